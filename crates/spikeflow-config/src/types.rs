// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `spikeflow.toml`. Missing sections and keys
//! fall back to their defaults.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpikeflowConfig {
    pub backend: BackendSection,
    pub logging: LoggingSection,
}

/// Numeric backend and global timestep
///
/// ```toml
/// [backend]
/// name = "array"
/// dt = 0.1
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendSection {
    /// Backend name (`array`, `gpu`, `jit`, `jit-parallel`, `autodiff` or a custom name)
    pub name: String,
    /// Global timestep; must be written as a float literal
    pub dt: f64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            name: "array".to_string(),
            dt: 0.1,
        }
    }
}

/// Log verbosity
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSection {
    /// One of `trace`, `debug`, `info`, `warn`, `error`
    pub level: String,
    /// Crates logged at `debug` regardless of `level`
    pub debug_crates: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug_crates: Vec::new(),
        }
    }
}

impl LoggingSection {
    /// Accepted values of `level`
    pub const LEVELS: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SpikeflowConfig::default();
        assert_eq!(config.backend.name, "array");
        assert_eq!(config.backend.dt, 0.1);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.debug_crates.is_empty());
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: SpikeflowConfig = toml::from_str("[backend]\ndt = 0.05\n").unwrap();
        assert_eq!(config.backend.name, "array");
        assert_eq!(config.backend.dt, 0.05);
        assert_eq!(config.logging, LoggingSection::default());
    }
}
