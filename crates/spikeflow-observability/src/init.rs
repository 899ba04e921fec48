// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Console logging initialisation
//!
//! Installs a `fmt` subscriber filtered by the configured level plus per-crate
//! debug overrides. Initialisation is idempotent: if a global subscriber is
//! already installed (by an earlier call or by the host application) it is left
//! alone.

use std::str::FromStr;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::LoggingConfig;

/// Filter directive combining `config` and `debug_flags`
pub fn filter_directive(config: &LoggingConfig, debug_flags: &CrateDebugFlags) -> String {
    let mut flags = debug_flags.clone();
    for crate_name in &config.debug_crates {
        flags.enable(crate_name);
    }
    flags.to_filter_string(&config.level.to_lowercase())
}

/// Initialize console logging
///
/// Returns `true` if this call installed the global subscriber, `false` if one was
/// already installed.
///
/// # Errors
/// Fails for an unknown level or when a crate name does not form a valid filter
/// directive.
pub fn init_logging(config: &LoggingConfig, debug_flags: &CrateDebugFlags) -> Result<bool> {
    tracing::Level::from_str(config.level.trim())
        .with_context(|| format!("Invalid log level: '{}'", config.level))?;
    let directive = filter_directive(config, debug_flags);
    let env_filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter: {directive}"))?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .with_file(false)
        .with_line_number(false)
        .with_filter(env_filter);

    let installed = Registry::default().with(console_layer).try_init().is_ok();
    if installed {
        tracing::debug!(filter = %directive, "[LOGGING] Subscriber installed");
    }
    Ok(installed)
}

/// Initialize logging with default settings and flags from the process arguments
/// and `SPIKEFLOW_DEBUG`
pub fn init_logging_default() -> Result<bool> {
    init_logging(&LoggingConfig::default(), &crate::cli::parse_debug_flags())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_merges_config_and_flags() {
        let config = LoggingConfig::default()
            .with_level("WARN")
            .with_debug_crates(["spikeflow-config"]);
        let flags = CrateDebugFlags::from_args(vec!["--debug-spikeflow-npu-engine".to_string()]);
        assert_eq!(
            filter_directive(&config, &flags),
            "spikeflow_config=debug,spikeflow_npu_engine=debug,warn"
        );
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let config = LoggingConfig::default().with_level("loud");
        assert!(init_logging(&config, &CrateDebugFlags::default()).is_err());
    }

    #[test]
    fn test_second_init_is_a_no_op() {
        let config = LoggingConfig::default().with_level("error");
        let first = init_logging(&config, &CrateDebugFlags::default()).unwrap();
        let second = init_logging(&config, &CrateDebugFlags::default()).unwrap();
        // Another test in this binary may have installed the subscriber first.
        assert!(!second);
        let _ = first;
    }
}
