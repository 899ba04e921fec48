//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-spikeflow-npu-engine`, `--debug-spikeflow-config`, etc.
//! to raise one crate's log level to `debug`.

use std::collections::BTreeSet;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

/// Environment variable listing crates to debug (comma-separated, or `all`)
pub const DEBUG_ENV: &str = "SPIKEFLOW_DEBUG";

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use spikeflow_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(["--debug-spikeflow-npu-engine".to_string()]);
/// assert!(flags.is_enabled("spikeflow-npu-engine"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}` pattern.
    /// Also supports `--debug-all` to enable all crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }
        flags
    }

    pub fn enable(&mut self, crate_name: &str) {
        let crate_name = crate_name.trim();
        if !crate_name.is_empty() {
            self.enabled_crates.insert(crate_name.to_string());
        }
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Get all enabled crates
    pub fn enabled_crates(&self) -> impl Iterator<Item = &str> {
        self.enabled_crates.iter().map(String::as_str)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Get log level filter for a crate
    ///
    /// Returns `tracing::Level::DEBUG` if enabled, `tracing::Level::INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Create a tracing filter from debug flags
    ///
    /// Format: `spikeflow_npu_engine=debug,info`, or just the default level if no
    /// crate is enabled.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        self.enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_target(crate_name)))
            .chain(std::iter::once(default_level.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Parse debug flags from the process arguments and `SPIKEFLOW_DEBUG`
///
/// Environment variable format: comma-separated crate names, e.g.
/// `spikeflow-npu-engine,spikeflow-config`, or `all`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(env_var) = env::var(DEBUG_ENV) {
        apply_debug_env(&mut flags, &env_var);
    }
    flags
}

fn apply_debug_env(flags: &mut CrateDebugFlags, value: &str) {
    if value.trim() == "all" {
        flags.enable_all();
        return;
    }
    for crate_name in value.split(',') {
        flags.enable(crate_name);
    }
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  {env}={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  {env}=all                               Enable debug for all crates

Examples:
  --debug-spikeflow-npu-engine
  --debug-spikeflow-npu-engine --debug-spikeflow-config
  {env}=spikeflow-npu-engine,spikeflow-config
"#,
        KNOWN_CRATES.join(", "),
        env = DEBUG_ENV
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-spikeflow-npu-engine".to_string()]);
        assert!(flags.is_enabled("spikeflow-npu-engine"));
        assert!(!flags.is_enabled("spikeflow-config"));
    }

    #[test]
    fn test_unrelated_args_are_ignored() {
        let flags = CrateDebugFlags::from_args(vec![
            "simulate".to_string(),
            "--dt".to_string(),
            "0.1".to_string(),
        ]);
        assert!(!flags.any_enabled());
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_filter_string_uses_targets() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-spikeflow-npu-engine".to_string()]);
        assert_eq!(flags.to_filter_string("warn"), "spikeflow_npu_engine=debug,warn");
        assert_eq!(CrateDebugFlags::default().to_filter_string("info"), "info");
    }

    #[test]
    fn test_env_list() {
        let mut flags = CrateDebugFlags::default();
        apply_debug_env(&mut flags, "spikeflow-config, spikeflow-npu-neural,,");
        assert_eq!(
            flags.enabled_crates().collect::<Vec<_>>(),
            vec!["spikeflow-config", "spikeflow-npu-neural"]
        );

        let mut flags = CrateDebugFlags::default();
        apply_debug_env(&mut flags, "all");
        assert_eq!(flags.enabled_crates.len(), KNOWN_CRATES.len());
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-spikeflow-npu-engine".to_string()]);
        assert_eq!(flags.log_level("spikeflow-npu-engine"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("spikeflow-config"), tracing::Level::INFO);
    }
}
