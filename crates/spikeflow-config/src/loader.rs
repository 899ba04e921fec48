// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::validation::{collect_errors, report, validate_document};
use crate::{ConfigError, ConfigResult, SpikeflowConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "spikeflow.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "SPIKEFLOW_CONFIG_PATH";

/// Find the Spikeflow configuration file
///
/// Search order:
/// 1. `SPIKEFLOW_CONFIG_PATH` environment variable
/// 2. Current working directory: `./spikeflow.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(
            cwd.ancestors()
                .skip(1)
                .take(5)
                .map(|dir| dir.join(CONFIG_FILE_NAME)),
        );
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Spikeflow configuration file '{}' not found in any of these locations:\n{}\n\nSet {} environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Parse and validate a TOML document without applying overrides
///
/// # Errors
///
/// `ParseError` for invalid TOML; `ValidationError` listing every problem otherwise
pub fn parse_config(content: &str) -> ConfigResult<SpikeflowConfig> {
    let (config, mut errors) = parse_document(content)?;
    errors.extend(collect_errors(&config));
    report(errors)?;
    Ok(config)
}

fn parse_document(
    content: &str,
) -> ConfigResult<(SpikeflowConfig, Vec<crate::ConfigValidationError>)> {
    let raw: toml::Table = content.parse()?;
    let errors = validate_document(&raw);
    let config: SpikeflowConfig = toml::Value::Table(raw).try_into()?;
    Ok((config, errors))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Returns
///
/// Complete `SpikeflowConfig` with all overrides applied
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, has an
/// unparseable override, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SpikeflowConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };
    debug!(path = %config_file.display(), "[CONFIG] Loading configuration");

    let content = fs::read_to_string(&config_file)?;
    let (mut config, mut errors) = parse_document(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    errors.extend(collect_errors(&config));
    report(errors)?;
    Ok(config)
}

/// Parse an override timestep; integer spellings are rejected like in the file
fn parse_dt(source: &str, value: &str) -> ConfigResult<f64> {
    let value = value.trim();
    if value.parse::<i64>().is_ok() {
        return Err(ConfigError::InvalidValue(format!(
            "{source}: dt must be a floating-point value, got '{value}'"
        )));
    }
    value.parse::<f64>().map_err(|e| {
        ConfigError::InvalidValue(format!("{source}: cannot parse dt '{value}': {e}"))
    })
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SPIKEFLOW_BACKEND` -> `backend.name`
/// - `SPIKEFLOW_DT` -> `backend.dt`
/// - `SPIKEFLOW_LOG_LEVEL` -> `logging.level`
///
/// # Errors
///
/// `InvalidValue` when `SPIKEFLOW_DT` is not a floating-point number
pub fn apply_environment_overrides(config: &mut SpikeflowConfig) -> ConfigResult<()> {
    if let Ok(value) = env::var("SPIKEFLOW_BACKEND") {
        config.backend.name = value;
    }
    if let Ok(value) = env::var("SPIKEFLOW_DT") {
        config.backend.dt = parse_dt("SPIKEFLOW_DT", &value)?;
    }
    if let Ok(value) = env::var("SPIKEFLOW_LOG_LEVEL") {
        config.logging.level = value;
    }
    Ok(())
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - CLI arguments (e.g., `{"backend": "jit", "dt": "0.05"}`)
///
/// # Errors
///
/// `InvalidValue` when `dt` is not a floating-point number
pub fn apply_cli_overrides(
    config: &mut SpikeflowConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("backend") {
        config.backend.name = value.clone();
    }
    if let Some(value) = cli_args.get("dt") {
        config.backend.dt = parse_dt("--dt", value)?;
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in ["SPIKEFLOW_BACKEND", "SPIKEFLOW_DT", "SPIKEFLOW_LOG_LEVEL"] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        env::set_var(CONFIG_PATH_ENV, missing.to_str().unwrap());
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[backend]").unwrap();
        writeln!(file, "name = \"jit\"").unwrap();
        writeln!(file, "dt = 0.025").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();
        assert_eq!(config.backend.name, "jit");
        assert_eq!(config.backend.dt, 0.025);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_integer_dt_in_file_fails() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[backend]\ndt = 1\n[logging]\nlevel = \"loud\"\n").unwrap();

        match load_config(Some(&config_path), None) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("dt must be a floating-point value"));
                assert!(msg.contains("logging.level"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = SpikeflowConfig::default();

        env::set_var("SPIKEFLOW_BACKEND", "gpu");
        env::set_var("SPIKEFLOW_DT", "0.01");
        let result = apply_environment_overrides(&mut config);
        clear_env();

        result.unwrap();
        assert_eq!(config.backend.name, "gpu");
        assert_eq!(config.backend.dt, 0.01);
    }

    #[test]
    fn test_environment_integer_dt_fails() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = SpikeflowConfig::default();

        env::set_var("SPIKEFLOW_DT", "2");
        let result = apply_environment_overrides(&mut config);
        clear_env();

        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
        assert_eq!(config.backend.dt, 0.1);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = SpikeflowConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("backend".to_string(), "autodiff".to_string());
        cli_args.insert("log_level".to_string(), "debug".to_string());

        apply_cli_overrides(&mut config, &cli_args).unwrap();

        assert_eq!(config.backend.name, "autodiff");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[backend]\nname = \"array\"\ndt = 0.5\n").unwrap();

        env::set_var("SPIKEFLOW_BACKEND", "jit");
        env::set_var("SPIKEFLOW_DT", "0.2");

        let mut cli_args = HashMap::new();
        cli_args.insert("backend".to_string(), "jit-parallel".to_string());

        let result = load_config(Some(&config_path), Some(&cli_args));
        clear_env();

        // CLI wins for backend, env wins for dt (no CLI override)
        let config = result.unwrap();
        assert_eq!(config.backend.name, "jit-parallel");
        assert_eq!(config.backend.dt, 0.2);
    }
}
