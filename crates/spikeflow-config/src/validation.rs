// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Two passes: [`validate_document`] checks how values are written in the TOML
//! source, [`validate_config`] checks the resolved values. Both collect every
//! problem before failing.

use crate::{ConfigError, ConfigResult, LoggingSection, SpikeflowConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Check the raw document before it is deserialised
///
/// TOML integers deserialise into `f64` silently, so `dt = 1` is caught here:
/// the timestep must be written as a floating-point literal.
pub fn validate_document(raw: &toml::Table) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    let dt = raw
        .get("backend")
        .and_then(toml::Value::as_table)
        .and_then(|backend| backend.get("dt"));
    if let Some(value) = dt {
        if !value.is_float() {
            errors.push(ConfigValidationError::InvalidValue {
                field: "backend.dt".to_string(),
                reason: format!(
                    "dt must be a floating-point value, got {} `{}`",
                    value.type_str(),
                    value
                ),
            });
        }
    }
    errors
}

/// Validate the resolved configuration
///
/// Checks for:
/// - Non-empty backend name
/// - Finite, positive `dt`
/// - Known log level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &SpikeflowConfig) -> ConfigResult<()> {
    report(collect_errors(config))
}

/// Every problem with the resolved values
pub(crate) fn collect_errors(config: &SpikeflowConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_backend(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

/// Turn collected problems into a single error
pub(crate) fn report(errors: Vec<ConfigValidationError>) -> ConfigResult<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

fn validate_backend(config: &SpikeflowConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.backend.name.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "backend.name".to_string(),
        });
    }

    let dt = config.backend.dt;
    if !dt.is_finite() || dt <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "backend.dt".to_string(),
            reason: format!("must be finite and positive, got {dt}"),
        });
    }
}

fn validate_logging(config: &SpikeflowConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LoggingSection::LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!(
                "must be one of {}, got '{}'",
                LoggingSection::LEVELS.join("/"),
                config.logging.level
            ),
        });
    }
    for name in &config.logging.debug_crates {
        if name.trim().is_empty() {
            errors.push(ConfigValidationError::InvalidValue {
                field: "logging.debug_crates".to_string(),
                reason: "crate names must not be empty".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_dt_is_rejected() {
        let raw: toml::Table = "[backend]\ndt = 1\n".parse().unwrap();
        let errors = validate_document(&raw);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("dt must be a floating-point value"));

        let raw: toml::Table = "[backend]\ndt = 1.0\n".parse().unwrap();
        assert!(validate_document(&raw).is_empty());
    }

    #[test]
    fn test_non_positive_dt() {
        let mut config = SpikeflowConfig::default();
        config.backend.dt = 0.0;

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("backend.dt"));
            assert!(msg.contains("finite and positive"));
        } else {
            panic!("expected a validation error");
        }
    }

    #[test]
    fn test_every_problem_is_reported() {
        let mut config = SpikeflowConfig::default();
        config.backend.name = "  ".to_string();
        config.backend.dt = f64::NAN;
        config.logging.level = "verbose".to_string();

        assert_eq!(collect_errors(&config).len(), 3);
        if let Err(ConfigError::ValidationError(msg)) = validate_config(&config) {
            assert!(msg.contains("backend.name"));
            assert!(msg.contains("backend.dt"));
            assert!(msg.contains("logging.level"));
        } else {
            panic!("expected a validation error");
        }
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let mut config = SpikeflowConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
