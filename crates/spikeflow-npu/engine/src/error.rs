// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for backend selection, model setup and simulation runs

use spikeflow_npu_neural::NeuralError;
use spikeflow_npu_runtime::RuntimeError;

/// Simulation engine errors
///
/// Everything except [`SimError::Execution`] is raised during setup, before the
/// first time step runs.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Backend name that cannot be parsed at all
    #[error("Invalid backend name \"{0}\"")]
    InvalidBackendName(String),

    /// Unrecognised backend selected without an operator source
    #[error("Backend \"{0}\" cannot be used without an explicit operator source")]
    UnknownBackend(String),

    /// Operator source incomplete, unrecognised operator names, or wrong conventions
    #[error("Operator configuration error: {0}")]
    Operators(#[from] RuntimeError),

    /// Timestep that is not a finite positive floating-point value
    #[error("Invalid dt {0}: dt must be a finite, positive floating-point value")]
    InvalidDt(f64),

    /// Duration that is neither a length nor a `(start, end)` pair with `start < end`
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Group geometry with an unsupported number of dimensions
    #[error("Unsupported geometry {0:?}: groups are 1- or 2-dimensional")]
    UnsupportedGeometry(Vec<usize>),

    /// Step function declares a name that the run cannot bind
    #[error("Step \"{step}\" declares unknown parameter \"{param}\"")]
    UnknownStepParameter { step: String, param: String },

    /// Model of the wrong kind handed to a group
    #[error("Model type mismatch: expected {expected}, got {actual}")]
    ModelUse { expected: String, actual: String },

    /// Model description that fails validation
    #[error("Invalid model \"{model}\": {reason}")]
    InvalidModel { model: String, reason: String },

    /// Monitor on a variable the state does not have
    #[error("Cannot monitor \"{0}\": not a state variable")]
    UnknownMonitor(String),

    /// Input or lookup naming a group that is not part of the run
    #[error("Unknown group \"{0}\"")]
    UnknownGroup(String),

    /// Two groups of one network share a name
    #[error("Duplicate group name \"{0}\"")]
    DuplicateGroup(String),

    /// Input definition that does not fit the run
    #[error("Invalid input for \"{var}\": {reason}")]
    InvalidInput { var: String, reason: String },

    /// State or parameter setup failure
    #[error(transparent)]
    State(NeuralError),

    /// Step body or primitive failure during a run
    #[error("Step \"{step}\" failed at step index {index}: {source}")]
    Execution {
        step: String,
        index: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl SimError {
    /// Whether this error was raised during setup rather than mid-run
    pub fn is_configuration(&self) -> bool {
        !matches!(self, SimError::Execution { .. })
    }
}

impl From<NeuralError> for SimError {
    fn from(err: NeuralError) -> Self {
        match err {
            NeuralError::UnknownStepParameter { step, param } => {
                SimError::UnknownStepParameter { step, param }
            }
            NeuralError::Runtime(inner) => SimError::Operators(inner),
            other => SimError::State(other),
        }
    }
}

pub type Result<T> = core::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_parameter_error_is_lifted() {
        let err: SimError = NeuralError::UnknownStepParameter {
            step: "update".to_string(),
            param: "gain".to_string(),
        }
        .into();
        assert!(matches!(err, SimError::UnknownStepParameter { ref param, .. } if param == "gain"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_execution_keeps_source() {
        let err = SimError::Execution {
            step: "update".to_string(),
            index: 3,
            source: anyhow::anyhow!("diverged"),
        };
        assert!(!err.is_configuration());
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("diverged"));
        assert!(err.to_string().contains("step index 3"));
    }
}
