// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for operator resolution and primitive evaluation

/// Runtime errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// An operator module does not provide a vocabulary primitive
    #[error("Operation \"{op}\" is needed, but is not defined in module \"{module}\"")]
    MissingOperator {
        /// Missing primitive name
        op: String,
        /// Offending module name
        module: String,
    },

    /// Operator overrides named primitives outside the vocabulary (all of them)
    #[error("Unknown operations: {0:?}")]
    UnknownOperators(Vec<String>),

    /// An operator was assigned to a slot with a different calling convention
    #[error("Operation \"{op}\" expects {expected}, got {actual}")]
    SignatureMismatch {
        /// Vocabulary slot
        op: String,
        /// Convention the slot requires
        expected: String,
        /// Convention that was supplied
        actual: String,
    },

    /// Tensor shapes are incompatible with the requested primitive
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Invalid parameters provided to a primitive
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl From<ndarray::ShapeError> for RuntimeError {
    fn from(err: ndarray::ShapeError) -> Self {
        RuntimeError::ShapeMismatch(err.to_string())
    }
}

/// Result type for runtime operations
pub type Result<T> = core::result::Result<T, RuntimeError>;
