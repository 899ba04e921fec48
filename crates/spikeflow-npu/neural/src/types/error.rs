// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for state containers and step declarations

use spikeflow_npu_runtime::RuntimeError;

/// Error types for neural state and step handling
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NeuralError {
    /// Variable name not present in the state's fixed variable set
    #[error("Unknown state variable \"{0}\"")]
    UnknownVariable(String),

    /// Raw slot index outside the state's rows
    #[error("Slot index {index} out of range for {rows} state rows")]
    SlotOutOfRange { index: isize, rows: usize },

    /// Access path does not match the state's layout
    #[error("Layout mismatch: {0}")]
    LayoutMismatch(String),

    /// Malformed state template
    #[error("Invalid state template: {0}")]
    InvalidTemplate(String),

    /// Step declares a parameter name that cannot be bound
    #[error("Step \"{step}\" declares unknown parameter \"{param}\"")]
    UnknownStepParameter { step: String, param: String },

    /// Step body asked for a value it did not declare
    #[error("Step \"{step}\" did not declare \"{arg}\"")]
    UndeclaredArgument { step: String, arg: String },

    /// Parameter value problems (unknown name, bad per-unit length, ...)
    #[error("Invalid parameter \"{name}\": {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Operator failure while allocating or reshaping state
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub type Result<T> = core::result::Result<T, NeuralError>;
