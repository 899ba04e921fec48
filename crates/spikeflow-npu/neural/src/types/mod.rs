// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Core type definitions shared by state, steps and parameters

pub mod error;
pub mod params;

pub use error::{NeuralError, Result};
pub use params::{ParamValue, ParameterSet};
