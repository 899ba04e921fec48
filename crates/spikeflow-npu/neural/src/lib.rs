// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Spikeflow Neural Building Blocks (Backend-Agnostic)
//!
//! Everything a model description is made of:
//! - **State**: [`NeuState`] named-variable container and its [`StateTemplate`]
//! - **Steps**: [`StepFunction`] declarations and one-time argument [`bind`]ing
//! - **Types**: parameters ([`ParameterSet`]) and errors ([`NeuralError`])
//!
//! Buffers are allocated through a [`spikeflow_npu_runtime::OperatorTable`], so the
//! same model code runs on whichever backend supplied the table.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod state;
pub mod step;
pub mod types;

pub use state::{Layout, NeuState, StateTemplate};
pub use step::{bind, ArgSource, BindScope, BoundStep, StepArgs, StepFunction, STATE_KEY};
pub use types::{NeuralError, ParamValue, ParameterSet, Result};
