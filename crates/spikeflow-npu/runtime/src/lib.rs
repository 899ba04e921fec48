// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! # Spikeflow Operator Runtime
//!
//! The numeric contract every spikeflow backend has to satisfy.
//!
//! This crate provides:
//! - **Tensor**: the backend-native array type (`ndarray::ArrayD<f64>`)
//! - **Vocabulary**: the fixed set of primitive operations ([`OpName`]) and their
//!   calling conventions ([`Operator`])
//! - **Operator tables**: a fully-resolved binding of every primitive ([`OperatorTable`])
//! - **Host modules**: [`HostOps`] (eager) and, behind `parallel`, [`ParallelHostOps`]
//!
//! ## Features
//!
//! - `default` = `["parallel"]`
//! - `parallel` = Rayon-backed elementwise and reduction primitives
//!
//! ## Usage
//!
//! ```rust
//! use spikeflow_npu_runtime::{HostOps, OperatorTable};
//!
//! let ops = OperatorTable::from_module(&HostOps).unwrap();
//! let v = ops.zeros(&[4]);
//! assert_eq!(ops.shape(&v), vec![4]);
//! ```
//!
//! ### Custom modules
//!
//! Implement [`OperatorModule`] and return an [`Operator`] for every [`OpName`]:
//!
//! ```rust
//! use spikeflow_npu_runtime::{HostOps, OpName, Operator, OperatorModule};
//!
//! struct Tracing;
//!
//! impl OperatorModule for Tracing {
//!     fn name(&self) -> &str {
//!         "tracing"
//!     }
//!
//!     fn get(&self, op: OpName) -> Option<Operator> {
//!         HostOps.get(op)
//!     }
//! }
//! ```

#![warn(missing_docs)]

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod ops;

// Host (CPU) operator modules
pub mod std_impl;

pub use error::{Result, RuntimeError};
pub use ops::{
    Convention, OpName, Operator, OperatorMap, OperatorModule, OperatorSource, OperatorTable,
    Tensor,
};
pub use std_impl::HostOps;
#[cfg(feature = "parallel")]
pub use std_impl::ParallelHostOps;

/// Version of the operator vocabulary
///
/// Increment this when adding or changing a primitive's calling convention.
pub const VOCABULARY_VERSION: u32 = 1;
