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

//! # Spikeflow Simulation Engine
//!
//! Backend dispatch and the per-timestep run loop.
//!
//! ## Architecture
//! - **Backend registry**: active backend, `dt`, operator table and runners, either
//!   process-wide or as an isolated [`BackendContext`]
//! - **Binding**: step functions are resolved to their arguments once per run, then
//!   called in a plain loop
//! - **Models**: [`NeuType`] / [`SynType`] descriptions, [`NeuGroup`] ensembles and
//!   [`Network`]s of groups
//! - **Monitors**: per-run time series of state variables
//!
//! ## Example
//!
//! ```rust
//! use spikeflow_npu_engine::{BackendContext, NeuType};
//! use spikeflow_npu_neural::{StateTemplate, StepFunction};
//!
//! let ctx = BackendContext::default().with_dt(1.0).unwrap();
//! let clock = NeuType::builder("clock")
//!     .requires(StateTemplate::new([("v", 0.0)]).unwrap())
//!     .step(StepFunction::new("tick", ["ST", "t"], |args| {
//!         let t = args.t()?;
//!         args.state()?.set("v", t)?;
//!         Ok(())
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let mon = clock.run_with_context(&ctx, 10.0, &["v"], &[]).unwrap();
//! assert_eq!(mon["v"][[9]], 9.0);
//! assert_eq!(mon.ts().len(), 10);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod backend;
pub mod error;
pub mod group;
pub mod model;
pub mod monitor;
pub mod network;
pub mod runner;
pub mod synthesis;

pub use backend::{BackendContext, BackendOptions, BackendType, DEFAULT_DT};
pub use error::{Result, SimError};
pub use group::{Geometry, GroupOptions, NeuGroup};
pub use model::{BaseType, Model, ModelBuilder, NeuType, SynType};
pub use monitor::Monitors;
pub use network::Network;
pub use runner::{
    GeneralNetRunner, GeneralNodeRunner, Input, InputMode, InputValue, NetRunner, NodeRunner,
    RunOptions, RunPlan,
};
pub use synthesis::Duration;
