// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Spikeflow - spiking point-neuron simulation
//!
//! Models are written once against a small vocabulary of array primitives and run
//! on whichever numeric backend is active. This crate re-exports the member crates
//! and wires configuration into the backend registry.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! spikeflow = "0.1"  # Default: config + observability
//! ```
//!
//! ```rust
//! use spikeflow::prelude::*;
//!
//! // Leaky integrator driven by a constant input
//! let lif = NeuType::builder("lif")
//!     .requires(StateTemplate::new([("v", 0.0), ("inp", 0.0)])?)
//!     .parameters(ParameterSet::new().with("tau", 10.0))
//!     .step(StepFunction::new("integrate", ["ST", "dt", "tau"], |args| {
//!         let dt = args.dt()?;
//!         let tau = args.param_value("tau")?;
//!         let st = args.state()?;
//!         let inp = st.var("inp")?.to_owned();
//!         st.var_mut("v")?.zip_mut_with(&inp, |v, i| *v += (-*v + i) / tau * dt);
//!         st.set("inp", 0.0)?;
//!         Ok(())
//!     }))
//!     .build()?;
//!
//! let ctx = BackendContext::default().with_dt(0.5)?;
//! let mut group = NeuGroup::new_with_context(
//!     &lif,
//!     100usize,
//!     GroupOptions::new().monitors(["v"]),
//!     &ctx,
//! )?;
//! let mon = group.run_with_context(&ctx, 50.0, RunOptions::new().input(Input::add("inp", 1.0)))?;
//! assert_eq!(mon["v"].shape(), &[100, 100]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`config`** (default): `spikeflow.toml` loading and [`init_from_config`]
//! - **`observability`** (default): console logging with per-crate debug flags
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  runtime: Tensor, operator vocabulary, host modules     │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  neural: NeuState, step declarations, parameters        │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  engine: backend registry, binding, runners, groups     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub use spikeflow_npu_engine as engine;
pub use spikeflow_npu_neural as neural;
pub use spikeflow_npu_runtime as runtime;

#[cfg(feature = "config")]
pub use spikeflow_config as config;

#[cfg(feature = "observability")]
pub use spikeflow_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::engine::backend;
    pub use crate::engine::{
        BackendContext, BackendOptions, BackendType, Duration, Geometry, GroupOptions, Input,
        InputMode, Model, Monitors, Network, NeuGroup, NeuType, RunOptions, SimError, SynType,
    };
    pub use crate::neural::{Layout, NeuState, ParamValue, ParameterSet, StateTemplate, StepFunction};
    pub use crate::runtime::{OpName, Operator, OperatorSource, Tensor};
}

/// Apply the `[backend]` section to the process-wide registry
///
/// Parses the backend name, switches to it and applies `dt`. Custom backend names
/// need an operator source and are rejected here; register them with
/// [`engine::backend::set`] instead.
///
/// # Errors
/// Any configuration error of the backend switch (`InvalidBackendName`,
/// `UnknownBackend`, `InvalidDt`).
#[cfg(feature = "config")]
pub fn init_from_config(
    config: &spikeflow_config::SpikeflowConfig,
) -> engine::Result<engine::BackendType> {
    let backend: engine::BackendType = config.backend.name.parse()?;
    let options = engine::BackendOptions::new().with_dt(config.backend.dt);
    engine::backend::set(backend.clone(), options)?;
    tracing::info!(
        backend = %backend,
        dt = config.backend.dt,
        "[CONFIG] Backend initialised from configuration"
    );
    Ok(backend)
}

/// Console logging as described by the `[logging]` section, plus `debug_flags`
///
/// Returns `true` if this call installed the global subscriber.
#[cfg(all(feature = "config", feature = "observability"))]
pub fn init_logging_from_config(
    config: &spikeflow_config::SpikeflowConfig,
    debug_flags: &spikeflow_observability::CrateDebugFlags,
) -> anyhow::Result<bool> {
    let logging = spikeflow_observability::LoggingConfig::default()
        .with_level(config.logging.level.clone())
        .with_debug_crates(config.logging.debug_crates.iter().cloned());
    spikeflow_observability::init_logging(&logging, debug_flags)
}
