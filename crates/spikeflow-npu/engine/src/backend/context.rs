// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Injectable backend configuration

use std::fmt;
use std::sync::Arc;

use spikeflow_npu_runtime::{OpName, Operator, OperatorModule, OperatorSource, OperatorTable};
use tracing::{debug, info, warn};

use super::{validate_dt, BackendType, DEFAULT_DT};
use crate::error::{Result, SimError};
use crate::runner::{GeneralNetRunner, GeneralNodeRunner, NetRunner, NodeRunner};

/// Optional parts of a backend switch
///
/// Anything left `None` resolves to the backend's default.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    /// Operator module or explicit name → operator overrides
    pub operators: Option<OperatorSource>,
    /// Runner for single groups
    pub node_runner: Option<Arc<dyn NodeRunner>>,
    /// Runner for networks
    pub net_runner: Option<Arc<dyn NetRunner>>,
    /// Timestep, applied even when the backend is already active
    pub dt: Option<f64>,
}

impl BackendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operators(mut self, operators: OperatorSource) -> Self {
        self.operators = Some(operators);
        self
    }

    pub fn with_node_runner(mut self, runner: Arc<dyn NodeRunner>) -> Self {
        self.node_runner = Some(runner);
        self
    }

    pub fn with_net_runner(mut self, runner: Arc<dyn NetRunner>) -> Self {
        self.net_runner = Some(runner);
        self
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }
}

/// Active backend, timestep, operator table and runners
///
/// Cheap to clone: operators and runners are shared handles. Models read a context
/// when they allocate state and when they run; switching a context afterwards does
/// not touch arrays that were already allocated.
#[derive(Clone)]
pub struct BackendContext {
    backend: BackendType,
    dt: f64,
    ops: OperatorTable,
    node_runner: Arc<dyn NodeRunner>,
    net_runner: Option<Arc<dyn NetRunner>>,
}

impl Default for BackendContext {
    fn default() -> Self {
        Self {
            backend: BackendType::Array,
            dt: DEFAULT_DT,
            ops: OperatorTable::host(),
            node_runner: Arc::new(GeneralNodeRunner),
            net_runner: Some(Arc::new(GeneralNetRunner)),
        }
    }
}

impl BackendContext {
    /// Context for `backend` with its default operators and runners
    ///
    /// # Errors
    /// `UnknownBackend` for a custom backend, which has no default operators.
    pub fn new(backend: BackendType) -> Result<Self> {
        Self::with_options(backend, BackendOptions::default())
    }

    /// Context for `backend` with some parts overridden
    pub fn with_options(backend: BackendType, options: BackendOptions) -> Result<Self> {
        let mut ctx = Self::default();
        ctx.set(backend, options)?;
        Ok(ctx)
    }

    /// Switch the active backend
    ///
    /// `options.dt` is validated and applied first, always. If `backend` is already
    /// active nothing else changes. Otherwise the operator table and runners are
    /// resolved completely before any of them replaces the current ones.
    ///
    /// # Errors
    /// - `InvalidDt` for a non-finite or non-positive timestep
    /// - `UnknownBackend` for a custom backend without `options.operators`
    /// - `Operators` when the operator source is incomplete or malformed
    pub fn set(&mut self, backend: BackendType, options: BackendOptions) -> Result<()> {
        let BackendOptions {
            operators,
            node_runner,
            net_runner,
            dt,
        } = options;

        if let Some(dt) = dt {
            self.set_dt(dt)?;
        }

        if backend == self.backend {
            debug!(%backend, "backend already active");
            return Ok(());
        }

        let ops = match operators {
            Some(OperatorSource::Module(module)) => OperatorTable::from_module(module.as_ref())?,
            Some(OperatorSource::Operations(overrides)) => {
                let mut table = self.ops.clone();
                table.apply(overrides)?;
                table
            }
            None => default_operators(&backend)?,
        };
        let node_runner = node_runner.unwrap_or_else(|| Arc::new(GeneralNodeRunner));
        let net_runner = net_runner.or_else(|| default_net_runner(&backend));

        info!(
            from = %self.backend,
            to = %backend,
            operators = ops.module_name(),
            node_runner = node_runner.name(),
            "[BACKEND] Switched backend"
        );

        self.backend = backend;
        self.ops = ops;
        self.node_runner = node_runner;
        self.net_runner = net_runner;
        Ok(())
    }

    /// Rebind every primitive from `module`
    ///
    /// # Errors
    /// `Operators(MissingOperator)` naming the first absent primitive and the module;
    /// the current table is left untouched.
    pub fn set_ops_from_module(&mut self, module: &dyn OperatorModule) -> Result<()> {
        self.ops = OperatorTable::from_module(module)?;
        info!(module = module.name(), "[BACKEND] Operators rebound from module");
        Ok(())
    }

    /// Rebind the named primitives, leaving every other one as it is
    ///
    /// # Errors
    /// `Operators(UnknownOperators)` listing every unrecognised name; nothing is
    /// rebound in that case.
    pub fn set_ops<I, K>(&mut self, ops: I) -> Result<Vec<OpName>>
    where
        I: IntoIterator<Item = (K, Operator)>,
        K: Into<String>,
    {
        let overrides = ops.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let rebound = self.ops.apply(overrides)?;
        debug!(?rebound, "operators rebound");
        Ok(rebound)
    }

    /// Set the simulation timestep
    pub fn set_dt(&mut self, dt: f64) -> Result<()> {
        self.dt = validate_dt(dt)?;
        debug!(dt, "timestep set");
        Ok(())
    }

    /// Builder-style [`set_dt`](Self::set_dt)
    pub fn with_dt(mut self, dt: f64) -> Result<Self> {
        self.set_dt(dt)?;
        Ok(self)
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn backend(&self) -> &BackendType {
        &self.backend
    }

    /// Active operator table
    pub fn ops(&self) -> &OperatorTable {
        &self.ops
    }

    pub fn node_runner(&self) -> Arc<dyn NodeRunner> {
        Arc::clone(&self.node_runner)
    }

    /// Registered net runner, or the general one if none was registered
    pub fn net_runner(&self) -> Arc<dyn NetRunner> {
        self.net_runner
            .clone()
            .unwrap_or_else(|| Arc::new(GeneralNetRunner))
    }

    /// Net runner registered for this backend, if any
    pub fn registered_net_runner(&self) -> Option<Arc<dyn NetRunner>> {
        self.net_runner.clone()
    }

    pub(crate) fn register_net_runner(&mut self, runner: Arc<dyn NetRunner>) {
        self.net_runner = Some(runner);
    }
}

impl fmt::Debug for BackendContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendContext")
            .field("backend", &self.backend)
            .field("dt", &self.dt)
            .field("ops", &self.ops.module_name())
            .field("node_runner", &self.node_runner.name())
            .field("net_runner", &self.net_runner.as_ref().map(|r| r.name()))
            .finish()
    }
}

fn default_operators(backend: &BackendType) -> Result<OperatorTable> {
    match backend {
        BackendType::Array | BackendType::Jit | BackendType::Autodiff => Ok(OperatorTable::host()),
        BackendType::Gpu => {
            warn!("[BACKEND] No GPU kernels compiled in, backend \"gpu\" evaluates on the host");
            Ok(OperatorTable::host())
        }
        #[cfg(feature = "parallel")]
        BackendType::JitParallel => Ok(OperatorTable::from_module(
            &spikeflow_npu_runtime::ParallelHostOps,
        )?),
        #[cfg(not(feature = "parallel"))]
        BackendType::JitParallel => {
            warn!("[BACKEND] 'parallel' feature not enabled at compile time, falling back to serial host operators");
            Ok(OperatorTable::host())
        }
        BackendType::Custom(name) => Err(SimError::UnknownBackend(name.clone())),
    }
}

fn default_net_runner(backend: &BackendType) -> Option<Arc<dyn NetRunner>> {
    match backend {
        BackendType::Array | BackendType::Gpu | BackendType::Autodiff => {
            Some(Arc::new(GeneralNetRunner))
        }
        BackendType::Jit | BackendType::JitParallel | BackendType::Custom(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spikeflow_npu_runtime::{HostOps, OperatorMap, Tensor};

    #[test]
    fn test_default_context() {
        let ctx = BackendContext::default();
        assert_eq!(ctx.backend(), &BackendType::Array);
        assert_eq!(ctx.dt(), DEFAULT_DT);
        assert_eq!(ctx.ops().module_name(), "host");
        assert!(ctx.registered_net_runner().is_some());
    }

    #[test]
    fn test_jit_leaves_net_runner_unset() {
        let ctx = BackendContext::new(BackendType::Jit).unwrap();
        assert!(ctx.registered_net_runner().is_none());
        assert_eq!(ctx.net_runner().name(), "general");
        assert_eq!(ctx.node_runner().name(), "general");
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_jit_parallel_uses_parallel_operators() {
        let ctx = BackendContext::new(BackendType::JitParallel).unwrap();
        assert_eq!(ctx.ops().module_name(), "host-parallel");
    }

    #[test]
    fn test_custom_backend_requires_operators() {
        let custom = BackendType::Custom("loihi".to_string());
        let err = BackendContext::new(custom.clone()).unwrap_err();
        assert!(matches!(err, SimError::UnknownBackend(ref n) if n == "loihi"));

        let ctx = BackendContext::with_options(
            custom.clone(),
            BackendOptions::new()
                .with_operators(OperatorSource::module(OperatorMap::from_module("loihi", &HostOps))),
        )
        .unwrap();
        assert_eq!(ctx.backend(), &custom);
        assert_eq!(ctx.ops().module_name(), "loihi");
    }

    #[test]
    fn test_same_backend_still_applies_dt() {
        let mut ctx = BackendContext::default();
        let before = ctx.ops().get(OpName::Zeros);
        ctx.set(
            BackendType::Array,
            BackendOptions::new()
                .with_dt(0.025)
                .with_operators(OperatorSource::operations([(
                    "zeros",
                    Operator::fill(|shape| Tensor::ones(shape)),
                )])),
        )
        .unwrap();
        assert_eq!(ctx.dt(), 0.025);
        // Already active: the operator source is ignored.
        assert!(ctx.ops().get(OpName::Zeros).same_callable(&before));
    }

    #[test]
    fn test_failed_switch_keeps_previous_backend() {
        let mut ctx = BackendContext::default();
        let partial = OperatorMap::from_module("partial", &HostOps).without(OpName::Eye);
        let err = ctx
            .set(
                BackendType::Custom("partial".to_string()),
                BackendOptions::new().with_operators(OperatorSource::module(partial)),
            )
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(ctx.backend(), &BackendType::Array);
        assert_eq!(ctx.ops().module_name(), "host");
    }

    #[test]
    fn test_rejects_bad_dt() {
        let mut ctx = BackendContext::default();
        assert!(matches!(ctx.set_dt(0.0), Err(SimError::InvalidDt(_))));
        assert_eq!(ctx.dt(), DEFAULT_DT);
    }
}
