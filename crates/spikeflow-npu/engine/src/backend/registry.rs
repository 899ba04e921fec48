// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Process-wide backend context
//!
//! Single-writer configuration: configure first, then construct and run. A run
//! works on a snapshot taken when it starts, so switching backends from another
//! thread never tears an in-flight run.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use spikeflow_npu_runtime::{OpName, Operator, OperatorModule, OperatorTable};

use super::{BackendContext, BackendOptions, BackendType};
use crate::error::Result;
use crate::runner::{GeneralNetRunner, NetRunner, NodeRunner};

static REGISTRY: Lazy<RwLock<BackendContext>> =
    Lazy::new(|| RwLock::new(BackendContext::default()));

/// Switch the process-wide backend (see [`BackendContext::set`])
pub fn set(backend: BackendType, options: BackendOptions) -> Result<()> {
    REGISTRY.write().set(backend, options)
}

/// Rebind every primitive of the process-wide table from `module`
pub fn set_ops_from_module(module: &dyn OperatorModule) -> Result<()> {
    REGISTRY.write().set_ops_from_module(module)
}

/// Rebind the named primitives of the process-wide table
pub fn set_ops<I, K>(ops: I) -> Result<Vec<OpName>>
where
    I: IntoIterator<Item = (K, Operator)>,
    K: Into<String>,
{
    REGISTRY.write().set_ops(ops)
}

pub fn set_dt(dt: f64) -> Result<()> {
    REGISTRY.write().set_dt(dt)
}

pub fn get_dt() -> f64 {
    REGISTRY.read().dt()
}

pub fn get_backend() -> BackendType {
    REGISTRY.read().backend().clone()
}

pub fn get_node_runner() -> Arc<dyn NodeRunner> {
    REGISTRY.read().node_runner()
}

/// Registered net runner; registers the general runner on first use if unset
pub fn get_net_runner() -> Arc<dyn NetRunner> {
    if let Some(runner) = REGISTRY.read().registered_net_runner() {
        return runner;
    }
    let mut registry = REGISTRY.write();
    match registry.registered_net_runner() {
        Some(runner) => runner,
        None => {
            let runner: Arc<dyn NetRunner> = Arc::new(GeneralNetRunner);
            registry.register_net_runner(Arc::clone(&runner));
            runner
        }
    }
}

/// Active process-wide operator table
pub fn ops() -> OperatorTable {
    REGISTRY.read().ops().clone()
}

/// Snapshot of the process-wide context
pub fn current() -> BackendContext {
    REGISTRY.read().clone()
}
