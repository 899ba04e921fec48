// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Backend Registry
//!
//! Selects the numeric backend a simulation runs on: its operator table, the
//! global timestep, and the runners that drive groups and networks.
//!
//! Two ways to use it:
//! - **Process-wide**: the free functions in [`registry`] ([`set`], [`set_dt`],
//!   [`ops`], ...) act on one shared [`BackendContext`]. Model code that never
//!   mentions a context reads this one.
//! - **Isolated**: build a [`BackendContext`] directly and pass it to the
//!   `*_with_context` constructors and runs. Nothing global is touched.
//!
//! ## Default resolution
//!
//! | Backend        | Operators           | Node runner | Net runner        |
//! |----------------|---------------------|-------------|-------------------|
//! | `array`        | `HostOps`           | General     | General           |
//! | `gpu`          | `HostOps` (warns)   | General     | General           |
//! | `jit`          | `HostOps`           | General     | unset → General   |
//! | `jit-parallel` | `ParallelHostOps`   | General     | unset → General   |
//! | `autodiff`     | `HostOps`           | General     | General           |
//! | custom         | caller must supply  | General     | unset → General   |

mod context;
pub mod registry;

pub use context::{BackendContext, BackendOptions};
pub use registry::{
    current, get_backend, get_dt, get_net_runner, get_node_runner, ops, set, set_dt, set_ops,
    set_ops_from_module,
};

use std::str::FromStr;

use crate::error::{Result, SimError};

/// Default simulation timestep
pub const DEFAULT_DT: f64 = 0.1;

/// Backend identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BackendType {
    /// Eager vectorised arrays
    #[default]
    Array,

    /// GPU arrays
    Gpu,

    /// JIT-compiled kernels
    Jit,

    /// JIT-compiled kernels, parallel over units
    JitParallel,

    /// Automatic-differentiation arrays
    Autodiff,

    /// Any other backend; needs an explicit operator source
    Custom(String),
}

impl BackendType {
    /// Whether this backend has built-in default operators
    pub fn is_recognised(&self) -> bool {
        !matches!(self, BackendType::Custom(_))
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Array => write!(f, "array"),
            BackendType::Gpu => write!(f, "gpu"),
            BackendType::Jit => write!(f, "jit"),
            BackendType::JitParallel => write!(f, "jit-parallel"),
            BackendType::Autodiff => write!(f, "autodiff"),
            BackendType::Custom(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for BackendType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if name.is_empty() {
            return Err(SimError::InvalidBackendName(s.to_string()));
        }
        match name.to_lowercase().as_str() {
            "array" | "ndarray" | "cpu" => Ok(BackendType::Array),
            "gpu" | "cuda" | "wgpu" => Ok(BackendType::Gpu),
            "jit" => Ok(BackendType::Jit),
            "jit-parallel" | "jit_parallel" => Ok(BackendType::JitParallel),
            "autodiff" => Ok(BackendType::Autodiff),
            _ => Ok(BackendType::Custom(name.to_string())),
        }
    }
}

/// Reject anything that is not a finite, strictly positive timestep
pub(crate) fn validate_dt(dt: f64) -> Result<f64> {
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        Err(SimError::InvalidDt(dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names_round_trip() {
        for backend in [
            BackendType::Array,
            BackendType::Gpu,
            BackendType::Jit,
            BackendType::JitParallel,
            BackendType::Autodiff,
            BackendType::Custom("loihi".to_string()),
        ] {
            assert_eq!(backend.to_string().parse::<BackendType>().unwrap(), backend);
        }
    }

    #[test]
    fn test_backend_aliases() {
        assert_eq!("CPU".parse::<BackendType>().unwrap(), BackendType::Array);
        assert_eq!("cuda".parse::<BackendType>().unwrap(), BackendType::Gpu);
        assert_eq!("jit_parallel".parse::<BackendType>().unwrap(), BackendType::JitParallel);
        assert!(matches!(
            "  ".parse::<BackendType>(),
            Err(SimError::InvalidBackendName(_))
        ));
    }

    #[test]
    fn test_validate_dt() {
        assert_eq!(validate_dt(0.25).unwrap(), 0.25);
        assert!(validate_dt(0.0).is_err());
        assert!(validate_dt(-0.1).is_err());
        assert!(validate_dt(f64::NAN).is_err());
        assert!(validate_dt(f64::INFINITY).is_err());
    }
}
