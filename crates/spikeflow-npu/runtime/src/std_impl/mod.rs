// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Host Operator Modules
//!
//! Operator modules that evaluate on the host CPU.
//!
//! ## Modules
//! - [`HostOps`]: eager ndarray evaluation, one primitive call = one array pass
//! - [`ParallelHostOps`] (`parallel` feature): elementwise and reduction primitives
//!   split across the Rayon pool, everything else shared with [`HostOps`]

pub mod host_ops;
#[cfg(feature = "parallel")]
pub mod parallel_ops;

pub use host_ops::HostOps;
#[cfg(feature = "parallel")]
pub use parallel_ops::ParallelHostOps;
