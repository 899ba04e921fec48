// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikeflow-observability
//!
//! Logging initialisation shared by all Spikeflow crates, with per-crate debug
//! flag support (`--debug-spikeflow-npu-engine`, `SPIKEFLOW_DEBUG=all`, ...).

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known Spikeflow crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "spikeflow",
    "spikeflow-config",
    "spikeflow-observability",
    "spikeflow-npu-runtime",
    "spikeflow-npu-neural",
    "spikeflow-npu-engine",
];

/// `tracing` target of a crate (`spikeflow-npu-engine` -> `spikeflow_npu_engine`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
