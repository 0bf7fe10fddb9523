// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # harness
//!
//! Runs a compiled model through a [`BackendRuntime`](backend_runtime::BackendRuntime)
//! and checks what it produced.
//!
//! A run loads raw input files into the model's input buffers, executes the
//! model a configurable number of times while timing each call, and then
//! either compares every output buffer against a golden reference file or,
//! when the golden files do not line up with the outputs, dumps the outputs
//! to disk.
//!
//! # Key Components
//!
//! - [`Session`]: the type-state pipeline driving one run.
//! - [`HarnessConfig`]: run options, loadable from TOML.
//! - [`compare`]: difference count and SNR over typed output data.
//! - [`OutputValidator`]: the golden-match-or-dump policy.
//! - [`ExecutionTimings`]: per-iteration durations and their average.
//! - [`file_io`]: whole-file reads and writes with exact size checks.
//!
//! # Report
//!
//! The human-readable report is written to a caller-supplied
//! [`std::io::Write`]; diagnostics go through `tracing`.

pub mod compare;
mod config;
mod console;
mod error;
pub mod file_io;
mod input_loader;
mod metrics;
mod output;
mod session;

pub use compare::{compare_bytes, ComparisonOutcome, GoldenElement};
pub use config::{dump_file_name, HarnessConfig, MISSING_INPUTS_MESSAGE};
pub use console::{Painted, Palette};
pub use error::{ErrorTag, HarnessError, Stage};
pub use input_loader::load_inputs;
pub use metrics::ExecutionTimings;
pub use output::{format_snr, OutputReport, OutputValidator};
pub use session::{
    run_harness, Executed, Idle, Opened, Primed, RunSummary, Session, SessionState, Validated,
};
