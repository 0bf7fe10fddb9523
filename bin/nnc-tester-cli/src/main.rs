// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # nnc-tester
//!
//! Executes a compiled model and validates its outputs against golden data.
//!
//! ## Usage
//! ```bash
//! # Run once and compare against golden outputs
//! nnc-tester --model model.toml --input in0.bin --input in1.bin --golden out0.bin
//!
//! # Time 100 iterations without loading inputs or checking outputs
//! nnc-tester --model model.toml --force --iteration 100
//!
//! # Dump outputs (no golden files) into ./dumps
//! nnc-tester --model model.toml --input in0.bin in1.bin --output-dir ./dumps
//! ```
//!
//! Exits with status 0 on success and 1 on any failure.

mod run;

use clap::{ArgAction, Parser};
use harness::Palette;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "nnc-tester",
    about = "Executes a compiled model and validates its outputs against golden data",
    version,
    author
)]
struct Cli {
    /// Model to execute (a TOML model descriptor).
    #[arg(long, required_unless_present = "config")]
    model: Option<String>,

    /// Input data files, one per input layer, in layer order.
    #[arg(long = "input", value_name = "FILE", num_args = 1.., action = ArgAction::Append)]
    inputs: Vec<PathBuf>,

    /// Golden (reference) files, one per output layer, in layer order.
    #[arg(long = "golden", value_name = "FILE", num_args = 1.., action = ArgAction::Append)]
    goldens: Vec<PathBuf>,

    /// Number of times to execute the model [default: 1].
    #[arg(long)]
    iteration: Option<u32>,

    /// Per-element tolerance when comparing against golden data [default: 0.0].
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<f32>,

    /// Run the model without input data and skip output validation.
    #[arg(long)]
    force: bool,

    /// Path to a TOML configuration file; command-line options override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory that receives output<i>.bin dumps [default: .].
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    init_tracing(cli.verbose);

    let stderr_palette =
        Palette::new(colors_allowed(!cli.no_color) && std::io::stderr().is_terminal());
    match run::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            run::report_failure(&e, stderr_palette);
            ExitCode::FAILURE
        }
    }
}

/// Colors are used only if requested and `NO_COLOR` is unset.
pub(crate) fn colors_allowed(requested: bool) -> bool {
    requested && std::env::var_os("NO_COLOR").is_none()
}

/// Initializes the tracing subscriber on stderr, keeping stdout for the report.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
