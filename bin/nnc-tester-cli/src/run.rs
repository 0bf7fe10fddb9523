// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Resolves the run configuration and drives the harness.

use crate::Cli;
use backend_runtime::ManifestBackend;
use harness::{HarnessConfig, HarnessError, Palette};
use std::io::{IsTerminal, Write};

const SUCCESS_MESSAGE: &str = "ENN Framework Execute Model Success";
const FAILURE_MESSAGE: &str = "[[Failed to Execute Model]]";

pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(cli)?;
    tracing::debug!("resolved configuration: {config:?}");

    let stdout = std::io::stdout();
    let palette = Palette::new(crate::colors_allowed(config.color) && stdout.is_terminal());
    let mut out = stdout.lock();

    let summary = harness::run_harness(ManifestBackend::new(), config, palette, &mut out)?;
    tracing::debug!("{}", summary.scratch.summary());

    writeln!(out, "{}", palette.success(SUCCESS_MESSAGE))?;
    Ok(())
}

/// Starts from the config file (or defaults) and applies command-line overrides.
fn resolve_config(cli: Cli) -> Result<HarnessConfig, HarnessError> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::from_file(path)?,
        None => HarnessConfig::default(),
    };

    if let Some(model) = cli.model {
        config.model = model;
    }
    if !cli.inputs.is_empty() {
        config.inputs = cli.inputs;
    }
    if !cli.goldens.is_empty() {
        config.goldens = cli.goldens;
    }
    if let Some(iterations) = cli.iteration {
        config.iterations = iterations;
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    config.force |= cli.force;
    config.color &= !cli.no_color;

    Ok(config)
}

/// Prints a failed run to stderr.
///
/// Usage errors print only their message. Everything else is prefixed with
/// its category tag and followed by the failure banner.
pub fn report_failure(err: &anyhow::Error, palette: Palette) {
    match err.downcast_ref::<HarnessError>() {
        Some(HarnessError::Usage(msg)) => eprintln!("{msg}"),
        Some(e) => {
            eprintln!("{}\t{e}", palette.error(e.tag().as_str()));
            eprintln!("{}", palette.error(FAILURE_MESSAGE));
        }
        None => {
            eprintln!("{err:#}");
            eprintln!("{}", palette.error(FAILURE_MESSAGE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("nnc-tester").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "--model", "m.toml", "--input", "a.bin", "b.bin", "--golden", "g.bin",
            "--iteration", "4", "--threshold", "0.5", "--output-dir", "out", "--no-color",
        ]);
        let c = resolve_config(cli).unwrap();
        assert_eq!(c.model, "m.toml");
        assert_eq!(c.inputs, vec![PathBuf::from("a.bin"), PathBuf::from("b.bin")]);
        assert_eq!(c.goldens, vec![PathBuf::from("g.bin")]);
        assert_eq!(c.iterations, 4);
        assert_eq!(c.threshold, 0.5);
        assert_eq!(c.output_dir, PathBuf::from("out"));
        assert!(!c.color);
        assert!(!c.force);
    }

    #[test]
    fn test_repeated_input_flags_keep_order() {
        let cli = parse(&["--model", "m", "--input", "x.bin", "--input", "y.bin"]);
        let c = resolve_config(cli).unwrap();
        assert_eq!(c.inputs, vec![PathBuf::from("x.bin"), PathBuf::from("y.bin")]);
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            "model = \"from-file.toml\"\niterations = 7\nforce = true\nthreshold = 0.1\n",
        )
        .unwrap();

        let cli = parse(&["--config", path.to_str().unwrap(), "--iteration", "2"]);
        let c = resolve_config(cli).unwrap();
        assert_eq!(c.model, "from-file.toml");
        assert_eq!(c.iterations, 2);
        assert!(c.force);
        assert_eq!(c.threshold, 0.1);
    }

    #[test]
    fn test_model_required_without_config() {
        assert!(Cli::try_parse_from(["nnc-tester", "--force"]).is_err());
    }

    #[test]
    fn test_negative_iteration_rejected() {
        assert!(Cli::try_parse_from(["nnc-tester", "--model", "m", "--iteration", "-1"]).is_err());
    }
}
