// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Post-execution handling of the output region.
//!
//! Golden matching is all-or-nothing. When exactly one golden file per
//! output buffer was supplied, every output is compared against its golden
//! file. Otherwise no output is compared and every output is dumped to
//! `output<i>.bin` instead.

use crate::compare::{self, ComparisonOutcome};
use crate::config::dump_file_name;
use crate::console::Palette;
use crate::error::Stage;
use crate::file_io::{self, FileIoError};
use crate::HarnessError;
use backend_runtime::{BackendRuntime, Buffer, BufferSet, ElementType, ModelHandle};
use scratch_pool::ScratchPool;
use std::io::Write;
use std::path::{Path, PathBuf};

/// What happened to one output buffer.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum OutputReport {
    /// Compared against its golden file.
    Compared(ComparisonOutcome),
    /// Written to the given file because golden matching was disabled.
    Dumped(PathBuf),
    /// The golden file loaded, but the element type cannot be compared.
    Unsupported(ElementType),
}

impl OutputReport {
    pub fn outcome(&self) -> Option<&ComparisonOutcome> {
        match self {
            OutputReport::Compared(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Compares or dumps every output buffer of an executed model.
#[derive(Debug)]
pub struct OutputValidator<'a> {
    pub goldens: &'a [PathBuf],
    pub threshold: f32,
    pub output_dir: &'a Path,
    pub pool: &'a ScratchPool,
    pub palette: Palette,
}

impl OutputValidator<'_> {
    /// Processes each output buffer in order, writing the report to `out`.
    ///
    /// Returns one [`OutputReport`] per output buffer. The first I/O or
    /// backend failure aborts processing.
    pub fn process<B: BackendRuntime + ?Sized>(
        &self,
        backend: &B,
        handle: ModelHandle,
        buffers: &BufferSet,
        out: &mut dyn Write,
    ) -> Result<Vec<OutputReport>, HarnessError> {
        let n_out = buffers.info().n_out_buf;
        let golden_match = self.goldens.len() == n_out;

        if !golden_match {
            tracing::warn!(
                "{} golden files for {n_out} output layers; dumping outputs to {}",
                self.goldens.len(),
                self.output_dir.display()
            );
            writeln!(out, "Number of golden files and output layers mismatch.")?;
            writeln!(out, "\tDumping output layers.")?;
        }

        let mut reports = Vec::with_capacity(n_out);
        for (index, buffer) in buffers.outputs().iter().enumerate() {
            let report = if golden_match {
                self.compare_one(backend, handle, index, buffer, &self.goldens[index], out)?
            } else {
                self.dump_one(index, buffer)?
            };
            reports.push(report);
        }

        tracing::debug!("{}", self.pool.stats().summary());
        Ok(reports)
    }

    fn compare_one<B: BackendRuntime + ?Sized>(
        &self,
        backend: &B,
        handle: ModelHandle,
        index: usize,
        buffer: &Buffer,
        golden_path: &Path,
        out: &mut dyn Write,
    ) -> Result<OutputReport, HarnessError> {
        let mut golden = self
            .pool
            .acquire(buffer.size())
            .map_err(|source| HarnessError::Scratch { layer: index, source })?;

        file_io::read_full(golden_path, golden.as_mut_slice()).map_err(|e| match e {
            FileIoError::SizeMismatch {
                path,
                expected,
                actual,
            } => HarnessError::GoldenSizeMismatch {
                layer: index,
                path,
                expected,
                actual,
            },
            source => HarnessError::GoldenLoad { layer: index, source },
        })?;

        write!(out, "Output Layer({index}): ")?;

        let info = backend
            .output_buffer_info(handle, index)
            .map_err(HarnessError::backend(Stage::QueryOutputInfo))?;
        tracing::debug!(
            "output layer {index}: {} {} ({} bytes)",
            info.element_type,
            info.shape_string(),
            info.size
        );

        let Some(outcome) = compare::compare_bytes(
            info.element_type,
            golden.as_slice(),
            buffer.as_slice(),
            self.threshold,
        ) else {
            tracing::warn!("output layer {index}: cannot compare {} data", info.element_type);
            writeln!(
                out,
                "{}",
                self.palette.error(&format!("Unsupported element type ({})", info.element_type))
            )?;
            return Ok(OutputReport::Unsupported(info.element_type));
        };

        if outcome.is_match() {
            writeln!(out, "{}", self.palette.success("Golden Match"))?;
        } else {
            writeln!(out, "{}", self.palette.error("Golden Mismatch"))?;
            writeln!(out, "-\tdifferent indices:{}", outcome.diff_count)?;
        }
        writeln!(out, "-\tsnr value:{}", format_snr(outcome.snr))?;

        Ok(OutputReport::Compared(outcome))
    }

    fn dump_one(&self, index: usize, buffer: &Buffer) -> Result<OutputReport, HarnessError> {
        let path = self.output_dir.join(dump_file_name(index));
        file_io::write_full(buffer.as_slice(), &path)
            .map_err(|source| HarnessError::OutputDump { layer: index, source })?;
        tracing::info!("output layer {index}: dumped {} bytes to {}", buffer.size(), path.display());
        Ok(OutputReport::Dumped(path))
    }
}

/// Formats an SNR for the report: `inf` for identical buffers, four decimals otherwise.
pub fn format_snr(snr: f64) -> String {
    if snr.is_infinite() {
        format!("{snr}")
    } else {
        format!("{snr:.4}")
    }
}
