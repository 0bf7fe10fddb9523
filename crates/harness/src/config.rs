// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Harness configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! model = "./models/mobilenet.toml"
//! inputs = ["input0.bin", "input1.bin"]
//! goldens = ["golden0.bin"]
//! iterations = 10
//! threshold = 0.01
//! force = false
//! output_dir = "./dumps"
//! scratch_budget = "256M"
//! color = true
//! ```
//!
//! Every key is optional; missing keys take the values of
//! [`HarnessConfig::default`].

use crate::HarnessError;
use scratch_pool::ScratchBudget;
use std::path::{Path, PathBuf};

/// Message reported when neither input files nor force mode were requested.
pub const MISSING_INPUTS_MESSAGE: &str =
    "You must provide input data files or use the --force flag.";

/// Configuration for one harness run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Model identifier handed to the backend's `open_model`.
    pub model: String,
    /// Input data files, one per input buffer, in buffer order.
    pub inputs: Vec<PathBuf>,
    /// Golden files, one per output buffer, in buffer order.
    pub goldens: Vec<PathBuf>,
    /// Number of timed execute calls.
    pub iterations: u32,
    /// Absolute per-element tolerance for the difference count.
    pub threshold: f32,
    /// Skip input loading and output validation.
    pub force: bool,
    /// Directory receiving `output<i>.bin` dumps.
    pub output_dir: PathBuf,
    /// Cap on golden scratch memory (human-readable, e.g. `"512M"`).
    pub scratch_budget: String,
    /// Whether the console report uses ANSI colors.
    pub color: bool,
}

impl HarnessConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, HarnessError> {
        toml::from_str(toml_str)
            .map_err(|e| HarnessError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, HarnessError> {
        toml::to_string_pretty(self)
            .map_err(|e| HarnessError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the scratch budget string into a [`ScratchBudget`].
    pub fn parse_scratch_budget(&self) -> Result<ScratchBudget, HarnessError> {
        ScratchBudget::parse(&self.scratch_budget)
            .map_err(|e| HarnessError::Config(format!("invalid scratch budget: {e}")))
    }

    /// Checks the usage rules that must hold before the backend is touched.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.model.trim().is_empty() {
            return Err(HarnessError::Usage("A model must be given with --model.".into()));
        }
        if self.inputs.is_empty() && !self.force {
            return Err(HarnessError::Usage(MISSING_INPUTS_MESSAGE.into()));
        }
        if self.iterations == 0 {
            return Err(HarnessError::Usage(
                "The iteration count must be at least 1.".into(),
            ));
        }
        if self.threshold.is_nan() {
            return Err(HarnessError::Usage("The threshold must be a number.".into()));
        }
        self.parse_scratch_budget()?;
        Ok(())
    }

    /// Path of the dump file for output buffer `index`.
    pub fn dump_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(dump_file_name(index))
    }
}

/// File name an unmatched output buffer is dumped under.
pub fn dump_file_name(index: usize) -> String {
    format!("output{index}.bin")
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            inputs: Vec::new(),
            goldens: Vec::new(),
            iterations: 1,
            threshold: 0.0,
            force: false,
            output_dir: PathBuf::from("."),
            scratch_budget: "1G".to_string(),
            color: true,
        }
    }
}
