// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the validation harness.

use crate::file_io::FileIoError;
use std::path::PathBuf;

/// Backend call that failed, reported alongside the [`BackendError`](backend_runtime::BackendError).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Initialize,
    OpenModel,
    AllocateBuffers,
    Execute,
    QueryOutputInfo,
    ReleaseBuffers,
    CloseModel,
    Deinitialize,
}

impl Stage {
    /// The phrase used in console diagnostics, e.g. `"Failed to Open Model"`.
    pub fn failure_message(self) -> &'static str {
        match self {
            Stage::Initialize => "Failed to Initialize",
            Stage::OpenModel => "Failed to Open Model",
            Stage::AllocateBuffers => "Failed to Allocate Buffers",
            Stage::Execute => "Failed to Execute Model",
            Stage::QueryOutputInfo => "Failed to Query Output Buffer Info",
            Stage::ReleaseBuffers => "Failed to Release Buffers",
            Stage::CloseModel => "Failed to Close Model",
            Stage::Deinitialize => "Failed to Deinitialize",
        }
    }
}

/// Console tag that prefixes a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTag {
    Usage,
    Framework,
    Input,
    Output,
}

impl ErrorTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorTag::Usage => "USAGE Error:",
            ErrorTag::Framework => "ENN Framework Error:",
            ErrorTag::Input => "INPUT Error:",
            ErrorTag::Output => "OUTPUT Error:",
        }
    }
}

/// Everything that can abort a harness run.
///
/// Every variant is fatal. A golden/output count mismatch is deliberately
/// absent: it switches the run to dump mode instead of failing it.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Invalid arguments or configuration, detected before any backend call.
    #[error("{0}")]
    Usage(String),

    /// A backend call failed.
    #[error("{}: {source}", .stage.failure_message())]
    Backend {
        stage: Stage,
        #[source]
        source: backend_runtime::BackendError,
    },

    /// The number of input files differs from the number of input buffers.
    #[error("Number of input layers and input data files do not match ({files} files, {buffers} input layers)")]
    InputCountMismatch { files: usize, buffers: usize },

    /// An input file could not be loaded into its buffer.
    #[error("Layer Index {layer}: Problem loading input data file to memory: {source}")]
    InputLoad {
        layer: usize,
        #[source]
        source: FileIoError,
    },

    /// An input file's size differs from its buffer's size.
    #[error("Layer Index {layer}: Input layer size and input data size mismatch ({} is {actual} bytes, layer is {expected} bytes)", .path.display())]
    InputSizeMismatch {
        layer: usize,
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// A golden file could not be loaded.
    #[error("Layer Index {layer}: Problem loading golden data file to memory: {source}")]
    GoldenLoad {
        layer: usize,
        #[source]
        source: FileIoError,
    },

    /// A golden file's size differs from its output buffer's size.
    #[error("Layer Index {layer}: Output layer size and golden data size mismatch ({} is {actual} bytes, layer is {expected} bytes)", .path.display())]
    GoldenSizeMismatch {
        layer: usize,
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// No scratch memory could be reserved for a golden file.
    #[error("Layer Index {layer}: cannot reserve golden scratch memory: {source}")]
    Scratch {
        layer: usize,
        #[source]
        source: scratch_pool::ScratchError,
    },

    /// An output buffer could not be dumped to disk.
    #[error("Layer Index {layer}: Failed to write output file: {source}")]
    OutputDump {
        layer: usize,
        #[source]
        source: FileIoError,
    },

    /// The report stream could not be written.
    #[error("cannot write report: {0}")]
    Report(#[from] std::io::Error),

    /// The configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl HarnessError {
    pub(crate) fn backend(stage: Stage) -> impl FnOnce(backend_runtime::BackendError) -> Self {
        move |source| HarnessError::Backend { stage, source }
    }

    /// Which console tag this error is reported under.
    pub fn tag(&self) -> ErrorTag {
        match self {
            HarnessError::Usage(_) | HarnessError::Config(_) => ErrorTag::Usage,
            HarnessError::Backend { .. } => ErrorTag::Framework,
            HarnessError::InputCountMismatch { .. }
            | HarnessError::InputLoad { .. }
            | HarnessError::InputSizeMismatch { .. }
            | HarnessError::GoldenLoad { .. }
            | HarnessError::GoldenSizeMismatch { .. }
            | HarnessError::Scratch { .. } => ErrorTag::Input,
            HarnessError::OutputDump { .. } | HarnessError::Report(_) => ErrorTag::Output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_names_stage() {
        let err = HarnessError::Backend {
            stage: Stage::AllocateBuffers,
            source: backend_runtime::BackendError::NotInitialized,
        };
        assert!(err.to_string().starts_with("Failed to Allocate Buffers"));
        assert_eq!(err.tag(), ErrorTag::Framework);
    }

    #[test]
    fn test_count_mismatch_is_input_error() {
        let err = HarnessError::InputCountMismatch { files: 1, buffers: 2 };
        assert_eq!(err.tag(), ErrorTag::Input);
        assert!(err.to_string().contains("do not match"));
    }

    #[test]
    fn test_tags() {
        assert_eq!(ErrorTag::Framework.as_str(), "ENN Framework Error:");
        assert_eq!(ErrorTag::Input.as_str(), "INPUT Error:");
        assert_eq!(ErrorTag::Output.as_str(), "OUTPUT Error:");
        assert_eq!(HarnessError::Usage("x".into()).tag(), ErrorTag::Usage);
    }
}
