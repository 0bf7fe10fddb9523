// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for backend operations.

use crate::ModelHandle;

/// Errors reported by a [`BackendRuntime`](crate::BackendRuntime).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// A call was made before `initialize` or after `deinitialize`.
    #[error("backend is not initialized")]
    NotInitialized,

    /// `initialize` was called twice without an intervening `deinitialize`.
    #[error("backend is already initialized")]
    AlreadyInitialized,

    /// The model could not be opened.
    #[error("cannot open model '{model}': {detail}")]
    OpenFailed { model: String, detail: String },

    /// The handle does not refer to an open model.
    #[error("unknown model handle {0}")]
    UnknownModel(ModelHandle),

    /// A buffer set was already allocated for this model.
    #[error("buffers already allocated for model {0}")]
    BuffersInUse(ModelHandle),

    /// The model still has buffers allocated and cannot be closed.
    #[error("model {0} still has allocated buffers")]
    BuffersNotReleased(ModelHandle),

    /// A buffer set does not match what the backend allocated.
    #[error("buffer set mismatch: {0}")]
    BufferMismatch(String),

    /// An output index was outside the output region.
    #[error("output index {index} out of range ({count} outputs)")]
    OutputIndexOutOfRange { index: usize, count: usize },

    /// The backend failed while executing the model.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}
