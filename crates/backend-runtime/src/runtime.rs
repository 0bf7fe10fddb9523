// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The backend capability trait.

use crate::{BackendError, BufferInfo, BufferSet, ModelHandle};

/// Lifecycle interface of a model-execution backend.
///
/// All calls are blocking and must be issued in order: `initialize`,
/// `open_model`, `allocate_buffers`, any number of `execute`s, then
/// `release_buffers`, `close_model`, `deinitialize`. Every call reports
/// failure through its `Result`; none of them panic on bad input.
pub trait BackendRuntime {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Brings up process-wide backend state.
    fn initialize(&mut self) -> Result<(), BackendError>;

    /// Tears down process-wide backend state.
    fn deinitialize(&mut self) -> Result<(), BackendError>;

    /// Opens the model identified by `model` (a path or backend-specific name).
    fn open_model(&mut self, model: &str) -> Result<ModelHandle, BackendError>;

    fn close_model(&mut self, handle: ModelHandle) -> Result<(), BackendError>;

    /// Allocates the full input-then-output buffer set for an open model.
    fn allocate_buffers(&mut self, handle: ModelHandle) -> Result<BufferSet, BackendError>;

    /// Returns a buffer set previously handed out by [`allocate_buffers`](Self::allocate_buffers).
    fn release_buffers(&mut self, handle: ModelHandle, buffers: BufferSet)
        -> Result<(), BackendError>;

    /// Runs the model once, synchronously, reading the input region and
    /// writing the output region of `buffers`.
    fn execute(&mut self, handle: ModelHandle, buffers: &mut BufferSet)
        -> Result<(), BackendError>;

    /// Queries metadata for the output buffer at `index` (0-based within the output region).
    fn output_buffer_info(
        &self,
        handle: ModelHandle,
        index: usize,
    ) -> Result<BufferInfo, BackendError>;
}
