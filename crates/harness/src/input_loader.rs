// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fills the input region of a buffer set from raw data files.

use crate::file_io::{self, FileIoError};
use crate::HarnessError;
use backend_runtime::BufferSet;
use std::path::PathBuf;

/// Loads `files[i]` into input buffer `i`, in order.
///
/// The file count is checked against the number of input buffers before any
/// buffer is touched. Each file must match its buffer's size exactly. The
/// first failing file aborts the load; buffers before it have already been
/// filled.
pub fn load_inputs(buffers: &mut BufferSet, files: &[PathBuf]) -> Result<(), HarnessError> {
    let n_in = buffers.info().n_in_buf;
    if files.len() != n_in {
        return Err(HarnessError::InputCountMismatch {
            files: files.len(),
            buffers: n_in,
        });
    }

    for (layer, (buffer, path)) in buffers.inputs_mut().iter_mut().zip(files).enumerate() {
        file_io::read_full(path, buffer.as_mut_slice()).map_err(|e| match e {
            FileIoError::SizeMismatch {
                path,
                expected,
                actual,
            } => HarnessError::InputSizeMismatch {
                layer,
                path,
                expected,
                actual,
            },
            source => HarnessError::InputLoad { layer, source },
        })?;
        tracing::debug!("input layer {layer}: loaded {}", path.display());
    }
    Ok(())
}
