// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model handles and the I/O buffer set allocated for an open model.
//!
//! A [`BufferSet`] is always laid out as a contiguous prefix of input
//! buffers followed by a contiguous suffix of output buffers:
//!
//! ```text
//! index:  0 .. n_in            n_in .. n_in + n_out
//!         [ in | in | ... ]    [ out | out | ... ]
//! ```
//!
//! The layout is checked once in [`BufferSet::new`] and the buffer count
//! cannot change afterwards; callers only get slices into existing buffers.

use crate::{BackendError, ElementType};
use std::fmt;

/// Opaque identifier for a model opened by a backend.
///
/// The harness never looks inside it; it only hands it back to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(u64);

impl ModelHandle {
    /// Wraps a raw backend identifier.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw backend identifier.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

/// Whether a buffer feeds the model or receives its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

/// A single backend-owned memory region.
#[derive(Clone, PartialEq, Eq)]
pub struct Buffer {
    direction: Direction,
    data: Vec<u8>,
}

impl Buffer {
    /// Allocates a zero-filled buffer of `size` bytes.
    pub fn zeroed(direction: Direction, size: usize) -> Self {
        Self {
            direction,
            data: vec![0u8; size],
        }
    }

    /// Wraps existing bytes.
    pub fn from_bytes(direction: Direction, data: Vec<u8>) -> Self {
        Self { direction, data }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the declared size of this buffer in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("direction", &self.direction)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Input and output buffer counts of one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BufferSetInfo {
    pub n_in_buf: usize,
    pub n_out_buf: usize,
}

impl BufferSetInfo {
    /// Total number of buffers (`n_in_buf + n_out_buf`).
    pub fn total(&self) -> usize {
        self.n_in_buf + self.n_out_buf
    }
}

/// The fixed, ordered set of I/O buffers allocated for one open model.
#[derive(Clone, PartialEq, Eq)]
pub struct BufferSet {
    buffers: Vec<Buffer>,
    info: BufferSetInfo,
}

impl BufferSet {
    /// Builds a buffer set, checking the input-prefix / output-suffix layout.
    pub fn new(buffers: Vec<Buffer>) -> Result<Self, BackendError> {
        let n_in_buf = buffers
            .iter()
            .take_while(|b| b.direction() == Direction::Input)
            .count();

        if let Some(pos) = buffers[n_in_buf..]
            .iter()
            .position(|b| b.direction() == Direction::Input)
        {
            return Err(BackendError::BufferMismatch(format!(
                "input buffer at index {} follows an output buffer",
                n_in_buf + pos
            )));
        }

        let info = BufferSetInfo {
            n_in_buf,
            n_out_buf: buffers.len() - n_in_buf,
        };
        Ok(Self { buffers, info })
    }

    pub fn info(&self) -> BufferSetInfo {
        self.info
    }

    /// Total number of buffers in the set.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Returns the buffer at absolute index `index`.
    pub fn get(&self, index: usize) -> Option<&Buffer> {
        self.buffers.get(index)
    }

    pub fn inputs(&self) -> &[Buffer] {
        &self.buffers[..self.info.n_in_buf]
    }

    pub fn inputs_mut(&mut self) -> &mut [Buffer] {
        &mut self.buffers[..self.info.n_in_buf]
    }

    pub fn outputs(&self) -> &[Buffer] {
        &self.buffers[self.info.n_in_buf..]
    }

    pub fn outputs_mut(&mut self) -> &mut [Buffer] {
        &mut self.buffers[self.info.n_in_buf..]
    }

    /// Returns the output buffer at `index`, counted from the start of the output region.
    pub fn output(&self, index: usize) -> Option<&Buffer> {
        self.outputs().get(index)
    }

    /// Splits into the read-only input region and the writable output region.
    pub fn split_io_mut(&mut self) -> (&[Buffer], &mut [Buffer]) {
        let (inputs, outputs) = self.buffers.split_at_mut(self.info.n_in_buf);
        (inputs, outputs)
    }

    /// Sum of all buffer sizes in bytes.
    pub fn total_bytes(&self) -> usize {
        self.buffers.iter().map(Buffer::size).sum()
    }
}

impl fmt::Debug for BufferSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferSet")
            .field("n_in_buf", &self.info.n_in_buf)
            .field("n_out_buf", &self.info.n_out_buf)
            .field("total_bytes", &self.total_bytes())
            .finish()
    }
}

/// Per-buffer metadata queried from the backend.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BufferInfo {
    pub element_type: ElementType,
    /// Batch size.
    pub n: u32,
    pub height: u32,
    pub width: u32,
    pub channel: u32,
    /// Buffer size in bytes.
    pub size: usize,
    pub label: Option<String>,
}

impl BufferInfo {
    /// Returns the dimensions as `[n, height, width, channel]`.
    pub fn dims(&self) -> [u32; 4] {
        [self.n, self.height, self.width, self.channel]
    }

    /// Formats the dimensions as `"NxHxWxC"`.
    pub fn shape_string(&self) -> String {
        let [n, h, w, c] = self.dims();
        format!("{n}x{h}x{w}x{c}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(dirs: &[(Direction, usize)]) -> Result<BufferSet, BackendError> {
        BufferSet::new(dirs.iter().map(|&(d, s)| Buffer::zeroed(d, s)).collect())
    }

    #[test]
    fn test_layout_counts() {
        let s = set(&[
            (Direction::Input, 4),
            (Direction::Input, 8),
            (Direction::Output, 4),
        ])
        .unwrap();
        assert_eq!(s.info(), BufferSetInfo { n_in_buf: 2, n_out_buf: 1 });
        assert_eq!(s.info().total(), 3);
        assert_eq!(s.len(), 3);
        assert_eq!(s.inputs().len(), 2);
        assert_eq!(s.outputs().len(), 1);
        assert_eq!(s.output(0).unwrap().size(), 4);
        assert_eq!(s.total_bytes(), 16);
    }

    #[test]
    fn test_rejects_interleaved_layout() {
        let result = set(&[
            (Direction::Input, 4),
            (Direction::Output, 4),
            (Direction::Input, 4),
        ]);
        assert!(matches!(result, Err(BackendError::BufferMismatch(_))));
    }

    #[test]
    fn test_outputs_only() {
        let s = set(&[(Direction::Output, 2), (Direction::Output, 2)]).unwrap();
        assert_eq!(s.info().n_in_buf, 0);
        assert_eq!(s.info().n_out_buf, 2);
        assert!(s.inputs().is_empty());
    }

    #[test]
    fn test_split_io_mut() {
        let mut s = set(&[(Direction::Input, 2), (Direction::Output, 2)]).unwrap();
        s.inputs_mut()[0].as_mut_slice().copy_from_slice(&[7, 9]);
        let (inputs, outputs) = s.split_io_mut();
        outputs[0].as_mut_slice().copy_from_slice(inputs[0].as_slice());
        assert_eq!(s.output(0).unwrap().as_slice(), &[7, 9]);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(ModelHandle::new(0x2a).to_string(), "000000000000002A");
    }

    #[test]
    fn test_shape_string() {
        let info = BufferInfo {
            element_type: ElementType::Float32,
            n: 1,
            height: 224,
            width: 224,
            channel: 3,
            size: 224 * 224 * 3 * 4,
            label: None,
        };
        assert_eq!(info.shape_string(), "1x224x224x3");
    }
}
