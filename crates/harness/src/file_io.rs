// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Whole-file transfers between disk and memory regions.
//!
//! Both directions are all-or-nothing: [`read_full`] either fills the whole
//! destination with the whole file or reports an error, and [`write_full`]
//! either writes every byte or reports an error. Partial success is never
//! returned to the caller.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Errors from [`read_full`] and [`write_full`].
#[derive(Debug, thiserror::Error)]
pub enum FileIoError {
    #[error("Cannot open file({}): {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file length differs from the destination length.
    #[error("Invalid file size({}): {actual} bytes, expected {expected}", .path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot read file({}): {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write to file({}): {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads the whole of `path` into `dst`.
///
/// The file must be exactly `dst.len()` bytes long. The length is checked
/// before any byte is copied, so on [`FileIoError::SizeMismatch`] `dst` is
/// left untouched. Returns the number of bytes read.
pub fn read_full(path: &Path, dst: &mut [u8]) -> Result<usize, FileIoError> {
    let mut file = File::open(path).map_err(|source| FileIoError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let read_err = |source| FileIoError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file_len = file.metadata().map_err(read_err)?.len();
    let actual = usize::try_from(file_len).unwrap_or(usize::MAX);
    if actual != dst.len() {
        return Err(FileIoError::SizeMismatch {
            path: path.to_path_buf(),
            expected: dst.len(),
            actual,
        });
    }

    file.read_exact(dst).map_err(read_err)?;
    tracing::trace!("read {} bytes from {}", dst.len(), path.display());
    Ok(dst.len())
}

/// Writes all of `src` to `path`, creating or truncating it.
pub fn write_full(src: &[u8], path: &Path) -> Result<(), FileIoError> {
    let mut file = File::create(path).map_err(|source| FileIoError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    file.write_all(src).map_err(|source| FileIoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::trace!("wrote {} bytes to {}", src.len(), path.display());
    Ok(())
}
