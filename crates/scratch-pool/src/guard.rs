// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII guard for a scratch region.

use crate::pool::PoolState;
use std::rc::Rc;

/// Exclusive owner of one scratch region.
///
/// The region goes back to its [`ScratchPool`](crate::ScratchPool) when the
/// guard is dropped, so there is no matching "free" call to forget on an
/// error path.
pub struct ScratchGuard {
    /// Wrapped in `Option` so `drop` can move it out.
    region: Option<Vec<u8>>,
    pool: Rc<PoolState>,
    len: usize,
}

impl ScratchGuard {
    pub(crate) fn new(region: Vec<u8>, pool: Rc<PoolState>) -> Self {
        let len = region.len();
        Self {
            region: Some(region),
            pool,
            len,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        self.region.as_deref().unwrap_or_default()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.region.as_deref_mut().unwrap_or_default()
    }

    /// Length of the region in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capacity of the underlying allocation, which may exceed `len` for reused regions.
    pub fn capacity(&self) -> usize {
        self.region.as_ref().map_or(0, Vec::capacity)
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        if let Some(region) = self.region.take() {
            self.pool.give_back(region, self.len);
        }
    }
}

impl std::fmt::Debug for ScratchGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchGuard")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}
