// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scratch pool counters.

/// Cumulative statistics about scratch pool usage.
///
/// After a complete validation pass `acquisitions == releases`; anything
/// else means a guard outlived the comparison it was created for.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScratchStats {
    /// Successful `acquire` calls.
    pub acquisitions: u64,
    /// Guards dropped.
    pub releases: u64,
    /// Acquisitions served from a previously released region.
    pub reused: u64,
    /// Requests refused because of the budget.
    pub rejected: u64,
    /// High-water mark of live scratch bytes.
    pub peak_live_bytes: usize,
}

impl ScratchStats {
    pub(crate) fn record_acquire(&mut self, reused: bool, live_bytes: usize) {
        self.acquisitions += 1;
        if reused {
            self.reused += 1;
        }
        self.peak_live_bytes = self.peak_live_bytes.max(live_bytes);
    }

    pub(crate) fn record_release(&mut self) {
        self.releases += 1;
    }

    pub(crate) fn record_rejection(&mut self) {
        self.rejected += 1;
    }

    /// Number of guards currently alive.
    pub fn outstanding(&self) -> u64 {
        self.acquisitions - self.releases
    }

    pub fn summary(&self) -> String {
        format!(
            "Scratch: {} acquired ({} reused), {} released, {} rejected, peak {} bytes",
            self.acquisitions, self.reused, self.releases, self.rejected, self.peak_live_bytes,
        )
    }
}
