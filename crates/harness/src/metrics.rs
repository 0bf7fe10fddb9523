// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution timing metrics.
//!
//! Durations are kept as whole microseconds, the granularity the report
//! prints, so the reported average is exactly `total / iterations` in
//! integer arithmetic.

use std::time::Duration;

/// Per-iteration execution durations and their running sum.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExecutionTimings {
    /// Duration of each execute call, in microseconds, in call order.
    pub per_iteration_micros: Vec<u64>,
    /// Sum of `per_iteration_micros`.
    pub total_micros: u64,
}

impl ExecutionTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one iteration, truncating to whole microseconds.
    pub fn record(&mut self, elapsed: Duration) -> u64 {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.record_micros(micros);
        micros
    }

    pub fn record_micros(&mut self, micros: u64) {
        self.per_iteration_micros.push(micros);
        self.total_micros = self.total_micros.saturating_add(micros);
    }

    pub fn iterations(&self) -> usize {
        self.per_iteration_micros.len()
    }

    /// Integer mean of the recorded durations, or `None` before the first record.
    pub fn average_micros(&self) -> Option<u64> {
        match self.iterations() as u64 {
            0 => None,
            n => Some(self.total_micros / n),
        }
    }

    pub fn min_micros(&self) -> Option<u64> {
        self.per_iteration_micros.iter().copied().min()
    }

    pub fn max_micros(&self) -> Option<u64> {
        self.per_iteration_micros.iter().copied().max()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "Execution: {} iterations, {} us total, avg {} us, min {} us, max {} us",
            self.iterations(),
            self.total_micros,
            self.average_micros().unwrap_or(0),
            self.min_micros().unwrap_or(0),
            self.max_micros().unwrap_or(0),
        )
    }
}
