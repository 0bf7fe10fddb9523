// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for scratch allocation.

/// Errors raised by [`ScratchPool`](crate::ScratchPool) and [`ScratchBudget`](crate::ScratchBudget).
#[derive(Debug, thiserror::Error)]
pub enum ScratchError {
    /// The request would push live scratch bytes past the budget.
    #[error("scratch budget exceeded: requested {requested_bytes} bytes, {available_bytes} available (budget: {budget_bytes})")]
    BudgetExceeded {
        requested_bytes: usize,
        available_bytes: usize,
        budget_bytes: usize,
    },

    /// A budget string could not be parsed.
    #[error("invalid scratch budget '{input}': {reason}")]
    InvalidBudget { input: String, reason: &'static str },
}
