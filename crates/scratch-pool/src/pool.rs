// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Budget-enforcing scratch pool.
//!
//! The pool keeps released regions on a reuse list so that validating the
//! same model repeatedly does not reallocate every golden buffer. A request
//! is served by the smallest cached region whose capacity fits; otherwise a
//! fresh zeroed `Vec<u8>` is allocated. Either way the region handed out is
//! zero-filled and exactly the requested length.

use crate::{ScratchBudget, ScratchError, ScratchGuard, ScratchStats};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Pool state shared between the pool and its outstanding guards.
#[derive(Debug)]
pub(crate) struct PoolState {
    budget: ScratchBudget,
    live_bytes: Cell<usize>,
    reuse: RefCell<Vec<Vec<u8>>>,
    stats: RefCell<ScratchStats>,
}

impl PoolState {
    /// Called from `ScratchGuard::drop`.
    pub(crate) fn give_back(&self, region: Vec<u8>, len: usize) {
        self.live_bytes.set(self.live_bytes.get() - len);
        self.stats.borrow_mut().record_release();
        if region.capacity() > 0 {
            self.reuse.borrow_mut().push(region);
        }
    }
}

/// Allocator for harness-owned scratch regions.
///
/// ```
/// use scratch_pool::{ScratchBudget, ScratchPool};
///
/// let pool = ScratchPool::new(ScratchBudget::from_bytes(64));
/// let a = pool.acquire(48).unwrap();
/// assert!(pool.acquire(32).is_err());
/// drop(a);
/// assert!(pool.acquire(32).is_ok());
/// ```
#[derive(Debug)]
pub struct ScratchPool {
    state: Rc<PoolState>,
}

impl ScratchPool {
    pub fn new(budget: ScratchBudget) -> Self {
        Self {
            state: Rc::new(PoolState {
                budget,
                live_bytes: Cell::new(0),
                reuse: RefCell::new(Vec::new()),
                stats: RefCell::new(ScratchStats::default()),
            }),
        }
    }

    /// Acquires a zero-filled region of exactly `len` bytes.
    ///
    /// Fails with [`ScratchError::BudgetExceeded`] if the region would push
    /// live scratch bytes past the budget. Zero-length requests always succeed.
    pub fn acquire(&self, len: usize) -> Result<ScratchGuard, ScratchError> {
        let state = &self.state;
        let live = state.live_bytes.get();
        let budget = state.budget.as_bytes();

        if live.saturating_add(len) > budget {
            state.stats.borrow_mut().record_rejection();
            tracing::warn!("scratch request of {len} bytes refused ({live} of {budget} live)");
            return Err(ScratchError::BudgetExceeded {
                requested_bytes: len,
                available_bytes: budget.saturating_sub(live),
                budget_bytes: budget,
            });
        }

        let cached = self.take_cached(len);
        let reused = cached.is_some();
        let region = match cached {
            Some(mut region) => {
                region.clear();
                region.resize(len, 0);
                region
            }
            None => vec![0u8; len],
        };

        state.live_bytes.set(live + len);
        state
            .stats
            .borrow_mut()
            .record_acquire(reused, live + len);

        Ok(ScratchGuard::new(region, Rc::clone(&self.state)))
    }

    /// Removes the smallest cached region with capacity for `len` bytes.
    fn take_cached(&self, len: usize) -> Option<Vec<u8>> {
        if len == 0 {
            return None;
        }
        let mut reuse = self.state.reuse.borrow_mut();
        let idx = reuse
            .iter()
            .enumerate()
            .filter(|(_, r)| r.capacity() >= len)
            .min_by_key(|(_, r)| r.capacity())
            .map(|(i, _)| i)?;
        Some(reuse.swap_remove(idx))
    }

    /// Bytes currently held by live guards.
    pub fn live_bytes(&self) -> usize {
        self.state.live_bytes.get()
    }

    /// Bytes that can still be acquired before hitting the budget.
    pub fn available_bytes(&self) -> usize {
        self.state
            .budget
            .as_bytes()
            .saturating_sub(self.live_bytes())
    }

    pub fn budget(&self) -> ScratchBudget {
        self.state.budget
    }

    /// Bytes held on the reuse list.
    pub fn cached_bytes(&self) -> usize {
        self.state.reuse.borrow().iter().map(Vec::capacity).sum()
    }

    /// Drops every cached region.
    pub fn shrink(&self) {
        self.state.reuse.borrow_mut().clear();
    }

    pub fn stats(&self) -> ScratchStats {
        self.state.stats.borrow().clone()
    }
}
