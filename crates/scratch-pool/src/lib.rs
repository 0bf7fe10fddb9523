// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # scratch-pool
//!
//! Short-lived, budget-limited byte regions for data the harness owns
//! itself, such as a golden reference file loaded for one comparison.
//!
//! # Key Components
//!
//! - [`ScratchBudget`]: a ceiling on live scratch bytes, parsed from
//!   strings such as `"512M"` or `"1G"`.
//! - [`ScratchPool`]: hands out regions, enforces the budget, and keeps
//!   released regions around for reuse.
//! - [`ScratchGuard`]: owns one region. Dropping it gives the region back,
//!   whichever way the enclosing scope is left (`?`, early `return`, or
//!   falling off the end).
//! - [`ScratchStats`]: acquisition/release counters and the peak.
//!
//! # Ownership Model
//!
//! ```text
//! ScratchPool::acquire(size)
//!       │
//!       ▼
//!  ScratchGuard  ◄─── owns Vec<u8>, holds Rc<PoolState>
//!       │
//!       │  drop()
//!       ▼
//!  PoolState::give_back()  ──► reuse list
//! ```
//!
//! The pool is single-threaded (`Rc`/`RefCell`), matching the harness,
//! which issues every backend call and comparison in sequence.
//!
//! # Example
//! ```
//! use scratch_pool::{ScratchBudget, ScratchPool};
//!
//! let pool = ScratchPool::new(ScratchBudget::from_mb(4));
//! {
//!     let mut golden = pool.acquire(1024).unwrap();
//!     golden.as_mut_slice()[0] = 1;
//!     assert_eq!(pool.live_bytes(), 1024);
//! }
//! assert_eq!(pool.live_bytes(), 0);
//! ```

mod budget;
mod error;
mod guard;
mod pool;
mod stats;

pub use budget::ScratchBudget;
pub use error::ScratchError;
pub use guard::ScratchGuard;
pub use pool::ScratchPool;
pub use stats::ScratchStats;
