// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # backend-runtime
//!
//! The seam between the validation harness and whatever actually runs a
//! compiled model.
//!
//! The harness never links an inference engine directly. Instead it talks to
//! a [`BackendRuntime`]: a small capability interface covering the whole
//! model lifecycle.
//!
//! ```text
//! initialize ─► open_model ─► allocate_buffers ─► execute (× N)
//!                                                    │
//! deinitialize ◄─ close_model ◄─ release_buffers ◄───┘
//! ```
//!
//! # Key Components
//!
//! - [`BackendRuntime`]: the lifecycle trait every backend implements.
//! - [`BufferSet`]: the ordered input-then-output buffer allocation for one
//!   open model, described by a [`BufferSetInfo`].
//! - [`ElementType`]: the backend's tag for how a buffer's raw bytes are
//!   laid out.
//! - [`ManifestBackend`]: a reference backend driven by a TOML model
//!   descriptor. Its execution is deterministic, which makes golden files
//!   reproducible.
//! - [`mock::ScriptedBackend`]: a programmable backend for tests.

mod buffer;
mod element;
mod error;
mod manifest;
pub mod mock;
mod runtime;

pub use buffer::{Buffer, BufferInfo, BufferSet, BufferSetInfo, Direction, ModelHandle};
pub use element::ElementType;
pub use error::BackendError;
pub use manifest::{BufferDescriptor, ManifestBackend, ModelDescriptor};
pub use runtime::BackendRuntime;
