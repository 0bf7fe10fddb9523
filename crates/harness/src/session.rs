// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! One validation run, with type-state-enforced stage ordering.
//!
//! ```text
//! Session<Idle>
//!     │  .open()          initialize, open model, allocate buffers
//!     ▼
//! Session<Opened>
//!     │  .load_inputs()   fill input buffers (skipped in force mode)
//!     ▼
//! Session<Primed>
//!     │  .execute()       timed execute loop
//!     ▼
//! Session<Executed>
//!     │  .validate()      golden comparison or dump (skipped in force mode)
//!     ▼
//! Session<Validated>
//!     │  .finish()        release buffers, close model, deinitialize
//!     ▼
//!   RunSummary
//! ```
//!
//! Each transition consumes the session. A failing transition returns the
//! error and drops the session without any teardown calls: a model whose
//! buffers could not be allocated is not closed, and so on.

use crate::error::Stage;
use crate::output::{OutputReport, OutputValidator};
use crate::{input_loader, ExecutionTimings, HarnessConfig, HarnessError, Palette};
use backend_runtime::{BackendRuntime, BufferSet, BufferSetInfo, ModelHandle};
use scratch_pool::{ScratchPool, ScratchStats};
use std::io::Write;
use std::time::Instant;

// ── Type-state markers ─────────────────────────────────────────

/// Backend not yet touched.
#[derive(Debug)]
pub struct Idle;

/// Model open and buffers allocated.
#[derive(Debug)]
pub struct Opened {
    handle: ModelHandle,
    buffers: BufferSet,
}

/// Input buffers filled (or deliberately left as allocated in force mode).
#[derive(Debug)]
pub struct Primed {
    handle: ModelHandle,
    buffers: BufferSet,
}

/// Every iteration has executed.
#[derive(Debug)]
pub struct Executed {
    handle: ModelHandle,
    buffers: BufferSet,
    timings: ExecutionTimings,
}

/// Outputs compared or dumped.
#[derive(Debug)]
pub struct Validated {
    handle: ModelHandle,
    buffers: BufferSet,
    timings: ExecutionTimings,
    outputs: Vec<OutputReport>,
}

/// Sealed trait for session states.
pub trait SessionState: std::fmt::Debug {}
impl SessionState for Idle {}
impl SessionState for Opened {}
impl SessionState for Primed {}
impl SessionState for Executed {}
impl SessionState for Validated {}

// ── Run summary ────────────────────────────────────────────────

/// Everything a completed run measured.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunSummary {
    pub model: String,
    pub timings: ExecutionTimings,
    /// One entry per output buffer; empty in force mode.
    pub outputs: Vec<OutputReport>,
    pub scratch: ScratchStats,
}

impl RunSummary {
    /// `true` unless some output was compared and mismatched.
    pub fn all_matched(&self) -> bool {
        self.outputs
            .iter()
            .filter_map(OutputReport::outcome)
            .all(|o| o.is_match())
    }
}

// ── Session ────────────────────────────────────────────────────

/// A single-model validation run against backend `B`.
///
/// # Example
/// ```
/// use backend_runtime::{mock::ScriptedBackend, ElementType};
/// use harness::{HarnessConfig, Palette, Session};
///
/// let backend = ScriptedBackend::new().with_output(ElementType::UInt8, vec![1, 2]);
/// let config = HarnessConfig {
///     model: "model".into(),
///     force: true,
///     iterations: 3,
///     ..Default::default()
/// };
///
/// let mut report = Vec::new();
/// let summary = Session::new(backend, config, Palette::plain())?
///     .open(&mut report)?
///     .load_inputs()?
///     .execute(&mut report)?
///     .validate(&mut report)?
///     .finish()?;
/// assert_eq!(summary.timings.iterations(), 3);
/// # Ok::<(), harness::HarnessError>(())
/// ```
#[derive(Debug)]
pub struct Session<B: BackendRuntime, S: SessionState = Idle> {
    backend: B,
    config: HarnessConfig,
    palette: Palette,
    pool: ScratchPool,
    state: S,
}

impl<B: BackendRuntime, S: SessionState> Session<B, S> {
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

// ── Idle → Opened ──────────────────────────────────────────────

impl<B: BackendRuntime> Session<B, Idle> {
    /// Validates `config` and creates the golden scratch pool.
    ///
    /// Fails with a usage or configuration error before the backend is
    /// touched.
    pub fn new(backend: B, config: HarnessConfig, palette: Palette) -> Result<Self, HarnessError> {
        config.validate()?;
        let budget = config.parse_scratch_budget()?;
        tracing::info!(
            "session created: backend '{}', scratch budget {budget}",
            backend.name()
        );
        Ok(Self {
            backend,
            config,
            palette,
            pool: ScratchPool::new(budget),
            state: Idle,
        })
    }

    /// Initializes the backend, opens the model and allocates its buffers.
    pub fn open(mut self, out: &mut dyn Write) -> Result<Session<B, Opened>, HarnessError> {
        self.backend
            .initialize()
            .map_err(HarnessError::backend(Stage::Initialize))?;

        let handle = self
            .backend
            .open_model(&self.config.model)
            .map_err(HarnessError::backend(Stage::OpenModel))?;
        writeln!(out, "Loaded Model:\n\t{}({handle})", self.config.model)?;

        let buffers = self
            .backend
            .allocate_buffers(handle)
            .map_err(HarnessError::backend(Stage::AllocateBuffers))?;
        let info = buffers.info();
        tracing::info!(
            "allocated {} input and {} output buffers ({} bytes)",
            info.n_in_buf,
            info.n_out_buf,
            buffers.total_bytes()
        );

        Ok(Session {
            backend: self.backend,
            config: self.config,
            palette: self.palette,
            pool: self.pool,
            state: Opened { handle, buffers },
        })
    }
}

// ── Opened → Primed ────────────────────────────────────────────

impl<B: BackendRuntime> Session<B, Opened> {
    pub fn handle(&self) -> ModelHandle {
        self.state.handle
    }

    pub fn buffer_info(&self) -> BufferSetInfo {
        self.state.buffers.info()
    }

    /// Loads the configured input files into the input buffers.
    ///
    /// In force mode the buffers are left exactly as the backend allocated
    /// them.
    pub fn load_inputs(mut self) -> Result<Session<B, Primed>, HarnessError> {
        if self.config.force {
            tracing::info!("force mode: input loading skipped");
        } else {
            input_loader::load_inputs(&mut self.state.buffers, &self.config.inputs)?;
            tracing::info!("loaded {} input files", self.config.inputs.len());
        }
        let Opened { handle, buffers } = self.state;
        Ok(Session {
            backend: self.backend,
            config: self.config,
            palette: self.palette,
            pool: self.pool,
            state: Primed { handle, buffers },
        })
    }
}

// ── Primed → Executed ──────────────────────────────────────────

impl<B: BackendRuntime> Session<B, Primed> {
    /// Executes the model `iterations` times, timing each call.
    ///
    /// Prints one line per iteration and the integer average. A failing
    /// execute aborts the remaining iterations.
    pub fn execute(mut self, out: &mut dyn Write) -> Result<Session<B, Executed>, HarnessError> {
        let Primed { handle, mut buffers } = self.state;
        let mut timings = ExecutionTimings::new();

        for idx in 1..=self.config.iterations {
            let start = Instant::now();
            self.backend
                .execute(handle, &mut buffers)
                .map_err(HarnessError::backend(Stage::Execute))?;
            let micros = timings.record(start.elapsed());
            writeln!(out, "Model Execution Time ({idx}): {micros} microseconds")?;
        }

        let average = timings.average_micros().unwrap_or(0);
        writeln!(out, "Avg. Model Execution Time: {average} microseconds")?;
        tracing::info!("{}", timings.summary());

        Ok(Session {
            backend: self.backend,
            config: self.config,
            palette: self.palette,
            pool: self.pool,
            state: Executed {
                handle,
                buffers,
                timings,
            },
        })
    }
}

// ── Executed → Validated ───────────────────────────────────────

impl<B: BackendRuntime> Session<B, Executed> {
    pub fn timings(&self) -> &ExecutionTimings {
        &self.state.timings
    }

    /// Compares outputs against the golden files, or dumps them.
    ///
    /// Skipped in force mode, leaving the output report empty.
    pub fn validate(self, out: &mut dyn Write) -> Result<Session<B, Validated>, HarnessError> {
        let outputs = if self.config.force {
            tracing::info!("force mode: output validation skipped");
            Vec::new()
        } else {
            let validator = OutputValidator {
                goldens: &self.config.goldens,
                threshold: self.config.threshold,
                output_dir: &self.config.output_dir,
                pool: &self.pool,
                palette: self.palette,
            };
            validator.process(&self.backend, self.state.handle, &self.state.buffers, out)?
        };

        let Executed {
            handle,
            buffers,
            timings,
        } = self.state;
        Ok(Session {
            backend: self.backend,
            config: self.config,
            palette: self.palette,
            pool: self.pool,
            state: Validated {
                handle,
                buffers,
                timings,
                outputs,
            },
        })
    }
}

// ── Validated → done ───────────────────────────────────────────

impl<B: BackendRuntime> Session<B, Validated> {
    pub fn outputs(&self) -> &[OutputReport] {
        &self.state.outputs
    }

    /// Releases the buffers, closes the model and deinitializes the backend.
    pub fn finish(mut self) -> Result<RunSummary, HarnessError> {
        let Validated {
            handle,
            buffers,
            timings,
            outputs,
        } = self.state;

        self.backend
            .release_buffers(handle, buffers)
            .map_err(HarnessError::backend(Stage::ReleaseBuffers))?;
        self.backend
            .close_model(handle)
            .map_err(HarnessError::backend(Stage::CloseModel))?;
        self.backend
            .deinitialize()
            .map_err(HarnessError::backend(Stage::Deinitialize))?;
        tracing::info!("model {handle} closed");

        Ok(RunSummary {
            model: self.config.model,
            timings,
            outputs,
            scratch: self.pool.stats(),
        })
    }
}

/// Runs every stage in order against `backend`.
///
/// The report goes to `out`. On error nothing further is called on the
/// backend.
pub fn run_harness<B: BackendRuntime>(
    backend: B,
    config: HarnessConfig,
    palette: Palette,
    out: &mut dyn Write,
) -> Result<RunSummary, HarnessError> {
    Session::new(backend, config, palette)?
        .open(out)?
        .load_inputs()?
        .execute(out)?
        .validate(out)?
        .finish()
}
