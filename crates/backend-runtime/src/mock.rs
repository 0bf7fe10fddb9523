// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A programmable backend for tests.
//!
//! [`ScriptedBackend`] allocates whatever buffer layout it is told to,
//! writes canned bytes into its outputs on every execute, and can be made to
//! fail at any lifecycle stage. Every call is recorded in a shared
//! [`CallLog`], which stays readable after the backend itself has been moved
//! into (and dropped by) the code under test.

use crate::{
    BackendError, BackendRuntime, Buffer, BufferInfo, BufferSet, Direction, ElementType,
    ModelHandle,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Backend lifecycle calls, as recorded in a [`CallLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Initialize,
    Deinitialize,
    Open,
    Close,
    Allocate,
    Release,
    Execute,
    OutputInfo,
}

#[derive(Debug, Default)]
struct LogInner {
    calls: Vec<Stage>,
    input_snapshots: Vec<Vec<Vec<u8>>>,
}

/// Shared record of the calls a [`ScriptedBackend`] received.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<LogInner>>);

impl CallLog {
    /// All calls, in order.
    pub fn calls(&self) -> Vec<Stage> {
        self.0.borrow().calls.clone()
    }

    /// Number of times `stage` was called.
    pub fn count(&self, stage: Stage) -> usize {
        self.0.borrow().calls.iter().filter(|&&s| s == stage).count()
    }

    /// Contents of the input region observed at each execute call.
    pub fn input_snapshots(&self) -> Vec<Vec<Vec<u8>>> {
        self.0.borrow().input_snapshots.clone()
    }

    fn record(&self, stage: Stage) {
        self.0.borrow_mut().calls.push(stage);
    }
}

#[derive(Debug, Clone)]
struct OutputSpec {
    element_type: ElementType,
    data: Vec<u8>,
}

/// A backend whose layout, outputs, and failures are set up by the test.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    inputs: Vec<usize>,
    outputs: Vec<OutputSpec>,
    fail_on: Option<(Stage, usize)>,
    log: CallLog,
}

/// Handle value the scripted backend hands out.
pub const SCRIPTED_HANDLE: u64 = 0x5EED;

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an input buffer of `size` bytes.
    pub fn with_input(mut self, size: usize) -> Self {
        self.inputs.push(size);
        self
    }

    /// Adds an output buffer that receives `data` on every execute.
    /// Its size is `data.len()`.
    pub fn with_output(mut self, element_type: ElementType, data: Vec<u8>) -> Self {
        self.outputs.push(OutputSpec { element_type, data });
        self
    }

    /// Makes the first call to `stage` fail.
    pub fn failing_on(self, stage: Stage) -> Self {
        self.failing_on_nth(stage, 1)
    }

    /// Makes the `nth` (1-based) call to `stage` fail.
    pub fn failing_on_nth(mut self, stage: Stage, nth: usize) -> Self {
        self.fail_on = Some((stage, nth));
        self
    }

    /// Returns a handle to this backend's call log.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    fn enter(&self, stage: Stage) -> Result<(), BackendError> {
        self.log.record(stage);
        match self.fail_on {
            Some((s, nth)) if s == stage && self.log.count(stage) == nth => Err(
                BackendError::ExecutionFailed(format!("scripted failure at {stage:?}")),
            ),
            _ => Ok(()),
        }
    }

    fn check_handle(handle: ModelHandle) -> Result<(), BackendError> {
        if handle.raw() == SCRIPTED_HANDLE {
            Ok(())
        } else {
            Err(BackendError::UnknownModel(handle))
        }
    }
}

impl BackendRuntime for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn initialize(&mut self) -> Result<(), BackendError> {
        self.enter(Stage::Initialize)
    }

    fn deinitialize(&mut self) -> Result<(), BackendError> {
        self.enter(Stage::Deinitialize)
    }

    fn open_model(&mut self, _model: &str) -> Result<ModelHandle, BackendError> {
        self.enter(Stage::Open)?;
        Ok(ModelHandle::new(SCRIPTED_HANDLE))
    }

    fn close_model(&mut self, handle: ModelHandle) -> Result<(), BackendError> {
        self.enter(Stage::Close)?;
        Self::check_handle(handle)
    }

    fn allocate_buffers(&mut self, handle: ModelHandle) -> Result<BufferSet, BackendError> {
        self.enter(Stage::Allocate)?;
        Self::check_handle(handle)?;
        let inputs = self.inputs.iter().map(|&s| Buffer::zeroed(Direction::Input, s));
        let outputs = self
            .outputs
            .iter()
            .map(|o| Buffer::zeroed(Direction::Output, o.data.len()));
        BufferSet::new(inputs.chain(outputs).collect())
    }

    fn release_buffers(
        &mut self,
        handle: ModelHandle,
        buffers: BufferSet,
    ) -> Result<(), BackendError> {
        self.enter(Stage::Release)?;
        Self::check_handle(handle)?;
        if buffers.len() != self.inputs.len() + self.outputs.len() {
            return Err(BackendError::BufferMismatch(format!(
                "released {} buffers, allocated {}",
                buffers.len(),
                self.inputs.len() + self.outputs.len()
            )));
        }
        Ok(())
    }

    fn execute(
        &mut self,
        handle: ModelHandle,
        buffers: &mut BufferSet,
    ) -> Result<(), BackendError> {
        self.enter(Stage::Execute)?;
        Self::check_handle(handle)?;

        let snapshot = buffers.inputs().iter().map(|b| b.as_slice().to_vec()).collect();
        self.log.0.borrow_mut().input_snapshots.push(snapshot);

        for (out, spec) in buffers.outputs_mut().iter_mut().zip(&self.outputs) {
            out.as_mut_slice().copy_from_slice(&spec.data);
        }
        Ok(())
    }

    fn output_buffer_info(
        &self,
        handle: ModelHandle,
        index: usize,
    ) -> Result<BufferInfo, BackendError> {
        self.enter(Stage::OutputInfo)?;
        Self::check_handle(handle)?;
        let spec = self
            .outputs
            .get(index)
            .ok_or(BackendError::OutputIndexOutOfRange {
                index,
                count: self.outputs.len(),
            })?;
        let elem = spec.element_type.size_bytes().unwrap_or(1).max(1);
        Ok(BufferInfo {
            element_type: spec.element_type,
            n: 1,
            height: 1,
            width: (spec.data.len() / elem) as u32,
            channel: 1,
            size: spec.data.len(),
            label: Some(format!("output{index}")),
        })
    }
}
