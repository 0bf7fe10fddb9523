// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Descriptor-driven reference backend.
//!
//! [`ManifestBackend`] stands in for a vendor runtime. The "model" it opens
//! is a TOML descriptor that only declares the I/O buffer layout:
//!
//! ```toml
//! name = "toy-classifier"
//!
//! [[inputs]]
//! name = "image"
//! element_type = "uint8"
//! height = 2
//! width = 2
//!
//! [[outputs]]
//! name = "scores"
//! element_type = "float32"
//! channel = 4
//! ```
//!
//! Execution is deterministic: output byte `k` is the wrapping sum, over all
//! input buffers, of `input[k % input.len()]`. With no inputs (or only empty
//! ones) the outputs are zero-filled. This makes golden files reproducible
//! without a real inference engine.

use crate::{
    BackendError, BackendRuntime, Buffer, BufferInfo, BufferSet, Direction, ElementType,
    ModelHandle,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A model descriptor, deserialized from TOML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModelDescriptor {
    /// Human-readable model name.
    pub name: String,
    /// Input buffers, in buffer-set order.
    #[serde(default)]
    pub inputs: Vec<BufferDescriptor>,
    /// Output buffers, in buffer-set order.
    pub outputs: Vec<BufferDescriptor>,
}

/// One buffer entry in a [`ModelDescriptor`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BufferDescriptor {
    pub name: String,
    #[serde(default = "default_element_type")]
    pub element_type: ElementType,
    #[serde(default = "default_dim")]
    pub n: u32,
    #[serde(default = "default_dim")]
    pub height: u32,
    #[serde(default = "default_dim")]
    pub width: u32,
    #[serde(default = "default_dim")]
    pub channel: u32,
    /// Explicit byte size. Required for element types without a fixed width.
    #[serde(default)]
    pub size: Option<usize>,
}

fn default_element_type() -> ElementType {
    ElementType::Float32
}

fn default_dim() -> u32 {
    1
}

impl BufferDescriptor {
    /// Returns the buffer size in bytes: the explicit `size` if given,
    /// otherwise `n * height * width * channel * element size`.
    pub fn byte_size(&self) -> Option<usize> {
        if let Some(size) = self.size {
            return Some(size);
        }
        let elem = self.element_type.size_bytes()?;
        [self.n, self.height, self.width, self.channel]
            .iter()
            .try_fold(elem, |acc, &d| acc.checked_mul(d as usize))
    }

    fn info(&self) -> BufferInfo {
        BufferInfo {
            element_type: self.element_type,
            n: self.n,
            height: self.height,
            width: self.width,
            channel: self.channel,
            size: self.byte_size().unwrap_or(0),
            label: Some(self.name.clone()),
        }
    }
}

impl ModelDescriptor {
    /// Loads a descriptor from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, BackendError> {
        let content = std::fs::read_to_string(path).map_err(|e| BackendError::OpenFailed {
            model: path.display().to_string(),
            detail: e.to_string(),
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            BackendError::OpenFailed { detail, .. } => BackendError::OpenFailed {
                model: path.display().to_string(),
                detail,
            },
            other => other,
        })
    }

    /// Parses a descriptor from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, BackendError> {
        toml::from_str(toml_str).map_err(|e| BackendError::OpenFailed {
            model: "<inline>".into(),
            detail: format!("descriptor parse error: {e}"),
        })
    }

    /// Checks that the descriptor is usable.
    ///
    /// - At least one output buffer.
    /// - No duplicate buffer names.
    /// - Every buffer has a computable byte size.
    pub fn validate(&self) -> Result<(), BackendError> {
        let invalid = |detail: String| BackendError::OpenFailed {
            model: self.name.clone(),
            detail,
        };

        if self.outputs.is_empty() {
            return Err(invalid("descriptor declares no output buffers".into()));
        }

        let mut seen = HashSet::new();
        for buf in self.inputs.iter().chain(&self.outputs) {
            if !seen.insert(buf.name.as_str()) {
                return Err(invalid(format!("duplicate buffer name '{}'", buf.name)));
            }
            if buf.byte_size().is_none() {
                return Err(invalid(format!(
                    "buffer '{}' of type {} needs an explicit size",
                    buf.name, buf.element_type
                )));
            }
        }
        Ok(())
    }

    /// Returns the byte sizes of all buffers, inputs first.
    fn layout(&self) -> Vec<(Direction, usize)> {
        let inputs = self.inputs.iter().map(|b| (Direction::Input, b));
        let outputs = self.outputs.iter().map(|b| (Direction::Output, b));
        inputs
            .chain(outputs)
            .map(|(d, b)| (d, b.byte_size().unwrap_or(0)))
            .collect()
    }
}

#[derive(Debug)]
struct OpenModel {
    descriptor: ModelDescriptor,
    buffers_allocated: bool,
}

/// Reference backend that opens TOML model descriptors.
#[derive(Debug, Default)]
pub struct ManifestBackend {
    initialized: bool,
    next_id: u64,
    models: HashMap<ModelHandle, OpenModel>,
}

impl ManifestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_initialized(&self) -> Result<(), BackendError> {
        if self.initialized {
            Ok(())
        } else {
            Err(BackendError::NotInitialized)
        }
    }

    fn model(&self, handle: ModelHandle) -> Result<&OpenModel, BackendError> {
        self.ensure_initialized()?;
        self.models
            .get(&handle)
            .ok_or(BackendError::UnknownModel(handle))
    }

    fn model_mut(&mut self, handle: ModelHandle) -> Result<&mut OpenModel, BackendError> {
        self.ensure_initialized()?;
        self.models
            .get_mut(&handle)
            .ok_or(BackendError::UnknownModel(handle))
    }
}

impl BackendRuntime for ManifestBackend {
    fn name(&self) -> &str {
        "manifest"
    }

    fn initialize(&mut self) -> Result<(), BackendError> {
        if self.initialized {
            return Err(BackendError::AlreadyInitialized);
        }
        self.initialized = true;
        tracing::debug!("manifest backend initialized");
        Ok(())
    }

    fn deinitialize(&mut self) -> Result<(), BackendError> {
        self.ensure_initialized()?;
        if !self.models.is_empty() {
            tracing::warn!(
                "deinitializing with {} model(s) still open",
                self.models.len()
            );
            self.models.clear();
        }
        self.initialized = false;
        tracing::debug!("manifest backend deinitialized");
        Ok(())
    }

    fn open_model(&mut self, model: &str) -> Result<ModelHandle, BackendError> {
        self.ensure_initialized()?;

        let descriptor = ModelDescriptor::from_file(Path::new(model))?;
        descriptor.validate()?;

        self.next_id += 1;
        let handle = ModelHandle::new(self.next_id);
        tracing::info!(
            "opened model '{}' ({} inputs, {} outputs) as {handle}",
            descriptor.name,
            descriptor.inputs.len(),
            descriptor.outputs.len(),
        );

        self.models.insert(
            handle,
            OpenModel {
                descriptor,
                buffers_allocated: false,
            },
        );
        Ok(handle)
    }

    fn close_model(&mut self, handle: ModelHandle) -> Result<(), BackendError> {
        if self.model(handle)?.buffers_allocated {
            return Err(BackendError::BuffersNotReleased(handle));
        }
        self.models.remove(&handle);
        tracing::debug!("closed model {handle}");
        Ok(())
    }

    fn allocate_buffers(&mut self, handle: ModelHandle) -> Result<BufferSet, BackendError> {
        let model = self.model_mut(handle)?;
        if model.buffers_allocated {
            return Err(BackendError::BuffersInUse(handle));
        }

        let buffers = model
            .descriptor
            .layout()
            .into_iter()
            .map(|(direction, size)| Buffer::zeroed(direction, size))
            .collect();
        let set = BufferSet::new(buffers)?;
        model.buffers_allocated = true;

        tracing::debug!("allocated {set:?} for model {handle}");
        Ok(set)
    }

    fn release_buffers(
        &mut self,
        handle: ModelHandle,
        buffers: BufferSet,
    ) -> Result<(), BackendError> {
        let model = self.model_mut(handle)?;
        if !model.buffers_allocated {
            return Err(BackendError::BufferMismatch(format!(
                "no buffers allocated for model {handle}"
            )));
        }
        check_layout(&model.descriptor, &buffers)?;
        model.buffers_allocated = false;
        tracing::debug!("released {} buffers for model {handle}", buffers.len());
        Ok(())
    }

    fn execute(
        &mut self,
        handle: ModelHandle,
        buffers: &mut BufferSet,
    ) -> Result<(), BackendError> {
        let model = self.model(handle)?;
        if !model.buffers_allocated {
            return Err(BackendError::ExecutionFailed(format!(
                "model {handle} has no allocated buffers"
            )));
        }
        check_layout(&model.descriptor, buffers)?;

        let (inputs, outputs) = buffers.split_io_mut();
        for out in outputs {
            synthesize_output(inputs, out.as_mut_slice());
        }
        Ok(())
    }

    fn output_buffer_info(
        &self,
        handle: ModelHandle,
        index: usize,
    ) -> Result<BufferInfo, BackendError> {
        let outputs = &self.model(handle)?.descriptor.outputs;
        outputs
            .get(index)
            .map(BufferDescriptor::info)
            .ok_or(BackendError::OutputIndexOutOfRange {
                index,
                count: outputs.len(),
            })
    }
}

/// Verifies that `buffers` has exactly the layout the descriptor declares.
fn check_layout(descriptor: &ModelDescriptor, buffers: &BufferSet) -> Result<(), BackendError> {
    let expected = descriptor.layout();
    if expected.len() != buffers.len() {
        return Err(BackendError::BufferMismatch(format!(
            "expected {} buffers, got {}",
            expected.len(),
            buffers.len()
        )));
    }
    for (i, (direction, size)) in expected.into_iter().enumerate() {
        let actual = buffers.get(i).map(|b| (b.direction(), b.size()));
        if actual != Some((direction, size)) {
            return Err(BackendError::BufferMismatch(format!(
                "buffer {i}: expected {direction:?} of {size} bytes, got {actual:?}"
            )));
        }
    }
    Ok(())
}

/// Fills `out` with the wrapping byte-sum of the cycled input buffers.
fn synthesize_output(inputs: &[Buffer], out: &mut [u8]) {
    for (k, byte) in out.iter_mut().enumerate() {
        *byte = inputs
            .iter()
            .map(Buffer::as_slice)
            .filter(|data| !data.is_empty())
            .fold(0u8, |acc, data| acc.wrapping_add(data[k % data.len()]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOY: &str = r#"
name = "toy"

[[inputs]]
name = "a"
element_type = "uint8"
width = 4

[[inputs]]
name = "b"
element_type = "float32"
width = 2

[[outputs]]
name = "out"
element_type = "float32"
"#;

    fn write_descriptor(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    fn open_toy() -> (ManifestBackend, ModelHandle, tempfile::NamedTempFile) {
        let file = write_descriptor(TOY);
        let mut backend = ManifestBackend::new();
        backend.initialize().unwrap();
        let handle = backend
            .open_model(file.path().to_str().unwrap())
            .unwrap();
        (backend, handle, file)
    }

    #[test]
    fn test_parse_descriptor() {
        let d = ModelDescriptor::from_toml(TOY).unwrap();
        assert_eq!(d.name, "toy");
        assert_eq!(d.inputs.len(), 2);
        assert_eq!(d.inputs[0].byte_size(), Some(4));
        assert_eq!(d.inputs[1].byte_size(), Some(8));
        assert_eq!(d.outputs[0].byte_size(), Some(4));
        d.validate().unwrap();
    }

    #[test]
    fn test_validate_no_outputs() {
        let d = ModelDescriptor::from_toml("name = \"x\"\noutputs = []\n").unwrap();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_names() {
        let d = ModelDescriptor::from_toml(
            r#"
name = "dup"
[[inputs]]
name = "x"
[[outputs]]
name = "x"
"#,
        )
        .unwrap();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_validate_string_needs_size() {
        let d = ModelDescriptor::from_toml(
            r#"
name = "s"
[[outputs]]
name = "text"
element_type = "string"
"#,
        )
        .unwrap();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_explicit_size_wins() {
        let d = ModelDescriptor::from_toml(
            r#"
name = "s"
[[outputs]]
name = "o"
element_type = "float32"
width = 10
size = 6
"#,
        )
        .unwrap();
        assert_eq!(d.outputs[0].byte_size(), Some(6));
    }

    #[test]
    fn test_requires_initialize() {
        let mut backend = ManifestBackend::new();
        assert!(matches!(
            backend.open_model("whatever.toml"),
            Err(BackendError::NotInitialized)
        ));
        backend.initialize().unwrap();
        assert!(matches!(
            backend.initialize(),
            Err(BackendError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let mut backend = ManifestBackend::new();
        backend.initialize().unwrap();
        let result = backend.open_model("/nonexistent/model.toml");
        assert!(matches!(result, Err(BackendError::OpenFailed { .. })));
    }

    #[test]
    fn test_full_lifecycle() {
        let (mut backend, handle, _file) = open_toy();

        let mut buffers = backend.allocate_buffers(handle).unwrap();
        assert_eq!(buffers.info().n_in_buf, 2);
        assert_eq!(buffers.info().n_out_buf, 1);

        buffers.inputs_mut()[0]
            .as_mut_slice()
            .copy_from_slice(&[1, 2, 3, 4]);
        buffers.inputs_mut()[1]
            .as_mut_slice()
            .copy_from_slice(&[10, 20, 30, 40, 50, 60, 70, 80]);

        backend.execute(handle, &mut buffers).unwrap();
        assert_eq!(buffers.output(0).unwrap().as_slice(), &[11, 22, 33, 44]);

        let info = backend.output_buffer_info(handle, 0).unwrap();
        assert_eq!(info.element_type, ElementType::Float32);
        assert_eq!(info.size, 4);
        assert_eq!(info.label.as_deref(), Some("out"));

        backend.release_buffers(handle, buffers).unwrap();
        backend.close_model(handle).unwrap();
        backend.deinitialize().unwrap();
    }

    #[test]
    fn test_double_allocate_rejected() {
        let (mut backend, handle, _file) = open_toy();
        let _buffers = backend.allocate_buffers(handle).unwrap();
        assert!(matches!(
            backend.allocate_buffers(handle),
            Err(BackendError::BuffersInUse(_))
        ));
    }

    #[test]
    fn test_close_with_live_buffers_rejected() {
        let (mut backend, handle, _file) = open_toy();
        let _buffers = backend.allocate_buffers(handle).unwrap();
        assert!(matches!(
            backend.close_model(handle),
            Err(BackendError::BuffersNotReleased(_))
        ));
    }

    #[test]
    fn test_output_index_out_of_range() {
        let (backend, handle, _file) = open_toy();
        assert!(matches!(
            backend.output_buffer_info(handle, 1),
            Err(BackendError::OutputIndexOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_execute_rejects_foreign_buffers() {
        let (mut backend, handle, _file) = open_toy();
        let _buffers = backend.allocate_buffers(handle).unwrap();
        let mut foreign = BufferSet::new(vec![Buffer::zeroed(Direction::Output, 4)]).unwrap();
        assert!(matches!(
            backend.execute(handle, &mut foreign),
            Err(BackendError::BufferMismatch(_))
        ));
    }

    #[test]
    fn test_synthesize_without_inputs_is_zero() {
        let mut out = [0xFFu8; 3];
        synthesize_output(&[], &mut out);
        assert_eq!(out, [0, 0, 0]);
    }

    #[test]
    fn test_synthesize_wraps() {
        let inputs = vec![
            Buffer::from_bytes(Direction::Input, vec![200]),
            Buffer::from_bytes(Direction::Input, vec![100, 1]),
        ];
        let mut out = [0u8; 3];
        synthesize_output(&inputs, &mut out);
        assert_eq!(out, [44, 201, 44]);
    }
}
