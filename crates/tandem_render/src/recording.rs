//! Recording backend.
//!
//! Performs no GPU work; appends every call it receives to a shared
//! [`CallLog`]. Used by tests to assert replay order and by the demo as a
//! stand-in for a real graphics API.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::Backend;
use crate::desc::{
    Bindings, BufferDesc, ImageData, ImageDesc, PassAction, PassDesc, PipelineDesc, PixelFormat,
    Rect, ShaderDesc, ShaderStage,
};
use crate::handle::{Buffer, Image, Pass, Pipeline, Shader};

/// One observed backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `push_debug_group`.
    PushDebugGroup(String),
    /// `pop_debug_group`.
    PopDebugGroup,
    /// `init_buffer`.
    InitBuffer(Buffer),
    /// `init_image`.
    InitImage(Image),
    /// `init_shader`.
    InitShader(Shader),
    /// `init_pipeline`.
    InitPipeline(Pipeline),
    /// `init_pass`.
    InitPass(Pass),
    /// `destroy_buffer`.
    DestroyBuffer(Buffer),
    /// `destroy_image`.
    DestroyImage(Image),
    /// `destroy_shader`.
    DestroyShader(Shader),
    /// `destroy_pipeline`.
    DestroyPipeline(Pipeline),
    /// `destroy_pass`.
    DestroyPass(Pass),
    /// `update_buffer`.
    UpdateBuffer(Buffer, Vec<u8>),
    /// `append_buffer`.
    AppendBuffer(Buffer, Vec<u8>),
    /// `update_image`.
    UpdateImage(Image, ImageData),
    /// `begin_default_pass`.
    BeginDefaultPass {
        /// Default framebuffer width.
        width: u32,
        /// Default framebuffer height.
        height: u32,
    },
    /// `begin_pass`.
    BeginPass(Pass),
    /// `apply_viewport`.
    ApplyViewport(Rect),
    /// `apply_scissor_rect`.
    ApplyScissorRect(Rect),
    /// `apply_pipeline`.
    ApplyPipeline(Pipeline),
    /// `apply_bindings`.
    ApplyBindings(Bindings),
    /// `apply_uniforms`.
    ApplyUniforms {
        /// Stage.
        stage: ShaderStage,
        /// Slot.
        slot: u32,
        /// Uploaded bytes.
        data: Vec<u8>,
    },
    /// `draw`.
    Draw {
        /// First element.
        base_element: u32,
        /// Element count.
        element_count: u32,
        /// Instance count.
        instance_count: u32,
    },
    /// `end_pass`.
    EndPass,
    /// `commit`.
    Commit,
    /// Pushed by custom commands or cleanups, not by the backend itself.
    Marker(String),
}

/// Shared, append-only list of observed calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<BackendCall>>>);

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call.
    pub fn push(&self, call: BackendCall) {
        self.0.lock().push(call);
    }

    /// Appends a [`BackendCall::Marker`].
    pub fn mark(&self, label: impl Into<String>) {
        self.push(BackendCall::Marker(label.into()));
    }

    /// Copies the calls observed so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<BackendCall> {
        self.0.lock().clone()
    }

    /// Removes and returns the calls observed so far.
    #[must_use]
    pub fn take(&self) -> Vec<BackendCall> {
        std::mem::take(&mut *self.0.lock())
    }

    /// Number of calls observed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns true if nothing has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Index of the first call equal to `call`.
    #[must_use]
    pub fn position(&self, call: &BackendCall) -> Option<usize> {
        self.0.lock().iter().position(|c| c == call)
    }
}

/// A [`Backend`] that records instead of rendering.
#[derive(Debug)]
pub struct RecordingBackend {
    name: String,
    color_format: PixelFormat,
    log: CallLog,
}

impl RecordingBackend {
    /// Creates a backend with a fresh log.
    #[must_use]
    pub fn new() -> Self {
        Self::with_log(CallLog::new())
    }

    /// Creates a backend writing into `log`.
    #[must_use]
    pub fn with_log(log: CallLog) -> Self {
        Self {
            name: "recording".to_owned(),
            color_format: PixelFormat::Bgra8,
            log,
        }
    }

    /// Overrides the reported name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns a handle to the shared log.
    #[must_use]
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn color_format(&self) -> PixelFormat {
        self.color_format
    }

    fn push_debug_group(&mut self, name: &str) {
        self.log.push(BackendCall::PushDebugGroup(name.to_owned()));
    }

    fn pop_debug_group(&mut self) {
        self.log.push(BackendCall::PopDebugGroup);
    }

    fn init_buffer(&mut self, buffer: Buffer, _desc: &BufferDesc) {
        self.log.push(BackendCall::InitBuffer(buffer));
    }

    fn init_image(&mut self, image: Image, _desc: &ImageDesc) {
        self.log.push(BackendCall::InitImage(image));
    }

    fn init_shader(&mut self, shader: Shader, _desc: &ShaderDesc) {
        self.log.push(BackendCall::InitShader(shader));
    }

    fn init_pipeline(&mut self, pipeline: Pipeline, _desc: &PipelineDesc) {
        self.log.push(BackendCall::InitPipeline(pipeline));
    }

    fn init_pass(&mut self, pass: Pass, _desc: &PassDesc) {
        self.log.push(BackendCall::InitPass(pass));
    }

    fn destroy_buffer(&mut self, buffer: Buffer) {
        self.log.push(BackendCall::DestroyBuffer(buffer));
    }

    fn destroy_image(&mut self, image: Image) {
        self.log.push(BackendCall::DestroyImage(image));
    }

    fn destroy_shader(&mut self, shader: Shader) {
        self.log.push(BackendCall::DestroyShader(shader));
    }

    fn destroy_pipeline(&mut self, pipeline: Pipeline) {
        self.log.push(BackendCall::DestroyPipeline(pipeline));
    }

    fn destroy_pass(&mut self, pass: Pass) {
        self.log.push(BackendCall::DestroyPass(pass));
    }

    fn update_buffer(&mut self, buffer: Buffer, data: &[u8]) {
        self.log.push(BackendCall::UpdateBuffer(buffer, data.to_vec()));
    }

    fn append_buffer(&mut self, buffer: Buffer, data: &[u8]) {
        self.log.push(BackendCall::AppendBuffer(buffer, data.to_vec()));
    }

    fn update_image(&mut self, image: Image, data: &ImageData) {
        self.log.push(BackendCall::UpdateImage(image, data.clone()));
    }

    fn begin_default_pass(&mut self, _action: &PassAction, width: u32, height: u32) {
        self.log.push(BackendCall::BeginDefaultPass { width, height });
    }

    fn begin_pass(&mut self, pass: Pass, _action: &PassAction) {
        self.log.push(BackendCall::BeginPass(pass));
    }

    fn apply_viewport(&mut self, rect: Rect, _origin_top_left: bool) {
        self.log.push(BackendCall::ApplyViewport(rect));
    }

    fn apply_scissor_rect(&mut self, rect: Rect, _origin_top_left: bool) {
        self.log.push(BackendCall::ApplyScissorRect(rect));
    }

    fn apply_pipeline(&mut self, pipeline: Pipeline) {
        self.log.push(BackendCall::ApplyPipeline(pipeline));
    }

    fn apply_bindings(&mut self, bindings: &Bindings) {
        self.log.push(BackendCall::ApplyBindings(*bindings));
    }

    fn apply_uniforms(&mut self, stage: ShaderStage, slot: u32, data: &[u8]) {
        self.log.push(BackendCall::ApplyUniforms {
            stage,
            slot,
            data: data.to_vec(),
        });
    }

    fn draw(&mut self, base_element: u32, element_count: u32, instance_count: u32) {
        self.log.push(BackendCall::Draw {
            base_element,
            element_count,
            instance_count,
        });
    }

    fn end_pass(&mut self) {
        self.log.push(BackendCall::EndPass);
    }

    fn commit(&mut self) {
        self.log.push(BackendCall::Commit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_shared() {
        let mut backend = RecordingBackend::new();
        let log = backend.log();

        backend.draw(0, 3, 1);
        backend.commit();

        assert_eq!(log.len(), 2);
        assert_eq!(log.position(&BackendCall::Commit), Some(1));
    }

    #[test]
    fn test_take_empties_log() {
        let log = CallLog::new();
        log.mark("a");
        assert_eq!(log.take(), vec![BackendCall::Marker("a".into())]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_named_backend() {
        let backend = RecordingBackend::new().named("gl33");
        assert_eq!(backend.name(), "gl33");
        assert_eq!(backend.color_format(), PixelFormat::Bgra8);
    }
}
