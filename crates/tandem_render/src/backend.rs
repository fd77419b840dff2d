//! # Graphics Backend Interface
//!
//! The renderer never talks to a GPU API itself. It replays recorded
//! commands by calling into a [`Backend`], one method per operation, in the
//! exact order they were recorded. Failures inside a backend call are the
//! backend's to report; the renderer only sequences the calls.

use crate::desc::{
    Bindings, BufferDesc, ImageData, ImageDesc, PassAction, PassDesc, PipelineDesc, PixelFormat,
    Rect, ShaderDesc, ShaderStage,
};
use crate::handle::{Buffer, Image, Pass, Pipeline, Shader};

/// The render-thread side of a graphics API.
///
/// All methods are called from the consumer thread only. Resource handles
/// arrive already allocated; `init_*` gives them GPU backing and
/// `destroy_*` releases it. The handle slot itself is returned to its pool
/// later, by a deferred cleanup.
pub trait Backend: Send {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Color format of the default framebuffer.
    fn color_format(&self) -> PixelFormat;

    /// Opens a named debug group.
    fn push_debug_group(&mut self, name: &str);
    /// Closes the innermost debug group.
    fn pop_debug_group(&mut self);

    /// Creates the GPU object behind `buffer`.
    fn init_buffer(&mut self, buffer: Buffer, desc: &BufferDesc);
    /// Creates the GPU object behind `image`.
    fn init_image(&mut self, image: Image, desc: &ImageDesc);
    /// Creates the GPU object behind `shader`.
    fn init_shader(&mut self, shader: Shader, desc: &ShaderDesc);
    /// Creates the GPU object behind `pipeline`.
    fn init_pipeline(&mut self, pipeline: Pipeline, desc: &PipelineDesc);
    /// Creates the GPU object behind `pass`.
    fn init_pass(&mut self, pass: Pass, desc: &PassDesc);

    /// Releases the GPU object behind `buffer`.
    fn destroy_buffer(&mut self, buffer: Buffer);
    /// Releases the GPU object behind `image`.
    fn destroy_image(&mut self, image: Image);
    /// Releases the GPU object behind `shader`.
    fn destroy_shader(&mut self, shader: Shader);
    /// Releases the GPU object behind `pipeline`.
    fn destroy_pipeline(&mut self, pipeline: Pipeline);
    /// Releases the GPU object behind `pass`.
    fn destroy_pass(&mut self, pass: Pass);

    /// Replaces the contents of `buffer`.
    fn update_buffer(&mut self, buffer: Buffer, data: &[u8]);
    /// Appends to `buffer`.
    fn append_buffer(&mut self, buffer: Buffer, data: &[u8]);
    /// Replaces the contents of `image`.
    fn update_image(&mut self, image: Image, data: &ImageData);

    /// Starts a pass on the default framebuffer.
    fn begin_default_pass(&mut self, action: &PassAction, width: u32, height: u32);
    /// Starts a pass on an offscreen target.
    fn begin_pass(&mut self, pass: Pass, action: &PassAction);
    /// Sets the viewport.
    fn apply_viewport(&mut self, rect: Rect, origin_top_left: bool);
    /// Sets the scissor rectangle.
    fn apply_scissor_rect(&mut self, rect: Rect, origin_top_left: bool);
    /// Binds a pipeline.
    fn apply_pipeline(&mut self, pipeline: Pipeline);
    /// Binds buffers and images.
    fn apply_bindings(&mut self, bindings: &Bindings);
    /// Uploads one uniform block.
    fn apply_uniforms(&mut self, stage: ShaderStage, slot: u32, data: &[u8]);
    /// Issues a draw.
    fn draw(&mut self, base_element: u32, element_count: u32, instance_count: u32);
    /// Ends the current pass.
    fn end_pass(&mut self);
    /// Finishes the frame.
    fn commit(&mut self);
}

/// Backend facts captured once when the renderer is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Default framebuffer color format.
    pub color_format: PixelFormat,
}

impl BackendInfo {
    /// Queries `backend`.
    #[must_use]
    pub fn of(backend: &dyn Backend) -> Self {
        Self {
            name: backend.name().to_owned(),
            color_format: backend.color_format(),
        }
    }
}
