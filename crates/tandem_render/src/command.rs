//! # Render Commands
//!
//! One recorded backend operation per value. Commands are built on the
//! update thread, owned by whichever queue buffer holds them, and consumed
//! exactly once when the render thread replays them.
//!
//! ## Hot Path
//!
//! Uniform uploads happen many times per frame, so [`UniformBlock`] keeps
//! its bytes inline instead of on the heap:
//!
//! ```text
//! ApplyUniforms { stage, slot, block: [len: u16 | bytes: [u8; 512]] }
//! ```

use std::borrow::Cow;
use std::fmt;

use bytemuck::Pod;

use crate::backend::Backend;
use crate::desc::{
    Bindings, BufferDesc, ImageData, ImageDesc, PassAction, PassDesc, PipelineDesc, Rect,
    ShaderDesc, ShaderStage,
};
use crate::error::{RenderError, RenderResult};
use crate::handle::{Buffer, Image, Pass, Pipeline, Shader};

/// Inline capacity of a uniform block, in bytes.
pub const MAX_UNIFORM_BYTES: usize = 512;

/// Kind tag of a [`RenderCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperationKind {
    /// Open a debug group.
    PushDebugGroup,
    /// Close a debug group.
    PopDebugGroup,
    /// Create a buffer.
    MakeBuffer,
    /// Create an image.
    MakeImage,
    /// Create a shader.
    MakeShader,
    /// Create a pipeline.
    MakePipeline,
    /// Create a render target.
    MakePass,
    /// Destroy a buffer.
    DestroyBuffer,
    /// Destroy an image.
    DestroyImage,
    /// Destroy a shader.
    DestroyShader,
    /// Destroy a pipeline.
    DestroyPipeline,
    /// Destroy a render target.
    DestroyPass,
    /// Overwrite buffer contents.
    UpdateBuffer,
    /// Append to a buffer.
    AppendBuffer,
    /// Overwrite image contents.
    UpdateImage,
    /// Begin the default framebuffer pass.
    BeginDefaultPass,
    /// Begin an offscreen pass.
    BeginPass,
    /// Set the viewport.
    ApplyViewport,
    /// Set the scissor rectangle.
    ApplyScissorRect,
    /// Bind a pipeline.
    ApplyPipeline,
    /// Bind resources.
    ApplyBindings,
    /// Upload uniforms.
    ApplyUniforms,
    /// Draw.
    Draw,
    /// End the current pass.
    EndPass,
    /// Finish the frame.
    Commit,
    /// Caller-supplied callback.
    Custom,
}

impl OperationKind {
    /// Returns true for resource lifecycle and upload operations.
    ///
    /// These are the only kinds replayed in
    /// [`ExecuteMode::ResourcesOnly`](crate::ExecuteMode::ResourcesOnly),
    /// together with [`OperationKind::Custom`].
    #[must_use]
    pub const fn is_resource(self) -> bool {
        matches!(
            self,
            Self::MakeBuffer
                | Self::MakeImage
                | Self::MakeShader
                | Self::MakePipeline
                | Self::MakePass
                | Self::DestroyBuffer
                | Self::DestroyImage
                | Self::DestroyShader
                | Self::DestroyPipeline
                | Self::DestroyPass
                | Self::UpdateBuffer
                | Self::AppendBuffer
                | Self::UpdateImage
        )
    }
}

/// Uniform data stored inline in the command.
#[derive(Clone, Copy)]
pub struct UniformBlock {
    len: u16,
    bytes: [u8; MAX_UNIFORM_BYTES],
}

impl UniformBlock {
    /// Copies `data` into a new block.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UniformPayloadTooLarge`] if `data` is longer
    /// than [`MAX_UNIFORM_BYTES`].
    pub fn try_from_bytes(data: &[u8]) -> RenderResult<Self> {
        if data.len() > MAX_UNIFORM_BYTES {
            return Err(RenderError::UniformPayloadTooLarge {
                len: data.len(),
                capacity: MAX_UNIFORM_BYTES,
            });
        }

        let mut bytes = [0u8; MAX_UNIFORM_BYTES];
        bytes[..data.len()].copy_from_slice(data);

        Ok(Self {
            // Bounded by MAX_UNIFORM_BYTES above.
            len: data.len() as u16,
            bytes,
        })
    }

    /// Copies a plain-old-data value into a new block.
    ///
    /// # Errors
    ///
    /// Same as [`try_from_bytes`](Self::try_from_bytes).
    pub fn from_pod<T: Pod>(value: &T) -> RenderResult<Self> {
        Self::try_from_bytes(bytemuck::bytes_of(value))
    }

    /// Number of valid bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns true if the block holds no bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }
}

impl PartialEq for UniformBlock {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for UniformBlock {}

impl fmt::Debug for UniformBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformBlock").field("len", &self.len).finish()
    }
}

/// A caller-supplied operation replayed on the render thread.
///
/// The closure owns whatever context it captured; it runs exactly once,
/// or is dropped unrun if its buffer is never replayed.
pub struct CustomCommand {
    label: &'static str,
    callback: Box<dyn FnOnce(&mut dyn Backend) + Send>,
}

impl CustomCommand {
    /// Wraps `callback`.
    pub fn new(label: &'static str, callback: impl FnOnce(&mut dyn Backend) + Send + 'static) -> Self {
        Self {
            label,
            callback: Box::new(callback),
        }
    }

    /// Label shown in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Runs the callback.
    pub fn invoke(self, backend: &mut dyn Backend) {
        (self.callback)(backend);
    }
}

impl fmt::Debug for CustomCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCommand").field("label", &self.label).finish_non_exhaustive()
    }
}

/// One recorded backend operation and its parameters.
#[derive(Debug)]
pub enum RenderCommand {
    /// See [`Backend::push_debug_group`].
    PushDebugGroup {
        /// Group name.
        name: Cow<'static, str>,
    },
    /// See [`Backend::pop_debug_group`].
    PopDebugGroup,
    /// See [`Backend::init_buffer`].
    MakeBuffer {
        /// Pre-allocated handle.
        buffer: Buffer,
        /// Creation parameters.
        desc: BufferDesc,
    },
    /// See [`Backend::init_image`].
    MakeImage {
        /// Pre-allocated handle.
        image: Image,
        /// Creation parameters.
        desc: ImageDesc,
    },
    /// See [`Backend::init_shader`].
    MakeShader {
        /// Pre-allocated handle.
        shader: Shader,
        /// Creation parameters.
        desc: ShaderDesc,
    },
    /// See [`Backend::init_pipeline`].
    MakePipeline {
        /// Pre-allocated handle.
        pipeline: Pipeline,
        /// Creation parameters.
        desc: PipelineDesc,
    },
    /// See [`Backend::init_pass`].
    MakePass {
        /// Pre-allocated handle.
        pass: Pass,
        /// Creation parameters.
        desc: PassDesc,
    },
    /// See [`Backend::destroy_buffer`].
    DestroyBuffer {
        /// Target.
        buffer: Buffer,
    },
    /// See [`Backend::destroy_image`].
    DestroyImage {
        /// Target.
        image: Image,
    },
    /// See [`Backend::destroy_shader`].
    DestroyShader {
        /// Target.
        shader: Shader,
    },
    /// See [`Backend::destroy_pipeline`].
    DestroyPipeline {
        /// Target.
        pipeline: Pipeline,
    },
    /// See [`Backend::destroy_pass`].
    DestroyPass {
        /// Target.
        pass: Pass,
    },
    /// See [`Backend::update_buffer`].
    UpdateBuffer {
        /// Target.
        buffer: Buffer,
        /// New contents.
        data: Vec<u8>,
    },
    /// See [`Backend::append_buffer`].
    AppendBuffer {
        /// Target.
        buffer: Buffer,
        /// Appended bytes.
        data: Vec<u8>,
    },
    /// See [`Backend::update_image`].
    UpdateImage {
        /// Target.
        image: Image,
        /// New contents.
        data: ImageData,
    },
    /// See [`Backend::begin_default_pass`].
    BeginDefaultPass {
        /// Load/clear behaviour.
        action: PassAction,
    },
    /// See [`Backend::begin_pass`].
    BeginPass {
        /// Target.
        pass: Pass,
        /// Load/clear behaviour.
        action: PassAction,
    },
    /// See [`Backend::apply_viewport`].
    ApplyViewport {
        /// Viewport rectangle.
        rect: Rect,
        /// Origin convention.
        origin_top_left: bool,
    },
    /// See [`Backend::apply_scissor_rect`].
    ApplyScissorRect {
        /// Scissor rectangle.
        rect: Rect,
        /// Origin convention.
        origin_top_left: bool,
    },
    /// See [`Backend::apply_pipeline`].
    ApplyPipeline {
        /// Pipeline to bind.
        pipeline: Pipeline,
    },
    /// See [`Backend::apply_bindings`].
    ApplyBindings {
        /// Resources to bind.
        bindings: Bindings,
    },
    /// See [`Backend::apply_uniforms`].
    ApplyUniforms {
        /// Target stage.
        stage: ShaderStage,
        /// Uniform block slot.
        slot: u32,
        /// Inline data.
        block: UniformBlock,
    },
    /// See [`Backend::draw`].
    Draw {
        /// First element.
        base_element: u32,
        /// Elements to draw.
        element_count: u32,
        /// Instances to draw.
        instance_count: u32,
    },
    /// See [`Backend::end_pass`].
    EndPass,
    /// See [`Backend::commit`].
    Commit,
    /// Caller-supplied operation.
    Custom(CustomCommand),
}

impl RenderCommand {
    /// Returns the kind tag.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::PushDebugGroup { .. } => OperationKind::PushDebugGroup,
            Self::PopDebugGroup => OperationKind::PopDebugGroup,
            Self::MakeBuffer { .. } => OperationKind::MakeBuffer,
            Self::MakeImage { .. } => OperationKind::MakeImage,
            Self::MakeShader { .. } => OperationKind::MakeShader,
            Self::MakePipeline { .. } => OperationKind::MakePipeline,
            Self::MakePass { .. } => OperationKind::MakePass,
            Self::DestroyBuffer { .. } => OperationKind::DestroyBuffer,
            Self::DestroyImage { .. } => OperationKind::DestroyImage,
            Self::DestroyShader { .. } => OperationKind::DestroyShader,
            Self::DestroyPipeline { .. } => OperationKind::DestroyPipeline,
            Self::DestroyPass { .. } => OperationKind::DestroyPass,
            Self::UpdateBuffer { .. } => OperationKind::UpdateBuffer,
            Self::AppendBuffer { .. } => OperationKind::AppendBuffer,
            Self::UpdateImage { .. } => OperationKind::UpdateImage,
            Self::BeginDefaultPass { .. } => OperationKind::BeginDefaultPass,
            Self::BeginPass { .. } => OperationKind::BeginPass,
            Self::ApplyViewport { .. } => OperationKind::ApplyViewport,
            Self::ApplyScissorRect { .. } => OperationKind::ApplyScissorRect,
            Self::ApplyPipeline { .. } => OperationKind::ApplyPipeline,
            Self::ApplyBindings { .. } => OperationKind::ApplyBindings,
            Self::ApplyUniforms { .. } => OperationKind::ApplyUniforms,
            Self::Draw { .. } => OperationKind::Draw,
            Self::EndPass => OperationKind::EndPass,
            Self::Commit => OperationKind::Commit,
            Self::Custom(_) => OperationKind::Custom,
        }
    }

    /// Replays the command against `backend`, consuming it.
    ///
    /// `default_pass_size` is `[width, height]` of the default framebuffer.
    pub fn execute(self, backend: &mut dyn Backend, default_pass_size: [u32; 2]) {
        match self {
            Self::PushDebugGroup { name } => backend.push_debug_group(&name),
            Self::PopDebugGroup => backend.pop_debug_group(),
            Self::MakeBuffer { buffer, desc } => backend.init_buffer(buffer, &desc),
            Self::MakeImage { image, desc } => backend.init_image(image, &desc),
            Self::MakeShader { shader, desc } => backend.init_shader(shader, &desc),
            Self::MakePipeline { pipeline, desc } => backend.init_pipeline(pipeline, &desc),
            Self::MakePass { pass, desc } => backend.init_pass(pass, &desc),
            Self::DestroyBuffer { buffer } => backend.destroy_buffer(buffer),
            Self::DestroyImage { image } => backend.destroy_image(image),
            Self::DestroyShader { shader } => backend.destroy_shader(shader),
            Self::DestroyPipeline { pipeline } => backend.destroy_pipeline(pipeline),
            Self::DestroyPass { pass } => backend.destroy_pass(pass),
            Self::UpdateBuffer { buffer, data } => backend.update_buffer(buffer, &data),
            Self::AppendBuffer { buffer, data } => backend.append_buffer(buffer, &data),
            Self::UpdateImage { image, data } => backend.update_image(image, &data),
            Self::BeginDefaultPass { action } => {
                let [width, height] = default_pass_size;
                backend.begin_default_pass(&action, width, height);
            }
            Self::BeginPass { pass, action } => backend.begin_pass(pass, &action),
            Self::ApplyViewport { rect, origin_top_left } => backend.apply_viewport(rect, origin_top_left),
            Self::ApplyScissorRect { rect, origin_top_left } => {
                backend.apply_scissor_rect(rect, origin_top_left);
            }
            Self::ApplyPipeline { pipeline } => backend.apply_pipeline(pipeline),
            Self::ApplyBindings { bindings } => backend.apply_bindings(&bindings),
            Self::ApplyUniforms { stage, slot, block } => backend.apply_uniforms(stage, slot, block.as_bytes()),
            Self::Draw {
                base_element,
                element_count,
                instance_count,
            } => backend.draw(base_element, element_count, instance_count),
            Self::EndPass => backend.end_pass(),
            Self::Commit => backend.commit(),
            Self::Custom(custom) => custom.invoke(backend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_block_roundtrip_bytes() {
        let block = UniformBlock::try_from_bytes(&[1, 2, 3, 4]).unwrap();
        assert_eq!(block.len(), 4);
        assert_eq!(block.as_bytes(), &[1, 2, 3, 4]);
        assert!(!block.is_empty());
    }

    #[test]
    fn test_uniform_block_full_capacity() {
        let data = [7u8; MAX_UNIFORM_BYTES];
        let block = UniformBlock::try_from_bytes(&data).unwrap();
        assert_eq!(block.len(), MAX_UNIFORM_BYTES);
    }

    #[test]
    fn test_uniform_block_too_large() {
        let data = vec![0u8; MAX_UNIFORM_BYTES + 1];
        let err = UniformBlock::try_from_bytes(&data).unwrap_err();
        assert!(matches!(
            err,
            RenderError::UniformPayloadTooLarge { len, capacity } if len == MAX_UNIFORM_BYTES + 1 && capacity == MAX_UNIFORM_BYTES
        ));
    }

    #[test]
    fn test_uniform_block_from_pod() {
        let mvp = [[1.0f32, 0.0, 0.0, 0.0]; 4];
        let block = UniformBlock::from_pod(&mvp).unwrap();
        assert_eq!(block.len(), 64);
        assert_eq!(block.as_bytes(), bytemuck::bytes_of(&mvp));
    }

    #[test]
    fn test_uniform_block_equality_ignores_tail() {
        let a = UniformBlock::try_from_bytes(&[1, 2]).unwrap();
        let b = UniformBlock::try_from_bytes(&[1, 2]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, UniformBlock::try_from_bytes(&[1]).unwrap());
    }

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(RenderCommand::Commit.kind(), OperationKind::Commit);
        assert_eq!(
            RenderCommand::DestroyBuffer { buffer: Buffer::INVALID }.kind(),
            OperationKind::DestroyBuffer
        );
        let custom = RenderCommand::Custom(CustomCommand::new("noop", |_| {}));
        assert_eq!(custom.kind(), OperationKind::Custom);
    }

    #[test]
    fn test_resource_kinds() {
        assert!(OperationKind::MakeShader.is_resource());
        assert!(OperationKind::AppendBuffer.is_resource());
        assert!(OperationKind::DestroyPass.is_resource());
        assert!(!OperationKind::Draw.is_resource());
        assert!(!OperationKind::Commit.is_resource());
        assert!(!OperationKind::Custom.is_resource());
    }
}
