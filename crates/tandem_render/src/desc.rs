//! Resource descriptors and per-call parameter blocks.
//!
//! The renderer never looks inside these; they travel from the recording
//! call to the backend unchanged.

use crate::handle::{Buffer, Image, Shader};

/// Vertex buffer slots in [`Bindings`].
pub const MAX_VERTEX_BUFFERS: usize = 8;
/// Image slots per shader stage in [`Bindings`].
pub const MAX_STAGE_IMAGES: usize = 12;
/// Color attachments in a [`PassDesc`].
pub const MAX_COLOR_ATTACHMENTS: usize = 4;

/// What a buffer is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferType {
    /// Vertex data.
    #[default]
    Vertex,
    /// Index data.
    Index,
}

/// How often a resource's contents change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Usage {
    /// Written once at creation.
    #[default]
    Immutable,
    /// Updated occasionally.
    Dynamic,
    /// Rewritten every frame.
    Stream,
}

/// Pixel formats understood by backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// 8-bit RGBA, normalized.
    #[default]
    Rgba8,
    /// 8-bit BGRA, normalized (common swapchain format).
    Bgra8,
    /// 16-bit float RGBA.
    Rgba16F,
    /// 32-bit float single channel.
    R32F,
    /// Depth only.
    Depth,
    /// Packed depth + stencil.
    DepthStencil,
}

/// Shader stage a uniform block or image binding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
}

/// Primitive topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveType {
    /// Independent triangles.
    #[default]
    Triangles,
    /// Triangle strip.
    TriangleStrip,
    /// Independent lines.
    Lines,
    /// Points.
    Points,
}

/// Index element width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexType {
    /// Non-indexed drawing.
    #[default]
    None,
    /// 16-bit indices.
    U16,
    /// 32-bit indices.
    U32,
}

/// Format of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Two floats.
    Float2,
    /// Three floats.
    Float3,
    /// Four floats.
    Float4,
    /// Four normalized bytes.
    UByte4N,
}

/// Buffer creation parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferDesc {
    /// Size in bytes.
    pub size: usize,
    /// Vertex or index.
    pub buffer_type: BufferType,
    /// Update frequency.
    pub usage: Usage,
    /// Initial contents (required for immutable buffers).
    pub data: Option<Vec<u8>>,
    /// Debug label.
    pub label: Option<String>,
}

/// Pixel data for every mip level of an image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageData {
    /// One byte blob per mip level, largest first.
    pub mip_levels: Vec<Vec<u8>>,
}

/// Image creation parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub pixel_format: PixelFormat,
    /// Whether the image can be a pass attachment.
    pub render_target: bool,
    /// MSAA sample count.
    pub sample_count: u32,
    /// Update frequency.
    pub usage: Usage,
    /// Initial contents.
    pub data: Option<ImageData>,
    /// Debug label.
    pub label: Option<String>,
}

/// Shader program creation parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderDesc {
    /// Vertex stage source or bytecode.
    pub vertex_source: Vec<u8>,
    /// Fragment stage source or bytecode.
    pub fragment_source: Vec<u8>,
    /// Uniform block sizes for the vertex stage, by slot.
    pub vertex_uniform_blocks: Vec<usize>,
    /// Uniform block sizes for the fragment stage, by slot.
    pub fragment_uniform_blocks: Vec<usize>,
    /// Debug label.
    pub label: Option<String>,
}

/// Pipeline creation parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineDesc {
    /// Program the pipeline runs.
    pub shader: Shader,
    /// Vertex attribute formats, in location order.
    pub attributes: Vec<VertexFormat>,
    /// Topology.
    pub primitive: PrimitiveType,
    /// Index width.
    pub index_type: IndexType,
    /// Enable depth writes.
    pub depth_write: bool,
    /// Debug label.
    pub label: Option<String>,
}

/// Render target creation parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassDesc {
    /// Color attachments.
    pub color_attachments: Vec<Image>,
    /// Optional depth/stencil attachment.
    pub depth_stencil_attachment: Option<Image>,
    /// Debug label.
    pub label: Option<String>,
}

/// What happens to attachments at the start of a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassAction {
    /// Clear color, or keep previous contents when `None`.
    pub clear_color: Option<[f32; 4]>,
    /// Clear depth value.
    pub clear_depth: Option<f32>,
    /// Clear stencil value.
    pub clear_stencil: Option<u8>,
}

impl PassAction {
    /// Clears color to `rgba`, depth to 1.0, stencil to 0.
    #[must_use]
    pub const fn clear(rgba: [f32; 4]) -> Self {
        Self {
            clear_color: Some(rgba),
            clear_depth: Some(1.0),
            clear_stencil: Some(0),
        }
    }

    /// Keeps every attachment's contents.
    #[must_use]
    pub const fn load() -> Self {
        Self {
            clear_color: None,
            clear_depth: None,
            clear_stencil: None,
        }
    }
}

/// Resource bindings for the next draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bindings {
    /// Vertex buffers by slot.
    pub vertex_buffers: [Buffer; MAX_VERTEX_BUFFERS],
    /// Byte offsets into the vertex buffers.
    pub vertex_buffer_offsets: [u32; MAX_VERTEX_BUFFERS],
    /// Index buffer (`INVALID` for non-indexed).
    pub index_buffer: Buffer,
    /// Byte offset into the index buffer.
    pub index_buffer_offset: u32,
    /// Vertex stage images by slot.
    pub vertex_images: [Image; MAX_STAGE_IMAGES],
    /// Fragment stage images by slot.
    pub fragment_images: [Image; MAX_STAGE_IMAGES],
}

/// A screen-space rectangle in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top or bottom edge, depending on origin.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}
