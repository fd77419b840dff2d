//! # Tandem Render
//!
//! Deferred graphics command transport between an update thread and a
//! render thread.
//!
//! ## Architecture Rules
//!
//! 1. **Record anywhere, execute once** - the update thread only appends commands
//! 2. **Handles are immediate** - a make call returns a usable handle before the GPU sees it
//! 3. **Destruction is deferred** - slots return to their pool frames after the destroy replays
//! 4. **The backend is a trait** - this crate links no graphics API
//!
//! ## Modules
//!
//! - [`renderer`]: the update/render handoff and the public recording API
//! - [`queue`]: double-buffered command storage
//! - [`command`]: one variant per backend operation
//! - [`cleanup`]: frame-deferred destruction
//! - [`handle`]: generation-tagged handles and their pools
//! - [`backend`]: the render-thread interface
//! - [`recording`]: a backend that logs instead of rendering

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod cleanup;
pub mod command;
pub mod config;
pub mod desc;
pub mod error;
pub mod handle;
pub mod queue;
pub mod recording;
pub mod renderer;
pub mod stats;

pub use backend::{Backend, BackendInfo};
pub use cleanup::{CleanupEntry, CleanupScheduler};
pub use command::{CustomCommand, OperationKind, RenderCommand, UniformBlock, MAX_UNIFORM_BYTES};
pub use config::{PoolSizes, RendererConfig};
pub use desc::{
    Bindings, BufferDesc, BufferType, ImageData, ImageDesc, IndexType, PassAction, PassDesc,
    PipelineDesc, PixelFormat, PrimitiveType, Rect, ShaderDesc, ShaderStage, Usage, VertexFormat,
    MAX_COLOR_ATTACHMENTS, MAX_STAGE_IMAGES, MAX_VERTEX_BUFFERS,
};
pub use error::{RenderError, RenderResult};
pub use handle::{
    Buffer, HandlePool, Image, Pass, Pipeline, ResourceHandle, ResourceKind, ResourcePools, Shader,
    MAX_POOL_CAPACITY,
};
pub use queue::CommandQueue;
pub use recording::{BackendCall, CallLog, RecordingBackend};
pub use renderer::{ExecuteMode, Renderer, RendererState};
pub use stats::{ExecuteReport, RendererStats};
