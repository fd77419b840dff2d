//! # Tandem
//!
//! Update/render frame driver.
//!
//! ```text
//! ┌──────────────────────┐   commit_commands()   ┌──────────────────────┐
//! │    UPDATE THREAD     │ ────────────────────> │    RENDER THREAD     │
//! │                      │                       │   (RenderThread)     │
//! │  add_command_*       │                       │  try_execute_...()   │
//! │  schedule_cleanup    │ <──────────────────── │  ExecuteReport ──┐   │
//! │  flush_commands()    │   frame replayed      └──────────────────┼───┘
//! └──────────────────────┘                                          │
//!            ^                   crossbeam channel                  │
//!            └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `render_thread`: owns the render-side loop of a shared [`Renderer`]

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod render_thread;

// Re-export the layers
pub use tandem_core as core;
pub use tandem_render as render;

// Re-export commonly used types
pub use render_thread::{RenderThread, RenderThreadConfig};
pub use tandem_render::{
    Backend, ExecuteMode, ExecuteReport, RecordingBackend, RenderError, RenderResult, Renderer,
    RendererConfig,
};
