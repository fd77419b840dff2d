//! # Render Error Types
//!
//! Recoverable failures only. Contract violations (wrong thread, double
//! commit, oversized uniform block on the recording path) panic instead.

use thiserror::Error;

use crate::handle::ResourceKind;

/// Errors that can occur while configuring or driving the renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No free slot left in a handle pool.
    #[error("{kind} pool exhausted: capacity {capacity}")]
    PoolExhausted {
        /// Resource kind whose pool is full.
        kind: ResourceKind,
        /// Configured pool capacity.
        capacity: usize,
    },

    /// Uniform data does not fit the inline payload.
    #[error("uniform payload too large: {len} bytes, capacity {capacity}")]
    UniformPayloadTooLarge {
        /// Bytes supplied.
        len: usize,
        /// Inline capacity.
        capacity: usize,
    },

    /// The render thread did not finish the committed frame in time.
    #[error("flush timed out after {waited_ms} ms")]
    FlushTimeout {
        /// How long we waited.
        waited_ms: u64,
    },

    /// Invalid configuration value or file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
