//! # Tandem Core
//!
//! Handoff primitives for a two-thread update/render split:
//! - One producer thread records work
//! - One consumer thread replays it
//! - Neither ever touches the other's buffer
//!
//! ## Architecture Rules
//!
//! 1. **Ownership moves at a swap** - buffers change hands, they are never shared
//! 2. **Blocking is explicit** - only semaphore acquires block
//! 3. **Misuse is fatal** - contract violations panic instead of corrupting state
//!
//! ## Example
//!
//! ```rust
//! use tandem_core::Semaphore;
//!
//! let ready = Semaphore::with_max(0, 1);
//! ready.release();
//! ready.release(); // dropped, already saturated
//! assert!(ready.try_acquire());
//! assert!(!ready.try_acquire());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod sync;

pub use sync::{BufferRole, DoubleBuffer, Semaphore, ThreadBinding};
