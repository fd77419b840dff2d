//! # Synchronization Primitives for the Update/Render Split
//!
//! ## The Problem
//!
//! ```text
//! Thread 1 (Update):  RECORD commands for frame N+1
//! Thread 2 (Render):  REPLAY commands for frame N
//!
//! Without synchronization: RACE CONDITION → CORRUPT COMMAND STREAM
//! With one shared Mutex:   UPDATE STALLS WHILE RENDER REPLAYS
//! ```
//!
//! ## The Solution: Double Buffering + Two Semaphores
//!
//! ```text
//! Update:  record → [pending] ── commit (swap) ──► render semaphore ─┐
//!                                                                     ▼
//! Render:                    [in-flight] ◄── acquire ── replay ── release update semaphore
//! ```
//!
//! The buffers swap roles at commit. The semaphores carry the happens-before
//! edges across the swap.

mod affinity;
mod double_buffer;
mod semaphore;

pub use affinity::ThreadBinding;
pub use double_buffer::{BufferRole, DoubleBuffer};
pub use semaphore::Semaphore;
