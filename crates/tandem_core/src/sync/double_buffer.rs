//! # Double Buffer
//!
//! Two slots and one atomic role selector. The producer fills the pending
//! slot while the consumer works through the in-flight slot; `swap` flips
//! which is which.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │        DoubleBuffer<T>      │
//!                    │                             │
//!                    │  ┌─────────┐  ┌─────────┐   │
//!                    │  │ Slot 0  │  │ Slot 1  │   │
//!                    │  └────┬────┘  └────┬────┘   │
//!                    │       │            │        │
//!                    │  ┌────┴────────────┴────┐   │
//!                    │  │ Pending Index (0/1)  │   │
//!                    │  └──────────────────────┘   │
//!                    └─────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              ▼               ▼               ▼
//!      ┌──────────────┐ ┌────────────┐ ┌────────────┐
//!      │  pending()   │ │ in_flight()│ │   swap()   │
//!      │  (producer)  │ │ (consumer) │ │ (producer) │
//!      └──────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! Each slot sits behind its own lock. Under the single-producer /
//! single-consumer protocol the two threads always hold different slots,
//! so the locks are never contended; they exist so that a protocol
//! violation blocks or panics instead of racing.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::{Mutex, MutexGuard};

/// Which role a slot currently plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferRole {
    /// The slot the producer appends to.
    Pending,
    /// The slot the consumer replays.
    InFlight,
}

/// A pair of buffers with a single atomic role selector.
///
/// Invariant: `pending_index() != in_flight_index()` and both are in `{0, 1}`.
/// Only one integer is stored; the in-flight index is always `pending ^ 1`.
///
/// ## Usage
///
/// ```rust
/// use tandem_core::DoubleBuffer;
///
/// let buffers: DoubleBuffer<Vec<u32>> = DoubleBuffer::default();
///
/// buffers.pending().push(7);
/// buffers.swap();
///
/// assert_eq!(buffers.in_flight().as_slice(), &[7]);
/// assert!(buffers.pending().is_empty());
/// ```
pub struct DoubleBuffer<T> {
    /// The two slots.
    slots: [Mutex<T>; 2],
    /// Index of the pending slot (0 or 1).
    pending_index: AtomicUsize,
    /// Number of swaps performed.
    swap_count: AtomicU64,
}

impl<T> DoubleBuffer<T> {
    /// Creates a double buffer from two initial slot values.
    ///
    /// `first` starts as the pending slot.
    #[must_use]
    pub fn new(first: T, second: T) -> Self {
        Self {
            slots: [Mutex::new(first), Mutex::new(second)],
            pending_index: AtomicUsize::new(0),
            swap_count: AtomicU64::new(0),
        }
    }

    /// Creates a double buffer whose slots are built by `init`.
    #[must_use]
    pub fn from_fn(mut init: impl FnMut() -> T) -> Self {
        let first = init();
        let second = init();
        Self::new(first, second)
    }

    /// Returns the index of the pending slot.
    #[inline]
    #[must_use]
    pub fn pending_index(&self) -> usize {
        self.pending_index.load(Ordering::Acquire)
    }

    /// Returns the index of the in-flight slot.
    #[inline]
    #[must_use]
    pub fn in_flight_index(&self) -> usize {
        self.pending_index() ^ 1
    }

    /// Returns how many times the roles have been swapped.
    #[inline]
    #[must_use]
    pub fn swap_count(&self) -> u64 {
        self.swap_count.load(Ordering::Relaxed)
    }

    /// Returns the role of slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not 0 or 1.
    #[must_use]
    pub fn role_of(&self, index: usize) -> BufferRole {
        assert!(index < 2, "DoubleBuffer slot index {index} out of range");
        if index == self.pending_index() {
            BufferRole::Pending
        } else {
            BufferRole::InFlight
        }
    }

    /// Locks the pending slot (producer side).
    pub fn pending(&self) -> MutexGuard<'_, T> {
        self.slots[self.pending_index()].lock()
    }

    /// Locks the in-flight slot (consumer side).
    pub fn in_flight(&self) -> MutexGuard<'_, T> {
        self.slots[self.in_flight_index()].lock()
    }

    /// Locks the slot currently playing `role`.
    pub fn get(&self, role: BufferRole) -> MutexGuard<'_, T> {
        match role {
            BufferRole::Pending => self.pending(),
            BufferRole::InFlight => self.in_flight(),
        }
    }

    /// Exchanges the roles of the two slots.
    ///
    /// Both slots are locked for the duration of the flip, so the swap is
    /// ordered after every prior access to either slot. Returns the index of
    /// the new in-flight slot (the one the producer just filled).
    ///
    /// # Panics
    ///
    /// Panics if either slot is currently locked: a held pending guard means
    /// the producer is swapping mid-record, a held in-flight guard means the
    /// consumer is still replaying the previous buffer.
    pub fn swap(&self) -> usize {
        let pending = self.pending_index();

        let Some(_pending_guard) = self.slots[pending].try_lock() else {
            panic!("Cannot swap buffers while the pending buffer is locked!");
        };
        let Some(_in_flight_guard) = self.slots[pending ^ 1].try_lock() else {
            panic!("Cannot swap buffers while the in-flight buffer is being replayed!");
        };

        self.pending_index.store(pending ^ 1, Ordering::Release);
        self.swap_count.fetch_add(1, Ordering::Relaxed);

        pending
    }

    /// Consumes the double buffer, returning `(pending, in_flight)`.
    #[must_use]
    pub fn into_inner(self) -> (T, T) {
        let pending = self.pending_index.load(Ordering::Acquire);
        let [first, second] = self.slots;
        let (first, second) = (first.into_inner(), second.into_inner());

        if pending == 0 {
            (first, second)
        } else {
            (second, first)
        }
    }
}

impl<T: Default> Default for DoubleBuffer<T> {
    fn default() -> Self {
        Self::from_fn(T::default)
    }
}

impl<T> std::fmt::Debug for DoubleBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoubleBuffer")
            .field("pending_index", &self.pending_index())
            .field("swap_count", &self.swap_count())
            .finish_non_exhaustive()
    }
}
