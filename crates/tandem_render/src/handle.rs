//! # Resource Handles and Handle Pools
//!
//! Handles are handed out on the update thread the moment a create command is
//! recorded, long before the render thread initialises the resource. A handle
//! is a generation-tagged slot index:
//!
//! ```text
//!   31            16 15             0
//!  ┌────────────────┬────────────────┐
//!  │   generation   │   slot + 1     │   id 0 = INVALID
//!  └────────────────┴────────────────┘
//! ```
//!
//! Releasing a slot bumps its generation, so a stale handle never aliases a
//! newer resource that reuses the slot.

use std::fmt;

use crate::config::PoolSizes;
use crate::error::{RenderError, RenderResult};

/// Largest pool a 16-bit slot field can address.
pub const MAX_POOL_CAPACITY: usize = 0xFFFF;

const SLOT_MASK: u32 = 0xFFFF;
const GENERATION_SHIFT: u32 = 16;

/// The kinds of backend resource the renderer manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResourceKind {
    /// Vertex/index/storage buffer.
    Buffer = 0,
    /// Texture or render attachment.
    Image = 1,
    /// Compiled shader program.
    Shader = 2,
    /// Pipeline state object.
    Pipeline = 3,
    /// Offscreen render target.
    Pass = 4,
}

impl ResourceKind {
    /// Every kind, in pool order.
    pub const ALL: [Self; 5] = [Self::Buffer, Self::Image, Self::Shader, Self::Pipeline, Self::Pass];

    /// Lowercase name used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Buffer => "buffer",
            Self::Image => "image",
            Self::Shader => "shader",
            Self::Pipeline => "pipeline",
            Self::Pass => "pass",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Common surface of the five handle types.
pub trait ResourceHandle: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Pool this handle type is allocated from.
    const KIND: ResourceKind;

    /// Wraps a raw id.
    fn from_id(id: u32) -> Self;

    /// Returns the raw id.
    fn id(self) -> u32;

    /// Returns the pool slot, or `None` for the invalid handle.
    fn slot(self) -> Option<usize> {
        match self.id() & SLOT_MASK {
            0 => None,
            n => Some(n as usize - 1),
        }
    }

    /// Returns the slot generation.
    fn generation(self) -> u16 {
        (self.id() >> GENERATION_SHIFT) as u16
    }
}

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// The handle that never refers to a resource.
            pub const INVALID: Self = Self(0);

            /// Returns the raw id.
            #[inline]
            #[must_use]
            pub const fn id(self) -> u32 {
                self.0
            }

            /// Returns false for [`Self::INVALID`].
            #[inline]
            #[must_use]
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }

        impl ResourceHandle for $name {
            const KIND: ResourceKind = ResourceKind::$kind;

            #[inline]
            fn from_id(id: u32) -> Self {
                Self(id)
            }

            #[inline]
            fn id(self) -> u32 {
                self.0
            }
        }
    };
}

resource_handle!(
    /// Handle to a GPU buffer.
    Buffer => Buffer
);
resource_handle!(
    /// Handle to a GPU image.
    Image => Image
);
resource_handle!(
    /// Handle to a shader program.
    Shader => Shader
);
resource_handle!(
    /// Handle to a pipeline state object.
    Pipeline => Pipeline
);
resource_handle!(
    /// Handle to an offscreen render target.
    Pass => Pass
);

/// Fixed-capacity slot allocator for one resource kind.
///
/// `alloc` and `release` are **O(1)**; all memory is allocated up front.
#[derive(Debug)]
pub struct HandlePool {
    /// Kind served by this pool.
    kind: ResourceKind,
    /// Current generation of each slot.
    generations: Box<[u16]>,
    /// Whether each slot is handed out.
    alive: Box<[bool]>,
    /// Whether each live slot already has a destroy pending.
    retiring: Box<[bool]>,
    /// Indices of available slots.
    free_list: Vec<usize>,
    /// Number of live handles.
    allocated_count: usize,
}

impl HandlePool {
    /// Creates a pool with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or above [`MAX_POOL_CAPACITY`].
    #[must_use]
    pub fn new(kind: ResourceKind, capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= MAX_POOL_CAPACITY,
            "Capacity {capacity} exceeds the {MAX_POOL_CAPACITY} slot limit"
        );

        Self {
            kind,
            generations: vec![0; capacity].into_boxed_slice(),
            alive: vec![false; capacity].into_boxed_slice(),
            retiring: vec![false; capacity].into_boxed_slice(),
            // Reversed so slot 0 is handed out first.
            free_list: (0..capacity).rev().collect(),
            allocated_count: 0,
        }
    }

    /// Returns the kind served by this pool.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.alive.len()
    }

    /// Returns the number of live handles.
    #[inline]
    #[must_use]
    pub const fn allocated_count(&self) -> usize {
        self.allocated_count
    }

    /// Returns the number of free slots.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Allocates a slot and returns its raw id, or `None` if the pool is full.
    pub fn alloc(&mut self) -> Option<u32> {
        let slot = self.free_list.pop()?;

        self.alive[slot] = true;
        self.allocated_count += 1;

        Some(encode(slot, self.generations[slot]))
    }

    /// Returns a slot to the pool. Returns false for stale or unknown ids.
    pub fn release(&mut self, id: u32) -> bool {
        let Some(slot) = self.live_slot(id) else {
            return false;
        };

        self.alive[slot] = false;
        self.retiring[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.allocated_count -= 1;
        self.free_list.push(slot);
        true
    }

    /// Marks a live slot as having its destroy recorded.
    ///
    /// Returns false for stale or unknown ids and for slots already
    /// retiring. The slot stays alive until [`release`](Self::release).
    pub fn retire(&mut self, id: u32) -> bool {
        let Some(slot) = self.live_slot(id) else {
            return false;
        };
        !std::mem::replace(&mut self.retiring[slot], true)
    }

    /// Returns true if `id` is the current occupant of its slot.
    #[must_use]
    pub fn is_alive(&self, id: u32) -> bool {
        self.live_slot(id).is_some()
    }

    fn live_slot(&self, id: u32) -> Option<usize> {
        let slot = (id & SLOT_MASK).checked_sub(1)? as usize;
        let generation = (id >> GENERATION_SHIFT) as u16;

        let matches = *self.alive.get(slot)? && self.generations[slot] == generation;
        matches.then_some(slot)
    }
}

fn encode(slot: usize, generation: u16) -> u32 {
    // Slot is bounded by MAX_POOL_CAPACITY, so slot + 1 fits in 16 bits.
    (u32::from(generation) << GENERATION_SHIFT) | (slot as u32 + 1)
}

/// One [`HandlePool`] per [`ResourceKind`].
#[derive(Debug)]
pub struct ResourcePools {
    pools: [HandlePool; 5],
}

impl ResourcePools {
    /// Creates the pools with the given sizes.
    #[must_use]
    pub fn new(sizes: &PoolSizes) -> Self {
        Self {
            pools: [
                HandlePool::new(ResourceKind::Buffer, sizes.buffers),
                HandlePool::new(ResourceKind::Image, sizes.images),
                HandlePool::new(ResourceKind::Shader, sizes.shaders),
                HandlePool::new(ResourceKind::Pipeline, sizes.pipelines),
                HandlePool::new(ResourceKind::Pass, sizes.passes),
            ],
        }
    }

    /// Returns the pool for `kind`.
    #[must_use]
    pub fn pool(&self, kind: ResourceKind) -> &HandlePool {
        &self.pools[kind as usize]
    }

    fn pool_mut(&mut self, kind: ResourceKind) -> &mut HandlePool {
        &mut self.pools[kind as usize]
    }

    /// Allocates a handle of type `H`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PoolExhausted`] if no slot is free.
    pub fn alloc<H: ResourceHandle>(&mut self) -> RenderResult<H> {
        let pool = self.pool_mut(H::KIND);
        pool.alloc().map(H::from_id).ok_or(RenderError::PoolExhausted {
            kind: H::KIND,
            capacity: pool.capacity(),
        })
    }

    /// Releases `handle`'s slot. Returns false if it was already released.
    pub fn release<H: ResourceHandle>(&mut self, handle: H) -> bool {
        self.pool_mut(H::KIND).release(handle.id())
    }

    /// Marks `handle` as destroyed but not yet released.
    ///
    /// Returns false if it is stale or already retiring.
    pub fn retire<H: ResourceHandle>(&mut self, handle: H) -> bool {
        self.pool_mut(H::KIND).retire(handle.id())
    }

    /// Returns true if `handle` is still allocated.
    #[must_use]
    pub fn is_alive<H: ResourceHandle>(&self, handle: H) -> bool {
        self.pool(H::KIND).is_alive(handle.id())
    }

    /// Total live handles across all kinds.
    #[must_use]
    pub fn total_allocated(&self) -> usize {
        self.pools.iter().map(HandlePool::allocated_count).sum()
    }
}
