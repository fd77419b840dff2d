//! # Double-Buffered Command Queue
//!
//! ```text
//! Frame N:
//!   Update records into buffer A (pending)
//!   Render replays buffer B (in-flight, committed last frame)
//!
//! Commit:
//!   SWAP roles
//!   Update records into buffer B
//!   Render replays buffer A
//! ```
//!
//! Commands within a buffer replay strictly in recording order: draws
//! depend on the pipeline, bindings and uniforms applied before them.

use tandem_core::DoubleBuffer;

use crate::command::RenderCommand;

/// Two command buffers that swap roles at every commit.
#[derive(Debug)]
pub struct CommandQueue {
    buffers: DoubleBuffer<Vec<RenderCommand>>,
}

impl CommandQueue {
    /// Creates a queue with no reserved capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a queue reserving `capacity` commands in each buffer.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffers: DoubleBuffer::from_fn(|| Vec::with_capacity(capacity)),
        }
    }

    /// Appends `command` to the pending buffer (producer side).
    #[inline]
    pub fn record(&self, command: RenderCommand) {
        self.buffers.pending().push(command);
    }

    /// Number of commands waiting in the pending buffer.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buffers.pending().len()
    }

    /// Number of commands waiting in the in-flight buffer.
    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        self.buffers.in_flight().len()
    }

    /// Number of commits so far.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.buffers.swap_count()
    }

    /// Hands the pending buffer to the consumer and starts a fresh one.
    ///
    /// Returns how many commands were handed over.
    ///
    /// # Panics
    ///
    /// Panics if the previous in-flight buffer was never drained; swapping
    /// it back in as pending would silently lose those commands.
    pub fn swap_and_commit(&self) -> usize {
        let handed_over = self.pending_len();
        self.buffers.swap();

        let mut pending = self.buffers.pending();
        assert!(
            pending.is_empty(),
            "Committed over {} commands that were never replayed!",
            pending.len()
        );
        pending.clear();

        handed_over
    }

    /// Replays the in-flight buffer in recording order, then leaves it empty.
    ///
    /// `dispatch` receives each command by value. Returns the number of
    /// commands dispatched.
    pub fn drain(&self, mut dispatch: impl FnMut(RenderCommand)) -> usize {
        let mut in_flight = self.buffers.in_flight();
        let count = in_flight.len();

        // drain(..) keeps the allocation for the next time this buffer is pending.
        for command in in_flight.drain(..) {
            dispatch(command);
        }

        count
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::OperationKind;
    use crate::handle::Buffer;

    fn draw(n: u32) -> RenderCommand {
        RenderCommand::Draw {
            base_element: n,
            element_count: 3,
            instance_count: 1,
        }
    }

    fn base_elements(queue: &CommandQueue) -> Vec<u32> {
        let mut seen = Vec::new();
        queue.drain(|cmd| {
            if let RenderCommand::Draw { base_element, .. } = cmd {
                seen.push(base_element);
            }
        });
        seen
    }

    #[test]
    fn test_fifo_preservation() {
        let queue = CommandQueue::with_capacity(16);
        for n in 0..10 {
            queue.record(draw(n));
        }

        assert_eq!(queue.swap_and_commit(), 10);
        assert_eq!(base_elements(&queue), (0..10).collect::<Vec<_>>());
        assert_eq!(queue.in_flight_len(), 0);
    }

    #[test]
    fn test_no_cross_buffer_interference() {
        let queue = CommandQueue::new();

        queue.record(draw(100));
        queue.swap_and_commit();

        // Recorded after the commit: must not show up in this drain.
        queue.record(draw(200));

        assert_eq!(base_elements(&queue), vec![100]);
        assert_eq!(queue.pending_len(), 1);

        queue.swap_and_commit();
        assert_eq!(base_elements(&queue), vec![200]);
    }

    #[test]
    fn test_commit_starts_empty_pending() {
        let queue = CommandQueue::new();
        queue.record(RenderCommand::DestroyBuffer { buffer: Buffer::INVALID });
        queue.swap_and_commit();

        assert_eq!(queue.pending_len(), 0);
        assert_eq!(queue.in_flight_len(), 1);
        assert_eq!(queue.commit_count(), 1);

        let mut kinds = Vec::new();
        queue.drain(|cmd| kinds.push(cmd.kind()));
        assert_eq!(kinds, vec![OperationKind::DestroyBuffer]);
    }

    #[test]
    fn test_empty_commit() {
        let queue = CommandQueue::new();
        assert_eq!(queue.swap_and_commit(), 0);
        assert_eq!(queue.drain(|_| {}), 0);
    }

    #[test]
    #[should_panic(expected = "never replayed")]
    fn test_commit_over_undrained_buffer_panics() {
        let queue = CommandQueue::new();
        queue.record(draw(1));
        queue.swap_and_commit();
        // No drain: the next commit would recycle the undrained buffer.
        queue.swap_and_commit();
    }
}
