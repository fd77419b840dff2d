//! # Frame-Deferred Cleanup
//!
//! A resource retired while frame N is being recorded may still be named by
//! commands the render thread has not replayed yet. Its destruction is
//! therefore queued with a due frame and only run once the render thread has
//! finished that frame.
//!
//! ```text
//! schedule(defer = 2) while recording frame 5  →  due_frame = 7
//! process(5), process(6)                        →  nothing
//! process(7)                                    →  runs, removed
//! ```

use std::fmt;

/// One queued destruction.
pub struct CleanupEntry {
    /// Label shown in logs.
    label: &'static str,
    /// Earliest frame this may run in.
    due_frame: u64,
    /// Owns whatever it destroys until it runs.
    action: Box<dyn FnOnce() + Send>,
}

impl CleanupEntry {
    /// Creates an entry.
    pub fn new(label: &'static str, due_frame: u64, action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            label,
            due_frame,
            action: Box::new(action),
        }
    }

    /// Label shown in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Earliest frame this may run in.
    #[must_use]
    pub const fn due_frame(&self) -> u64 {
        self.due_frame
    }

    /// Runs the action, consuming the entry.
    pub fn run(self) {
        (self.action)();
    }
}

impl fmt::Debug for CleanupEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanupEntry")
            .field("label", &self.label)
            .field("due_frame", &self.due_frame)
            .finish_non_exhaustive()
    }
}

/// Queue of cleanups keyed by due frame.
///
/// `current_frame` is the frame being recorded on the update thread; it
/// advances once per commit. Entries with equal due frames run in the order
/// they were scheduled.
#[derive(Debug, Default)]
pub struct CleanupScheduler {
    entries: Vec<CleanupEntry>,
    current_frame: u64,
}

impl CleanupScheduler {
    /// Creates an empty scheduler at frame 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame currently being recorded.
    #[inline]
    #[must_use]
    pub const fn current_frame(&self) -> u64 {
        self.current_frame
    }

    /// Moves recording on to the next frame. Returns the new frame.
    pub fn advance_frame(&mut self) -> u64 {
        self.current_frame += 1;
        self.current_frame
    }

    /// Queues `action` to run no earlier than `current_frame + defer_frames`.
    ///
    /// Returns the due frame.
    pub fn schedule(
        &mut self,
        label: &'static str,
        defer_frames: u32,
        action: impl FnOnce() + Send + 'static,
    ) -> u64 {
        let due_frame = self.current_frame + u64::from(defer_frames);
        self.entries.push(CleanupEntry::new(label, due_frame, action));
        due_frame
    }

    /// Number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest due frame among queued entries.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(CleanupEntry::due_frame).min()
    }

    /// Moves every entry due at or before `frame` into `out`, in schedule order.
    ///
    /// Returns how many were moved.
    pub fn take_due(&mut self, frame: u64, out: &mut Vec<CleanupEntry>) -> usize {
        if !self.entries.iter().any(|e| e.due_frame <= frame) {
            return 0;
        }

        let before = out.len();
        let entries = std::mem::take(&mut self.entries);
        self.entries.reserve(entries.len());

        for entry in entries {
            if entry.due_frame <= frame {
                out.push(entry);
            } else {
                self.entries.push(entry);
            }
        }

        out.len() - before
    }

    /// Runs and removes every entry due at or before `frame`.
    ///
    /// Returns how many ran.
    pub fn process(&mut self, frame: u64) -> usize {
        let mut due = Vec::new();
        let count = self.take_due(frame, &mut due);
        due.into_iter().for_each(CleanupEntry::run);
        count
    }

    /// Removes every entry regardless of due frame, in schedule order.
    pub fn drain_all(&mut self) -> Vec<CleanupEntry> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce() + Send>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |name: &'static str| -> Box<dyn FnOnce() + Send> {
            let sink = Arc::clone(&sink);
            Box::new(move || sink.lock().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_defer_zero_runs_same_frame() {
        let (log, make) = recorder();
        let mut scheduler = CleanupScheduler::new();

        assert_eq!(scheduler.schedule("a", 0, make("a")), 0);
        assert_eq!(scheduler.process(0), 1);
        assert_eq!(*log.lock(), vec!["a"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_never_runs_early() {
        let (log, make) = recorder();
        let mut scheduler = CleanupScheduler::new();

        scheduler.schedule("late", 2, make("late"));
        assert_eq!(scheduler.next_due(), Some(2));

        assert_eq!(scheduler.process(0), 0);
        assert_eq!(scheduler.process(1), 0);
        assert!(log.lock().is_empty());

        assert_eq!(scheduler.process(2), 1);
        assert_eq!(*log.lock(), vec!["late"]);

        // Exactly once
        assert_eq!(scheduler.process(3), 0);
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_due_frame_tracks_current_frame() {
        let mut scheduler = CleanupScheduler::new();
        scheduler.advance_frame();
        scheduler.advance_frame();
        assert_eq!(scheduler.current_frame(), 2);
        assert_eq!(scheduler.schedule("x", 3, || {}), 5);
    }

    #[test]
    fn test_equal_due_frames_keep_order() {
        let (log, make) = recorder();
        let mut scheduler = CleanupScheduler::new();

        scheduler.schedule("first", 1, make("first"));
        scheduler.schedule("later", 4, make("later"));
        scheduler.schedule("second", 1, make("second"));
        scheduler.schedule("third", 0, make("third"));

        assert_eq!(scheduler.process(1), 3);
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_take_due_leaves_rest() {
        let mut scheduler = CleanupScheduler::new();
        scheduler.schedule("a", 0, || {});
        scheduler.schedule("b", 1, || {});

        let mut out = Vec::new();
        assert_eq!(scheduler.take_due(0, &mut out), 1);
        assert_eq!(out[0].label(), "a");
        assert_eq!(scheduler.len(), 1);

        let rest = scheduler.drain_all();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].due_frame(), 1);
        assert!(scheduler.is_empty());
    }
}
