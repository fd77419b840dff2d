//! # Counting Semaphore
//!
//! Blocking handoff between exactly two threads, with an optional cap so a
//! fast signaller cannot bank more permits than the waiter will ever use.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::trace;

/// A counting semaphore.
///
/// `acquire` blocks until a permit is available and takes it. `release`
/// adds a permit and wakes one waiter. When a maximum is configured,
/// releases beyond it are dropped instead of accumulated.
///
/// ## Usage
///
/// ```rust
/// use std::sync::Arc;
/// use tandem_core::Semaphore;
///
/// let frame_ready = Arc::new(Semaphore::with_max(0, 1));
/// let signal = Arc::clone(&frame_ready);
///
/// let render = std::thread::spawn(move || {
///     frame_ready.acquire();
/// });
///
/// signal.release();
/// render.join().unwrap();
/// ```
pub struct Semaphore {
    /// Available permits.
    count: Mutex<u32>,
    /// Wakes blocked acquirers.
    condvar: Condvar,
    /// Saturation cap (`None` = unbounded).
    max: Option<u32>,
}

impl Semaphore {
    /// Creates an uncapped semaphore holding `initial` permits.
    #[must_use]
    pub fn new(initial: u32) -> Self {
        Self {
            count: Mutex::new(initial),
            condvar: Condvar::new(),
            max: None,
        }
    }

    /// Creates a semaphore that never holds more than `max` permits.
    ///
    /// # Panics
    ///
    /// Panics if `max` is zero or `initial` exceeds `max`.
    #[must_use]
    pub fn with_max(initial: u32, max: u32) -> Self {
        assert!(max > 0, "Semaphore max must be greater than zero");
        assert!(initial <= max, "Semaphore initial count {initial} exceeds max {max}");

        Self {
            count: Mutex::new(initial),
            condvar: Condvar::new(),
            max: Some(max),
        }
    }

    /// Returns the configured cap, if any.
    #[inline]
    #[must_use]
    pub const fn max(&self) -> Option<u32> {
        self.max
    }

    /// Returns the number of permits currently available.
    ///
    /// Only a snapshot: the other thread may change it immediately.
    #[must_use]
    pub fn available(&self) -> u32 {
        *self.count.lock()
    }

    /// Adds one permit and wakes one waiter.
    ///
    /// Returns `false` if the permit was dropped because the semaphore was
    /// already saturated (or the count would overflow).
    pub fn release(&self) -> bool {
        let mut count = self.count.lock();

        let limit = self.max.unwrap_or(u32::MAX);
        if *count >= limit {
            trace!(limit, "Semaphore saturated, release dropped");
            return false;
        }

        *count += 1;
        self.condvar.notify_one();
        true
    }

    /// Blocks until a permit is available, then takes it.
    pub fn acquire(&self) {
        let mut count = self.count.lock();
        while *count == 0 {
            self.condvar.wait(&mut count);
        }
        *count -= 1;
    }

    /// Takes a permit if one is available right now.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        let mut count = self.count.lock();
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    /// Blocks for at most `timeout` waiting for a permit.
    ///
    /// Returns `true` if a permit was taken.
    #[must_use]
    pub fn try_acquire_for(&self, timeout: Duration) -> bool {
        // Overflowing deadlines degrade to a plain blocking acquire.
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.acquire();
            return true;
        };

        let mut count = self.count.lock();
        while *count == 0 {
            if self.condvar.wait_until(&mut count, deadline).timed_out() {
                // A release may have landed right at the deadline.
                break;
            }
        }

        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Semaphore")
            .field("available", &self.available())
            .field("max", &self.max)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_release_then_acquire() {
        let sem = Semaphore::new(0);
        assert!(sem.release());
        assert_eq!(sem.available(), 1);

        sem.acquire();
        assert_eq!(sem.available(), 0);
    }

    #[test]
    fn test_try_acquire_empty() {
        let sem = Semaphore::new(0);
        assert!(!sem.try_acquire());

        let sem = Semaphore::new(2);
        assert!(sem.try_acquire());
        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
    }

    #[test]
    fn test_cap_drops_excess_releases() {
        let sem = Semaphore::with_max(0, 1);

        assert!(sem.release());
        assert!(!sem.release()); // saturated

        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
    }

    #[test]
    fn test_capped_second_acquire_blocks() {
        let sem = Arc::new(Semaphore::with_max(0, 1));
        sem.release();
        sem.release();

        // First acquire succeeds immediately
        sem.acquire();

        // Second one must block until someone releases again
        let acquired = Arc::new(AtomicBool::new(false));
        let waiter = {
            let sem = Arc::clone(&sem);
            let acquired = Arc::clone(&acquired);
            thread::spawn(move || {
                sem.acquire();
                acquired.store(true, Ordering::Release);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::Acquire));

        sem.release();
        waiter.join().unwrap();
        assert!(acquired.load(Ordering::Acquire));
    }

    #[test]
    fn test_try_acquire_for_times_out() {
        let sem = Semaphore::new(0);

        let start = Instant::now();
        assert!(!sem.try_acquire_for(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_try_acquire_for_wakes_on_release() {
        let sem = Arc::new(Semaphore::new(0));

        let releaser = {
            let sem = Arc::clone(&sem);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                sem.release();
            })
        };

        assert!(sem.try_acquire_for(Duration::from_secs(5)));
        releaser.join().unwrap();
        assert_eq!(sem.available(), 0);
    }

    #[test]
    #[should_panic(expected = "exceeds max")]
    fn test_initial_above_max_panics() {
        let _ = Semaphore::with_max(2, 1);
    }
}
