//! Thread binding for single-producer / single-consumer contracts.

use std::sync::OnceLock;
use std::thread::{self, ThreadId};

use tracing::debug;

/// Binds a role ("producer", "consumer") to the first thread that uses it.
///
/// Every later [`check`](Self::check) from a different thread is a contract
/// violation and panics. A disabled binding never panics.
#[derive(Debug)]
pub struct ThreadBinding {
    /// Role name used in the panic message.
    role: &'static str,
    /// Thread that first claimed the role.
    owner: OnceLock<ThreadId>,
    /// Whether violations panic.
    enforce: bool,
}

impl ThreadBinding {
    /// Creates an enforcing binding for `role`.
    #[must_use]
    pub const fn new(role: &'static str) -> Self {
        Self {
            role,
            owner: OnceLock::new(),
            enforce: true,
        }
    }

    /// Creates a binding that records the owner but never panics.
    #[must_use]
    pub const fn disabled(role: &'static str) -> Self {
        Self {
            role,
            owner: OnceLock::new(),
            enforce: false,
        }
    }

    /// Returns the role name.
    #[inline]
    #[must_use]
    pub const fn role(&self) -> &'static str {
        self.role
    }

    /// Returns whether violations panic.
    #[inline]
    #[must_use]
    pub const fn is_enforced(&self) -> bool {
        self.enforce
    }

    /// Returns the thread that claimed the role, if any has.
    #[must_use]
    pub fn owner(&self) -> Option<ThreadId> {
        self.owner.get().copied()
    }

    /// Claims the role for the calling thread, or verifies it already owns it.
    ///
    /// # Panics
    ///
    /// Panics if enforcement is on and another thread owns the role.
    #[inline]
    pub fn check(&self) {
        let current = thread::current().id();
        let owner = *self.owner.get_or_init(|| {
            debug!(role = self.role, thread = ?current, "Thread bound");
            current
        });

        if self.enforce && owner != current {
            panic!(
                "{} called from {:?}, but the {} role is bound to {:?}",
                self.role, current, self.role, owner
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_caller_claims_role() {
        let binding = ThreadBinding::new("producer");
        assert!(binding.owner().is_none());

        binding.check();
        binding.check();
        assert_eq!(binding.owner(), Some(thread::current().id()));
    }

    #[test]
    fn test_other_thread_is_rejected() {
        let binding = std::sync::Arc::new(ThreadBinding::new("consumer"));
        binding.check();

        let other = std::sync::Arc::clone(&binding);
        let result = thread::spawn(move || other.check()).join();
        assert!(result.is_err());
    }

    #[test]
    fn test_disabled_binding_allows_any_thread() {
        let binding = std::sync::Arc::new(ThreadBinding::disabled("consumer"));
        binding.check();

        let other = std::sync::Arc::clone(&binding);
        thread::spawn(move || other.check()).join().unwrap();
        assert_eq!(binding.owner(), Some(thread::current().id()));
    }
}
