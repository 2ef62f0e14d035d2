//! Cooperative cancellation
//!
//! Bridges an asynchronous stop request (process signal, FFI caller, another
//! thread) to the scheduler. Requesting a stop is a single atomic store: no
//! allocation, no lock, safe to call from a signal handler. The scheduler reads
//! the flag only between steps, so a stop never interrupts a generation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag. Clones observe and set the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create an unset flag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the scheduler to stop at the next step boundary.
    #[inline]
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested
    #[inline]
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear a previous request so the flag can be reused for another run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Underlying atomic, for handlers that need a `'static` reference.
    #[must_use]
    pub fn as_atomic(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_flag_starts_unset() {
        assert!(!CancellationFlag::new().is_set());
    }

    #[test]
    fn test_clones_share_state() {
        let flag = CancellationFlag::new();
        let handle = flag.clone();
        handle.request_stop();
        assert!(flag.is_set());
        flag.reset();
        assert!(!handle.is_set());
    }

    #[test]
    fn test_request_from_other_thread() {
        let flag = CancellationFlag::new();
        let remote = flag.clone();
        thread::spawn(move || remote.request_stop()).join().unwrap();
        assert!(flag.is_set());
    }
}
