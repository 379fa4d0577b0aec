//! Process-wide shutdown flag.
//! The ctrl-c handler sets it; the transfer executor checks it between files
//! and stops the batch with `TransporterError::Interrupted`.
//!
//! Relaxed atomics are enough for a one-way "stop" flag, and `request()` is
//! safe to call from the signal handler thread.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

