//! Process-wide shutdown coordination.
//! The ctrl-c handler sets a flag; the hasher checks it between files and the
//! executor between operations, so an interrupted sync stops at an operation
//! boundary instead of mid-rename.
//!
//! Relaxed atomics are sufficient for a one-way "stop" flag, and `request()`
//! is safe to call from a signal handler.

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

/// Clear the flag. Tests use this to isolate runs inside one process.
#[inline]
pub fn reset() {
    SHUTDOWN.store(false, Ordering::Relaxed);
}
