//! Clock abstraction for entry timestamps.
//!
//! The `Clock` trait decouples entry construction from system time. Production
//! code injects a process-wide monotonic clock; tests inject [`ManualClock`]
//! for reproducible entries.
//!
//! # Invariants
//!
//! - Monotonicity: consecutive calls to `timestamp()` on one clock never return
//!   a smaller value
//! - Isolation: implementations must not share global state with other clocks

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of entry timestamps.
///
/// Timestamps are opaque `u64` ticks; the log only requires that an author's
/// clock does not run backwards. Two entries with identical content and links
/// still get distinct keys as long as their timestamps differ.
pub trait Clock: Send + Sync {
    /// Current timestamp.
    fn timestamp(&self) -> u64;
}

/// Clock that hands out a predetermined sequence of ticks.
///
/// Each call returns the current value and advances it by `step`.
#[derive(Debug)]
pub struct ManualClock {
    next: AtomicU64,
    step: u64,
}

impl ManualClock {
    /// Start at `start`, advancing by 1 per call.
    pub fn new(start: u64) -> Self {
        Self::with_step(start, 1)
    }

    /// Start at `start`, advancing by `step` per call.
    pub fn with_step(start: u64, step: u64) -> Self {
        Self { next: AtomicU64::new(start), step }
    }

    /// Value the next call to `timestamp()` returns.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    /// Move the clock to `value`.
    pub fn set(&self, value: u64) {
        self.next.store(value, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn timestamp(&self) -> u64 {
        self.next.fetch_add(self.step, Ordering::SeqCst)
    }
}
