use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use autodb_types::Timestamp;

/// Source of `createdAt`/`updatedAt` values.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock that never goes backwards.
///
/// Each reading is `max(wall_clock, last + 1ns)`, so two operations in the
/// same nanosecond (or across a wall-clock step backwards) still get
/// strictly increasing timestamps. This is what keeps `updatedAt` strictly
/// after `createdAt`.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: Mutex<u64>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = Timestamp::now().as_nanos();
        // The guarded value is a plain integer, always valid.
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let next = if wall > *last {
            wall
        } else {
            last.saturating_add(1)
        };
        *last = next;
        Timestamp::from_nanos(next)
    }
}

/// Hand-driven clock for tests.
///
/// Every reading returns the current value and then advances it by `step`.
/// A `step` of zero gives a frozen clock.
#[derive(Debug)]
pub struct ManualClock {
    nanos: AtomicU64,
    step: u64,
}

impl ManualClock {
    /// A clock stuck at `at` until moved with [`set`](Self::set).
    pub fn fixed(at: u64) -> Self {
        Self::stepping(at, 0)
    }

    /// A clock starting at `start` that ticks `step` nanoseconds per reading.
    pub fn stepping(start: u64, step: u64) -> Self {
        Self {
            nanos: AtomicU64::new(start),
            step,
        }
    }

    pub fn set(&self, at: u64) {
        self.nanos.store(at, Ordering::SeqCst);
    }

    pub fn advance(&self, by: u64) {
        self.nanos.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.nanos.fetch_add(self.step, Ordering::SeqCst))
    }
}
