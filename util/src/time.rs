//! General time utility functions and clock sources
//!
//! Controllers never read the time directly, they are given a [`Clock`] at construction. On the
//! vehicle this is a [`MonotonicClock`], in replays and tests a [`SimClock`] which is stepped
//! explicitly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of monotonic time.
pub trait Clock: Send + Sync {
    /// Seconds elapsed since the clock's (arbitrary) epoch.
    fn now_s(&self) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Wall clock backed by [`Instant`], with its epoch at creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant
}

/// Clock which only moves when told to.
///
/// The time is stored as the bit pattern of an `f64` so the clock can be shared between
/// controllers without a lock.
#[derive(Debug, Default)]
pub struct SimClock {
    time_s_bits: AtomicU64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now()
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_s(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

impl SimClock {
    /// Create a new clock starting at the given time.
    pub fn new(start_s: f64) -> Self {
        Self {
            time_s_bits: AtomicU64::new(start_s.to_bits())
        }
    }

    /// Set the current time.
    pub fn set(&self, time_s: f64) {
        self.time_s_bits.store(time_s.to_bits(), Ordering::Relaxed);
    }

    /// Move the clock forward by `dt_s` seconds.
    pub fn advance(&self, dt_s: f64) {
        self.set(self.now_s() + dt_s);
    }
}

impl Clock for SimClock {
    fn now_s(&self) -> f64 {
        f64::from_bits(self.time_s_bits.load(Ordering::Relaxed))
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}
