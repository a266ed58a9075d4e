//! Heading history used as the recovery reference

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::VecDeque;
use util::maths::circular_mean_deg;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of heading samples kept. At the default 4 Hz sampling this covers 5 s.
pub const HISTORY_CAPACITY: usize = 20;

/// Number of samples averaged to get the reference heading.
pub const REFERENCE_WINDOW: usize = 9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Bounded history of recent headings, oldest first.
#[derive(Debug, Clone)]
pub struct HeadingHistory {
    samples: VecDeque<f64>,
    capacity: usize,
    reference_window: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeadingHistory {
    pub fn new(capacity: usize, reference_window: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            reference_window,
        }
    }

    /// Add a sample, evicting the oldest if the history is full.
    pub fn push(&mut self, heading_deg: f64) {
        if self.capacity == 0 {
            return;
        }

        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(heading_deg);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    /// Reference heading: the circular mean of the last `reference_window` samples before the
    /// newest one.
    ///
    /// The newest sample is left out as it was probably taken as the vehicle hit whatever it is
    /// stuck on. `None` if there are fewer than two samples.
    pub fn reference_deg(&self) -> Option<f64> {
        let num_older = self.samples.len().checked_sub(1)?;
        let skip = num_older.saturating_sub(self.reference_window);

        circular_mean_deg(self.samples.iter().take(num_older).skip(skip))
    }
}

impl Default for HeadingHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY, REFERENCE_WINDOW)
    }
}
