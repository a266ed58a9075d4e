//! # Telemetry replay module
//!
//! A replay is a recorded run of the vehicle stored as JSON lines, one [`TickRecord`] per control
//! cycle. Replays let the pipeline be driven off-vehicle exactly as it would have been during the
//! recorded run.
//!
//! Blank lines and lines starting with `#` are ignored:
//!
//! ```text
//! # Arm and launch
//! {"time_s": 0.0, "telemetry": {"mode": "user"}, "tcs": ["ARM_LAUNCH"]}
//! {"time_s": 0.1, "telemetry": {"mode": "local", "speed": 0.0}, "cmd": {"throttle": 0.3}}
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

// Internal
use comms_if::{
    eqpt::{DriveCommand, Telemetry},
    tc::Tc,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One recorded control cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TickRecord {
    /// Time of the cycle since the start of the recording.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Telemetry sampled this cycle.
    pub telemetry: Telemetry,

    /// The autopilot's command this cycle.
    #[serde(default)]
    pub cmd: DriveCommand,

    /// Telecommands received this cycle, executed before the pipeline runs.
    #[serde(default)]
    pub tcs: Vec<Tc>,
}

/// A loaded replay.
#[derive(Debug, Clone, Default)]
pub struct Replay {
    ticks: Vec<TickRecord>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Could not read the replay: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tick record on line {line}: {source}")]
    InvalidRecord {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Tick time on line {line} ({time_s} s) is before the previous tick or not finite")]
    NonMonotonicTime { line: usize, time_s: f64 },

    #[error("The replay contains no ticks")]
    Empty,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Replay {
    /// Load a replay from the given path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let file = File::open(path)?;

        Self::parse(BufReader::new(file))
    }

    /// Parse a replay from a reader.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, ReplayError> {
        let mut ticks: Vec<TickRecord> = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let tick: TickRecord = serde_json::from_str(trimmed)
                .map_err(|source| ReplayError::InvalidRecord { line: i + 1, source })?;

            let monotonic = match ticks.last() {
                Some(prev) => tick.time_s >= prev.time_s,
                None => true,
            };
            if !tick.time_s.is_finite() || !monotonic {
                return Err(ReplayError::NonMonotonicTime {
                    line: i + 1,
                    time_s: tick.time_s,
                });
            }

            ticks.push(tick);
        }

        if ticks.is_empty() {
            return Err(ReplayError::Empty);
        }

        Ok(Self { ticks })
    }

    pub fn ticks(&self) -> &[TickRecord] {
        &self.ticks
    }

    pub fn num_ticks(&self) -> usize {
        self.ticks.len()
    }

    /// Number of telecommands across all ticks.
    pub fn num_tcs(&self) -> usize {
        self.ticks.iter().map(|t| t.tcs.len()).sum()
    }

    /// Time covered by the replay.
    pub fn duration_s(&self) -> f64 {
        match (self.ticks.first(), self.ticks.last()) {
            (Some(f), Some(l)) => l.time_s - f.time_s,
            _ => 0.0,
        }
    }
}
