//! # Stuck recovery module
//!
//! Stuck recovery watches for the vehicle sitting still in autopilot, for example after hitting a
//! wall. Once it has been stopped for `stuck_duration_s` a timed reverse-and-turn manoeuvre is
//! commanded, turning so as to bring the vehicle's heading back towards the direction it had been
//! travelling in recently.
//!
//! The controller is a three phase state machine:
//!
//! ```text
//! Monitoring --stopped--> Confirming --stopped for stuck_duration_s--> Recovering
//!     ^                        |                                          |
//!     +-------moving-----------+                                          |
//!     +-----------------recovery_duration_s elapsed-----------------------+
//! ```
//!
//! While travelling the heading is sampled into a bounded history, the mean of which is the
//! reference the recovery steers towards.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod heading;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use heading::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during StuckCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum StuckCtrlError {
    #[error("{name} must be positive and finite, found {value} s")]
    InvalidDuration { name: &'static str, value: f64 },

    #[error("Recovery throttle must be in [-1, 1], found {0}")]
    InvalidRecoveryThrottle(f64),

    #[error("Recovery steering must be in [0, 1], found {0}")]
    InvalidRecoverySteering(f64),

    #[error("{name} must be finite and non-negative, found {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
}
