//! # Launch assist module
//!
//! Launch assist applies a large fixed throttle for a short time when the vehicle enters
//! autopilot, to get it off the line quickly at the start of a race. The autopilot takes over once
//! the boost has run for its duration.
//!
//! Launch assist is one-shot: it is armed either explicitly (`LaunchCtrl::arm`) or, if
//! `arm_on_mode_switch` is set, by the switch into autopilot, and is disarmed once the boost
//! completes. Leaving autopilot part way through a boost suspends it but keeps it armed, so the
//! next entry into autopilot starts a fresh boost.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LaunchCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum LaunchCtrlError {
    #[error("Boost duration must be positive and finite, found {0} s")]
    InvalidBoostDuration(f64),

    #[error("Boost throttle must be in [-1, 1], found {0}")]
    InvalidBoostThrottle(f64),
}
