//! # Obstacle avoidance module
//!
//! Obstacle avoidance is a reactive controller working from the nearest return in the latest lidar
//! scan. When an obstacle comes inside `far_distance_m` the steering is pushed away from it and the
//! throttle cut back in proportion to how close it is, reaching the maximum effect at
//! `close_distance_m`.
//!
//! The controller holds no state between cycles, it only reports what it did through the event
//! sink.

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

/// Possible errors that can occur during ObstCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum ObstCtrlError {
    #[error(
        "Expected 0 < close_distance_m < far_distance_m, found close = {close} m, far = {far} m"
    )]
    InvalidDistances { close: f64, far: f64 },

    #[error(
        "Expected -1 <= min_throttle_floor <= max_throttle <= 1, found floor = {floor}, max = {max}"
    )]
    InvalidThrottleLimits { floor: f64, max: f64 },

    #[error("Steer gain must be finite and non-negative, found {0}")]
    InvalidSteerGain(f64),

    #[error("Speed noise floor must be finite and non-negative, found {0}")]
    InvalidSpeedNoiseFloor(f64),

    #[error("Emergency brake trigger throttle must be in [-1, 1], found {0}")]
    InvalidTriggerThrottle(f64),
}
