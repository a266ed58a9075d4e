//! # Drive command
//!
//! The drive command is the demand produced by the autopilot each cycle, and passed through the
//! override controllers before it reaches the actuators.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Limits of the steering demand (full left, full right).
pub const STEERING_LIMITS: (f64, f64) = (-1.0, 1.0);

/// Limits of the throttle demand (full reverse, full forward).
pub const THROTTLE_LIMITS: (f64, f64) = (-1.0, 1.0);

/// Limits of the brake demand (released, fully applied).
pub const BRAKE_LIMITS: (f64, f64) = (0.0, 1.0);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A steering/throttle/brake demand.
///
/// All fields are normalised. Use [`DriveCommand::clamped`] before handing a command to anything
/// downstream.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveCommand {
    /// Steering demand, positive to the right.
    ///
    /// Units: normalised, [-1, 1]
    #[serde(default)]
    pub steering: f64,

    /// Throttle demand, positive forwards.
    ///
    /// Units: normalised, [-1, 1]
    #[serde(default)]
    pub throttle: f64,

    /// Brake demand.
    ///
    /// Units: normalised, [0, 1]
    #[serde(default)]
    pub brake: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveCommand {
    /// Create a new command from the individual demands.
    pub fn new(steering: f64, throttle: f64, brake: f64) -> Self {
        Self {
            steering,
            throttle,
            brake,
        }
    }

    /// A command which releases the throttle, centres the steering and applies the full brake.
    pub fn neutral_stop() -> Self {
        Self {
            steering: 0.0,
            throttle: 0.0,
            brake: 1.0,
        }
    }

    /// Return a copy of this command with every demand saturated to its limits.
    ///
    /// Non-finite demands (a missing value from the autopilot shows up as NaN) are treated as
    /// zero.
    pub fn clamped(&self) -> Self {
        Self {
            steering: saturate(self.steering, STEERING_LIMITS),
            throttle: saturate(self.throttle, THROTTLE_LIMITS),
            brake: saturate(self.brake, BRAKE_LIMITS),
        }
    }

    /// True if every demand is finite and within its limits.
    pub fn is_within_limits(&self) -> bool {
        within(self.steering, STEERING_LIMITS)
            && within(self.throttle, THROTTLE_LIMITS)
            && within(self.brake, BRAKE_LIMITS)
    }
}

impl std::fmt::Display for DriveCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "S {:+.2} T {:+.2} B {:.2}",
            self.steering, self.throttle, self.brake
        )
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn saturate(value: f64, limits: (f64, f64)) -> f64 {
    if value.is_finite() {
        value.max(limits.0).min(limits.1)
    } else {
        0.0
    }
}

fn within(value: f64, limits: (f64, f64)) -> bool {
    value.is_finite() && value >= limits.0 && value <= limits.1
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamped() {
        let cmd = DriveCommand::new(1.5, -3.0, -0.2).clamped();
        assert_eq!(cmd, DriveCommand::new(1.0, -1.0, 0.0));
        assert!(cmd.is_within_limits());

        let cmd = DriveCommand::new(f64::NAN, 0.4, f64::INFINITY).clamped();
        assert_eq!(cmd, DriveCommand::new(0.0, 0.4, 0.0));

        assert!(!DriveCommand::new(0.0, 0.0, 1.1).is_within_limits());
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let cmd: DriveCommand = serde_json::from_str(r#"{"throttle": 0.3}"#).unwrap();
        assert_eq!(cmd, DriveCommand::new(0.0, 0.3, 0.0));
    }
}
