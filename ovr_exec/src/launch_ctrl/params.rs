//! Parameters structure for LaunchCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use super::LaunchCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for launch assist.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Params {
    /// How long the boost is applied for.
    ///
    /// Units: seconds
    #[serde(default = "default_boost_duration_s")]
    pub boost_duration_s: f64,

    /// Throttle demanded during the boost.
    ///
    /// Units: normalised, [-1, 1]
    #[serde(default = "default_boost_throttle")]
    pub boost_throttle: f64,

    /// Arm launch assist whenever the vehicle switches into autopilot.
    #[serde(default)]
    pub arm_on_mode_switch: bool,

    /// Hold the steering at zero during the boost.
    #[serde(default)]
    pub lock_steering_during_boost: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the parameters are usable.
    pub fn validate(&self) -> Result<(), LaunchCtrlError> {
        if !(self.boost_duration_s.is_finite() && self.boost_duration_s > 0.0) {
            return Err(LaunchCtrlError::InvalidBoostDuration(self.boost_duration_s));
        }

        if !(self.boost_throttle >= -1.0 && self.boost_throttle <= 1.0) {
            return Err(LaunchCtrlError::InvalidBoostThrottle(self.boost_throttle));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            boost_duration_s: default_boost_duration_s(),
            boost_throttle: default_boost_throttle(),
            arm_on_mode_switch: false,
            lock_steering_during_boost: false,
        }
    }
}

fn default_boost_duration_s() -> f64 {
    1.0
}

fn default_boost_throttle() -> f64 {
    1.0
}
