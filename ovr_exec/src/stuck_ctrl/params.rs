//! Parameters structure for StuckCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use super::StuckCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for stuck recovery.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Params {
    /// How long the vehicle must be stopped before it is considered stuck.
    ///
    /// Units: seconds
    #[serde(default = "default_stuck_duration_s")]
    pub stuck_duration_s: f64,

    /// How long the recovery manoeuvre lasts.
    ///
    /// Units: seconds
    #[serde(default = "default_recovery_duration_s")]
    pub recovery_duration_s: f64,

    /// Throttle during recovery.
    ///
    /// Units: normalised, [-1, 1]
    #[serde(default = "default_recovery_throttle")]
    pub recovery_throttle: f64,

    /// Magnitude of the steering during recovery.
    ///
    /// Units: normalised, [0, 1]
    #[serde(default = "default_recovery_steering")]
    pub recovery_steering: f64,

    /// Motion below this means the vehicle is stopped.
    #[serde(default = "default_stop_speed_threshold")]
    pub stop_speed_threshold: f64,

    /// Motion above this means the vehicle is travelling and its heading can be sampled.
    #[serde(default = "default_moving_speed_threshold")]
    pub moving_speed_threshold: f64,

    /// Time between heading samples.
    ///
    /// Units: seconds
    #[serde(default = "default_sample_period_s")]
    pub sample_period_s: f64,

    /// Number of times the recovery can be extended while the heading is still off.
    #[serde(default = "default_max_extensions")]
    pub max_extensions: u32,

    /// Which telemetry to measure motion from.
    #[serde(default)]
    pub motion_source: MotionSource,

    /// How the recovery steering is chosen.
    #[serde(default)]
    pub steer_policy: SteerPolicy,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Source of the vehicle's motion measurement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionSource {
    /// Scalar speed.
    Speed,

    /// Magnitude of the velocity vector.
    Velocity,
}

/// Recovery steering selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SteerPolicy {
    /// Turn towards the reference heading.
    HeadingError,

    /// Always `+recovery_steering`.
    Fixed,

    /// The input steering, negated. Reversing with the opposite lock retraces the approach.
    MirrorInput,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the parameters are usable.
    pub fn validate(&self) -> Result<(), StuckCtrlError> {
        let durations = [
            ("stuck_duration_s", self.stuck_duration_s),
            ("recovery_duration_s", self.recovery_duration_s),
            ("sample_period_s", self.sample_period_s),
        ];
        for &(name, value) in durations.iter() {
            if !(value.is_finite() && value > 0.0) {
                return Err(StuckCtrlError::InvalidDuration {
                    name,
                    value,
                });
            }
        }

        let thresholds = [
            ("stop_speed_threshold", self.stop_speed_threshold),
            ("moving_speed_threshold", self.moving_speed_threshold),
        ];
        for &(name, value) in thresholds.iter() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(StuckCtrlError::InvalidThreshold {
                    name,
                    value,
                });
            }
        }

        if !(self.recovery_throttle >= -1.0 && self.recovery_throttle <= 1.0) {
            return Err(StuckCtrlError::InvalidRecoveryThrottle(self.recovery_throttle));
        }

        if !(self.recovery_steering >= 0.0 && self.recovery_steering <= 1.0) {
            return Err(StuckCtrlError::InvalidRecoverySteering(self.recovery_steering));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            stuck_duration_s: default_stuck_duration_s(),
            recovery_duration_s: default_recovery_duration_s(),
            recovery_throttle: default_recovery_throttle(),
            recovery_steering: default_recovery_steering(),
            stop_speed_threshold: default_stop_speed_threshold(),
            moving_speed_threshold: default_moving_speed_threshold(),
            sample_period_s: default_sample_period_s(),
            max_extensions: default_max_extensions(),
            motion_source: MotionSource::default(),
            steer_policy: SteerPolicy::default(),
        }
    }
}

impl Default for MotionSource {
    fn default() -> Self {
        MotionSource::Speed
    }
}

impl Default for SteerPolicy {
    fn default() -> Self {
        SteerPolicy::HeadingError
    }
}

fn default_stuck_duration_s() -> f64 {
    0.5
}

fn default_recovery_duration_s() -> f64 {
    2.2
}

fn default_recovery_throttle() -> f64 {
    -0.5
}

fn default_recovery_steering() -> f64 {
    1.0
}

fn default_stop_speed_threshold() -> f64 {
    0.5
}

fn default_moving_speed_threshold() -> f64 {
    10.0
}

fn default_sample_period_s() -> f64 {
    0.25
}

fn default_max_extensions() -> u32 {
    4
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let params: Params = util::params::parse(
            r#"
            recovery_duration_s = 3.0
            motion_source = "velocity"
            steer_policy = "mirror_input"
            "#,
        )
        .unwrap();

        assert_eq!(params.recovery_duration_s, 3.0);
        assert_eq!(params.stuck_duration_s, 0.5);
        assert_eq!(params.motion_source, MotionSource::Velocity);
        assert_eq!(params.steer_policy, SteerPolicy::MirrorInput);
    }

    #[test]
    fn test_validate() {
        assert!(Params::default().validate().is_ok());

        let params = Params {
            recovery_duration_s: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(StuckCtrlError::InvalidDuration {
                name: "recovery_duration_s",
                ..
            })
        ));

        let params = Params {
            recovery_throttle: -1.5,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(StuckCtrlError::InvalidRecoveryThrottle(_))
        ));
    }
}
