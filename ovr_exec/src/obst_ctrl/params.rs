//! Parameters structure for ObstCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use super::ObstCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for obstacle avoidance.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Params {
    /// Obstacles nearer than this are avoided.
    ///
    /// Units: meters
    #[serde(default = "default_far_distance_m")]
    pub far_distance_m: f64,

    /// Obstacles nearer than this get the full avoidance response.
    ///
    /// Units: meters
    #[serde(default = "default_close_distance_m")]
    pub close_distance_m: f64,

    /// Lowest throttle allowed while avoiding.
    ///
    /// Units: normalised, [-1, 1]
    #[serde(default = "default_min_throttle_floor")]
    pub min_throttle_floor: f64,

    /// Highest throttle allowed while avoiding.
    ///
    /// Units: normalised, [-1, 1]
    #[serde(default = "default_max_throttle")]
    pub max_throttle: f64,

    /// Steering added at full avoidance.
    #[serde(default = "default_steer_gain")]
    pub steer_gain: f64,

    /// Speeds below this are reported as zero.
    #[serde(default = "default_speed_noise_floor")]
    pub speed_noise_floor: f64,

    /// How the brake is set while avoiding.
    #[serde(default)]
    pub brake_policy: BrakePolicy,

    /// Which avoidance response to use.
    #[serde(default)]
    pub strategy: Strategy,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Brake demand while avoiding an obstacle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrakePolicy {
    /// Brake released, the reduced throttle lets the vehicle coast.
    Release,

    /// Brake fully applied.
    Full,

    /// Brake applied in proportion to the obstacle's proximity.
    Proportional,
}

/// Avoidance response.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    /// Steer away and slow down in proportion to proximity.
    Proportional,

    /// Full reverse throttle and brake when closing on an obstacle quickly.
    EmergencyBrake {
        /// Minimum input throttle for the brake to trigger.
        trigger_throttle: f64,

        /// Minimum speed for the brake to trigger.
        trigger_speed: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the parameters are usable.
    pub fn validate(&self) -> Result<(), ObstCtrlError> {
        let distances_ok = self.close_distance_m.is_finite()
            && self.far_distance_m.is_finite()
            && self.close_distance_m > 0.0
            && self.close_distance_m < self.far_distance_m;
        if !distances_ok {
            return Err(ObstCtrlError::InvalidDistances {
                close: self.close_distance_m,
                far: self.far_distance_m,
            });
        }

        let throttle_ok = self.min_throttle_floor >= -1.0
            && self.max_throttle <= 1.0
            && self.min_throttle_floor <= self.max_throttle;
        if !throttle_ok {
            return Err(ObstCtrlError::InvalidThrottleLimits {
                floor: self.min_throttle_floor,
                max: self.max_throttle,
            });
        }

        if !(self.steer_gain.is_finite() && self.steer_gain >= 0.0) {
            return Err(ObstCtrlError::InvalidSteerGain(self.steer_gain));
        }

        if !(self.speed_noise_floor.is_finite() && self.speed_noise_floor >= 0.0) {
            return Err(ObstCtrlError::InvalidSpeedNoiseFloor(self.speed_noise_floor));
        }

        if let Strategy::EmergencyBrake { trigger_throttle, .. } = self.strategy {
            if !(trigger_throttle >= -1.0 && trigger_throttle <= 1.0) {
                return Err(ObstCtrlError::InvalidTriggerThrottle(trigger_throttle));
            }
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            far_distance_m: default_far_distance_m(),
            close_distance_m: default_close_distance_m(),
            min_throttle_floor: default_min_throttle_floor(),
            max_throttle: default_max_throttle(),
            steer_gain: default_steer_gain(),
            speed_noise_floor: default_speed_noise_floor(),
            brake_policy: BrakePolicy::default(),
            strategy: Strategy::default(),
        }
    }
}

impl Default for BrakePolicy {
    fn default() -> Self {
        BrakePolicy::Release
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Proportional
    }
}

fn default_far_distance_m() -> f64 {
    4.5
}

fn default_close_distance_m() -> f64 {
    1.5
}

fn default_min_throttle_floor() -> f64 {
    0.1
}

fn default_max_throttle() -> f64 {
    1.0
}

fn default_steer_gain() -> f64 {
    1.0
}

fn default_speed_noise_floor() -> f64 {
    0.1
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_strategy() {
        let params: Params = util::params::parse(
            r#"
            far_distance_m = 5.0
            brake_policy = "proportional"

            [strategy]
            type = "emergency_brake"
            trigger_throttle = 0.5
            trigger_speed = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(params.far_distance_m, 5.0);
        assert_eq!(params.close_distance_m, 1.5);
        assert_eq!(params.brake_policy, BrakePolicy::Proportional);
        assert_eq!(
            params.strategy,
            Strategy::EmergencyBrake {
                trigger_throttle: 0.5,
                trigger_speed: 2.0
            }
        );
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(util::params::parse::<Params>("far_distnce_m = 5.0").is_err());
    }

    #[test]
    fn test_validate() {
        let params = Params {
            close_distance_m: 5.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ObstCtrlError::InvalidDistances { .. })
        ));

        let params = Params {
            min_throttle_floor: 0.5,
            max_throttle: 0.2,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ObstCtrlError::InvalidThrottleLimits { .. })
        ));

        assert!(Params::default().validate().is_ok());
    }
}
