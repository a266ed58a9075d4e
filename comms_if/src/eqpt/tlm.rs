//! # Vehicle telemetry
//!
//! Telemetry is supplied by the vehicle (or simulator) once per cycle and is read-only to the
//! override controllers.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Value reported by the lidar for a ray with no return.
pub const LIDAR_NO_RETURN: f64 = -1.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry sampled from the vehicle for one control cycle.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Current driving mode.
    pub mode: DriveMode,

    /// Scalar speed of the vehicle, if the source provides one.
    ///
    /// Units: source units (meters/second for the physical vehicle)
    #[serde(default)]
    pub speed: Option<f64>,

    /// Velocity vector of the vehicle, if the source provides one.
    ///
    /// Units: source units per axis
    #[serde(default)]
    pub velocity: Option<Vector3<f64>>,

    /// Yaw of the vehicle.
    ///
    /// Units: degrees
    #[serde(default)]
    pub heading_deg: Option<f64>,

    /// Position of the vehicle, if known.
    ///
    /// Units: meters
    #[serde(default)]
    pub position_m: Option<Vector3<f64>>,

    /// Latest lidar scan.
    #[serde(default)]
    pub lidar: LidarScan,
}

/// A full rotation of lidar ranges.
///
/// Element `i` of an `n` element scan points along bearing `i * 360 / n` degrees.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LidarScan(pub Vec<f64>);

/// A single lidar return.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LidarReturn {
    /// Index of the ray within the scan.
    pub index: usize,

    /// Bearing of the ray.
    ///
    /// Units: degrees, [0, 360)
    pub bearing_deg: f64,

    /// Measured range.
    ///
    /// Units: meters
    pub range_m: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The mode the vehicle is being driven in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DriveMode {
    /// Steering and throttle from the user.
    #[serde(rename = "user")]
    User,

    /// Steering from the autopilot, throttle from the user.
    #[serde(rename = "local_angle")]
    LocalAngle,

    /// Steering and throttle from the autopilot. Overrides are only allowed in this mode.
    #[serde(rename = "local", alias = "autopilot")]
    Autopilot,
}

#[derive(Debug, Error)]
#[error("Unknown drive mode \"{0}\", expected one of user, local_angle or local")]
pub struct DriveModeParseError(String);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Telemetry {
    /// Magnitude of the scalar speed.
    pub fn speed_magn(&self) -> Option<f64> {
        self.speed.filter(|s| s.is_finite()).map(f64::abs)
    }

    /// Magnitude of the velocity vector.
    pub fn velocity_magn(&self) -> Option<f64> {
        self.velocity.map(|v| v.norm()).filter(|s| s.is_finite())
    }

    /// Heading, if the source provided a finite one.
    pub fn heading(&self) -> Option<f64> {
        self.heading_deg.filter(|h| h.is_finite())
    }
}

impl LidarScan {
    /// True if the range is an actual return rather than the sentinel (or garbage).
    pub fn is_valid_range(range_m: f64) -> bool {
        range_m.is_finite() && range_m > 0.0
    }

    /// Bearing of the ray at the given index.
    pub fn bearing_deg(&self, index: usize) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }

        index as f64 * (360.0 / self.0.len() as f64)
    }

    /// Number of rays in the scan.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the scan has no rays.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the valid returns in the scan.
    pub fn returns(&self) -> impl Iterator<Item = LidarReturn> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, r)| Self::is_valid_range(**r))
            .map(move |(index, range_m)| LidarReturn {
                index,
                bearing_deg: self.bearing_deg(index),
                range_m: *range_m,
            })
    }

    /// The closest valid return, or `None` if the scan holds no valid return.
    ///
    /// Ties go to the lowest index.
    pub fn nearest(&self) -> Option<LidarReturn> {
        self.returns().fold(None, |nearest, r| match nearest {
            Some(n) if n.range_m <= r.range_m => Some(n),
            _ => Some(r),
        })
    }
}

impl From<Vec<f64>> for LidarScan {
    fn from(ranges: Vec<f64>) -> Self {
        Self(ranges)
    }
}

impl DriveMode {
    /// True if the autopilot is driving, the only mode the controllers act in.
    pub fn is_autopilot(&self) -> bool {
        *self == DriveMode::Autopilot
    }

    /// Name of the mode as it appears in telemetry.
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveMode::User => "user",
            DriveMode::LocalAngle => "local_angle",
            DriveMode::Autopilot => "local",
        }
    }
}

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::User
    }
}

impl std::fmt::Display for DriveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriveMode {
    type Err = DriveModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(DriveMode::User),
            "local_angle" => Ok(DriveMode::LocalAngle),
            "local" | "autopilot" => Ok(DriveMode::Autopilot),
            _ => Err(DriveModeParseError(s.to_string())),
        }
    }
}
