//! # Telecommand module
//!
//! Telecommands are the out-of-band instructions the override pipeline accepts alongside the
//! cyclic telemetry, for instance the launch arm button on the operator's UI.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand.
///
/// Serialised as the upper case name of the command, e.g. `"ARM_LAUNCH"`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Tc {
    /// Arm launch assist, the boost will be applied the next time the vehicle is in autopilot.
    #[serde(rename = "ARM_LAUNCH")]
    ArmLaunch,
}
