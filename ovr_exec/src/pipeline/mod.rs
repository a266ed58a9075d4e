//! # Override pipeline module
//!
//! The pipeline chains the override controllers in their fixed order:
//!
//! ```text
//! autopilot cmd -> launch_ctrl -> obst_ctrl -> stuck_ctrl -> actuators
//! ```
//!
//! Each stage sees the command produced by the stage before it and the same telemetry. A stage
//! whose parameter table is missing is not built and the command passes straight over it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod record;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use record::*;
pub use state::*;

use crate::{launch_ctrl::LaunchCtrlError, obst_ctrl::ObstCtrlError, stuck_ctrl::StuckCtrlError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while building the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid launch assist parameters: {0}")]
    Launch(#[from] LaunchCtrlError),

    #[error("Invalid obstacle avoidance parameters: {0}")]
    Obst(#[from] ObstCtrlError),

    #[error("Invalid stuck recovery parameters: {0}")]
    Stuck(#[from] StuckCtrlError),
}
