//! Flat per-cycle record of the pipeline for archiving

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::PipelineReport;
use crate::stuck_ctrl::StuckPhase;
use comms_if::eqpt::DriveMode;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One row of the pipeline archive.
///
/// Stage fields are empty if the stage is disabled (or, for the obstacle fields, there was no
/// return).
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRecord {
    pub time_s: f64,
    pub mode: &'static str,

    pub cmd_in_steering: f64,
    pub cmd_in_throttle: f64,
    pub cmd_in_brake: f64,

    pub launch_active: Option<bool>,
    pub launch_overridden: Option<bool>,

    pub obst_bearing_deg: Option<f64>,
    pub obst_range_m: Option<f64>,
    pub obst_alfa: Option<f64>,
    pub obst_overridden: Option<bool>,

    pub stuck_phase: Option<StuckPhase>,
    pub stuck_heading_error_deg: Option<f64>,
    pub stuck_overridden: Option<bool>,

    pub cmd_out_steering: f64,
    pub cmd_out_throttle: f64,
    pub cmd_out_brake: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PipelineRecord {
    pub fn new(time_s: f64, mode: DriveMode, report: &PipelineReport) -> Self {
        let nearest = report.obst.and_then(|o| o.nearest);

        Self {
            time_s,
            mode: mode.as_str(),
            cmd_in_steering: report.cmd_in.steering,
            cmd_in_throttle: report.cmd_in.throttle,
            cmd_in_brake: report.cmd_in.brake,
            launch_active: report.launch.map(|l| l.active),
            launch_overridden: report.launch.map(|l| l.overridden),
            obst_bearing_deg: nearest.map(|n| n.bearing_deg),
            obst_range_m: nearest.map(|n| n.range_m),
            obst_alfa: report.obst.map(|o| o.alfa),
            obst_overridden: report.obst.map(|o| o.overridden),
            stuck_phase: report.stuck.map(|s| s.phase),
            stuck_heading_error_deg: report.stuck.and_then(|s| s.heading_error_deg),
            stuck_overridden: report.stuck.map(|s| s.overridden),
            cmd_out_steering: report.cmd_out.steering,
            cmd_out_throttle: report.cmd_out.throttle,
            cmd_out_brake: report.cmd_out.brake,
        }
    }
}
