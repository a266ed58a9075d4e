//! Implementations for the override pipeline

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use serde::Serialize;

// Internal
use super::{Params, PipelineError};
use crate::{
    ctrl::{CtrlContext, OverrideCtrl},
    launch_ctrl::{self, LaunchCtrl},
    obst_ctrl::{self, ObstCtrl},
    stuck_ctrl::{self, StuckCtrl},
};
use comms_if::{
    eqpt::{DriveCommand, Telemetry},
    tc::Tc,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The chain of override controllers.
#[derive(Debug)]
pub struct OvrPipeline {
    launch: Option<LaunchCtrl>,
    obst: Option<ObstCtrl>,
    stuck: Option<StuckCtrl>,
}

/// Report on one pass through the pipeline.
///
/// A stage's report is `None` if the stage is disabled.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub struct PipelineReport {
    /// Command given to the pipeline.
    pub cmd_in: DriveCommand,

    pub launch: Option<launch_ctrl::StatusReport>,

    pub obst: Option<obst_ctrl::StatusReport>,

    pub stuck: Option<stuck_ctrl::StatusReport>,

    /// Command leaving the pipeline.
    pub cmd_out: DriveCommand,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OverrideCtrl for OvrPipeline {
    type Params = Params;
    type InitError = PipelineError;
    type StatusReport = PipelineReport;

    /// Build every stage with a parameter table, all sharing the same context.
    fn init(params: Self::Params, ctx: CtrlContext) -> Result<Self, Self::InitError> {
        let launch = match params.launch {
            Some(p) => Some(LaunchCtrl::init(p, ctx.clone())?),
            None => None,
        };
        let obst = match params.obst {
            Some(p) => Some(ObstCtrl::init(p, ctx.clone())?),
            None => None,
        };
        let stuck = match params.stuck {
            Some(p) => Some(StuckCtrl::init(p, ctx)?),
            None => None,
        };

        debug!(
            "OvrPipeline stages: launch {}, obst {}, stuck {}",
            launch.is_some(),
            obst.is_some(),
            stuck.is_some()
        );

        Ok(Self {
            launch,
            obst,
            stuck,
        })
    }

    /// Run one cycle of every enabled stage in order.
    fn proc(&mut self, cmd: DriveCommand, tlm: &Telemetry) -> (DriveCommand, PipelineReport) {
        let cmd_in = cmd;
        let mut cmd = cmd.clamped();

        let launch = self.launch.as_mut().map(|c| {
            let (out, report) = c.proc(cmd, tlm);
            cmd = out;
            report
        });

        let obst = self.obst.as_mut().map(|c| {
            let (out, report) = c.proc(cmd, tlm);
            cmd = out;
            report
        });

        let stuck = self.stuck.as_mut().map(|c| {
            let (out, report) = c.proc(cmd, tlm);
            cmd = out;
            report
        });

        (
            cmd,
            PipelineReport {
                cmd_in,
                launch,
                obst,
                stuck,
                cmd_out: cmd,
            },
        )
    }
}

impl OvrPipeline {
    /// Arm launch assist.
    ///
    /// Returns `false` if launch assist is disabled.
    pub fn arm_launch(&mut self) -> bool {
        match self.launch.as_mut() {
            Some(l) => {
                l.arm();
                true
            }
            None => false,
        }
    }

    /// Execute a telecommand.
    pub fn exec_tc(&mut self, tc: &Tc) {
        match tc {
            Tc::ArmLaunch => {
                debug!("Recieved ArmLaunch command");
                if !self.arm_launch() {
                    warn!("ArmLaunch ignored, launch assist is disabled");
                }
            }
        }
    }

    pub fn launch(&self) -> Option<&LaunchCtrl> {
        self.launch.as_ref()
    }

    pub fn obst(&self) -> Option<&ObstCtrl> {
        self.obst.as_ref()
    }

    pub fn stuck(&self) -> Option<&StuckCtrl> {
        self.stuck.as_ref()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
