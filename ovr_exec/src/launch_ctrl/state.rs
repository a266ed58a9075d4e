//! Implementations for the LaunchCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{LaunchCtrlError, Params};
use crate::{
    ctrl::{CtrlContext, OverrideCtrl},
    events::{ArmSource, LaunchEndCause, OvrEvent},
};
use comms_if::eqpt::{DriveCommand, DriveMode, Telemetry};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Launch assist controller state
#[derive(Debug)]
pub struct LaunchCtrl {
    params: Params,

    ctx: CtrlContext,

    /// Whether launch assist is armed.
    enabled: bool,

    /// Time at which the current boost started, `None` if no boost is in progress.
    boost_start_s: Option<f64>,

    /// The mode seen on the previous cycle, used to detect mode switches.
    prev_mode: Option<DriveMode>,
}

/// Status report for LaunchCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Launch assist is armed.
    pub enabled: bool,

    /// A boost is in progress.
    pub active: bool,

    /// Time the current boost has been running for.
    pub boost_elapsed_s: Option<f64>,

    /// The command was changed by launch assist this cycle.
    pub overridden: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OverrideCtrl for LaunchCtrl {
    type Params = Params;
    type InitError = LaunchCtrlError;
    type StatusReport = StatusReport;

    fn init(params: Self::Params, ctx: CtrlContext) -> Result<Self, Self::InitError> {
        params.validate()?;

        Ok(Self {
            params,
            ctx,
            enabled: false,
            boost_start_s: None,
            prev_mode: None,
        })
    }

    fn proc(&mut self, cmd: DriveCommand, tlm: &Telemetry) -> (DriveCommand, StatusReport) {
        let mut cmd = cmd.clamped();
        let mode = tlm.mode;
        let now_s = self.ctx.now_s();

        // Arm on the switch into autopilot if configured to
        if self.prev_mode != Some(mode) {
            self.prev_mode = Some(mode);

            if mode.is_autopilot() && self.params.arm_on_mode_switch {
                self.set_enabled(ArmSource::ModeSwitch);
            }
        }

        if mode.is_autopilot() && self.enabled {
            match self.boost_start_s {
                None => {
                    self.boost_start_s = Some(now_s);
                    self.ctx
                        .events
                        .emit(OvrEvent::LaunchActivated { time_s: now_s });
                }
                Some(start_s) => {
                    let boost_s = now_s - start_s;
                    if boost_s > self.params.boost_duration_s {
                        self.boost_start_s = None;
                        self.enabled = false;
                        self.ctx.events.emit(OvrEvent::LaunchDeactivated {
                            cause: LaunchEndCause::Duration,
                            boost_s,
                        });
                    }
                }
            }
        }
        else if let Some(start_s) = self.boost_start_s.take() {
            // Suspend, but stay armed
            self.ctx.events.emit(OvrEvent::LaunchDeactivated {
                cause: LaunchEndCause::ModeExit,
                boost_s: now_s - start_s,
            });
        }

        let mut report = StatusReport {
            enabled: self.enabled,
            active: self.boost_start_s.is_some(),
            boost_elapsed_s: self.boost_start_s.map(|s| now_s - s),
            overridden: false,
        };

        if report.active {
            let cmd_in = cmd;

            cmd.throttle = self.params.boost_throttle;
            if self.params.lock_steering_during_boost {
                cmd.steering = 0.0;
            }
            cmd = cmd.clamped();

            report.overridden = cmd != cmd_in;

            trace!("LaunchCtrl boosting: in [{}], out [{}]", cmd_in, cmd);
        }

        (cmd, report)
    }
}

impl LaunchCtrl {
    /// Arm launch assist.
    ///
    /// The boost starts on the next cycle in autopilot. Arming an already armed controller has no
    /// effect.
    pub fn arm(&mut self) {
        self.set_enabled(ArmSource::Request);
    }

    /// Launch assist is armed.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A boost is in progress.
    pub fn is_active(&self) -> bool {
        self.boost_start_s.is_some()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    fn set_enabled(&mut self, source: ArmSource) {
        if !self.enabled {
            self.enabled = true;
            self.ctx.events.emit(OvrEvent::LaunchArmed { source });
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
