//! Implementations for the ObstCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{BrakePolicy, ObstCtrlError, Params, Strategy};
use crate::{
    ctrl::{CtrlContext, OverrideCtrl},
    events::OvrEvent,
};
use comms_if::eqpt::{DriveCommand, LidarReturn, Telemetry};
use util::maths::{clamp, lin_map};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Obstacle avoidance controller
#[derive(Debug)]
pub struct ObstCtrl {
    params: Params,

    ctx: CtrlContext,
}

/// Status report for ObstCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// The nearest valid lidar return, if there was one and the vehicle is in autopilot.
    pub nearest: Option<LidarReturn>,

    /// Vehicle speed with noise below the floor removed.
    pub speed: f64,

    /// Proximity factor of the nearest return, 0 (out of range) to 1 (at or inside the close
    /// distance).
    pub alfa: f64,

    /// The command was changed by obstacle avoidance this cycle.
    pub overridden: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OverrideCtrl for ObstCtrl {
    type Params = Params;
    type InitError = ObstCtrlError;
    type StatusReport = StatusReport;

    fn init(params: Self::Params, ctx: CtrlContext) -> Result<Self, Self::InitError> {
        params.validate()?;

        Ok(Self { params, ctx })
    }

    fn proc(&mut self, cmd: DriveCommand, tlm: &Telemetry) -> (DriveCommand, StatusReport) {
        let cmd = cmd.clamped();
        let mut report = StatusReport::default();

        if !tlm.mode.is_autopilot() {
            return (cmd, report);
        }

        report.speed = self.speed(tlm);

        let nearest = match tlm.lidar.nearest() {
            Some(n) => n,
            None => return (cmd, report),
        };
        report.nearest = Some(nearest);
        report.alfa = proximity_factor(
            nearest.range_m,
            self.params.close_distance_m,
            self.params.far_distance_m,
        );

        let cmd_out = match self.params.strategy {
            Strategy::Proportional => self.proportional(cmd, &nearest, &report),
            Strategy::EmergencyBrake {
                trigger_throttle,
                trigger_speed,
            } => {
                if nearest.range_m < self.params.far_distance_m
                    && cmd.throttle >= trigger_throttle
                    && report.speed >= trigger_speed
                {
                    self.ctx.events.emit(OvrEvent::EmergencyBrake {
                        bearing_deg: nearest.bearing_deg,
                        range_m: nearest.range_m,
                        speed: report.speed,
                    });
                    DriveCommand::new(cmd.steering, -1.0, 1.0)
                }
                else {
                    cmd
                }
            }
        };

        report.overridden = cmd_out != cmd;

        (cmd_out, report)
    }
}

impl ObstCtrl {
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Speed from whichever source the telemetry has, scalar speed preferred.
    fn speed(&self, tlm: &Telemetry) -> f64 {
        match tlm.speed_magn().or_else(|| tlm.velocity_magn()) {
            Some(s) if s >= self.params.speed_noise_floor => s,
            _ => 0.0,
        }
    }

    fn proportional(
        &self,
        cmd: DriveCommand,
        nearest: &LidarReturn,
        report: &StatusReport,
    ) -> DriveCommand {
        if nearest.range_m >= self.params.far_distance_m {
            return cmd;
        }

        let alfa = report.alfa;

        // Obstacle on the right half of the scan, steer left, and the reverse
        let sign = if nearest.bearing_deg <= 180.0 { -1.0 } else { 1.0 };

        let brake = match self.params.brake_policy {
            BrakePolicy::Release => 0.0,
            BrakePolicy::Full => 1.0,
            BrakePolicy::Proportional => alfa,
        };

        let cmd_out = DriveCommand::new(
            cmd.steering + sign * alfa * self.params.steer_gain,
            clamp(
                &(cmd.throttle * (1.0 - alfa)),
                &self.params.min_throttle_floor,
                &self.params.max_throttle,
            ),
            brake,
        )
        .clamped();

        self.ctx.events.emit(OvrEvent::ObstacleDetected {
            bearing_deg: nearest.bearing_deg,
            range_m: nearest.range_m,
            speed: report.speed,
            alfa,
            cmd_in: cmd,
            cmd_out,
        });

        cmd_out
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Proximity factor of an obstacle at `range_m`.
///
/// 1 inside `close_m`, falling linearly to 0 at `far_m`, and 0 beyond it.
pub fn proximity_factor(range_m: f64, close_m: f64, far_m: f64) -> f64 {
    if range_m < close_m {
        1.0
    }
    else if range_m < far_m {
        lin_map((far_m, close_m), (0.0, 1.0), range_m)
    }
    else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
