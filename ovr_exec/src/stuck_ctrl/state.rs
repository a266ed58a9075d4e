//! Implementations for the StuckCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use super::{HeadingHistory, MotionSource, Params, SteerPolicy, StuckCtrlError};
use crate::{
    ctrl::{CtrlContext, OverrideCtrl},
    events::OvrEvent,
};
use comms_if::eqpt::{DriveCommand, Telemetry};
use util::maths::ang_diff_deg;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Heading error above which an expiring recovery is extended.
const EXTENSION_HEADING_ERROR_DEG: f64 = 45.0;

/// Time left on the recovery timer after an extension.
const EXTENSION_REMAINING_S: f64 = 0.5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Stuck recovery controller state
#[derive(Debug)]
pub struct StuckCtrl {
    params: Params,

    ctx: CtrlContext,

    phase: StuckPhase,

    /// Time the vehicle was first seen stopped, valid in `Confirming`.
    confirm_start_s: f64,

    /// Time the recovery timer was (re)started, valid in `Recovering`.
    recovery_start_s: f64,

    /// Extensions used by the current recovery.
    num_extensions: u32,

    history: HeadingHistory,

    /// Time of the last saved heading sample.
    last_sample_s: f64,
}

/// Status report for StuckCtrl processing.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Phase at the end of the cycle.
    pub phase: StuckPhase,

    /// Measured motion, `None` if the telemetry had none or the vehicle is not in autopilot.
    pub motion: Option<f64>,

    /// Signed error from the reference heading to the current heading.
    ///
    /// Units: degrees, (-180, 180]
    pub heading_error_deg: Option<f64>,

    /// Number of samples in the heading history.
    pub history_len: usize,

    /// The command was changed by stuck recovery this cycle.
    pub overridden: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Phase of the stuck recovery state machine.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum StuckPhase {
    /// Driving normally.
    Monitoring,

    /// Stopped, waiting to see whether it lasts.
    Confirming,

    /// Running the recovery manoeuvre.
    Recovering,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OverrideCtrl for StuckCtrl {
    type Params = Params;
    type InitError = StuckCtrlError;
    type StatusReport = StatusReport;

    fn init(params: Self::Params, ctx: CtrlContext) -> Result<Self, Self::InitError> {
        params.validate()?;

        let last_sample_s = ctx.now_s();

        Ok(Self {
            params,
            ctx,
            phase: StuckPhase::Monitoring,
            confirm_start_s: 0.0,
            recovery_start_s: 0.0,
            num_extensions: 0,
            history: HeadingHistory::default(),
            last_sample_s,
        })
    }

    fn proc(&mut self, cmd: DriveCommand, tlm: &Telemetry) -> (DriveCommand, StatusReport) {
        let cmd = cmd.clamped();

        let mut report = StatusReport {
            phase: self.phase,
            motion: None,
            heading_error_deg: None,
            history_len: self.history.len(),
            overridden: false,
        };

        if !tlm.mode.is_autopilot() {
            return (cmd, report);
        }

        let motion = match self.motion(tlm) {
            Some(m) => m,
            None => return (cmd, report),
        };
        let now_s = self.ctx.now_s();
        let heading = tlm.heading();

        // Nothing to steer by, leave the command and the phase alone
        if heading.is_none() && self.params.steer_policy == SteerPolicy::HeadingError {
            report.motion = Some(motion);
            return (cmd, report);
        }

        self.sample_heading(now_s, &cmd, motion, heading);

        let heading_error_deg = match (self.history.reference_deg(), heading) {
            (Some(r), Some(h)) => Some(ang_diff_deg(r, h)),
            _ => None,
        };

        let cmd_out = match self.phase {
            StuckPhase::Monitoring => {
                if motion < self.params.stop_speed_threshold {
                    self.phase = StuckPhase::Confirming;
                    self.confirm_start_s = now_s;
                    debug!("StuckCtrl: vehicle stopped, confirming");
                }
                cmd
            }
            StuckPhase::Confirming => {
                if motion >= self.params.stop_speed_threshold {
                    self.phase = StuckPhase::Monitoring;
                    debug!("StuckCtrl: vehicle moving again");
                    cmd
                }
                else if now_s - self.confirm_start_s > self.params.stuck_duration_s {
                    self.phase = StuckPhase::Recovering;
                    self.recovery_start_s = now_s;
                    self.num_extensions = 0;
                    self.ctx
                        .events
                        .emit(OvrEvent::RecoveryActivated { heading_error_deg });
                    self.recovery_cmd(&cmd, heading_error_deg)
                }
                else {
                    cmd
                }
            }
            StuckPhase::Recovering => self.proc_recovering(now_s, &cmd, heading_error_deg),
        };

        report.phase = self.phase;
        report.motion = Some(motion);
        report.heading_error_deg = heading_error_deg;
        report.history_len = self.history.len();
        report.overridden = cmd_out != cmd;

        (cmd_out, report)
    }
}

impl StuckCtrl {
    /// Current phase of the state machine.
    pub fn phase(&self) -> StuckPhase {
        self.phase
    }

    pub fn history(&self) -> &HeadingHistory {
        &self.history
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Motion from the configured source, falling back to the other.
    fn motion(&self, tlm: &Telemetry) -> Option<f64> {
        match self.params.motion_source {
            MotionSource::Speed => tlm.speed_magn().or_else(|| tlm.velocity_magn()),
            MotionSource::Velocity => tlm.velocity_magn().or_else(|| tlm.speed_magn()),
        }
    }

    fn sample_heading(&mut self, now_s: f64, cmd: &DriveCommand, motion: f64, heading: Option<f64>) {
        if now_s - self.last_sample_s < self.params.sample_period_s
            || cmd.throttle <= 0.0
            || motion <= self.params.moving_speed_threshold
        {
            return;
        }

        if let Some(h) = heading {
            self.history.push(h);
            self.last_sample_s = now_s;
        }
    }

    fn proc_recovering(
        &mut self,
        now_s: f64,
        cmd: &DriveCommand,
        heading_error_deg: Option<f64>,
    ) -> DriveCommand {
        let recovery_s = now_s - self.recovery_start_s;

        if recovery_s <= self.params.recovery_duration_s {
            return self.recovery_cmd(cmd, heading_error_deg);
        }

        // Still pointing well away from the reference, keep going a little longer
        match heading_error_deg {
            Some(e)
                if e.abs() > EXTENSION_HEADING_ERROR_DEG
                    && self.num_extensions < self.params.max_extensions =>
            {
                self.num_extensions += 1;
                self.recovery_start_s =
                    now_s - (self.params.recovery_duration_s - EXTENSION_REMAINING_S);
                self.ctx.events.emit(OvrEvent::RecoveryExtended {
                    heading_error_deg: e,
                    num_extensions: self.num_extensions,
                });
                self.recovery_cmd(cmd, heading_error_deg)
            }
            _ => {
                self.phase = StuckPhase::Monitoring;
                self.ctx
                    .events
                    .emit(OvrEvent::RecoveryDeactivated { recovery_s });
                DriveCommand::neutral_stop()
            }
        }
    }

    fn recovery_cmd(&self, cmd: &DriveCommand, heading_error_deg: Option<f64>) -> DriveCommand {
        let mag = self.params.recovery_steering;

        let steering = match self.params.steer_policy {
            SteerPolicy::HeadingError => match heading_error_deg {
                Some(e) if e < 0.0 => -mag,
                _ => mag,
            },
            SteerPolicy::Fixed => mag,
            SteerPolicy::MirrorInput => -cmd.steering,
        };

        DriveCommand::new(steering, self.params.recovery_throttle, 0.0).clamped()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::events::RecordingSink;
    use crate::stuck_ctrl::HISTORY_CAPACITY;
    use comms_if::eqpt::DriveMode;
    use std::sync::Arc;
    use util::time::SimClock;

    /// 16 Hz, exactly representable so sample and debounce times land on cycles.
    const CYCLE_PERIOD_S: f64 = 0.0625;

    struct Harness {
        ctrl: StuckCtrl,
        clock: Arc<SimClock>,
        sink: Arc<RecordingSink>,
        cycle: u32,
    }

    impl Harness {
        fn new(params: Params) -> Self {
            let clock = Arc::new(SimClock::new(0.0));
            let sink = Arc::new(RecordingSink::new());
            let ctrl =
                StuckCtrl::init(params, CtrlContext::new(clock.clone(), sink.clone())).unwrap();

            Self {
                ctrl,
                clock,
                sink,
                cycle: 0,
            }
        }

        fn step(&mut self, cmd: DriveCommand, tlm: &Telemetry) -> (DriveCommand, StatusReport) {
            self.clock.set(self.cycle as f64 * CYCLE_PERIOD_S);
            self.cycle += 1;
            self.ctrl.proc(cmd, tlm)
        }
    }

    fn tlm(speed: f64, heading_deg: Option<f64>) -> Telemetry {
        Telemetry {
            mode: DriveMode::Autopilot,
            speed: Some(speed),
            heading_deg,
            ..Default::default()
        }
    }

    fn cruise() -> DriveCommand {
        DriveCommand::new(0.1, 0.5, 0.0)
    }

    #[test]
    fn test_stuck_and_recover() {
        let mut h = Harness::new(Params::default());
        let stopped = tlm(0.0, Some(0.0));

        // t = 0, stop seen
        let (out, report) = h.step(cruise(), &stopped);
        assert_eq!(out, cruise());
        assert_eq!(report.phase, StuckPhase::Confirming);

        // Up to and including t = 0.5 the debounce has not strictly elapsed
        for _ in 0..8 {
            let (out, _) = h.step(cruise(), &stopped);
            assert_eq!(out, cruise());
            assert_eq!(h.ctrl.phase(), StuckPhase::Confirming);
        }

        // t = 0.5625
        let (out, report) = h.step(cruise(), &stopped);
        assert_eq!(report.phase, StuckPhase::Recovering);
        assert_eq!(out, DriveCommand::new(1.0, -0.5, 0.0));
        assert_eq!(
            h.sink.events()[0],
            OvrEvent::RecoveryActivated {
                heading_error_deg: None
            }
        );

        // Recovery runs until t > 0.5625 + 2.2
        let mut num_recovering = 1;
        loop {
            let (out, report) = h.step(cruise(), &stopped);
            if report.phase != StuckPhase::Recovering {
                assert_eq!(out, DriveCommand::neutral_stop());
                assert_eq!(report.phase, StuckPhase::Monitoring);
                break;
            }
            assert_eq!(out, DriveCommand::new(1.0, -0.5, 0.0));
            num_recovering += 1;
            assert!(num_recovering < 100);
        }

        // 2.2 s at 16 Hz
        assert_eq!(num_recovering, 36);
        assert!(matches!(
            h.sink.events().last(),
            Some(OvrEvent::RecoveryDeactivated { .. })
        ));

        // Still stopped, so straight back to confirming
        h.step(cruise(), &stopped);
        assert_eq!(h.ctrl.phase(), StuckPhase::Confirming);
    }

    #[test]
    fn test_motion_resets_confirming() {
        let mut h = Harness::new(Params::default());

        h.step(cruise(), &tlm(0.1, Some(0.0)));
        h.step(cruise(), &tlm(0.1, Some(0.0)));
        assert_eq!(h.ctrl.phase(), StuckPhase::Confirming);

        let (out, report) = h.step(cruise(), &tlm(1.0, Some(0.0)));
        assert_eq!(out, cruise());
        assert_eq!(report.phase, StuckPhase::Monitoring);

        // The debounce restarts from scratch
        for _ in 0..9 {
            h.step(cruise(), &tlm(0.1, Some(0.0)));
        }
        assert_eq!(h.ctrl.phase(), StuckPhase::Confirming);
        h.step(cruise(), &tlm(0.1, Some(0.0)));
        assert_eq!(h.ctrl.phase(), StuckPhase::Recovering);
    }

    #[test]
    fn test_monitoring_idempotent() {
        let mut h = Harness::new(Params::default());
        let moving = tlm(12.0, Some(30.0));

        for _ in 0..32 {
            let (out, report) = h.step(cruise(), &moving);
            assert_eq!(out, cruise());
            assert_eq!(report.phase, StuckPhase::Monitoring);
        }

        // Samples at 0.25, 0.5, ... 1.75
        assert_eq!(h.ctrl.history().len(), 7);

        // No samples without throttle
        for _ in 0..32 {
            h.step(DriveCommand::new(0.0, 0.0, 0.0), &moving);
        }
        assert_eq!(h.ctrl.history().len(), 7);
        assert!(h.sink.events().is_empty());
    }

    /// Drive forwards on `heading_deg` long enough to fill the history, then get stuck facing
    /// `stuck_heading_deg`.
    fn drive_then_stick(h: &mut Harness, heading_deg: f64, stuck_heading_deg: f64) {
        for _ in 0..96 {
            h.step(cruise(), &tlm(12.0, Some(heading_deg)));
        }
        assert_eq!(h.ctrl.history().len(), HISTORY_CAPACITY);

        let stuck = tlm(0.0, Some(stuck_heading_deg));
        while h.ctrl.phase() != StuckPhase::Recovering {
            h.step(cruise(), &stuck);
        }
    }

    #[test]
    fn test_heading_error_steering() {
        let mut h = Harness::new(Params::default());
        drive_then_stick(&mut h, 350.0, 60.0);

        let (out, report) = h.step(cruise(), &tlm(0.0, Some(60.0)));
        assert!((report.heading_error_deg.unwrap() - 70.0).abs() < 1e-6);
        assert_eq!(out.steering, 1.0);

        let mut h = Harness::new(Params::default());
        drive_then_stick(&mut h, 10.0, 300.0);

        let (out, report) = h.step(cruise(), &tlm(0.0, Some(300.0)));
        assert!((report.heading_error_deg.unwrap() - -70.0).abs() < 1e-6);
        assert_eq!(out.steering, -1.0);
    }

    #[test]
    fn test_bounded_extensions() {
        let mut h = Harness::new(Params {
            max_extensions: 2,
            ..Default::default()
        });
        drive_then_stick(&mut h, 0.0, 90.0);

        let stuck = tlm(0.0, Some(90.0));
        let mut num_recovering = 1;
        while h.step(cruise(), &stuck).1.phase == StuckPhase::Recovering {
            num_recovering += 1;
            assert!(num_recovering < 200);
        }

        let extensions: Vec<u32> = h
            .sink
            .events()
            .iter()
            .filter_map(|e| match e {
                OvrEvent::RecoveryExtended { num_extensions, .. } => Some(*num_extensions),
                _ => None,
            })
            .collect();
        assert_eq!(extensions, vec![1, 2]);

        // 2.2 s plus two half second extensions at 16 Hz, give or take a cycle
        assert!(
            (52..=55).contains(&num_recovering),
            "recovered for {} cycles",
            num_recovering
        );
    }

    #[test]
    fn test_no_extension_when_aligned() {
        let mut h = Harness::new(Params::default());
        drive_then_stick(&mut h, 0.0, 20.0);

        let stuck = tlm(0.0, Some(20.0));
        while h.step(cruise(), &stuck).1.phase == StuckPhase::Recovering {}

        assert!(!h
            .sink
            .events()
            .iter()
            .any(|e| matches!(e, OvrEvent::RecoveryExtended { .. })));
    }

    #[test]
    fn test_steer_policies() {
        let mut h = Harness::new(Params {
            steer_policy: SteerPolicy::MirrorInput,
            ..Default::default()
        });
        while h.ctrl.phase() != StuckPhase::Recovering {
            h.step(DriveCommand::new(0.4, 0.5, 0.0), &tlm(0.0, None));
        }
        let (out, _) = h.step(DriveCommand::new(0.4, 0.5, 0.0), &tlm(0.0, None));
        assert_eq!(out, DriveCommand::new(-0.4, -0.5, 0.0));

        let mut h = Harness::new(Params {
            steer_policy: SteerPolicy::Fixed,
            recovery_steering: 0.6,
            ..Default::default()
        });
        drive_then_stick(&mut h, 0.0, 300.0);
        let (out, _) = h.step(cruise(), &tlm(0.0, Some(300.0)));
        assert_eq!(out.steering, 0.6);
    }

    #[test]
    fn test_passthrough_keeps_state() {
        let mut h = Harness::new(Params::default());
        while h.ctrl.phase() != StuckPhase::Recovering {
            h.step(cruise(), &tlm(0.0, Some(0.0)));
        }

        // Out of autopilot
        let mut user = tlm(0.0, None);
        user.mode = DriveMode::User;
        let (out, report) = h.step(cruise(), &user);
        assert_eq!(out, cruise());
        assert_eq!(report.phase, StuckPhase::Recovering);

        // No motion measurement at all
        let blind = Telemetry {
            mode: DriveMode::Autopilot,
            ..Default::default()
        };
        let (out, report) = h.step(cruise(), &blind);
        assert_eq!(out, cruise());
        assert_eq!(report.phase, StuckPhase::Recovering);
        assert!(report.motion.is_none());
    }

    #[test]
    fn test_velocity_fallback() {
        let mut h = Harness::new(Params::default());

        let tlm = Telemetry {
            mode: DriveMode::Autopilot,
            velocity: Some(nalgebra::Vector3::new(0.0, 0.25, 0.0)),
            heading_deg: Some(0.0),
            ..Default::default()
        };
        let (_, report) = h.step(cruise(), &tlm);
        assert_eq!(report.motion, Some(0.25));
        assert_eq!(report.phase, StuckPhase::Confirming);
    }

    #[test]
    fn test_missing_heading_passthrough() {
        let mut h = Harness::new(Params::default());
        let stopped = tlm(0.0, None);

        // Well past the stuck debounce
        for _ in 0..20 {
            let (out, report) = h.step(cruise(), &stopped);
            assert_eq!(out, cruise());
            assert_eq!(report.phase, StuckPhase::Monitoring);
            assert_eq!(report.motion, Some(0.0));
            assert!(!report.overridden);
        }
        assert!(h.sink.events().is_empty());

        // Losing the heading mid-recovery holds the phase without overriding
        while h.ctrl.phase() != StuckPhase::Recovering {
            h.step(cruise(), &tlm(0.0, Some(0.0)));
        }
        let num_events = h.sink.events().len();
        for _ in 0..64 {
            let (out, report) = h.step(cruise(), &stopped);
            assert_eq!(out, cruise());
            assert_eq!(report.phase, StuckPhase::Recovering);
        }
        assert_eq!(h.sink.events().len(), num_events);
    }

    #[test]
    fn test_no_sampling_outside_autopilot() {
        let mut h = Harness::new(Params::default());
        let mut moving = tlm(12.0, Some(30.0));

        for mode in [DriveMode::User, DriveMode::LocalAngle].iter() {
            moving.mode = *mode;
            for _ in 0..16 {
                h.step(cruise(), &moving);
            }
        }
        assert_eq!(h.ctrl.history().len(), 0);

        // Last sample time is still the start, so the first autopilot cycle at t = 2 samples
        moving.mode = DriveMode::Autopilot;
        for _ in 0..32 {
            h.step(cruise(), &moving);
        }
        assert_eq!(h.ctrl.history().len(), 8);
    }

    #[test]
    fn test_sampling_in_every_phase() {
        // Stopped below 20 but still moving fast enough to sample above 10
        let mut h = Harness::new(Params {
            stop_speed_threshold: 20.0,
            ..Default::default()
        });
        let slow = tlm(12.0, Some(0.0));

        // t = 0 to 0.5, samples at 0.25 and 0.5
        for _ in 0..9 {
            let (_, report) = h.step(cruise(), &slow);
            assert_eq!(report.phase, StuckPhase::Confirming);
        }
        assert_eq!(h.ctrl.history().len(), 2);

        // t = 0.5625 to 1.5, samples at 0.75, 1.0, 1.25 and 1.5
        for _ in 0..16 {
            let (out, report) = h.step(cruise(), &slow);
            assert_eq!(report.phase, StuckPhase::Recovering);
            assert_eq!(out.throttle, -0.5);
        }
        assert_eq!(h.ctrl.history().len(), 6);
    }
}
