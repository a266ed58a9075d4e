//! Full pipeline scenario: launch off the line, meet an obstacle, get stuck and recover.

use std::sync::Arc;

use comms_if::{
    eqpt::{DriveCommand, DriveMode, Telemetry, LIDAR_NO_RETURN},
    tc::Tc,
};
use ovr_lib::{
    ctrl::{CtrlContext, OverrideCtrl},
    events::{OvrEvent, RecordingSink},
    pipeline::{OvrPipeline, Params},
    replay::Replay,
    stuck_ctrl::StuckPhase,
};
use util::time::SimClock;

const CYCLE_PERIOD_S: f64 = 0.0625;

fn scan(obstacle: Option<(usize, f64)>) -> Vec<f64> {
    let mut ranges = vec![LIDAR_NO_RETURN; 360];
    if let Some((i, r)) = obstacle {
        ranges[i] = r;
    }
    ranges
}

#[test]
fn test_launch_obstacle_stuck_scenario() {
    let clock = Arc::new(SimClock::new(0.0));
    let sink = Arc::new(RecordingSink::new());
    let mut pipeline = OvrPipeline::init(
        Params::default(),
        CtrlContext::new(clock.clone(), sink.clone()),
    )
    .unwrap();

    let cmd = DriveCommand::new(0.0, 0.4, 0.0);
    let mut cycle = 0u32;
    let mut step = |pipeline: &mut OvrPipeline, tlm: &Telemetry| {
        clock.set(cycle as f64 * CYCLE_PERIOD_S);
        cycle += 1;
        pipeline.proc(cmd, tlm)
    };

    // ---- Launch ----

    pipeline.exec_tc(&Tc::ArmLaunch);

    let mut tlm = Telemetry {
        mode: DriveMode::Autopilot,
        speed: Some(12.0),
        heading_deg: Some(0.0),
        lidar: scan(None).into(),
        ..Default::default()
    };

    let mut num_boosted = 0;
    for _ in 0..48 {
        let (out, report) = step(&mut pipeline, &tlm);
        assert!(out.is_within_limits());
        if report.launch.unwrap().active {
            assert_eq!(out.throttle, 1.0);
            num_boosted += 1;
        }
        else {
            assert_eq!(out, cmd);
        }
    }
    assert_eq!(num_boosted, 17);
    assert!(!pipeline.launch().unwrap().is_enabled());

    // ---- Obstacle ahead-right ----

    tlm.lidar = scan(Some((30, 1.0))).into();
    let (out, report) = step(&mut pipeline, &tlm);
    assert_eq!(report.obst.unwrap().alfa, 1.0);
    assert_eq!(out.throttle, 0.1);
    assert_eq!(out.steering, -1.0);

    // ---- Stuck against it ----

    tlm.speed = Some(0.0);
    let mut phases = Vec::new();
    for _ in 0..50 {
        let (out, report) = step(&mut pipeline, &tlm);
        assert!(out.is_within_limits());
        let phase = report.stuck.unwrap().phase;
        if phases.last() != Some(&phase) {
            phases.push(phase);
        }
    }

    assert_eq!(
        phases,
        vec![
            StuckPhase::Confirming,
            StuckPhase::Recovering,
            StuckPhase::Monitoring,
            StuckPhase::Confirming,
        ]
    );

    let events = sink.take();
    assert!(events
        .iter()
        .any(|e| matches!(e, OvrEvent::RecoveryActivated { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, OvrEvent::RecoveryDeactivated { .. })));
    assert!(events
        .iter()
        .all(|e| !matches!(e, OvrEvent::RecoveryExtended { .. })));
}

#[test]
fn test_user_mode_is_untouched() {
    let clock = Arc::new(SimClock::new(0.0));
    let sink = Arc::new(RecordingSink::new());
    let mut pipeline = OvrPipeline::init(
        Params::default(),
        CtrlContext::new(clock.clone(), sink.clone()),
    )
    .unwrap();

    pipeline.arm_launch();

    let tlm = Telemetry {
        mode: DriveMode::User,
        speed: Some(0.0),
        lidar: scan(Some((0, 0.3))).into(),
        ..Default::default()
    };
    let cmd = DriveCommand::new(-0.2, 0.7, 0.0);

    for i in 0..100 {
        clock.set(i as f64 * 0.1);
        let (out, report) = pipeline.proc(cmd, &tlm);
        assert_eq!(out, cmd);
        assert_eq!(report.stuck.unwrap().phase, StuckPhase::Monitoring);
    }

    // Only the arm itself
    assert_eq!(sink.events().len(), 1);
}

#[test]
fn test_replay_through_pipeline() {
    let src = r#"
{"time_s": 0.0, "telemetry": {"mode": "user", "speed": 0.0}, "tcs": ["ARM_LAUNCH"]}
{"time_s": 0.1, "telemetry": {"mode": "local", "speed": 0.0}, "cmd": {"throttle": 0.3}}
{"time_s": 0.2, "telemetry": {"mode": "local", "speed": 1.0}, "cmd": {"throttle": 0.3}}
"#;
    let replay = Replay::parse(src.as_bytes()).unwrap();

    let clock = Arc::new(SimClock::new(0.0));
    let sink = Arc::new(RecordingSink::new());
    let mut pipeline = OvrPipeline::init(
        Params::default(),
        CtrlContext::new(clock.clone(), sink.clone()),
    )
    .unwrap();

    let mut throttles = Vec::new();
    for tick in replay.ticks() {
        clock.set(tick.time_s);
        for tc in tick.tcs.iter() {
            pipeline.exec_tc(tc);
        }
        throttles.push(pipeline.proc(tick.cmd, &tick.telemetry).0.throttle);
    }

    assert_eq!(throttles, vec![0.0, 1.0, 1.0]);
}
