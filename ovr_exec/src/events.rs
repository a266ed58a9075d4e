//! # Override events
//!
//! Controllers report their state transitions as [`OvrEvent`]s through an [`EventSink`] given to
//! them at construction. The exec forwards them to the log with [`LogSink`], tests collect them
//! with [`RecordingSink`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::DriveCommand;
use log::{log, Level};
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Consumer of override events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: OvrEvent);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

/// Keeps every event it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<OvrEvent>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A state transition in one of the override controllers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum OvrEvent {
    /// Launch assist has been armed.
    LaunchArmed { source: ArmSource },

    /// The launch boost has started.
    LaunchActivated { time_s: f64 },

    /// The launch boost has ended.
    LaunchDeactivated { cause: LaunchEndCause, boost_s: f64 },

    /// An obstacle is inside the avoidance range and the command has been modified.
    ObstacleDetected {
        bearing_deg: f64,
        range_m: f64,
        speed: f64,
        alfa: f64,
        cmd_in: DriveCommand,
        cmd_out: DriveCommand,
    },

    /// An obstacle triggered the emergency brake.
    EmergencyBrake {
        bearing_deg: f64,
        range_m: f64,
        speed: f64,
    },

    /// The vehicle has been confirmed stuck and the recovery manoeuvre has started.
    RecoveryActivated { heading_error_deg: Option<f64> },

    /// The recovery timer expired with the heading still off, so it has been extended.
    RecoveryExtended {
        heading_error_deg: f64,
        num_extensions: u32,
    },

    /// The recovery manoeuvre has finished.
    RecoveryDeactivated { recovery_s: f64 },
}

/// What armed the launch assist.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum ArmSource {
    /// An explicit arm request (the UI button).
    Request,

    /// The vehicle switched into autopilot with arm-on-switch configured.
    ModeSwitch,
}

/// Why the launch boost ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum LaunchEndCause {
    /// The boost ran for its full duration, launch assist is disarmed.
    Duration,

    /// The vehicle left autopilot, launch assist stays armed.
    ModeExit,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OvrEvent {
    /// Level at which the event should be logged.
    ///
    /// Obstacle detections fire on every cycle an obstacle is in range so they go to debug.
    pub fn level(&self) -> Level {
        match self {
            OvrEvent::ObstacleDetected { .. } => Level::Debug,
            OvrEvent::EmergencyBrake { .. } => Level::Warn,
            _ => Level::Info,
        }
    }
}

impl fmt::Display for OvrEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OvrEvent::LaunchArmed { source } => {
                write!(f, "Launch assist armed ({:?})", source)
            }
            OvrEvent::LaunchActivated { time_s } => {
                write!(f, "Launch assist active at {:.3} s", time_s)
            }
            OvrEvent::LaunchDeactivated { cause, boost_s } => write!(
                f,
                "Launch assist deactivated by {:?} after {:.3} s",
                cause, boost_s
            ),
            OvrEvent::ObstacleDetected {
                bearing_deg,
                range_m,
                speed,
                alfa,
                cmd_in,
                cmd_out,
            } => write!(
                f,
                "Obstacle detected: dir={:.2} dist={:.2} sp={:.2} alfa={:.2} in=[{}] out=[{}]",
                bearing_deg, range_m, speed, alfa, cmd_in, cmd_out
            ),
            OvrEvent::EmergencyBrake {
                bearing_deg,
                range_m,
                speed,
            } => write!(
                f,
                "Emergency brake: dir={:.2} dist={:.2} sp={:.2}",
                bearing_deg, range_m, speed
            ),
            OvrEvent::RecoveryActivated { heading_error_deg } => match heading_error_deg {
                Some(e) => write!(f, "Stuck recovery activated, heading error {:.1} deg", e),
                None => write!(f, "Stuck recovery activated, heading error unknown"),
            },
            OvrEvent::RecoveryExtended {
                heading_error_deg,
                num_extensions,
            } => write!(
                f,
                "Stuck recovery extended (#{}), heading error {:.1} deg",
                num_extensions, heading_error_deg
            ),
            OvrEvent::RecoveryDeactivated { recovery_s } => write!(
                f,
                "Stuck recovery deactivated by timer after {:.3} s",
                recovery_s
            ),
        }
    }
}

impl EventSink for LogSink {
    fn emit(&self, event: OvrEvent) {
        log!(event.level(), "{}", event);
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events recorded so far.
    pub fn events(&self) -> Vec<OvrEvent> {
        match self.events.lock() {
            Ok(e) => e.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Remove and return all events recorded so far.
    pub fn take(&self) -> Vec<OvrEvent> {
        match self.events.lock() {
            Ok(mut e) => std::mem::take(&mut *e),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: OvrEvent) {
        match self.events.lock() {
            Ok(mut e) => e.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.emit(OvrEvent::LaunchArmed {
            source: ArmSource::Request,
        });
        sink.emit(OvrEvent::RecoveryDeactivated { recovery_s: 2.2 });

        assert_eq!(sink.events().len(), 2);
        assert_eq!(
            sink.take()[0],
            OvrEvent::LaunchArmed {
                source: ArmSource::Request
            }
        );
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_event_serialisation() {
        let json = serde_json::to_string(&OvrEvent::RecoveryExtended {
            heading_error_deg: 60.0,
            num_extensions: 1,
        })
        .unwrap();

        assert_eq!(
            json,
            r#"{"event":"RecoveryExtended","heading_error_deg":60.0,"num_extensions":1}"#
        );
    }
}
