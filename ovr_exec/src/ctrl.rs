//! Override controller interface
//!
//! Each controller in the pipeline (`launch_ctrl`, `obst_ctrl`, `stuck_ctrl`) shall implement
//! the items in this module.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::Arc;

// Internal
use crate::events::{EventSink, LogSink};
use comms_if::eqpt::{DriveCommand, Telemetry};
use util::time::{Clock, MonotonicClock};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// An override controller.
pub trait OverrideCtrl: Sized {
    /// Parameters required to build the controller.
    type Params;
    /// An error which can occur during initialisation.
    type InitError;
    /// A report on the status of the cyclic processing.
    type StatusReport;

    /// Initialise the controller.
    ///
    /// # Outputs
    /// - On success the controller.
    /// - If the parameters are not valid an `InitError` instance.
    fn init(params: Self::Params, ctx: CtrlContext) -> Result<Self, Self::InitError>;

    /// Main cyclic processing function.
    ///
    /// Takes the command from the stage upstream of this controller and returns the command to
    /// pass downstream, which is always within the drive command limits. Cyclic processing never
    /// fails, bad telemetry results in the command passing through unchanged.
    fn proc(&mut self, cmd: DriveCommand, tlm: &Telemetry) -> (DriveCommand, Self::StatusReport);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Services shared by all controllers.
#[derive(Clone)]
pub struct CtrlContext {
    /// Time source used for all duration based transitions.
    pub clock: Arc<dyn Clock>,

    /// Destination of the controllers' state transition events.
    pub events: Arc<dyn EventSink>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CtrlContext {
    pub fn new(clock: Arc<dyn Clock>, events: Arc<dyn EventSink>) -> Self {
        Self { clock, events }
    }

    /// Context for running on the vehicle: wall clock time, events go to the log.
    pub fn vehicle() -> Self {
        Self {
            clock: Arc::new(MonotonicClock::new()),
            events: Arc::new(LogSink),
        }
    }

    pub(crate) fn now_s(&self) -> f64 {
        self.clock.now_s()
    }
}

impl std::fmt::Debug for CtrlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtrlContext")
            .field("now_s", &self.clock.now_s())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::events::RecordingSink;
    use util::time::SimClock;

    #[test]
    fn test_shared_clock() {
        let clock = Arc::new(SimClock::new(2.0));
        let ctx = CtrlContext::new(clock.clone(), Arc::new(RecordingSink::new()));
        let other = ctx.clone();

        clock.advance(0.5);
        assert_eq!(ctx.now_s(), 2.5);
        assert_eq!(other.now_s(), 2.5);
    }

    #[test]
    fn test_vehicle_context() {
        let ctx = CtrlContext::vehicle();
        let t0 = ctx.now_s();
        assert!(t0 >= 0.0);
        assert!(ctx.now_s() >= t0);
    }
}
