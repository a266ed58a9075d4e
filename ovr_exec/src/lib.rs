//! # Override library.
//!
//! This library holds the safety override controllers which sit between the autopilot and the
//! vehicle's actuators, and the pipeline composing them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Override controller interface - the trait every controller implements and the services they share
pub mod ctrl;

/// Override events - state transition reports from the controllers
pub mod events;

/// Launch assist - fixed throttle boost on entering autopilot
pub mod launch_ctrl;

/// Obstacle avoidance - steers away from and slows for the nearest lidar return
pub mod obst_ctrl;

/// Stuck recovery - reverses and turns out when the vehicle stops moving in autopilot
pub mod stuck_ctrl;

/// Override pipeline - runs the controllers in order
pub mod pipeline;

/// Telemetry replay - recorded runs for driving the pipeline off-vehicle
pub mod replay;
