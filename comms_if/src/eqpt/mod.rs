//! # Equipment Interface
//!
//! This module defines the structures exchanged with the vehicle: the drive demands going to the
//! actuators and the telemetry coming back from the sensors.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod drive;
pub mod tlm;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use drive::DriveCommand;
pub use tlm::{DriveMode, LidarReturn, LidarScan, Telemetry, LIDAR_NO_RETURN};
