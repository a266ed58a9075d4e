//! # Communications interface crate.
//!
//! Provides the data exchanged between the vehicle, the autopilot and the override pipeline.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommands accepted by the override pipeline
pub mod tc;

/// Drive demands and vehicle telemetry
pub mod eqpt;
