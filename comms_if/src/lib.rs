//! # Communications interface crate.
//!
//! Provides the interface types exchanged between the rover core and the simulation harness which
//! drives it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telemetry and demand definitions for the simulated vehicle
pub mod eqpt;
