//! # Rover library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the rover crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Map module - accumulates observed terrain into a global evidence grid
pub mod map;

/// Navigation module - decides the drive demands from the perceived terrain
pub mod nav;

/// Rover parameters, loaded from the parameter file
pub mod params;

/// Perception module - turns camera frames into terrain masks and polar sets
pub mod per;

/// Rover pipeline, one perception and navigation pass per frame
pub mod rover;

/// Rover state shared between perception and navigation
pub mod state;
