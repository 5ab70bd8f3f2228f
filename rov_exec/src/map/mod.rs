//! # Map
//!
//! This module implements the [`WorldMap`], the persistent global map into which all terrain
//! observed by the rover is accumulated, along with the transforms which take rover-centric points
//! into the map.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Implements the [`WorldMap`] type
mod world_map;

/// Rover frame to world frame transforms
mod transform;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use transform::{pix_to_world, rotate_pix, translate_pix};
pub use world_map::WorldMap;
