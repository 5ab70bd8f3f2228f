//! # Perception module
//!
//! Converts camera frames into terrain information for the rover. Each frame is processed by:
//!
//! - Warping the frame into a top-down view ([`Calibration::warp`])
//! - Thresholding the warped frame into navigable, obstacle, and rock masks ([`color_thresh`])
//! - Converting mask pixels into rover-centric coordinates ([`rover_coords`])
//! - Accumulating those coordinates into the global [`WorldMap`]
//! - Converting the navigable and rock coordinates into polar form ([`to_polar_coords`]) for use by
//!   navigation.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod coords;
mod params;
mod thresh;
mod warp;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use coords::*;
pub use params::*;
pub use thresh::*;
pub use warp::*;

use image::{Rgb, RgbImage};
use log::{info, trace};

use crate::{map::WorldMap, state::RoverState};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Manages the perception algorithm.
///
/// The calibration is computed once when the manager is created, as it only depends on the image
/// size and the calibration parameters.
#[derive(Debug, Clone)]
pub struct PerMgr {
    pub params: PerParams,

    calib: Calibration,
}

/// Masks produced from a single frame.
#[derive(Debug, Clone)]
pub struct TerrainMasks {
    pub navigable: Mask,
    pub obstacle: Mask,
    pub rock: Mask,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum PerError {
    #[error("Expected a frame of {expected:?} pixels but found {found:?}")]
    FrameSizeMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("The calibration points do not define a valid perspective transform")]
    DegenerateCalibration,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PerMgr {
    pub fn new(params: PerParams) -> Result<Self, PerError> {
        let calib = Calibration::new(&params)?;

        info!(
            "Perception calibrated for {}x{} frames",
            params.image_width, params.image_height
        );

        Ok(Self { params, calib })
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calib
    }

    /// Warp a frame and classify it into terrain masks.
    pub fn classify(&self, frame: &RgbImage) -> Result<TerrainMasks, PerError> {
        let warped = self.calib.warp(frame)?;

        Ok(TerrainMasks {
            navigable: color_thresh(&warped, &self.params.nav_thresh),
            obstacle: color_thresh(&warped, &self.params.obs_thresh),
            rock: color_thresh(&warped, &self.params.rock_thresh),
        })
    }

    /// Process a single camera frame.
    ///
    /// Reads the rover's position and yaw from `state`, and writes the navigable and rock polar
    /// sets back into it. The observed terrain is accumulated into `world_map`.
    ///
    /// Returns the vision image, which holds the obstacle, rock, and navigable masks in its red,
    /// green, and blue channels respectively.
    ///
    /// The frame is validated before anything is modified, so on error neither `state` nor
    /// `world_map` are changed.
    pub fn step(
        &self,
        frame: &RgbImage,
        state: &mut RoverState,
        world_map: &mut WorldMap,
    ) -> Result<RgbImage, PerError> {
        let masks = self.classify(frame)?;

        let nav_points = rover_coords(&masks.navigable);
        let obs_points = rover_coords(&masks.obstacle);
        let rock_points = rover_coords(&masks.rock);

        trace!(
            "Perception found {} navigable, {} obstacle, {} rock pixels",
            nav_points.len(),
            obs_points.len(),
            rock_points.len()
        );

        for (points, class) in [
            (&nav_points, TerrainClass::Navigable),
            (&obs_points, TerrainClass::Obstacle),
            (&rock_points, TerrainClass::Rock),
        ]
        .iter()
        {
            world_map.update(
                points,
                *class,
                state.pos,
                state.yaw_deg,
                self.params.world_scale,
                self.params.update_strength,
            );
        }

        state.nav = Some(to_polar_coords(&nav_points));
        state.rock = Some(to_polar_coords(&rock_points));

        Ok(vision_image(&masks))
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the display image of a set of terrain masks.
pub fn vision_image(masks: &TerrainMasks) -> RgbImage {
    let (rows, cols) = masks.navigable.dim();

    RgbImage::from_fn(cols as u32, rows as u32, |x, y| {
        let idx = [y as usize, x as usize];
        Rgb([
            masks.obstacle[idx] * 255,
            masks.rock[idx] * 255,
            masks.navigable[idx] * 255,
        ])
    })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
