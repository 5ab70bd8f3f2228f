//! # Rover pipeline
//!
//! [`Rover`] owns everything which persists between cycles (the [`RoverState`], the [`WorldMap`],
//! and the latest vision image) and runs one full perception and navigation pass per cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::{DriveDems, Telemetry};
use image::RgbImage;
use log::{debug, info};

use crate::{
    map::WorldMap,
    nav::{NavCtrl, NavStatus},
    params::RoverParams,
    per::{PerError, PerMgr},
    state::RoverState,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct Rover {
    pub params: RoverParams,

    pub state: RoverState,

    per_mgr: PerMgr,
    nav_ctrl: NavCtrl,
    world_map: WorldMap,
    vision_image: RgbImage,
}

/// Output of a single cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutput {
    /// Demands for the vehicle
    pub dems: DriveDems,

    /// Outcome of the navigation step
    pub nav_status: NavStatus,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RoverError {
    #[error("Perception error: {0}")]
    PerError(#[from] PerError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Rover {
    pub fn new(params: RoverParams) -> Result<Self, RoverError> {
        let per_mgr = PerMgr::new(params.per.clone())?;
        let nav_ctrl = NavCtrl::new(params.nav.clone());
        let world_map = WorldMap::new(params.per.world_size);
        let vision_image = RgbImage::new(params.per.image_width, params.per.image_height);
        let state = RoverState::new(params.nav.initial_mode);

        info!(
            "Rover initialised in {} mode with a {}x{} world map",
            state.mode,
            world_map.size(),
            world_map.size()
        );

        Ok(Self {
            params,
            state,
            per_mgr,
            nav_ctrl,
            world_map,
            vision_image,
        })
    }

    /// Run one cycle of the pipeline on a new frame and its telemetry.
    ///
    /// If the frame is rejected by perception nothing is updated and the error is returned, so the
    /// caller may discard the frame and continue with the next.
    pub fn cycle(&mut self, frame: &RgbImage, telem: &Telemetry) -> Result<CycleOutput, RoverError> {
        // Take a copy of the state so that a rejected frame leaves no trace of its telemetry
        let mut state = self.state.clone();
        state.set_telemetry(telem);

        self.vision_image = self.per_mgr.step(frame, &mut state, &mut self.world_map)?;

        let nav_status = self.nav_ctrl.step(&mut state);
        self.state = state;

        let dems = self.state.drive_dems();
        debug!("Cycle complete in {} mode: {:?}", self.state.mode, dems);

        Ok(CycleOutput { dems, nav_status })
    }

    /// The accumulated world map.
    pub fn world_map(&self) -> &WorldMap {
        &self.world_map
    }

    /// The classification masks of the most recent frame.
    pub fn vision_image(&self) -> &RgbImage {
        &self.vision_image
    }

    /// Render the world map for display.
    pub fn world_map_image(&self) -> RgbImage {
        self.world_map
            .to_image(self.params.map_display_saturation)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
