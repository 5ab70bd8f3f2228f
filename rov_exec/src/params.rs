//! # Rover Parameters
//!
//! This module provides the parameters for the whole rover pipeline, normally loaded from
//! `params/rover.toml`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{nav::NavParams, per::PerParams};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Parameter file for the rover, relative to the params directory.
pub const ROVER_PARAMS_FILE: &str = "rover.toml";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoverParams {
    /// Perception parameters
    pub per: PerParams,

    /// Navigation parameters
    pub nav: NavParams,

    /// Evidence at which a world map cell is drawn at full brightness
    pub map_display_saturation: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RoverParams {
    fn default() -> Self {
        Self {
            per: PerParams::default(),
            nav: NavParams::default(),
            map_display_saturation: 10.0,
        }
    }
}

impl RoverParams {
    /// Load the rover parameters from the params directory.
    pub fn load() -> Result<Self, util::params::LoadError> {
        util::params::load(ROVER_PARAMS_FILE)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nav::Mode;

    #[test]
    fn test_partial_params() {
        let params: RoverParams = toml::from_str(
            r#"
            [nav]
            stop_forward = 30
            initial_mode = "rotate_left"

            [per.rock_thresh]
            min = [110, 110, 0]
            max = [255, 255, 60]
            "#,
        )
        .unwrap();

        assert_eq!(params.nav.stop_forward, 30);
        assert_eq!(params.nav.go_forward, 500);
        assert_eq!(params.nav.initial_mode, Mode::RotateLeft);
        assert_eq!(params.per.rock_thresh.max, [255, 255, 60]);
        assert_eq!(params.per.world_size, 200);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let result: Result<RoverParams, _> = toml::from_str(
            r#"
            [nav]
            initial_mode = "rotate_right"
            "#,
        );

        let err = result.unwrap_err().to_string();
        assert!(err.contains("Invalid navigation mode"), "{}", err);
    }

    #[test]
    fn test_shipped_params_load() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("params")
            .join(ROVER_PARAMS_FILE);

        let params: RoverParams = util::params::load_path(path).unwrap();

        assert_eq!(params.per.nav_thresh.min, [160, 160, 160]);
        assert_eq!(params.per.obs_thresh.max, [120, 120, 120]);
        assert_eq!(params.per.rock_thresh.min, [100, 100, 0]);
        assert_eq!(params.nav.sample_steer_weight, 0.65);
        assert_eq!(params.nav.initial_mode, Mode::Forward);
    }
}
