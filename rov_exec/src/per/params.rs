//! Parameters structure for the perception manager

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::Rgb;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for perception.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerParams {

    // ---- CAMERA ----

    /// Width of the camera frame.
    ///
    /// Units: pixels
    pub image_width: u32,

    /// Height of the camera frame.
    ///
    /// Units: pixels
    pub image_height: u32,

    // ---- CALIBRATION ----

    /// Calibrated trapezoid in the camera frame, covering a square patch of
    /// ground in front of the rover. Order: bottom left, bottom right, top
    /// right, top left.
    ///
    /// Units: pixels
    pub src_points: [[f64; 2]; 4],

    /// Half the side length of the destination square the trapezoid is warped
    /// onto. The square is centred horizontally and sits on the bottom edge of
    /// the warped image.
    ///
    /// Units: pixels
    pub dst_half_size: f64,

    // ---- CLASSIFICATION ----

    /// Colour range of navigable terrain.
    pub nav_thresh: ThreshRange,

    /// Colour range of obstacles.
    pub obs_thresh: ThreshRange,

    /// Colour range of rock samples.
    pub rock_thresh: ThreshRange,

    // ---- MAPPING ----

    /// Number of cells along each side of the world map.
    pub world_size: usize,

    /// Number of warped image pixels per world unit.
    pub world_scale: f64,

    /// Evidence added to a world map cell per observation.
    pub update_strength: f64,
}

/// Inclusive per-channel colour range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreshRange {
    /// Minimum RGB value, inclusive
    pub min: [u8; 3],

    /// Maximum RGB value, inclusive
    pub max: [u8; 3],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PerParams {
    fn default() -> Self {
        Self {
            image_width: 320,
            image_height: 160,
            src_points: [[14.0, 140.0], [301.0, 140.0], [200.0, 96.0], [118.0, 96.0]],
            dst_half_size: 5.0,
            nav_thresh: ThreshRange::new([160, 160, 160], [255, 255, 255]),
            obs_thresh: ThreshRange::new([0, 0, 0], [120, 120, 120]),
            rock_thresh: ThreshRange::new([100, 100, 0], [255, 255, 50]),
            world_size: 200,
            world_scale: 10.0,
            update_strength: 1.0,
        }
    }
}

impl ThreshRange {
    pub const fn new(min: [u8; 3], max: [u8; 3]) -> Self {
        Self { min, max }
    }

    /// True if all three channels of the pixel fall within the range.
    pub fn contains(&self, pixel: &Rgb<u8>) -> bool {
        pixel.0
            .iter()
            .zip(self.min.iter().zip(self.max.iter()))
            .all(|(v, (min, max))| min <= v && v <= max)
    }
}
