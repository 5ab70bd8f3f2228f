//! Colour thresholding of warped frames into terrain masks

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::RgbImage;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::ThreshRange;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Single channel binary image, indexed `[row, col]`. Set pixels are `1`.
pub type Mask = Array2<u8>;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The classes of terrain identified by perception.
///
/// The discriminant of each class is the channel it occupies in the world
/// map and the vision image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainClass {
    Obstacle = 0,
    Rock = 1,
    Navigable = 2,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TerrainClass {
    /// All classes, in channel order.
    pub const ALL: [TerrainClass; 3] = [
        TerrainClass::Obstacle,
        TerrainClass::Rock,
        TerrainClass::Navigable,
    ];

    /// Index of the channel holding this class.
    pub fn channel(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a mask of the pixels whose three channels all fall within `range`.
pub fn color_thresh(img: &RgbImage, range: &ThreshRange) -> Mask {
    let (width, height) = img.dimensions();

    Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
        range.contains(img.get_pixel(col as u32, row as u32)) as u8
    })
}
