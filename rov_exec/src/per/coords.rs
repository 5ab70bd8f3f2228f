//! Conversions from mask pixels to rover-centric cartesian and polar coordinates
//!
//! The rover frame has its origin at the bottom centre of the warped image, with X pointing
//! forward (up the image) and Y pointing to the rover's left (towards the left edge of the image).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use ndarray::{Array1, Zip};

use super::Mask;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Rover-centric positions of a set of pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    /// Distance ahead of the rover
    ///
    /// Units: pixels
    pub x: Array1<f64>,

    /// Distance to the left of the rover
    ///
    /// Units: pixels
    pub y: Array1<f64>,
}

/// Polar form of a [`PointSet`], in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolarSet {
    /// Distance from the rover
    ///
    /// Units: pixels
    pub dists: Array1<f64>,

    /// Angle from the rover's forward axis, positive to the left
    ///
    /// Units: radians
    pub angles: Array1<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PointSet {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

impl PolarSet {
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Number of points to the left of the rover's forward axis.
    pub fn num_left(&self) -> usize {
        self.angles.iter().filter(|a| **a > 0.0).count()
    }

    /// Number of points to the right of the rover's forward axis.
    pub fn num_right(&self) -> usize {
        self.angles.iter().filter(|a| **a < 0.0).count()
    }

    /// Mean angle of the set in degrees, or `None` if the set is empty.
    pub fn mean_angle_deg(&self) -> Option<f64> {
        self.angles.mean().map(f64::to_degrees)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert the set pixels of a mask into rover-centric coordinates.
///
/// Points are returned in row-major order of the mask.
pub fn rover_coords(mask: &Mask) -> PointSet {
    let (rows, cols) = mask.dim();
    let half_width = cols as f64 / 2.0;

    let (x, y): (Vec<f64>, Vec<f64>) = mask
        .indexed_iter()
        .filter(|(_, v)| **v != 0)
        .map(|((row, col), _)| (rows as f64 - row as f64, half_width - col as f64))
        .unzip();

    PointSet {
        x: Array1::from(x),
        y: Array1::from(y),
    }
}

/// Convert rover-centric cartesian coordinates into polar coordinates.
///
/// An empty point set gives an empty polar set.
pub fn to_polar_coords(points: &PointSet) -> PolarSet {
    PolarSet {
        dists: Zip::from(&points.x)
            .and(&points.y)
            .map_collect(|x, y| x.hypot(*y)),
        angles: Zip::from(&points.x)
            .and(&points.y)
            .map_collect(|x, y| y.atan2(*x)),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
