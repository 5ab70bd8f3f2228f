//! Rover frame to world frame transforms

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Rotation2;
use ndarray::Array1;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Rotate rover-centric points by the rover's yaw.
///
/// Units: `yaw_deg` in degrees
pub fn rotate_pix(x: &Array1<f64>, y: &Array1<f64>, yaw_deg: f64) -> (Array1<f64>, Array1<f64>) {
    let rot = Rotation2::new(yaw_deg.to_radians());
    let m = rot.matrix();

    (
        x * m[(0, 0)] + y * m[(0, 1)],
        x * m[(1, 0)] + y * m[(1, 1)],
    )
}

/// Scale rotated points from pixels into world units and move them to the rover's position.
pub fn translate_pix(
    x_rot: &Array1<f64>,
    y_rot: &Array1<f64>,
    pos: [f64; 2],
    scale: f64,
) -> (Array1<f64>, Array1<f64>) {
    (x_rot / scale + pos[0], y_rot / scale + pos[1])
}

/// Convert rover-centric points into world map cell indices.
///
/// Points are rotated by the yaw, scaled and translated to the rover's position, truncated to
/// integer cells, and finally clipped to lie within a `world_size` by `world_size` map.
pub fn pix_to_world(
    x: &Array1<f64>,
    y: &Array1<f64>,
    pos: [f64; 2],
    yaw_deg: f64,
    world_size: usize,
    scale: f64,
) -> (Array1<usize>, Array1<usize>) {
    let (x_rot, y_rot) = rotate_pix(x, y, yaw_deg);
    let (x_world, y_world) = translate_pix(&x_rot, &y_rot, pos, scale);

    let max = world_size.saturating_sub(1) as i64;
    let to_cell = |v: &f64| (*v as i64).clamp(0, max) as usize;

    (x_world.map(to_cell), y_world.map(to_cell))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
