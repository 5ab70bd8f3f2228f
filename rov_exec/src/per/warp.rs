//! Perspective transform from the camera view to a top-down view
//!
//! The transform is a homography fixed by four point correspondences: a trapezoid in the camera
//! frame which covers a square patch of flat ground, and the square in the warped frame which that
//! patch should occupy. Warping uses the inverse homography so each output pixel is sampled
//! (bilinearly) from the camera frame. Output pixels whose source lies outside the camera frame are
//! black.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{Rgb, RgbImage};
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

use super::{PerError, PerParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Calibrated perspective transform for a fixed image size.
#[derive(Debug, Clone)]
pub struct Calibration {
    /// Source quadrilateral in the camera frame
    pub src: [Point2<f64>; 4],

    /// Destination quadrilateral in the warped frame
    pub dst: [Point2<f64>; 4],

    /// Width and height of both the camera frame and the warped frame
    pub dimensions: (u32, u32),

    /// Homography mapping camera frame points to warped frame points
    homography: Matrix3<f64>,

    /// Homography mapping warped frame points back to camera frame points
    inverse: Matrix3<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Calibration {
    /// Build the calibration described by the perception parameters.
    pub fn new(params: &PerParams) -> Result<Self, PerError> {
        let src = [
            Point2::new(params.src_points[0][0], params.src_points[0][1]),
            Point2::new(params.src_points[1][0], params.src_points[1][1]),
            Point2::new(params.src_points[2][0], params.src_points[2][1]),
            Point2::new(params.src_points[3][0], params.src_points[3][1]),
        ];
        let dst = destination_points(
            params.image_width,
            params.image_height,
            params.dst_half_size,
        );

        Self::from_points(src, dst, (params.image_width, params.image_height))
    }

    /// Build a calibration from explicit point correspondences.
    pub fn from_points(
        src: [Point2<f64>; 4],
        dst: [Point2<f64>; 4],
        dimensions: (u32, u32),
    ) -> Result<Self, PerError> {
        let homography = compute_homography(&src, &dst).ok_or(PerError::DegenerateCalibration)?;
        let inverse = homography
            .try_inverse()
            .ok_or(PerError::DegenerateCalibration)?;

        Ok(Self {
            src,
            dst,
            dimensions,
            homography,
            inverse,
        })
    }

    /// Map a point in the camera frame into the warped frame.
    pub fn transform_point(&self, point: &Point2<f64>) -> Option<Point2<f64>> {
        apply_homography(&self.homography, point)
    }

    /// Warp a camera frame into the top-down view.
    pub fn warp(&self, frame: &RgbImage) -> Result<RgbImage, PerError> {
        if frame.dimensions() != self.dimensions {
            return Err(PerError::FrameSizeMismatch {
                expected: self.dimensions,
                found: frame.dimensions(),
            });
        }

        let (width, height) = self.dimensions;
        let mut warped = RgbImage::new(width, height);

        for (x, y, pixel) in warped.enumerate_pixels_mut() {
            if let Some(src) =
                apply_homography(&self.inverse, &Point2::new(x as f64, y as f64))
            {
                *pixel = bilinear_sample(frame, src.x, src.y);
            }
        }

        Ok(warped)
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Destination square for an image of the given size.
///
/// The square has sides of `2 * half_size` pixels, is centred on the horizontal middle of the image
/// and sits on its bottom edge, i.e. it is the patch of ground directly in front of the rover.
/// Points are ordered bottom left, bottom right, top right, top left to match the source
/// trapezoid.
pub fn destination_points(width: u32, height: u32, half_size: f64) -> [Point2<f64>; 4] {
    let mid = width as f64 / 2.0;
    let bottom = height as f64;

    [
        Point2::new(mid - half_size, bottom),
        Point2::new(mid + half_size, bottom),
        Point2::new(mid + half_size, bottom - 2.0 * half_size),
        Point2::new(mid - half_size, bottom - 2.0 * half_size),
    ]
}

/// Solve for the homography which maps each `src` point onto the matching `dst` point.
///
/// Returns `None` if the points are degenerate and no unique solution exists.
pub fn compute_homography(src: &[Point2<f64>; 4], dst: &[Point2<f64>; 4]) -> Option<Matrix3<f64>> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    // Each correspondence gives two rows of the system, with the bottom right element of the
    // homography fixed to 1.
    for i in 0..4 {
        let (x, y) = (src[i].x, src[i].y);
        let (u, v) = (dst[i].x, dst[i].y);

        let r = 2 * i;
        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -x * u;
        a[(r, 7)] = -y * u;
        b[r] = u;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -x * v;
        a[(r + 1, 7)] = -y * v;
        b[r + 1] = v;
    }

    let h = a.lu().solve(&b)?;

    if h.iter().any(|v| !v.is_finite()) {
        return None;
    }

    Some(Matrix3::new(
        h[0], h[1], h[2],
        h[3], h[4], h[5],
        h[6], h[7], 1.0,
    ))
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Apply a homography to a point, returning `None` if the point maps to infinity.
fn apply_homography(h: &Matrix3<f64>, point: &Point2<f64>) -> Option<Point2<f64>> {
    let p = h * Vector3::new(point.x, point.y, 1.0);

    if p.z == 0.0 {
        return None;
    }

    Some(Point2::new(p.x / p.z, p.y / p.z))
}

/// Bilinearly sample the image at a subpixel position. Neighbours outside the image contribute
/// black.
fn bilinear_sample(img: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let (width, height) = img.dimensions();

    if !x.is_finite() || !y.is_finite() {
        return Rgb([0, 0, 0]);
    }

    // Quick reject for points well outside the image, which also keeps the casts below in range
    if x <= -1.0 || y <= -1.0 || x >= width as f64 || y >= height as f64 {
        return Rgb([0, 0, 0]);
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let neighbours = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];

    let mut acc = [0f64; 3];

    for &(nx, ny, weight) in neighbours.iter() {
        if weight == 0.0
            || nx < 0
            || ny < 0
            || nx >= width as i64
            || ny >= height as i64
        {
            continue;
        }

        let pixel = img.get_pixel(nx as u32, ny as u32);
        for c in 0..3 {
            acc[c] += weight * pixel[c] as f64;
        }
    }

    Rgb([
        acc[0].round().min(255.0) as u8,
        acc[1].round().min(255.0) as u8,
        acc[2].round().min(255.0) as u8,
    ])
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
