//! # World Map
//!
//! The [`WorldMap`] is a square grid with one channel per [`TerrainClass`]. Each cell of a channel
//! counts the evidence that the cell contains that class of terrain. Evidence is only ever added,
//! so noisy classifications are outweighed over many frames rather than corrected per frame.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{Rgb, RgbImage};
use ndarray::{Array3, ArrayView3, Axis, Zip};
use serde::{Deserialize, Serialize};
use util::maths::{clamp, lin_map};

use super::pix_to_world;
use crate::per::{PointSet, TerrainClass};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Persistent evidence grid of the terrain observed by the rover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldMap {
    /// Raw map data, a 3D array with dimension order y cell, x cell, class channel
    data: Array3<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WorldMap {
    /// Create an empty map with `world_size` cells along each side.
    pub fn new(world_size: usize) -> Self {
        Self {
            data: Array3::zeros((world_size, world_size, TerrainClass::ALL.len())),
        }
    }

    /// Number of cells along each side of the map.
    pub fn size(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Read only view of the raw evidence, indexed `[y, x, channel]`.
    pub fn data(&self) -> ArrayView3<f64> {
        self.data.view()
    }

    /// Add evidence for a set of rover-centric points.
    ///
    /// Points are transformed into the map using the rover's position and yaw (degrees) and the
    /// number of pixels per world unit, and each one adds `strength` to its cell in the channel
    /// for `class`. Points outside the map are clipped onto its edge.
    pub fn update(
        &mut self,
        points: &PointSet,
        class: TerrainClass,
        pos: [f64; 2],
        yaw_deg: f64,
        scale: f64,
        strength: f64,
    ) {
        let (x_world, y_world) =
            pix_to_world(&points.x, &points.y, pos, yaw_deg, self.size(), scale);
        let channel = class.channel();

        Zip::from(&x_world).and(&y_world).for_each(|x, y| {
            self.data[[*y, *x, channel]] += strength;
        });
    }

    /// Evidence held in the cell at `(x, y)`, in channel order, or `None` if the cell is outside
    /// the map.
    pub fn cell(&self, x: usize, y: usize) -> Option<[f64; 3]> {
        if x >= self.size() || y >= self.size() {
            return None;
        }

        Some([
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
        ])
    }

    /// The class with the most evidence in the cell at `(x, y)`.
    ///
    /// Returns `None` if the cell is outside the map or has never been observed. Ties are broken
    /// in channel order.
    pub fn dominant_class(&self, x: usize, y: usize) -> Option<TerrainClass> {
        let cell = self.cell(x, y)?;

        let mut best: Option<(TerrainClass, f64)> = None;
        for class in TerrainClass::ALL.iter() {
            let evidence = cell[class.channel()];
            if evidence <= 0.0 {
                continue;
            }
            match best {
                Some((_, e)) if e >= evidence => (),
                _ => best = Some((*class, evidence)),
            }
        }

        best.map(|(c, _)| c)
    }

    /// Fraction of the map's cells which hold any evidence.
    pub fn mapped_fraction(&self) -> f64 {
        let num_cells = self.size() * self.size();
        if num_cells == 0 {
            return 0.0;
        }

        let mapped = self
            .data
            .lanes(Axis(2))
            .into_iter()
            .filter(|cell| cell.iter().any(|e| *e > 0.0))
            .count();

        mapped as f64 / num_cells as f64
    }

    /// Render the map as an RGB image for display.
    ///
    /// Obstacle evidence is drawn in red, rock in green, and navigable in blue. Evidence is scaled
    /// so that `saturation` or more is full brightness. The image is flipped vertically so that
    /// north (increasing y) is up.
    pub fn to_image(&self, saturation: f64) -> RgbImage {
        let size = self.size() as u32;

        let to_u8 = |evidence: f64| {
            clamp(
                &lin_map((0.0, saturation), (0.0, 255.0), evidence),
                &0.0,
                &255.0,
            ) as u8
        };

        RgbImage::from_fn(size, size, |x, row| {
            let y = (size - 1 - row) as usize;
            let x = x as usize;

            Rgb([
                to_u8(self.data[[y, x, 0]]),
                to_u8(self.data[[y, x, 1]]),
                to_u8(self.data[[y, x, 2]]),
            ])
        })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::arr1;

    fn points(x: &[f64], y: &[f64]) -> PointSet {
        PointSet {
            x: arr1(x),
            y: arr1(y),
        }
    }

    #[test]
    fn test_update_accumulates() {
        let mut map = WorldMap::new(200);
        let origin = points(&[0.0], &[0.0]);

        for i in 1..=3 {
            map.update(&origin, TerrainClass::Navigable, [50.0, 50.0], 0.0, 10.0, 1.0);
            assert_eq!(map.cell(50, 50), Some([0.0, 0.0, i as f64]));
        }

        map.update(&origin, TerrainClass::Rock, [50.0, 50.0], 0.0, 10.0, 0.5);
        assert_eq!(map.cell(50, 50), Some([0.0, 0.5, 3.0]));
        assert_eq!(map.dominant_class(50, 50), Some(TerrainClass::Navigable));
    }

    #[test]
    fn test_update_duplicate_points() {
        // Two pixels falling in the same cell both count
        let mut map = WorldMap::new(200);
        map.update(
            &points(&[1.0, 2.0], &[1.0, 2.0]),
            TerrainClass::Obstacle,
            [10.0, 20.0],
            0.0,
            10.0,
            1.0,
        );

        assert_eq!(map.cell(10, 20), Some([2.0, 0.0, 0.0]));
    }

    #[test]
    fn test_update_clips_to_edge() {
        let mut map = WorldMap::new(200);
        map.update(
            &points(&[5000.0], &[0.0]),
            TerrainClass::Obstacle,
            [190.0, 100.0],
            0.0,
            10.0,
            1.0,
        );

        assert_eq!(map.cell(199, 100), Some([1.0, 0.0, 0.0]));
        assert_eq!(map.cell(200, 100), None);
    }

    #[test]
    fn test_dominant_class() {
        let mut map = WorldMap::new(10);
        let origin = points(&[0.0], &[0.0]);

        assert_eq!(map.dominant_class(5, 5), None);
        assert_eq!(map.dominant_class(50, 5), None);

        map.update(&origin, TerrainClass::Rock, [5.0, 5.0], 0.0, 10.0, 2.0);
        map.update(&origin, TerrainClass::Obstacle, [5.0, 5.0], 0.0, 10.0, 3.0);
        assert_eq!(map.dominant_class(5, 5), Some(TerrainClass::Obstacle));
    }

    #[test]
    fn test_mapped_fraction_and_image() {
        let mut map = WorldMap::new(10);
        assert_eq!(map.mapped_fraction(), 0.0);

        map.update(&points(&[0.0], &[0.0]), TerrainClass::Navigable, [2.0, 7.0], 0.0, 10.0, 1.0);
        map.update(&points(&[0.0], &[0.0]), TerrainClass::Rock, [3.0, 0.0], 0.0, 10.0, 50.0);
        assert_eq!(map.mapped_fraction(), 0.02);

        let img = map.to_image(4.0);
        assert_eq!(img.dimensions(), (10, 10));
        // y = 7 is drawn on row 2
        assert_eq!(*img.get_pixel(2, 2), Rgb([0, 0, 63]));
        // Saturated evidence is drawn at full brightness
        assert_eq!(*img.get_pixel(3, 9), Rgb([0, 255, 0]));
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 0]));
    }
}
