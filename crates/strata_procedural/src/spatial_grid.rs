//! # Spatial Hash Grid
//!
//! Buckets SDF primitives by the cells their bounding boxes overlap, so a
//! voxel query only evaluates the handful of primitives near it instead of
//! every primitive in the chunk neighbourhood.
//!
//! Cell size follows the largest primitive: `2 * max_radius`, never below
//! [`SpatialHashGrid::MIN_CELL_SIZE`]. A grid lives for one chunk pass.

use std::collections::HashMap;

use crate::geometry::{Aabb, Vec3};
use crate::sdf::{SdfPrimitive, NO_EFFECT};

/// Integer cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellKey {
    /// Cell X
    pub x: i32,
    /// Cell Y
    pub y: i32,
    /// Cell Z
    pub z: i32,
}

/// Primitive buckets keyed by cell.
pub struct SpatialHashGrid {
    cell_size: f32,
    primitives: Vec<SdfPrimitive>,
    cells: HashMap<CellKey, Vec<u32>>,
}

impl SpatialHashGrid {
    /// Smallest cell edge in blocks.
    pub const MIN_CELL_SIZE: f32 = 4.0;

    /// Builds the grid over a set of primitives.
    #[must_use]
    pub fn build(primitives: Vec<SdfPrimitive>) -> Self {
        let max_radius = primitives.iter().map(SdfPrimitive::radius).fold(0.0_f32, f32::max);
        let cell_size = (max_radius * 2.0).max(Self::MIN_CELL_SIZE);

        let mut cells: HashMap<CellKey, Vec<u32>> = HashMap::new();
        for (index, primitive) in primitives.iter().enumerate() {
            let bounds = primitive.aabb();
            let lo = Self::key_for(cell_size, bounds.min);
            let hi = Self::key_for(cell_size, bounds.max);
            for x in lo.x..=hi.x {
                for y in lo.y..=hi.y {
                    for z in lo.z..=hi.z {
                        cells.entry(CellKey { x, y, z }).or_default().push(index as u32);
                    }
                }
            }
        }

        Self {
            cell_size,
            primitives,
            cells,
        }
    }

    fn key_for(cell_size: f32, p: Vec3) -> CellKey {
        CellKey {
            x: (p.x / cell_size).floor() as i32,
            y: (p.y / cell_size).floor() as i32,
            z: (p.z / cell_size).floor() as i32,
        }
    }

    /// Cell containing a point.
    #[must_use]
    pub fn cell_of(&self, p: Vec3) -> CellKey {
        Self::key_for(self.cell_size, p)
    }

    /// Edge length of a cell.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// All primitives in insertion order.
    #[must_use]
    pub fn primitives(&self) -> &[SdfPrimitive] {
        &self.primitives
    }

    /// Number of primitives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Whether the grid holds no primitives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Primitive bounding boxes as one flat buffer, six floats per primitive
    /// (`min` then `max`), in insertion order. Feeds debug overlays.
    #[must_use]
    pub fn bounds_buffer(&self) -> Vec<f32> {
        let boxes: Vec<Aabb> = self.primitives.iter().map(SdfPrimitive::aabb).collect();
        bytemuck::cast_slice::<Aabb, f32>(&boxes).to_vec()
    }

    /// Minimum signed distance over the primitives bucketed with `p`.
    ///
    /// Exact wherever the result is negative. Points in empty cells, or
    /// non-finite points, report [`NO_EFFECT`].
    #[must_use]
    pub fn min_distance(&self, p: Vec3) -> f32 {
        if !p.is_finite() {
            return NO_EFFECT;
        }
        self.cells.get(&self.cell_of(p)).map_or(NO_EFFECT, |bucket| {
            bucket
                .iter()
                .map(|&i| self.primitives[i as usize].distance(p))
                .fold(NO_EFFECT, f32::min)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_primitives() -> Vec<SdfPrimitive> {
        vec![
            SdfPrimitive::sphere(Vec3::new(8.0, 60.0, 8.0), 5.0).unwrap(),
            SdfPrimitive::capsule(Vec3::new(-20.0, 50.0, 3.0), Vec3::new(-4.0, 44.0, 9.0), 2.5).unwrap(),
            SdfPrimitive::cylinder(Vec3::new(30.0, 70.0, -6.0), Vec3::Y, 1.5, 12.0).unwrap(),
        ]
    }

    #[test]
    fn test_cell_size_tracks_largest_radius() {
        let grid = SpatialHashGrid::build(sample_primitives());
        assert_eq!(grid.cell_size(), 10.0);
        assert_eq!(grid.len(), 3);

        let small = SpatialHashGrid::build(vec![SdfPrimitive::sphere(Vec3::ZERO, 1.0).unwrap()]);
        assert_eq!(small.cell_size(), SpatialHashGrid::MIN_CELL_SIZE);
    }

    #[test]
    fn test_matches_brute_force_inside() {
        let primitives = sample_primitives();
        let grid = SpatialHashGrid::build(primitives.clone());
        for x in -30..40 {
            for y in 30..90 {
                for z in -15..20 {
                    let p = Vec3::block_center(x, y, z);
                    let brute = primitives.iter().map(|s| s.distance(p)).fold(NO_EFFECT, f32::min);
                    if brute < 0.0 {
                        assert_eq!(grid.min_distance(p), brute, "mismatch at {p:?}");
                    } else {
                        assert!(grid.min_distance(p) >= 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_grid_has_no_effect() {
        let grid = SpatialHashGrid::build(Vec::new());
        assert!(grid.is_empty());
        assert_eq!(grid.occupied_cells(), 0);
        assert_eq!(grid.min_distance(Vec3::new(1.0, 2.0, 3.0)), NO_EFFECT);
        assert_eq!(grid.min_distance(Vec3::new(f32::INFINITY, 0.0, 0.0)), NO_EFFECT);
    }

    #[test]
    fn test_bounds_buffer_follows_primitives() {
        let primitives = sample_primitives();
        let grid = SpatialHashGrid::build(primitives.clone());
        let buffer = grid.bounds_buffer();
        assert_eq!(buffer.len(), primitives.len() * 6);

        let sphere = primitives[0].aabb();
        assert_eq!(&buffer[..3], &[sphere.min.x, sphere.min.y, sphere.min.z]);
        assert_eq!(&buffer[3..6], &[sphere.max.x, sphere.max.y, sphere.max.z]);
        assert!(SpatialHashGrid::build(Vec::new()).bounds_buffer().is_empty());
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let grid = SpatialHashGrid::build(sample_primitives());
        assert_eq!(grid.cell_of(Vec3::new(-0.5, 0.0, 9.99)), CellKey { x: -1, y: 0, z: 0 });
    }
}
