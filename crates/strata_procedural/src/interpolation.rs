//! # Parameter Interpolation Grid
//!
//! Sampling six fractal fields for every column is the dominant cost of a
//! chunk. Instead, the sampler is evaluated only at the corners of a coarse
//! grid (16 blocks by default) and columns are bilinearly interpolated.
//!
//! The grid is aligned to world coordinates, not to chunks, so two chunks
//! sharing an edge interpolate between the same corner values and no seam
//! appears. Corners are cached unadjusted; the altitude correction is
//! applied once, after blending.

use std::collections::HashMap;

use crate::climate::{ClimateSampler, ParameterVector};

/// Grid corner coordinates (in cells, not blocks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridKey {
    /// Cell index along X.
    pub gx: i32,
    /// Cell index along Z.
    pub gz: i32,
}

/// Per-chunk cache of raw corner samples.
pub struct InterpolationGridCache {
    cell_size: i32,
    corners: HashMap<GridKey, ParameterVector>,
}

impl InterpolationGridCache {
    /// Default cell edge in blocks.
    pub const DEFAULT_CELL_SIZE: i32 = 16;

    /// Creates an empty cache. A non-positive `cell_size` falls back to the
    /// default; config validation rejects it before it gets here.
    #[must_use]
    pub fn new(cell_size: i32) -> Self {
        let cell_size = if cell_size > 0 {
            cell_size
        } else {
            Self::DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            // One chunk touches at most 4 corners at the default size.
            corners: HashMap::with_capacity(16),
        }
    }

    /// Cell edge in blocks.
    #[must_use]
    pub const fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// Number of cached corners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.corners.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    /// Drops every cached corner.
    pub fn clear(&mut self) {
        self.corners.clear();
    }

    fn corner(&mut self, sampler: &ClimateSampler, key: GridKey) -> ParameterVector {
        // Corner positions can leave the i32 range near the world edge.
        let cell = f64::from(self.cell_size);
        *self.corners.entry(key).or_insert_with(|| {
            sampler.sample_raw(f64::from(key.gx) * cell, f64::from(key.gz) * cell)
        })
    }

    /// Interpolated parameters at sea level (no altitude correction).
    pub fn sample_raw_interpolated(&mut self, sampler: &ClimateSampler, x: i32, z: i32) -> ParameterVector {
        let cell = self.cell_size;
        let (gx, gz) = (x.div_euclid(cell), z.div_euclid(cell));
        let tx = x.rem_euclid(cell) as f32 / cell as f32;
        let tz = z.rem_euclid(cell) as f32 / cell as f32;

        let v00 = self.corner(sampler, GridKey { gx, gz });
        if tx == 0.0 && tz == 0.0 {
            return v00;
        }
        // A fractional offset means cell >= 2, so gx + 1 cannot overflow.
        let v10 = self.corner(sampler, GridKey { gx: gx + 1, gz });
        let v01 = self.corner(sampler, GridKey { gx, gz: gz + 1 });
        let v11 = self.corner(sampler, GridKey { gx: gx + 1, gz: gz + 1 });
        ParameterVector::bilinear(v00, v10, v01, v11, tx, tz)
    }

    /// Interpolated parameters for a column whose surface sits at `height`.
    pub fn sample_interpolated(
        &mut self,
        sampler: &ClimateSampler,
        x: i32,
        z: i32,
        height: i32,
    ) -> ParameterVector {
        let raw = self.sample_raw_interpolated(sampler, x, z);
        sampler.adjust_for_altitude(raw, height)
    }
}

impl Default for InterpolationGridCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CELL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClimateSettings;
    use crate::noise::WorldSeed;

    fn sampler() -> ClimateSampler {
        ClimateSampler::new(WorldSeed::new(42), &ClimateSettings::default(), 64)
    }

    #[test]
    fn test_corner_equals_direct_sample() {
        let sampler = sampler();
        let mut cache = InterpolationGridCache::default();
        for (x, z) in [(0, 0), (16, -32), (-48, 160), (1024, 2048)] {
            let interpolated = cache.sample_raw_interpolated(&sampler, x, z);
            assert_eq!(interpolated, sampler.sample_raw(f64::from(x), f64::from(z)));
        }
    }

    #[test]
    fn test_midpoint_is_corner_mean() {
        let sampler = sampler();
        let mut cache = InterpolationGridCache::default();
        let mid = cache.sample_raw_interpolated(&sampler, 8, 8).to_array();
        let corners = [(0.0, 0.0), (16.0, 0.0), (0.0, 16.0), (16.0, 16.0)]
            .map(|(x, z)| sampler.sample_raw(x, z).to_array());
        for dim in 0..ParameterVector::DIMENSIONS {
            let mean = corners.iter().map(|c| c[dim]).sum::<f32>() / 4.0;
            assert!((mid[dim] - mean).abs() < 1e-5, "dimension {dim}: {} vs {mean}", mid[dim]);
        }
    }

    #[test]
    fn test_altitude_applied_after_blend() {
        let sampler = sampler();
        let mut cache = InterpolationGridCache::default();
        let raw = cache.sample_raw_interpolated(&sampler, 5, 11);
        let high = cache.sample_interpolated(&sampler, 5, 11, 200);
        assert_eq!(high, sampler.adjust_for_altitude(raw, 200));
        assert_eq!(cache.sample_interpolated(&sampler, 5, 11, 40), raw);
    }

    #[test]
    fn test_negative_coordinates_use_floor_cells() {
        let sampler = sampler();
        let mut cache = InterpolationGridCache::default();
        // -1 lies in cell -1, between corners -16 and 0.
        let _ = cache.sample_raw_interpolated(&sampler, -1, -1);
        assert!(cache.corners.contains_key(&GridKey { gx: -1, gz: -1 }));
        assert!(cache.corners.contains_key(&GridKey { gx: 0, gz: 0 }));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_clear_empties_cache() {
        let sampler = sampler();
        let mut cache = InterpolationGridCache::new(8);
        for x in 0..16 {
            let _ = cache.sample_raw_interpolated(&sampler, x, 3);
        }
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
