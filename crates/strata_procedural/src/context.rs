//! Per-chunk scratch state.
//!
//! Everything a chunk needs beyond the shared, immutable generator lives
//! here: the interpolation corners and the cave field. One context per chunk,
//! dropped when the chunk completes, so workers never share mutable state.
//!
//! Point queries (`cave_density`, `generate_column`) have no chunk pass to
//! hang a context on. They go through [`CaveFieldCache`], which keeps the
//! fields of the few most recently queried chunks.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::chunk::ChunkCoord;
use crate::climate::{ClimateSampler, ParameterVector};
use crate::interpolation::InterpolationGridCache;

/// Scratch state for generating one chunk.
pub struct ChunkGenContext<F> {
    coord: ChunkCoord,
    interpolation: InterpolationGridCache,
    cave_field: Arc<F>,
}

impl<F> ChunkGenContext<F> {
    /// Creates a context with an empty interpolation cache.
    #[must_use]
    pub fn new(coord: ChunkCoord, cell_size: i32, cave_field: Arc<F>) -> Self {
        Self {
            coord,
            interpolation: InterpolationGridCache::new(cell_size),
            cave_field,
        }
    }

    /// Chunk this context belongs to.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Raw interpolated parameters for a world column.
    pub fn raw_params(&mut self, sampler: &ClimateSampler, x: i32, z: i32) -> ParameterVector {
        self.interpolation.sample_raw_interpolated(sampler, x, z)
    }

    /// Cave field prepared for this chunk.
    #[must_use]
    pub fn cave_field(&self) -> &F {
        &self.cave_field
    }

    /// Interpolation corners cached so far.
    #[must_use]
    pub fn cached_corners(&self) -> usize {
        self.interpolation.len()
    }

    /// Ends the surface pass: clears the interpolation cache and returns how
    /// many corners it held.
    pub fn finish_surface(&mut self) -> usize {
        let corners = self.interpolation.len();
        self.interpolation.clear();
        corners
    }
}

/// Small shared cache of prepared cave fields, most recent first.
pub struct CaveFieldCache<F> {
    capacity: usize,
    entries: Mutex<VecDeque<(ChunkCoord, Arc<F>)>>,
}

impl<F> CaveFieldCache<F> {
    /// Chunks kept by default.
    pub const DEFAULT_CAPACITY: usize = 8;

    /// Creates an empty cache holding at most `capacity` chunks (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Field for `coord`, running `prepare` on a miss.
    ///
    /// `prepare` runs without the lock held. Fields are pure functions of the
    /// chunk, so two threads racing on the same miss build equal fields.
    pub fn get_or_prepare(&self, coord: ChunkCoord, prepare: impl FnOnce(ChunkCoord) -> F) -> Arc<F> {
        if let Some(hit) = self.lookup(coord) {
            return hit;
        }
        let field = Arc::new(prepare(coord));
        let mut entries = self.entries.lock();
        if !entries.iter().any(|(c, _)| *c == coord) {
            entries.push_front((coord, Arc::clone(&field)));
            entries.truncate(self.capacity);
        }
        field
    }

    fn lookup(&self, coord: ChunkCoord) -> Option<Arc<F>> {
        let mut entries = self.entries.lock();
        let index = entries.iter().position(|(c, _)| *c == coord)?;
        let entry = entries.remove(index)?;
        let field = Arc::clone(&entry.1);
        entries.push_front(entry);
        Some(field)
    }

    /// Number of cached chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<F> Default for CaveFieldCache<F> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClimateSettings;
    use crate::noise::WorldSeed;
    use std::cell::Cell;

    #[test]
    fn test_finish_surface_clears_corners() {
        let sampler = ClimateSampler::new(WorldSeed::new(3), &ClimateSettings::default(), 64);
        let mut ctx = ChunkGenContext::new(ChunkCoord::new(0, 0), 16, Arc::new(()));
        for x in 0..16 {
            let _ = ctx.raw_params(&sampler, x, 7);
        }
        assert_eq!(ctx.cached_corners(), 4);
        assert_eq!(ctx.finish_surface(), 4);
        assert_eq!(ctx.cached_corners(), 0);
    }

    #[test]
    fn test_field_cache_prepares_once_per_chunk() {
        let cache = CaveFieldCache::new(2);
        let builds = Cell::new(0);
        let prepare = |c: ChunkCoord| {
            builds.set(builds.get() + 1);
            c.x * 10 + c.z
        };

        assert_eq!(*cache.get_or_prepare(ChunkCoord::new(1, 2), prepare), 12);
        assert_eq!(*cache.get_or_prepare(ChunkCoord::new(1, 2), prepare), 12);
        assert_eq!(builds.get(), 1);

        let _ = cache.get_or_prepare(ChunkCoord::new(3, 4), prepare);
        // Touch (1, 2) so (3, 4) is the one evicted.
        let _ = cache.get_or_prepare(ChunkCoord::new(1, 2), prepare);
        let _ = cache.get_or_prepare(ChunkCoord::new(5, 6), prepare);
        assert_eq!(cache.len(), 2);
        assert_eq!(builds.get(), 3);

        let _ = cache.get_or_prepare(ChunkCoord::new(1, 2), prepare);
        assert_eq!(builds.get(), 3);
        let _ = cache.get_or_prepare(ChunkCoord::new(3, 4), prepare);
        assert_eq!(builds.get(), 4);
    }
}
