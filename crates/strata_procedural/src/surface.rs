//! # Surface Index and Spawn Heights
//!
//! Remembers the surface of every chunk generated so far and answers "where
//! can a player stand at (x, z)?" without regenerating terrain.
//!
//! Lookups degrade instead of failing:
//!
//! 1. **Exact**: the column is indexed and above sea level.
//! 2. **Nearby**: the closest dry indexed column within the search radius.
//! 3. **ChunkAverage**: the containing chunk is indexed but has no dry land.
//! 4. **Default**: nothing is known; a fixed height.
//!
//! Every step past the first logs a warning.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::chunk::{ChunkCoord, ChunkVolume, CHUNK_SIZE};

/// Where a spawn height came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnSource {
    /// The requested column.
    Exact,
    /// A dry column this far away (Chebyshev distance in blocks).
    Nearby {
        /// Ring distance searched.
        distance: i32,
    },
    /// Average surface of the containing chunk.
    ChunkAverage,
    /// Nothing indexed; fixed fallback.
    Default,
}

/// A spawn height with its provenance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnHeight {
    /// Y to place the player's feet at.
    pub y: i32,
    /// How the height was found.
    pub source: SpawnSource,
}

#[derive(Clone, Copy, Debug)]
struct ChunkSurface {
    heights: [[i32; CHUNK_SIZE]; CHUNK_SIZE],
    average: i32,
}

/// Thread-safe index of generated chunk surfaces.
pub struct SurfaceIndex {
    chunks: RwLock<HashMap<ChunkCoord, ChunkSurface>>,
    sea_level: i32,
    default_y: i32,
    search_radius: i32,
}

impl SurfaceIndex {
    /// Default nearby-column search radius in blocks.
    pub const DEFAULT_SEARCH_RADIUS: i32 = 8;

    /// Creates an empty index. `default_y` is the last-resort spawn height.
    #[must_use]
    pub fn new(sea_level: i32, default_y: i32) -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
            sea_level,
            default_y,
            search_radius: Self::DEFAULT_SEARCH_RADIUS,
        }
    }

    /// Overrides the nearby-column search radius.
    #[must_use]
    pub fn with_search_radius(mut self, radius: i32) -> Self {
        self.search_radius = radius.max(0);
        self
    }

    /// Indexes the surface of a generated chunk, replacing any prior entry.
    pub fn record(&self, volume: &ChunkVolume) {
        let mut heights = [[0; CHUNK_SIZE]; CHUNK_SIZE];
        for (z, row) in heights.iter_mut().enumerate() {
            for (x, h) in row.iter_mut().enumerate() {
                *h = volume.surface_height(x, z);
            }
        }
        let surface = ChunkSurface {
            heights,
            average: volume.average_surface_height(),
        };
        self.chunks.write().insert(volume.coord, surface);
    }

    /// Drops a chunk from the index.
    pub fn forget(&self, coord: ChunkCoord) {
        self.chunks.write().remove(&coord);
    }

    /// Number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    /// Whether nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }

    /// Indexed surface height of a world column, if known.
    #[must_use]
    pub fn surface_height(&self, x: i32, z: i32) -> Option<i32> {
        let chunks = self.chunks.read();
        Self::lookup(&chunks, x, z)
    }

    fn lookup(chunks: &HashMap<ChunkCoord, ChunkSurface>, x: i32, z: i32) -> Option<i32> {
        let coord = ChunkCoord::from_block_pos(x, z);
        let lx = (x - coord.world_x()) as usize;
        let lz = (z - coord.world_z()) as usize;
        chunks.get(&coord).map(|c| c.heights[lz][lx])
    }

    fn is_dry(&self, height: i32) -> bool {
        height >= self.sea_level
    }

    /// Spawn height for a world column, degrading through the fallback chain.
    #[must_use]
    pub fn spawn_height(&self, x: i32, z: i32) -> SpawnHeight {
        let chunks = self.chunks.read();

        if let Some(h) = Self::lookup(&chunks, x, z).filter(|&h| self.is_dry(h)) {
            return SpawnHeight {
                y: h + 1,
                source: SpawnSource::Exact,
            };
        }

        // Rings of growing Chebyshev distance; first dry hit wins, scanned
        // in a fixed order so the answer is deterministic.
        for distance in 1..=self.search_radius {
            for dz in -distance..=distance {
                for dx in -distance..=distance {
                    if dx.abs() != distance && dz.abs() != distance {
                        continue;
                    }
                    let (Some(nx), Some(nz)) = (x.checked_add(dx), z.checked_add(dz)) else {
                        continue;
                    };
                    if let Some(h) = Self::lookup(&chunks, nx, nz).filter(|&h| self.is_dry(h)) {
                        tracing::warn!(
                            "Spawn at ({}, {}) not dry, using column {} blocks away",
                            x,
                            z,
                            distance
                        );
                        return SpawnHeight {
                            y: h + 1,
                            source: SpawnSource::Nearby { distance },
                        };
                    }
                }
            }
        }

        if let Some(chunk) = chunks.get(&ChunkCoord::from_block_pos(x, z)) {
            tracing::warn!("Spawn at ({}, {}) fell back to chunk average", x, z);
            return SpawnHeight {
                y: chunk.average.max(self.sea_level) + 1,
                source: SpawnSource::ChunkAverage,
            };
        }

        tracing::warn!(
            "Spawn at ({}, {}) has no indexed terrain, using default height {}",
            x,
            z,
            self.default_y
        );
        SpawnHeight {
            y: self.default_y,
            source: SpawnSource::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ColumnSurface;

    fn volume_with(coord: ChunkCoord, height: impl Fn(usize, usize) -> i32) -> ChunkVolume {
        let mut volume = ChunkVolume::new(coord, 128);
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                volume.set_surface(
                    x,
                    z,
                    ColumnSurface {
                        height: height(x, z),
                        ..ColumnSurface::default()
                    },
                );
            }
        }
        volume
    }

    #[test]
    fn test_exact_column() {
        let index = SurfaceIndex::new(64, 100);
        index.record(&volume_with(ChunkCoord::new(0, 0), |x, _| 70 + x as i32));
        assert_eq!(
            index.spawn_height(3, 9),
            SpawnHeight {
                y: 74,
                source: SpawnSource::Exact
            }
        );
        assert_eq!(index.surface_height(3, 9), Some(73));
    }

    #[test]
    fn test_nearby_dry_column() {
        let index = SurfaceIndex::new(64, 100);
        // Ocean everywhere except a strip at x = 12.
        index.record(&volume_with(ChunkCoord::new(0, 0), |x, _| if x == 12 { 66 } else { 40 }));
        let spawn = index.spawn_height(9, 5);
        assert_eq!(spawn.source, SpawnSource::Nearby { distance: 3 });
        assert_eq!(spawn.y, 67);
    }

    #[test]
    fn test_nearby_search_crosses_chunk_borders() {
        let index = SurfaceIndex::new(64, 100);
        index.record(&volume_with(ChunkCoord::new(0, 0), |_, _| 30));
        index.record(&volume_with(ChunkCoord::new(-1, 0), |_, _| 80));
        let spawn = index.spawn_height(1, 4);
        assert_eq!(spawn.source, SpawnSource::Nearby { distance: 2 });
        assert_eq!(spawn.y, 81);
    }

    #[test]
    fn test_chunk_average_then_default() {
        let index = SurfaceIndex::new(64, 100).with_search_radius(2);
        index.record(&volume_with(ChunkCoord::new(4, 4), |_, _| 30));
        let spawn = index.spawn_height(72, 72);
        assert_eq!(spawn.source, SpawnSource::ChunkAverage);
        assert_eq!(spawn.y, 65);

        let unknown = index.spawn_height(-500, 900);
        assert_eq!(
            unknown,
            SpawnHeight {
                y: 100,
                source: SpawnSource::Default
            }
        );
    }

    #[test]
    fn test_search_at_world_edge() {
        let index = SurfaceIndex::new(64, 100);
        let edge = ChunkCoord::from_block_pos(i32::MAX, i32::MIN);
        index.record(&volume_with(edge, |x, _| if x == 12 { 70 } else { 30 }));
        let spawn = index.spawn_height(i32::MAX, i32::MIN);
        assert_eq!(spawn.source, SpawnSource::Nearby { distance: 3 });
        assert_eq!(spawn.y, 71);
    }

    #[test]
    fn test_forget_removes_chunk() {
        let index = SurfaceIndex::new(64, 100);
        index.record(&volume_with(ChunkCoord::new(1, 1), |_, _| 70));
        assert_eq!(index.len(), 1);
        index.forget(ChunkCoord::new(1, 1));
        assert!(index.is_empty());
        assert_eq!(index.spawn_height(20, 20).source, SpawnSource::Default);
    }
}
