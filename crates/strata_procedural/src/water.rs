//! # Water Basin Filling
//!
//! Water is poured, not painted: a breadth-first flood starts at verified
//! ocean entries and spreads 6-connected through air strictly below sea
//! level. Air that the flood cannot reach stays air, so a sealed cave below
//! sea level stays dry while one opening onto the sea floor fills.
//!
//! An ocean entry is the air voxel just under the sea surface of a column
//! whose continentalness is below the ocean threshold, whose terrain surface
//! lies below that voxel, and which has solid ground beneath it. A cave that
//! crosses sea level under dry ground is never an entry, whatever the
//! column's continentalness.
//!
//! The flood stays inside one chunk. A cave opening onto the sea floor in
//! one chunk fills up to the chunk edge; its continuation in a neighbour
//! only fills if the neighbour has its own opening. Chunks are generated
//! independently, so a neighbour's connectivity is never known here.

use std::collections::VecDeque;

use crate::chunk::{ChunkVolume, VoxelState, CHUNK_SIZE};
use crate::config::WaterSettings;

/// Flood-fills ocean water into a chunk volume.
#[derive(Clone, Debug)]
pub struct BasinFiller {
    sea_level: i32,
    settings: WaterSettings,
}

impl BasinFiller {
    /// Creates a filler for a world with the given sea level.
    #[must_use]
    pub fn new(sea_level: i32, settings: WaterSettings) -> Self {
        Self { sea_level, settings }
    }

    /// Local columns that qualify as ocean entries, as `(x, y, z)`.
    #[must_use]
    pub fn ocean_entries(&self, volume: &ChunkVolume) -> Vec<(usize, usize, usize)> {
        let top = self.sea_level - 1;
        if top < 1 || top as usize >= volume.height() {
            return Vec::new();
        }
        let y = top as usize;

        let mut entries = Vec::new();
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let surface = volume.surface(x, z);
                if surface.params.continentalness >= self.settings.ocean_threshold {
                    continue;
                }
                // Open sea only: the entry sits above the column's terrain.
                if surface.height >= top || volume.get(x, y, z) != VoxelState::Air {
                    continue;
                }
                let grounded = (0..y).any(|below| volume.get(x, below, z).is_solid());
                if grounded {
                    entries.push((x, y, z));
                }
            }
        }
        entries
    }

    /// Floods the volume. Returns the number of voxels turned to water.
    pub fn fill(&self, volume: &mut ChunkVolume) -> usize {
        if !self.settings.enabled {
            return 0;
        }
        let entries = self.ocean_entries(volume);
        if entries.is_empty() {
            return 0;
        }

        // Water never rises to or above the sea surface.
        let ceiling = (self.sea_level.max(0) as usize).min(volume.height());
        let budget = self.settings.max_fill;
        let mut filled = 0;
        let mut queue: VecDeque<(usize, usize, usize)> = VecDeque::new();

        for (x, y, z) in entries {
            if volume.get(x, y, z) == VoxelState::Air && filled < budget {
                volume.set(x, y, z, VoxelState::Water);
                filled += 1;
                queue.push_back((x, y, z));
            }
        }

        while let Some((x, y, z)) = queue.pop_front() {
            if filled >= budget {
                tracing::debug!(
                    "Chunk [{},{}]: water fill budget of {} exhausted",
                    volume.coord.x,
                    volume.coord.z,
                    budget
                );
                break;
            }
            let neighbours = [
                (x.wrapping_sub(1), y, z),
                (x + 1, y, z),
                (x, y.wrapping_sub(1), z),
                (x, y + 1, z),
                (x, y, z.wrapping_sub(1)),
                (x, y, z + 1),
            ];
            for (nx, ny, nz) in neighbours {
                // Wrapped indices land far out of range and are skipped.
                if nx >= CHUNK_SIZE || nz >= CHUNK_SIZE || ny >= ceiling {
                    continue;
                }
                if volume.get(nx, ny, nz) == VoxelState::Air && filled < budget {
                    volume.set(nx, ny, nz, VoxelState::Water);
                    filled += 1;
                    queue.push_back((nx, ny, nz));
                }
            }
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkCoord, ColumnSurface};
    use crate::climate::ParameterVector;

    const SEA: i32 = 64;

    /// Solid up to `ground` everywhere, every column marked as `continentalness`.
    fn flat_volume(ground: usize, continentalness: f32) -> ChunkVolume {
        let mut volume = ChunkVolume::new(ChunkCoord::new(0, 0), 128);
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                for y in 0..=ground {
                    volume.set(x, y, z, VoxelState::Solid);
                }
                volume.set_surface(
                    x,
                    z,
                    ColumnSurface {
                        height: ground as i32,
                        params: ParameterVector {
                            continentalness,
                            ..ParameterVector::NEUTRAL
                        },
                        ..ColumnSurface::default()
                    },
                );
            }
        }
        volume
    }

    fn filler() -> BasinFiller {
        BasinFiller::new(SEA, WaterSettings::default())
    }

    #[test]
    fn test_ocean_fills_to_sea_level() {
        let mut volume = flat_volume(40, -0.6);
        let filled = filler().fill(&mut volume);
        // Layers 41..=63 of every column.
        assert_eq!(filled, 23 * CHUNK_SIZE * CHUNK_SIZE);
        assert_eq!(volume.get(5, 63, 5), VoxelState::Water);
        assert_eq!(volume.get(5, 64, 5), VoxelState::Air);
        assert_eq!(volume.get(5, 40, 5), VoxelState::Solid);
    }

    #[test]
    fn test_land_is_not_an_entry() {
        let mut volume = flat_volume(40, 0.3);
        assert_eq!(filler().fill(&mut volume), 0);
        assert_eq!(volume.count(VoxelState::Water), 0);
    }

    #[test]
    fn test_enclosed_cave_stays_dry() {
        let mut volume = flat_volume(40, -0.6);
        // Sealed pocket well inside the rock.
        for x in 4..9 {
            for y in 20..25 {
                for z in 4..9 {
                    volume.set(x, y, z, VoxelState::Air);
                }
            }
        }
        filler().fill(&mut volume);
        assert_eq!(volume.get(6, 22, 6), VoxelState::Air);
        assert_eq!(volume.get(6, 50, 6), VoxelState::Water);
    }

    #[test]
    fn test_connected_cave_floods() {
        let mut volume = flat_volume(40, -0.6);
        for x in 4..9 {
            for y in 20..25 {
                for z in 4..9 {
                    volume.set(x, y, z, VoxelState::Air);
                }
            }
        }
        // Vertical passage from the pocket to the sea floor.
        for y in 25..=40 {
            volume.set(6, y, 6, VoxelState::Air);
        }
        filler().fill(&mut volume);
        assert_eq!(volume.get(6, 22, 6), VoxelState::Water);
        assert_eq!(volume.get(4, 20, 8), VoxelState::Water);
    }

    #[test]
    fn test_cave_under_land_crossing_sea_level_stays_dry() {
        let mut volume = flat_volume(90, 0.4);
        for x in 2..12 {
            for y in 55..70 {
                volume.set(x, y, 7, VoxelState::Air);
            }
        }
        assert_eq!(filler().fill(&mut volume), 0);
        assert_eq!(volume.get(5, 60, 7), VoxelState::Air);
    }

    #[test]
    fn test_cave_under_ocean_classed_land_stays_dry() {
        // Low continentalness, but the terrain rises above the sea.
        let mut volume = flat_volume(90, -0.3);
        for x in 2..12 {
            for y in 55..70 {
                volume.set(x, y, 7, VoxelState::Air);
            }
        }
        assert!(filler().ocean_entries(&volume).is_empty());
        assert_eq!(filler().fill(&mut volume), 0);
        assert_eq!(volume.get(5, 60, 7), VoxelState::Air);
        assert_eq!(volume.get(5, 63, 7), VoxelState::Air);
    }

    #[test]
    fn test_flood_fills_tunnel_up_to_chunk_edge() {
        let mut volume = flat_volume(40, -0.6);
        // Tunnel from the sea floor running into the east face of the chunk.
        for y in 30..=40 {
            volume.set(13, y, 8, VoxelState::Air);
        }
        for x in 13..CHUNK_SIZE {
            volume.set(x, 30, 8, VoxelState::Air);
        }
        let filled = filler().fill(&mut volume);
        assert_eq!(volume.get(15, 30, 8), VoxelState::Water);
        // Open sea, the shaft and the tunnel; nothing leaks past x = 15.
        assert_eq!(filled, 23 * CHUNK_SIZE * CHUNK_SIZE + 11 + 2);
    }

    #[test]
    fn test_fill_budget_is_respected() {
        let mut volume = flat_volume(40, -0.6);
        let capped = BasinFiller::new(
            SEA,
            WaterSettings {
                max_fill: 100,
                ..WaterSettings::default()
            },
        );
        assert_eq!(capped.fill(&mut volume), 100);
        assert_eq!(volume.count(VoxelState::Water), 100);
    }
}
