//! # Chunk Volumes
//!
//! The generator classifies voxels; it never stores block materials. A
//! [`ChunkVolume`] is the classification result for one 16x16 column block:
//!
//! - one [`VoxelState`] per voxel (solid, air or water)
//! - one [`ColumnSurface`] per column (surface height, biome, parameters)
//!
//! The external chunk store turns this into blocks and meshes.

use crate::biome::Biome;
use crate::climate::ParameterVector;

/// Chunk width/depth in blocks.
pub const CHUNK_SIZE: usize = 16;

/// Default world height in blocks.
pub const CHUNK_HEIGHT: usize = 256;

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world block coordinates to chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_SIZE as i32),
            z: block_z.div_euclid(CHUNK_SIZE as i32),
        }
    }

    /// Returns the world X coordinate of the chunk's origin (corner).
    ///
    /// Chunks built from block positions always fit; coordinates past the
    /// i32 block range saturate.
    #[inline]
    #[must_use]
    pub const fn world_x(self) -> i32 {
        self.x.saturating_mul(CHUNK_SIZE as i32)
    }

    /// Returns the world Z coordinate of the chunk's origin.
    #[inline]
    #[must_use]
    pub const fn world_z(self) -> i32 {
        self.z.saturating_mul(CHUNK_SIZE as i32)
    }

    /// World X of a local column.
    #[inline]
    #[must_use]
    pub const fn block_x(self, local_x: usize) -> i32 {
        self.world_x().saturating_add(local_x as i32)
    }

    /// World Z of a local column.
    #[inline]
    #[must_use]
    pub const fn block_z(self, local_z: usize) -> i32 {
        self.world_z().saturating_add(local_z as i32)
    }

    /// Whether a world column lies inside this chunk.
    #[inline]
    #[must_use]
    pub const fn contains_block(self, block_x: i32, block_z: i32) -> bool {
        let c = Self::from_block_pos(block_x, block_z);
        c.x == self.x && c.z == self.z
    }
}

/// Classification of one voxel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VoxelState {
    /// Empty.
    #[default]
    Air = 0,
    /// Terrain.
    Solid = 1,
    /// Ocean water.
    Water = 2,
}

impl VoxelState {
    /// Returns true if this voxel is terrain.
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Solid)
    }
}

/// One entry of a generated column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnCell {
    /// World Y.
    pub y: i32,
    /// Voxel classification.
    pub state: VoxelState,
    /// Column biome.
    pub biome: Biome,
}

/// Per-column surface data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSurface {
    /// Topmost solid voxel before caves.
    pub height: i32,
    /// Column biome.
    pub biome: Biome,
    /// Parameters cooled to the pass-1 height.
    pub params: ParameterVector,
}

impl Default for ColumnSurface {
    fn default() -> Self {
        Self {
            height: 0,
            biome: Biome::Plains,
            params: ParameterVector::NEUTRAL,
        }
    }
}

/// Classified voxels for one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkVolume {
    /// Chunk position in the world.
    pub coord: ChunkCoord,
    height: usize,
    /// Indexed as `[y][z][x]`.
    voxels: Vec<VoxelState>,
    /// Indexed as `[z][x]`.
    columns: [[ColumnSurface; CHUNK_SIZE]; CHUNK_SIZE],
}

impl ChunkVolume {
    /// Creates an all-air volume `height` voxels tall.
    #[must_use]
    pub fn new(coord: ChunkCoord, height: usize) -> Self {
        Self {
            coord,
            height,
            voxels: vec![VoxelState::Air; CHUNK_SIZE * CHUNK_SIZE * height],
            columns: [[ColumnSurface::default(); CHUNK_SIZE]; CHUNK_SIZE],
        }
    }

    /// Number of voxel layers.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        (x < CHUNK_SIZE && y < self.height && z < CHUNK_SIZE).then(|| (y * CHUNK_SIZE + z) * CHUNK_SIZE + x)
    }

    /// Gets a voxel at local coordinates. Out of range reads as air.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> VoxelState {
        self.index(x, y, z).map_or(VoxelState::Air, |i| self.voxels[i])
    }

    /// Sets a voxel at local coordinates. Out of range is ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, state: VoxelState) {
        if let Some(i) = self.index(x, y, z) {
            self.voxels[i] = state;
        }
    }

    /// Surface data of a local column.
    #[inline]
    #[must_use]
    pub fn surface(&self, x: usize, z: usize) -> ColumnSurface {
        if x < CHUNK_SIZE && z < CHUNK_SIZE {
            self.columns[z][x]
        } else {
            ColumnSurface::default()
        }
    }

    /// Sets the surface data of a local column.
    #[inline]
    pub fn set_surface(&mut self, x: usize, z: usize, surface: ColumnSurface) {
        if x < CHUNK_SIZE && z < CHUNK_SIZE {
            self.columns[z][x] = surface;
        }
    }

    /// Surface height of a local column.
    #[inline]
    #[must_use]
    pub fn surface_height(&self, x: usize, z: usize) -> i32 {
        self.surface(x, z).height
    }

    /// Biome of a local column.
    #[inline]
    #[must_use]
    pub fn biome(&self, x: usize, z: usize) -> Biome {
        self.surface(x, z).biome
    }

    /// Mean surface height over all columns.
    #[must_use]
    pub fn average_surface_height(&self) -> i32 {
        let total: i64 = self.columns.iter().flatten().map(|c| i64::from(c.height)).sum();
        (total / (CHUNK_SIZE * CHUNK_SIZE) as i64) as i32
    }

    /// Extracts one column bottom-up.
    #[must_use]
    pub fn column(&self, x: usize, z: usize) -> Vec<ColumnCell> {
        let biome = self.biome(x, z);
        (0..self.height)
            .map(|y| ColumnCell {
                y: y as i32,
                state: self.get(x, y, z),
                biome,
            })
            .collect()
    }

    /// Number of voxels in a given state.
    #[must_use]
    pub fn count(&self, state: VoxelState) -> usize {
        self.voxels.iter().filter(|&&v| v == state).count()
    }
}
