//! # STRATA Procedural Terrain
//!
//! Deterministic terrain synthesis for voxel worlds.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and config always produce the same world
//! 2. **Chunked**: Each chunk is generated independently, in any order
//! 3. **Seamless**: Neighbouring chunks agree on every shared column and cave
//! 4. **Classification only**: Output is solid/air/water plus biome and
//!    height; materials and meshes belong to the chunk store
//!
//! ## Pipeline
//!
//! - `ClimateSampler`: six parameter fields per column
//! - `InterpolationGridCache`: coarse-grid bilinear sampling per chunk
//! - `HeightSynthesizer`: spline base height, biome selection, modifiers
//! - `CaveCarver`: ridged-noise or SDF caves below a minimum depth
//! - `BasinFiller`: ocean flood fill that leaves sealed caves dry
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_procedural::{create_generator, ChunkCoord, TerrainConfig, WorldSeed};
//!
//! let config = TerrainConfig::default();
//! let generator = create_generator(WorldSeed::new(12345), &config)?;
//!
//! let height = generator.height_at(100, 200);
//! let volume = generator.generate_chunk(ChunkCoord::from_block_pos(100, 200));
//! assert_eq!(volume.surface_height(4, 8), height);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod batch;
pub mod biome;
pub mod caves;
pub mod chunk;
pub mod climate;
pub mod config;
pub mod context;
pub mod easing;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod hash;
pub mod height;
pub mod interpolation;
pub mod noise;
pub mod progress;
pub mod sdf;
pub mod spatial_grid;
pub mod spline;
pub mod surface;
pub mod water;

pub use batch::generate_batch;
pub use biome::{Biome, BiomeClassifier, BiomeDefinition, BiomeTable, DimensionWeights, ParameterRange};
pub use caves::{altitude_factor, CaveCarver, NoiseCaveCarver, SdfCaveCarver};
pub use chunk::{ChunkCoord, ChunkVolume, ColumnCell, ColumnSurface, VoxelState, CHUNK_HEIGHT, CHUNK_SIZE};
pub use climate::{ClimateSampler, ParameterVector};
pub use config::{GeneratorKind, TerrainConfig};
pub use context::{CaveFieldCache, ChunkGenContext};
pub use error::{TerrainError, TerrainResult};
pub use generator::{
    create_generator, HybridSdfGenerator, SplineGenerator, TerrainCore, TerrainEngine, TerrainGenerator,
};
pub use geometry::{Aabb, Vec3};
pub use hash::position_hash;
pub use height::{BaseHeightModel, HeightModifier, HeightSample, HeightSynthesizer};
pub use interpolation::{GridKey, InterpolationGridCache};
pub use noise::{FractalNoise, FractalSettings, SimplexNoise, WorldSeed};
pub use progress::{NoopProgress, ProgressSink, TracingProgress};
pub use sdf::{SdfPrimitive, NO_EFFECT};
pub use spatial_grid::{CellKey, SpatialHashGrid};
pub use spline::{Spline, SplinePoint};
pub use surface::{SpawnHeight, SpawnSource, SurfaceIndex};
pub use water::BasinFiller;
