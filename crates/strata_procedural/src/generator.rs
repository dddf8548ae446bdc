//! # Terrain Generators
//!
//! [`TerrainGenerator`] is the surface the rest of the engine talks to.
//! Two pipelines implement it through one generic [`TerrainEngine`]:
//!
//! | Kind        | Pass-1 height       | Caves           |
//! |-------------|---------------------|-----------------|
//! | `Spline`    | continental spline  | ridged 3D noise |
//! | `HybridSdf` | six-parameter model | SDF primitives  |
//!
//! Per chunk: climate (interpolated) → height and biome → caves → water.
//! Point queries (`height_at`, `biome_at`) run the same steps for one column
//! and agree exactly with the chunk pipeline, because the interpolation grid
//! is aligned to world coordinates rather than chunks.

use std::sync::Arc;
use std::time::Instant;

use crate::biome::{Biome, BiomeClassifier};
use crate::caves::{CaveCarver, NoiseCaveCarver, SdfCaveCarver};
use crate::chunk::{ChunkCoord, ChunkVolume, ColumnCell, ColumnSurface, VoxelState, CHUNK_SIZE};
use crate::climate::{ClimateSampler, ParameterVector};
use crate::config::{GeneratorKind, TerrainConfig};
use crate::context::{CaveFieldCache, ChunkGenContext};
use crate::error::TerrainResult;
use crate::height::{BaseHeightModel, HeightSample, HeightSynthesizer};
use crate::interpolation::InterpolationGridCache;
use crate::noise::WorldSeed;
use crate::progress::{stage, NoopProgress, ProgressSink};
use crate::water::BasinFiller;

/// Deterministic terrain source for one world.
///
/// Implementations are immutable after construction and safe to share
/// between chunk workers.
pub trait TerrainGenerator: Send + Sync {
    /// Pipeline this generator runs.
    fn kind(&self) -> GeneratorKind;

    /// World seed.
    fn seed(&self) -> WorldSeed;

    /// Frozen configuration.
    fn config(&self) -> &TerrainConfig;

    /// Shared parameter sampler.
    fn sampler(&self) -> &ClimateSampler;

    /// Raw continentalness at sea level.
    fn continentalness_at(&self, x: i32, z: i32) -> f32 {
        self.sampler().sample_raw(f64::from(x), f64::from(z)).continentalness
    }

    /// Raw erosion at sea level.
    fn erosion_at(&self, x: i32, z: i32) -> f32 {
        self.sampler().sample_raw(f64::from(x), f64::from(z)).erosion
    }

    /// Raw peaks/valleys at sea level.
    fn peaks_valleys_at(&self, x: i32, z: i32) -> f32 {
        self.sampler().sample_raw(f64::from(x), f64::from(z)).peaks_valleys
    }

    /// Raw weirdness at sea level.
    fn weirdness_at(&self, x: i32, z: i32) -> f32 {
        self.sampler().sample_raw(f64::from(x), f64::from(z)).weirdness
    }

    /// Raw temperature at sea level (no altitude cooling).
    fn temperature_at(&self, x: i32, z: i32) -> f32 {
        self.sampler().sample_raw(f64::from(x), f64::from(z)).temperature
    }

    /// Raw humidity at sea level.
    fn humidity_at(&self, x: i32, z: i32) -> f32 {
        self.sampler().sample_raw(f64::from(x), f64::from(z)).humidity
    }

    /// Height, biome and cooled parameters of one column.
    fn surface_at(&self, x: i32, z: i32) -> HeightSample;

    /// Biome of a column.
    fn biome_at(&self, x: i32, z: i32) -> Biome {
        self.surface_at(x, z).biome
    }

    /// Final (post-modifier) surface height of a column.
    fn height_at(&self, x: i32, z: i32) -> i32 {
        self.surface_at(x, z).y
    }

    /// Cave carve density at a voxel, `>= 0`.
    ///
    /// Builds the cave field of the voxel's chunk on first use and keeps it
    /// for the next few chunks queried, so sweeping one chunk costs one
    /// field. Callers holding a [`ChunkGenContext`] can skip the lookup with
    /// [`TerrainEngine::cave_density_in`].
    fn cave_density(&self, x: i32, y: i32, z: i32, surface: i32) -> f32;

    /// Solid/air classification of one column, bottom-up. Water is a
    /// chunk-level pass and does not appear here.
    fn generate_column(&self, x: i32, z: i32) -> Vec<ColumnCell>;

    /// Full pipeline for one chunk, reporting stages to `progress`.
    fn generate_chunk_with_progress(&self, coord: ChunkCoord, progress: &dyn ProgressSink) -> ChunkVolume;

    /// Full pipeline for one chunk.
    fn generate_chunk(&self, coord: ChunkCoord) -> ChunkVolume {
        self.generate_chunk_with_progress(coord, &NoopProgress)
    }
}

/// Everything both pipelines share.
pub struct TerrainCore {
    seed: WorldSeed,
    config: TerrainConfig,
    sampler: ClimateSampler,
    synthesizer: HeightSynthesizer,
    water: BasinFiller,
}

impl TerrainCore {
    /// Builds the shared stages.
    ///
    /// # Errors
    ///
    /// Config validation errors, or a malformed built-in spline.
    pub fn new(seed: WorldSeed, config: TerrainConfig, model: BaseHeightModel) -> TerrainResult<Self> {
        config.validate()?;
        let sea_level = config.world.sea_level;
        Ok(Self {
            sampler: ClimateSampler::new(seed, &config.climate, sea_level),
            synthesizer: HeightSynthesizer::new(seed, model, BiomeClassifier::standard(), &config)?,
            water: BasinFiller::new(sea_level, config.water.clone()),
            seed,
            config,
        })
    }

    /// Height synthesizer.
    #[must_use]
    pub fn synthesizer(&self) -> &HeightSynthesizer {
        &self.synthesizer
    }

    fn interpolation_cell(&self) -> i32 {
        self.config.climate.interpolation_cell
    }

    fn world_height(&self) -> usize {
        self.config.world.world_height as usize
    }

    /// Column sample through a caller-owned interpolation source.
    fn column_sample(&self, raw: &ParameterVector, x: i32, z: i32) -> HeightSample {
        self.synthesizer.sample(x, z, raw)
    }

    /// Column sample through a throwaway cache.
    fn isolated_sample(&self, x: i32, z: i32) -> HeightSample {
        let mut cache = InterpolationGridCache::new(self.interpolation_cell());
        let raw = cache.sample_raw_interpolated(&self.sampler, x, z);
        self.column_sample(&raw, x, z)
    }
}

/// Pipeline generic over its cave carver.
pub struct TerrainEngine<C: CaveCarver> {
    core: TerrainCore,
    carver: C,
    kind: GeneratorKind,
    cave_fields: CaveFieldCache<C::Field>,
}

/// Continental spline heights with noise caves.
pub type SplineGenerator = TerrainEngine<NoiseCaveCarver>;

/// Six-parameter heights with SDF caves.
pub type HybridSdfGenerator = TerrainEngine<SdfCaveCarver>;

impl SplineGenerator {
    /// Builds the spline pipeline.
    ///
    /// # Errors
    ///
    /// See [`TerrainCore::new`].
    pub fn spline(seed: WorldSeed, config: TerrainConfig) -> TerrainResult<Self> {
        let carver = NoiseCaveCarver::new(seed, config.caves.clone());
        let core = TerrainCore::new(seed, config, BaseHeightModel::ContinentalSpline)?;
        Ok(Self {
            core,
            carver,
            kind: GeneratorKind::Spline,
            cave_fields: CaveFieldCache::default(),
        })
    }
}

impl HybridSdfGenerator {
    /// Builds the hybrid SDF pipeline.
    ///
    /// # Errors
    ///
    /// See [`TerrainCore::new`].
    pub fn hybrid_sdf(seed: WorldSeed, config: TerrainConfig) -> TerrainResult<Self> {
        let carver = SdfCaveCarver::new(seed, config.caves.clone());
        let core = TerrainCore::new(seed, config, BaseHeightModel::MultiParameter)?;
        Ok(Self {
            core,
            carver,
            kind: GeneratorKind::HybridSdf,
            cave_fields: CaveFieldCache::default(),
        })
    }
}

impl<C: CaveCarver> TerrainEngine<C> {
    /// Shared stages.
    #[must_use]
    pub fn core(&self) -> &TerrainCore {
        &self.core
    }

    /// Cave carver.
    #[must_use]
    pub fn carver(&self) -> &C {
        &self.carver
    }

    /// Fresh per-chunk context with the chunk's cave field.
    #[must_use]
    pub fn chunk_context(&self, coord: ChunkCoord) -> ChunkGenContext<C::Field> {
        let field = self.cave_fields.get_or_prepare(coord, |c| self.carver.prepare_chunk(c));
        ChunkGenContext::new(coord, self.core.interpolation_cell(), field)
    }

    /// Cave density through a context's field. Matches
    /// [`TerrainGenerator::cave_density`] for voxels inside the context's chunk.
    #[must_use]
    pub fn cave_density_in(&self, ctx: &ChunkGenContext<C::Field>, x: i32, y: i32, z: i32, surface: i32) -> f32 {
        self.carver.density(ctx.cave_field(), x, y, z, surface)
    }

    /// Chunks whose cave fields are held for point queries.
    #[must_use]
    pub fn cached_cave_fields(&self) -> usize {
        self.cave_fields.len()
    }

    fn point_field(&self, x: i32, z: i32) -> Arc<C::Field> {
        self.cave_fields
            .get_or_prepare(ChunkCoord::from_block_pos(x, z), |c| self.carver.prepare_chunk(c))
    }

    /// Lowest and highest Y worth asking the carver about for a column.
    fn carve_span(&self, surface: i32) -> (i32, i32) {
        let caves = &self.core.config.caves;
        let low = caves.floor_y.max(1);
        let high = (surface - caves.min_depth).min(caves.ceiling_y);
        (low, high)
    }

    fn fill_column(&self, volume: &mut ChunkVolume, lx: usize, lz: usize, surface: i32) {
        let top = (surface.max(0) as usize).min(volume.height().saturating_sub(1));
        for y in 0..=top {
            volume.set(lx, y, lz, VoxelState::Solid);
        }
    }
}

impl<C: CaveCarver> TerrainGenerator for TerrainEngine<C> {
    fn kind(&self) -> GeneratorKind {
        self.kind
    }

    fn seed(&self) -> WorldSeed {
        self.core.seed
    }

    fn config(&self) -> &TerrainConfig {
        &self.core.config
    }

    fn sampler(&self) -> &ClimateSampler {
        &self.core.sampler
    }

    fn surface_at(&self, x: i32, z: i32) -> HeightSample {
        self.core.isolated_sample(x, z)
    }

    fn cave_density(&self, x: i32, y: i32, z: i32, surface: i32) -> f32 {
        let field = self.point_field(x, z);
        self.carver.density(&field, x, y, z, surface)
    }

    fn generate_column(&self, x: i32, z: i32) -> Vec<ColumnCell> {
        let sample = self.core.isolated_sample(x, z);
        let field = self.point_field(x, z);
        let (low, high) = self.carve_span(sample.y);

        (0..self.core.world_height() as i32)
            .map(|y| {
                let carved = y >= low && y <= high && self.carver.density(&field, x, y, z, sample.y) > 0.0;
                let state = if y <= sample.y && !carved {
                    VoxelState::Solid
                } else {
                    VoxelState::Air
                };
                ColumnCell {
                    y,
                    state,
                    biome: sample.biome,
                }
            })
            .collect()
    }

    fn generate_chunk_with_progress(&self, coord: ChunkCoord, progress: &dyn ProgressSink) -> ChunkVolume {
        let start = Instant::now();
        let core = &self.core;
        let mut volume = ChunkVolume::new(coord, core.world_height());

        progress.stage(stage::SURFACE);
        let mut ctx = self.chunk_context(coord);
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let (x, z) = (coord.block_x(lx), coord.block_z(lz));
                let raw = ctx.raw_params(&core.sampler, x, z);
                let sample = core.column_sample(&raw, x, z);
                volume.set_surface(
                    lx,
                    lz,
                    ColumnSurface {
                        height: sample.y,
                        biome: sample.biome,
                        params: sample.params,
                    },
                );
                self.fill_column(&mut volume, lx, lz, sample.y);
            }
        }
        let corners = ctx.finish_surface();

        progress.stage(stage::CAVES);
        let mut carved = 0usize;
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let (x, z) = (coord.block_x(lx), coord.block_z(lz));
                let surface = volume.surface_height(lx, lz);
                let (low, high) = self.carve_span(surface);
                for y in low..=high {
                    if self.cave_density_in(&ctx, x, y, z, surface) > 0.0 {
                        volume.set(lx, y as usize, lz, VoxelState::Air);
                        carved += 1;
                    }
                }
            }
        }

        progress.stage(stage::WATER);
        let flooded = core.water.fill(&mut volume);
        progress.stage(stage::DONE);

        tracing::debug!(
            "Chunk [{},{}]: {} corners, {} carved, {} flooded in {:?}",
            coord.x,
            coord.z,
            corners,
            carved,
            flooded,
            start.elapsed()
        );
        volume
    }
}

/// Builds the generator a config asks for.
///
/// # Errors
///
/// Config validation errors.
pub fn create_generator(seed: WorldSeed, config: &TerrainConfig) -> TerrainResult<Box<dyn TerrainGenerator>> {
    let generator: Box<dyn TerrainGenerator> = match config.generator {
        GeneratorKind::Spline => Box::new(SplineGenerator::spline(seed, config.clone())?),
        GeneratorKind::HybridSdf => Box::new(HybridSdfGenerator::hybrid_sdf(seed, config.clone())?),
    };
    tracing::info!(
        "Created {:?} terrain generator for seed {:#x}",
        config.generator,
        seed.value()
    );
    Ok(generator)
}
