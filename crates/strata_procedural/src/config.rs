//! # Terrain Configuration
//!
//! Loaded once at world creation from TOML and then frozen. Every section is
//! optional; missing keys fall back to the defaults below, which are the
//! values the shipped `config/default_terrain.toml` spells out.
//!
//! The generator kind is part of the config on purpose: a world keeps the
//! pipeline it was created with, so the config is stored next to the seed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};
use crate::noise::FractalSettings;

/// Which pipeline a world uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// Continentalness spline heights, ridged-noise caves.
    Spline,
    /// Six-parameter spline heights, SDF caves.
    #[default]
    HybridSdf,
}

/// Vertical extent of the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldSettings {
    /// Number of voxel layers; heights are clamped to `[1, world_height - 1]`.
    pub world_height: i32,
    /// Y of the sea surface; water fills air strictly below it.
    pub sea_level: i32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            world_height: 256,
            sea_level: 64,
        }
    }
}

/// Noise fields behind the six terrain parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClimateSettings {
    /// Blocks of altitude above sea level that cool temperature by 1.0.
    pub altitude_chill_factor: f32,
    /// Edge length of the interpolation grid cells, in blocks.
    pub interpolation_cell: i32,
    /// Ocean vs land.
    pub continentalness: FractalSettings,
    /// Flat vs rugged.
    pub erosion: FractalSettings,
    /// Height extremes.
    pub peaks_valleys: FractalSettings,
    /// Terraces, plateaus, rare variants.
    pub weirdness: FractalSettings,
    /// Base temperature before altitude cooling.
    pub temperature: FractalSettings,
    /// Humidity.
    pub humidity: FractalSettings,
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            continentalness: FractalSettings::new(0.0011, 5),
            erosion: FractalSettings::new(0.0019, 4),
            peaks_valleys: FractalSettings::new(0.0042, 4),
            weirdness: FractalSettings::new(0.0035, 3),
            temperature: FractalSettings::new(0.0009, 3),
            humidity: FractalSettings::new(0.0013, 3),
            altitude_chill_factor: 300.0,
            interpolation_cell: 16,
        }
    }
}

/// Shape parameters of the height synthesizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeightSettings {
    /// Extra blocks added at `peaks_valleys = 1` on fully inland terrain.
    pub peaks_amplitude: f32,
    /// Weirdness above which the multi-parameter model terraces hillsides.
    pub terrace_threshold: f32,
    /// Plateau height of weirdness terraces.
    pub terrace_step: f32,
    /// Auxiliary noise used by the biome modifiers (dunes, canyons, peaks).
    pub detail: FractalSettings,
}

impl Default for HeightSettings {
    fn default() -> Self {
        Self {
            peaks_amplitude: 28.0,
            terrace_threshold: 0.55,
            terrace_step: 6.0,
            detail: FractalSettings::new(0.02, 3),
        }
    }
}

/// Cave carving parameters, shared by both cave variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaveSettings {
    /// Master switch.
    pub enabled: bool,
    /// No carving within this many blocks below the surface.
    pub min_depth: i32,
    /// Caves fade in above this Y.
    pub floor_y: i32,
    /// Lower edge of full cave density.
    pub peak_low_y: i32,
    /// Upper edge of full cave density.
    pub peak_high_y: i32,
    /// Density is gone by this Y.
    pub ceiling_y: i32,
    /// Ridged value (0..1) above which the noise variant carves.
    pub noise_threshold: f32,
    /// Vertical frequency multiplier of the ridged field.
    pub noise_y_scale: f64,
    /// Spacing of SDF seed candidates, in blocks.
    pub seed_spacing: i32,
    /// Density value a candidate needs before the chance roll.
    pub seed_threshold: f32,
    /// Chance a qualifying candidate spawns a system.
    pub seed_chance: f32,
    /// Share of systems that are chambers instead of tunnels.
    pub chamber_chance: f32,
    /// Ridged 3D field for the noise variant.
    pub noise: FractalSettings,
    /// 2D density field that decides where cave systems cluster.
    pub seed_density: FractalSettings,
}

impl Default for CaveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min_depth: 10,
            floor_y: 5,
            peak_low_y: 40,
            peak_high_y: 120,
            ceiling_y: 170,
            noise: FractalSettings::new(0.018, 2),
            noise_threshold: 0.86,
            noise_y_scale: 1.6,
            seed_spacing: 8,
            seed_density: FractalSettings::new(0.01, 2),
            seed_threshold: 0.1,
            seed_chance: 0.22,
            chamber_chance: 0.3,
        }
    }
}

/// Ocean flooding parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaterSettings {
    /// Master switch.
    pub enabled: bool,
    /// Continentalness below which a column may seed the flood.
    pub ocean_threshold: f32,
    /// Upper bound on voxels flooded per chunk.
    pub max_fill: usize,
}

impl Default for WaterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ocean_threshold: -0.19,
            max_fill: 16 * 16 * 256,
        }
    }
}

/// Complete terrain configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerrainConfig {
    /// Pipeline selection.
    pub generator: GeneratorKind,
    /// Vertical extent.
    pub world: WorldSettings,
    /// Parameter noise fields.
    pub climate: ClimateSettings,
    /// Height shaping.
    pub height: HeightSettings,
    /// Cave carving.
    pub caves: CaveSettings,
    /// Ocean flooding.
    pub water: WaterSettings,
}

impl TerrainConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::ConfigParse`] for malformed TOML and
    /// [`TerrainError::InvalidConfig`] for values that break an invariant.
    pub fn from_toml_str(source: &str) -> TerrainResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::ConfigIo`] if the file cannot be read, plus
    /// everything [`Self::from_toml_str`] can return.
    pub fn load(path: &Path) -> TerrainResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| TerrainError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(
            "Loaded terrain config from {} (generator: {:?})",
            path.display(),
            config.generator
        );
        Ok(config)
    }

    /// Renders the config as TOML, for storing next to the world seed.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::ConfigSerialize`] if serialization fails.
    pub fn to_toml_string(&self) -> TerrainResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Checks every invariant the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidConfig`] naming the first violation.
    pub fn validate(&self) -> TerrainResult<()> {
        let world = &self.world;
        if !(16..=4096).contains(&world.world_height) {
            return invalid(format!("world_height {} outside 16..=4096", world.world_height));
        }
        if world.sea_level <= 1 || world.sea_level >= world.world_height - 1 {
            return invalid(format!(
                "sea_level {} must lie strictly inside the world (height {})",
                world.sea_level, world.world_height
            ));
        }

        let climate = &self.climate;
        for (name, field) in [
            ("continentalness", &climate.continentalness),
            ("erosion", &climate.erosion),
            ("peaks_valleys", &climate.peaks_valleys),
            ("weirdness", &climate.weirdness),
            ("temperature", &climate.temperature),
            ("humidity", &climate.humidity),
            ("height.detail", &self.height.detail),
            ("caves.noise", &self.caves.noise),
            ("caves.seed_density", &self.caves.seed_density),
        ] {
            validate_fractal(name, field)?;
        }
        if !(climate.altitude_chill_factor.is_finite() && climate.altitude_chill_factor > 0.0) {
            return invalid("altitude_chill_factor must be positive".to_string());
        }
        if climate.interpolation_cell <= 0 {
            return invalid("interpolation_cell must be positive".to_string());
        }

        let height = &self.height;
        if !height.peaks_amplitude.is_finite() || !height.terrace_threshold.is_finite() {
            return invalid("height settings must be finite".to_string());
        }
        if !(height.terrace_step.is_finite() && height.terrace_step > 0.0) {
            return invalid("terrace_step must be positive".to_string());
        }

        let caves = &self.caves;
        if caves.min_depth < 0 {
            return invalid("caves.min_depth must not be negative".to_string());
        }
        if !(caves.floor_y <= caves.peak_low_y
            && caves.peak_low_y <= caves.peak_high_y
            && caves.peak_high_y <= caves.ceiling_y)
        {
            return invalid("cave band must satisfy floor <= peak_low <= peak_high <= ceiling".to_string());
        }
        if caves.seed_spacing <= 0 {
            return invalid("caves.seed_spacing must be positive".to_string());
        }
        for (name, value) in [
            ("noise_threshold", caves.noise_threshold),
            ("seed_chance", caves.seed_chance),
            ("chamber_chance", caves.chamber_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("caves.{name} must lie in [0, 1], got {value}"));
            }
        }
        if !caves.seed_threshold.is_finite() || !(caves.noise_y_scale.is_finite() && caves.noise_y_scale > 0.0) {
            return invalid("cave seed threshold and y scale must be finite".to_string());
        }

        if !self.water.ocean_threshold.is_finite() {
            return invalid("water.ocean_threshold must be finite".to_string());
        }
        Ok(())
    }
}

fn invalid(message: String) -> TerrainResult<()> {
    Err(TerrainError::InvalidConfig(message))
}

fn validate_fractal(name: &str, settings: &FractalSettings) -> TerrainResult<()> {
    if !(settings.frequency.is_finite() && settings.frequency > 0.0) {
        return invalid(format!("{name}.frequency must be positive"));
    }
    if settings.octaves == 0 || settings.octaves > 16 {
        return invalid(format!("{name}.octaves must lie in 1..=16"));
    }
    if !(settings.persistence.is_finite() && settings.persistence > 0.0) {
        return invalid(format!("{name}.persistence must be positive"));
    }
    if !(settings.lacunarity.is_finite() && settings.lacunarity >= 1.0) {
        return invalid(format!("{name}.lacunarity must be at least 1"));
    }
    Ok(())
}
