//! # Height Synthesis
//!
//! Surface height is built in two passes.
//!
//! **Pass 1** turns the parameter vector into a base height using one of two
//! interchangeable [`BaseHeightModel`]s:
//!
//! - `ContinentalSpline`: a continentalness spline (ocean floor, coast,
//!   lowland, foothill, peak) scaled by erosion and peaks/valleys.
//! - `MultiParameter`: the same continental backbone plus erosion and PV
//!   splines, a weirdness terrace hint and small climate hints.
//!
//! The biome is then chosen at the pass-1 height, so temperature has already
//! been cooled by altitude when the classifier sees it.
//!
//! **Pass 2** applies the biome's [`HeightModifier`]. Modifiers are pure
//! functions of `(biome, base, params, x, z)` and the seed-derived noise in
//! [`ModifierNoise`]; they hold no mutable state.

use crate::biome::{Biome, BiomeClassifier};
use crate::climate::ParameterVector;
use crate::config::TerrainConfig;
use crate::easing::{lerp, smoothstep, terrace};
use crate::error::TerrainResult;
use crate::hash::{position_hash, purpose, unit_f32};
use crate::noise::{FractalNoise, FractalSettings, WorldSeed};
use crate::spline::Spline;

/// Seed purposes for the auxiliary modifier fields.
mod field {
    pub const DETAIL: u64 = 0x20;
    pub const CANYON: u64 = 0x21;
    pub const DUNES: u64 = 0x22;
    pub const STRATA: u64 = 0x23;
}

/// Pass-1 strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BaseHeightModel {
    /// Continentalness spline scaled by erosion and PV.
    ContinentalSpline,
    /// Nested splines and hints over all six parameters.
    MultiParameter,
}

/// Result of synthesizing one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightSample {
    /// Final surface Y (topmost solid voxel).
    pub y: i32,
    /// Biome selected at the pass-1 height.
    pub biome: Biome,
    /// Parameters with temperature cooled to the pass-1 height.
    pub params: ParameterVector,
}

/// Immutable noise fields the modifiers read.
pub struct ModifierNoise {
    seed: WorldSeed,
    detail: FractalNoise,
    canyon: FractalNoise,
    dunes: FractalNoise,
    strata: FractalNoise,
}

impl ModifierNoise {
    /// Derives the auxiliary fields from the world seed.
    #[must_use]
    pub fn new(seed: WorldSeed, detail: FractalSettings) -> Self {
        Self {
            seed,
            detail: FractalNoise::new(seed.derive(field::DETAIL), detail),
            canyon: FractalNoise::new(seed.derive(field::CANYON), FractalSettings::new(0.006, 3)),
            dunes: FractalNoise::new(seed.derive(field::DUNES), FractalSettings::new(0.045, 2)),
            strata: FractalNoise::new(seed.derive(field::STRATA), FractalSettings::new(0.004, 2)),
        }
    }
}

/// Biome-specific pass-2 adjustment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeightModifier {
    /// Leaves the base height alone.
    Identity,
    /// Mesa terraces cut by canyons, with scattered hoodoo spikes.
    Badlands {
        /// Plateau height of the mesa terraces.
        terrace_step: f32,
        /// Maximum canyon depth in blocks.
        canyon_depth: f32,
        /// Chance per column of a hoodoo spike.
        hoodoo_chance: f32,
    },
    /// Stretches relief above a pivot and adds ridged jaggedness.
    PeakAmplify {
        /// Relief multiplier above the pivot.
        gain: f32,
        /// Amplitude of the ridged detail.
        jag: f32,
    },
    /// Gentle rolling dunes.
    Dunes {
        /// Dune crest height in blocks.
        amplitude: f32,
    },
}

impl HeightModifier {
    /// Blocks above sea level where peak amplification starts.
    const PEAK_PIVOT: f32 = 24.0;

    /// The modifier registered for a biome.
    #[must_use]
    pub const fn for_biome(biome: Biome) -> Self {
        match biome {
            Biome::Badlands => Self::Badlands {
                terrace_step: 7.0,
                canyon_depth: 18.0,
                hoodoo_chance: 0.006,
            },
            Biome::StonyPeaks | Biome::SnowyPeaks => Self::PeakAmplify { gain: 1.45, jag: 6.0 },
            Biome::Mountains => Self::PeakAmplify { gain: 1.15, jag: 3.0 },
            Biome::Desert => Self::Dunes { amplitude: 4.0 },
            _ => Self::Identity,
        }
    }

    /// Applies the modifier to a base height.
    #[must_use]
    pub fn apply(
        self,
        noise: &ModifierNoise,
        base: f32,
        params: &ParameterVector,
        x: i32,
        z: i32,
        sea_level: f32,
    ) -> f32 {
        let (fx, fz) = (f64::from(x), f64::from(z));
        match self {
            Self::Identity => base,
            Self::Badlands {
                terrace_step,
                canyon_depth,
                hoodoo_chance,
            } => {
                let above = base - sea_level;
                if above <= 1.0 {
                    return base;
                }
                // Weirder badlands get crisper mesa steps.
                let softness = lerp(0.35, 0.1, params.weirdness.clamp(0.0, 1.0));
                // Neighbouring mesas sit on different shelves.
                let shelf = noise.strata.terraced(fx, fz, 3, 0.15) * terrace_step;
                let mesa = sea_level + terrace(above + terrace_step * 0.5 + shelf, terrace_step, softness);

                let ridge = (noise.canyon.ridged(fx, fz, 3.0) + 1.0) * 0.5;
                let cut = smoothstep(0.72, 0.95, ridge) * canyon_depth;
                // Canyon floors never drop below the shoreline.
                let carved = (mesa - cut).max(sea_level + 1.0);

                let roll = unit_f32(position_hash(noise.seed, x, 0, z, purpose::HOODOO));
                if cut < 1.0 && roll < hoodoo_chance {
                    let spire = 4.0 + (roll / hoodoo_chance) * 7.0;
                    carved + spire.floor()
                } else {
                    carved
                }
            }
            Self::PeakAmplify { gain, jag } => {
                let pivot = sea_level + Self::PEAK_PIVOT;
                if base <= pivot {
                    return base;
                }
                let ridged = (noise.detail.ridged(fx, fz, 2.0) + 1.0) * 0.5;
                let rise = smoothstep(0.0, 16.0, base - pivot);
                pivot + (base - pivot) * gain + ridged * jag * rise
            }
            Self::Dunes { amplitude } => {
                if base <= sea_level + 1.0 {
                    return base;
                }
                // Stretched along Z so crests run in long rows.
                let n = noise.dunes.sample(fx, fz * 0.35);
                let crest = 1.0 - n.abs();
                base + crest * crest * amplitude
            }
        }
    }
}

/// Two-pass height synthesizer.
///
/// Immutable after construction; shared by every chunk worker.
pub struct HeightSynthesizer {
    model: BaseHeightModel,
    classifier: BiomeClassifier,
    noise: ModifierNoise,
    continental: Spline,
    erosion: Spline,
    peaks_valleys: Spline,
    peaks_amplitude: f32,
    terrace_threshold: f32,
    terrace_step: f32,
    sea_level: i32,
    world_height: i32,
    altitude_chill_factor: f32,
}

impl HeightSynthesizer {
    /// Builds a synthesizer for one world.
    ///
    /// # Errors
    ///
    /// [`crate::TerrainError::InvalidSpline`] if a built-in curve is
    /// malformed, which only a code change can cause.
    pub fn new(
        seed: WorldSeed,
        model: BaseHeightModel,
        classifier: BiomeClassifier,
        config: &TerrainConfig,
    ) -> TerrainResult<Self> {
        let sea = config.world.sea_level as f32;
        // Offsets from sea level: ocean floor, coast, lowland, foothill, peak.
        let continental = Spline::monotone(&[
            (-1.0, sea - 40.0),
            (-0.55, sea - 28.0),
            (-0.19, sea - 6.0),
            (-0.1, sea + 1.0),
            (0.05, sea + 4.0),
            (0.3, sea + 10.0),
            (0.55, sea + 24.0),
            (0.8, sea + 48.0),
            (1.0, sea + 72.0),
        ])?;
        // Relief multiplier: rugged terrain keeps its height, eroded flattens.
        let erosion = Spline::monotone(&[(-1.0, 1.7), (-0.4, 1.25), (0.2, 0.8), (1.0, 0.35)])?;
        let peaks_valleys =
            Spline::monotone(&[(-1.0, -0.6), (-0.3, -0.1), (0.2, 0.15), (0.6, 0.6), (1.0, 1.0)])?;

        Ok(Self {
            model,
            classifier,
            noise: ModifierNoise::new(seed, config.height.detail),
            continental,
            erosion,
            peaks_valleys,
            peaks_amplitude: config.height.peaks_amplitude,
            terrace_threshold: config.height.terrace_threshold,
            terrace_step: config.height.terrace_step,
            sea_level: config.world.sea_level,
            world_height: config.world.world_height,
            altitude_chill_factor: config.climate.altitude_chill_factor,
        })
    }

    /// Active pass-1 strategy.
    #[must_use]
    pub const fn model(&self) -> BaseHeightModel {
        self.model
    }

    /// Classifier used for biome selection.
    #[must_use]
    pub fn classifier(&self) -> &BiomeClassifier {
        &self.classifier
    }

    /// Pass 1 only, before clamping. `params` are raw (sea-level) values.
    #[must_use]
    pub fn base_height(&self, params: &ParameterVector) -> f32 {
        let sea = self.sea_level as f32;
        let backbone = self.continental.evaluate(params.continentalness);
        let inland = smoothstep(-0.1, 0.4, params.continentalness);

        match self.model {
            BaseHeightModel::ContinentalSpline => {
                // Linear erosion factor: 1.5 rugged .. 0.5 flat.
                let erosion = 1.0 - params.erosion * 0.5;
                let relief = (backbone - sea).max(0.0) * erosion;
                let floor = backbone.min(sea);
                floor + relief + params.peaks_valleys * self.peaks_amplitude * inland * erosion
            }
            BaseHeightModel::MultiParameter => {
                let erosion = self.erosion.evaluate(params.erosion);
                let relief = (backbone - sea).max(0.0) * erosion;
                let floor = backbone.min(sea);
                let pv = self.peaks_valleys.evaluate(params.peaks_valleys);
                let mut height = floor + relief + pv * self.peaks_amplitude * inland * erosion;

                // Weirdness hint: strange terrain settles into terraces.
                let terrace_weight = smoothstep(
                    self.terrace_threshold,
                    self.terrace_threshold + 0.2,
                    params.weirdness,
                ) * inland;
                if terrace_weight > 0.0 && height > sea + 2.0 {
                    let stepped = sea + terrace(height - sea, self.terrace_step, 0.3);
                    height = lerp(height, stepped, terrace_weight);
                }

                // Climate hints: wet lowlands sag toward the water table,
                // hot dry land lifts a little.
                let lowland = inland * (1.0 - smoothstep(sea + 4.0, sea + 20.0, height));
                let wet = (params.humidity - 0.6).max(0.0) * -6.0;
                let dry_heat = (params.temperature - 0.5).max(0.0) * (0.5 - params.humidity).max(0.0) * 8.0;
                height + (wet + dry_heat) * lowland
            }
        }
    }

    /// Both passes for one column. `params` are raw (sea-level) values.
    #[must_use]
    pub fn sample(&self, x: i32, z: i32, params: &ParameterVector) -> HeightSample {
        let base = self.base_height(params);
        let base_y = self.clamp_height(base);
        let adjusted = params.at_altitude(base_y, self.sea_level, self.altitude_chill_factor);
        let biome = self.classifier.select(&adjusted);

        let modified = HeightModifier::for_biome(biome).apply(
            &self.noise,
            base,
            &adjusted,
            x,
            z,
            self.sea_level as f32,
        );

        HeightSample {
            y: self.clamp_height(modified),
            biome,
            params: adjusted,
        }
    }

    /// Final surface Y for one column.
    #[must_use]
    pub fn height(&self, x: i32, z: i32, params: &ParameterVector) -> i32 {
        self.sample(x, z, params).y
    }

    fn clamp_height(&self, h: f32) -> i32 {
        if !h.is_finite() {
            return self.sea_level;
        }
        (h.round() as i32).clamp(1, self.world_height - 1)
    }
}
