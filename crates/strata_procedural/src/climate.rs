//! # Multi-Parameter Climate Sampler
//!
//! Six independent noise fields describe every column of the world:
//!
//! | Parameter        | Range     | Drives                          |
//! |------------------|-----------|---------------------------------|
//! | continentalness  | `[-1, 1]` | ocean vs land, base height      |
//! | erosion          | `[-1, 1]` | flat vs rugged                  |
//! | peaks_valleys    | `[-1, 1]` | height extremes                 |
//! | weirdness        | `[-1, 1]` | terraces, rare variants         |
//! | temperature      | `[0, 1]`  | biome climate, cooled by height |
//! | humidity         | `[0, 1]`  | biome climate                   |
//!
//! Temperature is corrected for altitude *after* any interpolation: the raw
//! fields are always sampled as if the column sat at sea level.

use crate::config::ClimateSettings;
use crate::noise::{FractalNoise, WorldSeed};

/// Seed purposes for the six fields.
mod field {
    pub const CONTINENTALNESS: u64 = 0x10;
    pub const EROSION: u64 = 0x11;
    pub const PEAKS_VALLEYS: u64 = 0x12;
    pub const WEIRDNESS: u64 = 0x13;
    pub const TEMPERATURE: u64 = 0x14;
    pub const HUMIDITY: u64 = 0x15;
}

/// Octave sums rarely leave `[-0.7, 0.7]`; the gain spreads them over the
/// full parameter range before clamping.
const SIGNED_GAIN: f32 = 1.4;
const CLIMATE_GAIN: f32 = 1.6;

/// The six terrain parameters of one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterVector {
    /// Ocean (-1) to inland (1).
    pub continentalness: f32,
    /// Rugged (-1) to flat (1).
    pub erosion: f32,
    /// Valleys (-1) to peaks (1).
    pub peaks_valleys: f32,
    /// Terrace and variant selector.
    pub weirdness: f32,
    /// Cold (0) to hot (1).
    pub temperature: f32,
    /// Dry (0) to wet (1).
    pub humidity: f32,
}

impl ParameterVector {
    /// Number of dimensions.
    pub const DIMENSIONS: usize = 6;

    /// A neutral inland column; used where no sample exists yet.
    pub const NEUTRAL: Self = Self {
        continentalness: 0.0,
        erosion: 0.0,
        peaks_valleys: 0.0,
        weirdness: 0.0,
        temperature: 0.5,
        humidity: 0.5,
    };

    /// Components in canonical order.
    #[must_use]
    pub const fn to_array(self) -> [f32; Self::DIMENSIONS] {
        [
            self.continentalness,
            self.erosion,
            self.peaks_valleys,
            self.weirdness,
            self.temperature,
            self.humidity,
        ]
    }

    /// Builds a vector from components in canonical order, clamping each to
    /// its legal range. Non-finite components become the neutral value.
    #[must_use]
    pub fn from_array(values: [f32; Self::DIMENSIONS]) -> Self {
        let signed = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
        Self {
            continentalness: signed(values[0]),
            erosion: signed(values[1]),
            peaks_valleys: signed(values[2]),
            weirdness: signed(values[3]),
            temperature: unit(values[4]),
            humidity: unit(values[5]),
        }
    }

    /// Whether every component lies within its legal range.
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        let signed = |v: f32| (-1.0..=1.0).contains(&v);
        let unit = |v: f32| (0.0..=1.0).contains(&v);
        signed(self.continentalness)
            && signed(self.erosion)
            && signed(self.peaks_valleys)
            && signed(self.weirdness)
            && unit(self.temperature)
            && unit(self.humidity)
    }

    /// Per-dimension bilinear blend of four corner vectors.
    #[must_use]
    pub fn bilinear(v00: Self, v10: Self, v01: Self, v11: Self, tx: f32, tz: f32) -> Self {
        let (a, b, c, d) = (v00.to_array(), v10.to_array(), v01.to_array(), v11.to_array());
        let mut out = [0.0; Self::DIMENSIONS];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = crate::easing::bilinear(a[i], b[i], c[i], d[i], tx, tz);
        }
        Self::from_array(out)
    }

    /// Returns a copy with temperature cooled for a column at `height`.
    ///
    /// Unchanged at or below sea level; above it, one full unit of
    /// temperature is lost every `chill_factor` blocks.
    #[must_use]
    pub fn at_altitude(self, height: i32, sea_level: i32, chill_factor: f32) -> Self {
        if height <= sea_level || chill_factor <= 0.0 {
            return self;
        }
        let cooled = self.temperature - (height - sea_level) as f32 / chill_factor;
        Self {
            temperature: cooled.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Seeded sampler for the six parameter fields.
///
/// Immutable after construction and shared by every chunk worker.
pub struct ClimateSampler {
    continentalness: FractalNoise,
    erosion: FractalNoise,
    peaks_valleys: FractalNoise,
    weirdness: FractalNoise,
    temperature: FractalNoise,
    humidity: FractalNoise,
    sea_level: i32,
    altitude_chill_factor: f32,
}

impl ClimateSampler {
    /// Creates the six fields from one world seed.
    #[must_use]
    pub fn new(seed: WorldSeed, settings: &ClimateSettings, sea_level: i32) -> Self {
        Self {
            continentalness: FractalNoise::new(
                seed.derive(field::CONTINENTALNESS),
                settings.continentalness,
            ),
            erosion: FractalNoise::new(seed.derive(field::EROSION), settings.erosion),
            peaks_valleys: FractalNoise::new(seed.derive(field::PEAKS_VALLEYS), settings.peaks_valleys),
            weirdness: FractalNoise::new(seed.derive(field::WEIRDNESS), settings.weirdness),
            temperature: FractalNoise::new(seed.derive(field::TEMPERATURE), settings.temperature),
            humidity: FractalNoise::new(seed.derive(field::HUMIDITY), settings.humidity),
            sea_level,
            altitude_chill_factor: settings.altitude_chill_factor,
        }
    }

    /// Sea level the altitude correction is measured from.
    #[must_use]
    pub const fn sea_level(&self) -> i32 {
        self.sea_level
    }

    /// Parameters at sea level, with no altitude correction.
    #[must_use]
    pub fn sample_raw(&self, x: f64, z: f64) -> ParameterVector {
        let signed = |n: f32| (n * SIGNED_GAIN).clamp(-1.0, 1.0);
        let unit = |n: f32| ((n * CLIMATE_GAIN + 1.0) * 0.5).clamp(0.0, 1.0);
        ParameterVector {
            continentalness: signed(self.continentalness.sample(x, z)),
            erosion: signed(self.erosion.sample(x, z)),
            peaks_valleys: signed(self.peaks_valleys.ridged(x, z, 2.0)),
            weirdness: signed(self.weirdness.sample(x, z)),
            temperature: unit(self.temperature.sample(x, z)),
            humidity: unit(self.humidity.sample(x, z)),
        }
    }

    /// Parameters for a column whose surface sits at `height`.
    #[must_use]
    pub fn sample(&self, x: f64, z: f64, height: i32) -> ParameterVector {
        self.adjust_for_altitude(self.sample_raw(x, z), height)
    }

    /// Applies the altitude temperature correction to a raw vector.
    #[must_use]
    pub fn adjust_for_altitude(&self, raw: ParameterVector, height: i32) -> ParameterVector {
        raw.at_altitude(height, self.sea_level, self.altitude_chill_factor)
    }
}
