//! # Biome Classification
//!
//! Maps a six-dimensional [`ParameterVector`] to a biome.
//!
//! Every biome owns an inclusive acceptance region, one range per
//! dimension. Selection:
//!
//! 1. Candidates are the definitions whose six ranges all contain the point.
//! 2. No candidate: the definition with the smallest weighted distance wins.
//! 3. One candidate: it wins.
//! 4. Several: the one with the smallest weighted distance wins.
//!
//! Step 2 makes the classifier total. A point nobody claims still resolves,
//! so the table never has holes.
//!
//! The standard table is built once per process and shared read-only by
//! every worker.

use std::sync::{Arc, OnceLock};

use crate::climate::ParameterVector;
use crate::error::{TerrainError, TerrainResult};

/// Biome types in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Biome {
    /// Deep ocean, far from any coast
    DeepOcean = 0,
    /// Shallow ocean
    Ocean = 1,
    /// Ice-covered ocean in cold regions
    FrozenOcean = 2,
    /// Beach/coastline
    Beach = 3,
    /// Plains/grassland
    Plains = 4,
    /// Temperate forest
    Forest = 5,
    /// Swamp/wetland
    Swamp = 6,
    /// Dense jungle
    Jungle = 7,
    /// Savanna grassland
    Savanna = 8,
    /// Arid desert with dunes
    Desert = 9,
    /// Eroded badlands with canyons, mesas and hoodoos
    Badlands = 10,
    /// Snowy taiga forest
    Taiga = 11,
    /// Cold tundra
    Tundra = 12,
    /// Rugged highland below the peaks
    Mountains = 13,
    /// Bare rock peaks
    StonyPeaks = 14,
    /// Snow-capped peaks
    SnowyPeaks = 15,
}

impl Biome {
    /// Every biome, in discriminant order.
    pub const ALL: [Self; 16] = [
        Self::DeepOcean,
        Self::Ocean,
        Self::FrozenOcean,
        Self::Beach,
        Self::Plains,
        Self::Forest,
        Self::Swamp,
        Self::Jungle,
        Self::Savanna,
        Self::Desert,
        Self::Badlands,
        Self::Taiga,
        Self::Tundra,
        Self::Mountains,
        Self::StonyPeaks,
        Self::SnowyPeaks,
    ];

    /// Stable lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeepOcean => "deep_ocean",
            Self::Ocean => "ocean",
            Self::FrozenOcean => "frozen_ocean",
            Self::Beach => "beach",
            Self::Plains => "plains",
            Self::Forest => "forest",
            Self::Swamp => "swamp",
            Self::Jungle => "jungle",
            Self::Savanna => "savanna",
            Self::Desert => "desert",
            Self::Badlands => "badlands",
            Self::Taiga => "taiga",
            Self::Tundra => "tundra",
            Self::Mountains => "mountains",
            Self::StonyPeaks => "stony_peaks",
            Self::SnowyPeaks => "snowy_peaks",
        }
    }

    /// Whether the biome is open water.
    #[must_use]
    pub const fn is_ocean(self) -> bool {
        matches!(self, Self::DeepOcean | Self::Ocean | Self::FrozenOcean)
    }

    /// Converts from u8. Unknown values map to `Plains`.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        if (value as usize) < Self::ALL.len() {
            Self::ALL[value as usize]
        } else {
            Self::Plains
        }
    }
}

/// Inclusive acceptance range on one dimension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterRange {
    /// Lower bound (inclusive)
    pub min: f32,
    /// Upper bound (inclusive)
    pub max: f32,
}

impl ParameterRange {
    /// The whole signed domain.
    pub const ANY: Self = Self::new(-1.0, 1.0);
    /// The whole unit domain.
    pub const ANY_UNIT: Self = Self::new(0.0, 1.0);

    /// Creates a range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside, bounds included.
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Midpoint of the range.
    #[inline]
    #[must_use]
    pub fn center(&self) -> f32 {
        (self.min + self.max) * 0.5
    }
}

/// Per-dimension weights for distance comparisons.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DimensionWeights(pub [f32; ParameterVector::DIMENSIONS]);

impl DimensionWeights {
    /// Climate dominates: temperature and humidity count double, and their
    /// `[0, 1]` domain is half as wide as the others.
    pub const STANDARD: Self = Self([1.5, 1.0, 1.0, 0.5, 4.0, 4.0]);
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// One biome's acceptance region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeDefinition {
    /// Biome this region selects.
    pub biome: Biome,
    /// Ranges in canonical parameter order.
    pub ranges: [ParameterRange; ParameterVector::DIMENSIONS],
    /// Distance weights.
    pub weights: DimensionWeights,
}

impl BiomeDefinition {
    /// Creates a definition accepting everything, to be narrowed with the
    /// builder methods.
    #[must_use]
    pub const fn new(biome: Biome) -> Self {
        Self {
            biome,
            ranges: [
                ParameterRange::ANY,
                ParameterRange::ANY,
                ParameterRange::ANY,
                ParameterRange::ANY,
                ParameterRange::ANY_UNIT,
                ParameterRange::ANY_UNIT,
            ],
            weights: DimensionWeights::STANDARD,
        }
    }

    fn with(mut self, dimension: usize, min: f32, max: f32) -> Self {
        self.ranges[dimension] = ParameterRange::new(min, max);
        self
    }

    /// Narrows continentalness.
    #[must_use]
    pub fn continentalness(self, min: f32, max: f32) -> Self {
        self.with(0, min, max)
    }

    /// Narrows erosion.
    #[must_use]
    pub fn erosion(self, min: f32, max: f32) -> Self {
        self.with(1, min, max)
    }

    /// Narrows peaks/valleys.
    #[must_use]
    pub fn peaks_valleys(self, min: f32, max: f32) -> Self {
        self.with(2, min, max)
    }

    /// Narrows weirdness.
    #[must_use]
    pub fn weirdness(self, min: f32, max: f32) -> Self {
        self.with(3, min, max)
    }

    /// Narrows temperature.
    #[must_use]
    pub fn temperature(self, min: f32, max: f32) -> Self {
        self.with(4, min, max)
    }

    /// Narrows humidity.
    #[must_use]
    pub fn humidity(self, min: f32, max: f32) -> Self {
        self.with(5, min, max)
    }

    /// Whether all six ranges contain the point.
    #[must_use]
    pub fn contains(&self, params: &ParameterVector) -> bool {
        self.ranges
            .iter()
            .zip(params.to_array())
            .all(|(range, value)| range.contains(value))
    }

    /// Weighted squared distance from the point to the region's center.
    #[must_use]
    pub fn weighted_distance(&self, params: &ParameterVector) -> f32 {
        self.ranges
            .iter()
            .zip(params.to_array())
            .zip(self.weights.0)
            .map(|((range, value), weight)| {
                let d = value - range.center();
                weight * d * d
            })
            .sum()
    }

    fn validate(&self) -> TerrainResult<()> {
        for (dimension, range) in self.ranges.iter().enumerate() {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(TerrainError::InvalidBiomeDefinition {
                    biome: self.biome.name(),
                    reason: format!("range {dimension} is [{}, {}]", range.min, range.max),
                });
            }
        }
        if self.weights.0.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(TerrainError::InvalidBiomeDefinition {
                biome: self.biome.name(),
                reason: "weights must be finite and non-negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Immutable set of biome definitions.
#[derive(Debug)]
pub struct BiomeTable {
    definitions: Vec<BiomeDefinition>,
}

impl BiomeTable {
    /// Validates and wraps a set of definitions.
    ///
    /// # Errors
    ///
    /// [`TerrainError::EmptyBiomeTable`] for an empty set,
    /// [`TerrainError::InvalidBiomeDefinition`] for inverted or non-finite
    /// ranges.
    pub fn new(definitions: Vec<BiomeDefinition>) -> TerrainResult<Self> {
        if definitions.is_empty() {
            return Err(TerrainError::EmptyBiomeTable);
        }
        for definition in &definitions {
            definition.validate()?;
        }
        Ok(Self { definitions })
    }

    /// The process-wide standard table.
    #[must_use]
    pub fn standard() -> Arc<Self> {
        static STANDARD: OnceLock<Arc<BiomeTable>> = OnceLock::new();
        Arc::clone(STANDARD.get_or_init(|| {
            Arc::new(Self {
                definitions: standard_definitions(),
            })
        }))
    }

    /// All definitions in table order.
    #[must_use]
    pub fn definitions(&self) -> &[BiomeDefinition] {
        &self.definitions
    }

    /// First definition for a biome, if present.
    #[must_use]
    pub fn definition(&self, biome: Biome) -> Option<&BiomeDefinition> {
        self.definitions.iter().find(|d| d.biome == biome)
    }
}

/// Standard regions. Continentalness splits sea from land, erosion and
/// peaks/valleys pick out highlands, climate does the rest.
fn standard_definitions() -> Vec<BiomeDefinition> {
    use Biome as B;
    vec![
        BiomeDefinition::new(B::DeepOcean)
            .continentalness(-1.0, -0.55)
            .temperature(0.15, 1.0),
        BiomeDefinition::new(B::Ocean)
            .continentalness(-0.55, -0.19)
            .temperature(0.15, 1.0),
        BiomeDefinition::new(B::FrozenOcean)
            .continentalness(-1.0, -0.19)
            .temperature(0.0, 0.2),
        BiomeDefinition::new(B::Beach)
            .continentalness(-0.19, -0.05)
            .erosion(-0.2, 1.0)
            .temperature(0.2, 1.0),
        BiomeDefinition::new(B::Plains)
            .continentalness(-0.05, 0.6)
            .erosion(0.0, 1.0)
            .temperature(0.35, 0.7)
            .humidity(0.0, 0.5),
        BiomeDefinition::new(B::Forest)
            .continentalness(-0.05, 0.7)
            .erosion(-0.4, 1.0)
            .temperature(0.3, 0.7)
            .humidity(0.45, 0.8),
        BiomeDefinition::new(B::Swamp)
            .continentalness(-0.05, 0.3)
            .erosion(0.4, 1.0)
            .temperature(0.45, 0.85)
            .humidity(0.7, 1.0),
        BiomeDefinition::new(B::Jungle)
            .continentalness(-0.05, 0.7)
            .temperature(0.7, 1.0)
            .humidity(0.6, 1.0),
        BiomeDefinition::new(B::Savanna)
            .continentalness(-0.05, 0.6)
            .temperature(0.65, 1.0)
            .humidity(0.25, 0.6),
        BiomeDefinition::new(B::Desert)
            .continentalness(-0.05, 0.8)
            .erosion(-0.3, 1.0)
            .temperature(0.7, 1.0)
            .humidity(0.0, 0.3),
        BiomeDefinition::new(B::Badlands)
            .continentalness(0.1, 1.0)
            .erosion(-0.6, 0.5)
            .weirdness(0.2, 1.0)
            .temperature(0.65, 1.0)
            .humidity(0.0, 0.35),
        BiomeDefinition::new(B::Taiga)
            .continentalness(-0.05, 0.8)
            .temperature(0.15, 0.35)
            .humidity(0.4, 1.0),
        BiomeDefinition::new(B::Tundra)
            .continentalness(-0.05, 0.8)
            .temperature(0.0, 0.2),
        BiomeDefinition::new(B::Mountains)
            .continentalness(0.3, 1.0)
            .erosion(-1.0, -0.2)
            .peaks_valleys(0.0, 1.0)
            .temperature(0.25, 0.65),
        BiomeDefinition::new(B::StonyPeaks)
            .continentalness(0.45, 1.0)
            .erosion(-1.0, -0.4)
            .peaks_valleys(0.4, 1.0)
            .temperature(0.3, 1.0),
        BiomeDefinition::new(B::SnowyPeaks)
            .continentalness(0.45, 1.0)
            .erosion(-1.0, -0.4)
            .peaks_valleys(0.4, 1.0)
            .temperature(0.0, 0.3),
    ]
}

/// Selects biomes from parameter vectors.
#[derive(Clone, Debug)]
pub struct BiomeClassifier {
    table: Arc<BiomeTable>,
}

impl BiomeClassifier {
    /// Classifier over a custom set of definitions.
    ///
    /// # Errors
    ///
    /// See [`BiomeTable::new`].
    pub fn new(definitions: Vec<BiomeDefinition>) -> TerrainResult<Self> {
        Ok(Self {
            table: Arc::new(BiomeTable::new(definitions)?),
        })
    }

    /// Classifier over the shared standard table.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            table: BiomeTable::standard(),
        }
    }

    /// The table this classifier selects from.
    #[must_use]
    pub fn table(&self) -> &BiomeTable {
        &self.table
    }

    /// Definitions whose ranges all contain the point.
    pub fn candidates<'a>(
        &'a self,
        params: &'a ParameterVector,
    ) -> impl Iterator<Item = &'a BiomeDefinition> + 'a {
        self.table.definitions.iter().filter(|d| d.contains(params))
    }

    /// Selects the biome for a parameter vector. Never fails.
    #[must_use]
    pub fn select(&self, params: &ParameterVector) -> Biome {
        nearest(self.candidates(params), params)
            .or_else(|| nearest(self.table.definitions.iter(), params))
            // The table is never empty; this arm is unreachable.
            .unwrap_or(self.table.definitions[0].biome)
    }
}

/// Minimum weighted distance; strict less-than keeps table order on ties.
fn nearest<'a>(
    definitions: impl Iterator<Item = &'a BiomeDefinition>,
    params: &ParameterVector,
) -> Option<Biome> {
    let mut best: Option<(f32, Biome)> = None;
    for definition in definitions {
        let distance = definition.weighted_distance(params);
        if best.map_or(true, |(b, _)| distance < b) {
            best = Some((distance, definition.biome));
        }
    }
    best.map(|(_, biome)| biome)
}

impl Default for BiomeClassifier {
    fn default() -> Self {
        Self::standard()
    }
}
