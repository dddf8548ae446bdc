//! # Terrain Error Types
//!
//! Everything that can go wrong while *constructing* the terrain pipeline.
//!
//! Generation itself is infallible: noise faults collapse to `0.0`, the
//! classifier always resolves a biome and SDF queries outside the grid report
//! no effect. Errors only surface at construction and configuration time.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or configuring the terrain pipeline.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// The biome table has no definitions, so nothing could ever be selected.
    #[error("biome table is empty")]
    EmptyBiomeTable,

    /// A biome definition carries an inverted or non-finite range.
    #[error("invalid biome definition {biome}: {reason}")]
    InvalidBiomeDefinition {
        /// Name of the offending biome.
        biome: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// An SDF primitive was constructed with impossible dimensions.
    #[error("invalid {shape} primitive: {reason}")]
    InvalidPrimitive {
        /// Primitive kind (`sphere`, `capsule`, `cylinder`).
        shape: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A spline was built with unsorted or too few control points.
    #[error("invalid spline: {0}")]
    InvalidSpline(String),

    /// Configuration values violate an invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::config::TerrainConfig`].
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be rendered back to TOML.
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Result type for terrain construction.
pub type TerrainResult<T> = Result<T, TerrainError>;
