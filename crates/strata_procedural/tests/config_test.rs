//! # Config Tests
//!
//! Loading terrain configs from disk and rejecting bad ones.

use std::path::PathBuf;

use strata_procedural::{create_generator, GeneratorKind, TerrainConfig, TerrainError, WorldSeed};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("strata_{}_{}.toml", std::process::id(), name))
}

/// Test: The shipped default file loads and equals the built-in defaults.
#[test]
fn test_shipped_defaults_load() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/default_terrain.toml");
    let config = TerrainConfig::load(&path).unwrap();
    assert_eq!(config, TerrainConfig::default());
}

/// Test: A config written to disk reads back unchanged.
#[test]
fn test_file_round_trip() {
    let mut config = TerrainConfig::default();
    config.generator = GeneratorKind::Spline;
    config.world.sea_level = 72;
    config.caves.min_depth = 14;
    config.water.max_fill = 4096;

    let path = temp_path("round_trip");
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
    let loaded = TerrainConfig::load(&path);
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded.unwrap(), config);
}

/// Test: Partial files fill in defaults.
#[test]
fn test_partial_file_uses_defaults() {
    let config = TerrainConfig::from_toml_str("generator = \"spline\"\n\n[world]\nsea_level = 80\n").unwrap();
    assert_eq!(config.generator, GeneratorKind::Spline);
    assert_eq!(config.world.sea_level, 80);
    assert_eq!(config.caves, TerrainConfig::default().caves);
}

/// Test: Missing files, typos and broken invariants are all reported.
#[test]
fn test_bad_configs_are_rejected() {
    assert!(matches!(
        TerrainConfig::load(&temp_path("does_not_exist")),
        Err(TerrainError::ConfigIo { .. })
    ));
    assert!(matches!(
        TerrainConfig::from_toml_str("[world]\nsea_levle = 60\n"),
        Err(TerrainError::ConfigParse(_))
    ));
    assert!(matches!(
        TerrainConfig::from_toml_str("[world]\nworld_height = 128\nsea_level = 200\n"),
        Err(TerrainError::InvalidConfig(_))
    ));
    assert!(matches!(
        TerrainConfig::from_toml_str("[caves]\nfloor_y = 50\npeak_low_y = 40\n"),
        Err(TerrainError::InvalidConfig(_))
    ));
}

/// Test: The factory validates before building.
#[test]
fn test_factory_rejects_invalid_config() {
    let mut config = TerrainConfig::default();
    config.climate.interpolation_cell = 0;
    assert!(create_generator(WorldSeed::new(3), &config).is_err());
}
