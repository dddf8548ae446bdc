//! # Cave and Water Tests
//!
//! Caves never carve near the surface or through the bottom layer, and
//! water only ever sits below sea level where the ocean can reach it.

use strata_procedural::config::WaterSettings;
use strata_procedural::{
    create_generator, BasinFiller, ChunkCoord, ChunkVolume, ColumnSurface, GeneratorKind, ParameterVector,
    SdfPrimitive, TerrainConfig, TerrainError, TerrainGenerator, Vec3, VoxelState, WorldSeed, CHUNK_SIZE,
};

fn generator_with(config: TerrainConfig) -> Box<dyn TerrainGenerator> {
    create_generator(WorldSeed::new(1337), &config).unwrap()
}

fn generator(kind: GeneratorKind) -> Box<dyn TerrainGenerator> {
    generator_with(TerrainConfig {
        generator: kind,
        ..TerrainConfig::default()
    })
}

const KINDS: [GeneratorKind; 2] = [GeneratorKind::Spline, GeneratorKind::HybridSdf];

fn chunks() -> Vec<ChunkCoord> {
    (0..6).map(|i| ChunkCoord::new(i * 9 - 20, 17 - i * 7)).collect()
}

/// Test: Cave density is never negative and is zero inside the minimum depth.
#[test]
fn test_cave_density_respects_min_depth() {
    for kind in KINDS {
        let generator = generator(kind);
        let min_depth = generator.config().caves.min_depth;
        for x in (-64..64).step_by(13) {
            for z in (-64..64).step_by(17) {
                let surface = generator.height_at(x, z);
                for y in 1..surface {
                    let density = generator.cave_density(x, y, z, surface);
                    assert!(density >= 0.0, "{kind:?} density {density} at ({x}, {y}, {z})");
                    if surface - y < min_depth {
                        assert_eq!(density, 0.0, "{kind:?} carved {} below surface", surface - y);
                    }
                }
            }
        }
    }
}

/// Test: The bottom layer stays solid and nothing solid or wet appears
/// inside the minimum depth band except what was already there.
#[test]
fn test_chunks_keep_bedrock_and_skin() {
    for kind in KINDS {
        let generator = generator(kind);
        let min_depth = generator.config().caves.min_depth;
        for coord in chunks() {
            let volume = generator.generate_chunk(coord);
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    assert_eq!(volume.get(x, 0, z), VoxelState::Solid, "{kind:?} bedrock at {coord:?}");
                    let surface = volume.surface_height(x, z);
                    for y in (surface - min_depth + 1).max(0)..=surface {
                        assert_eq!(
                            volume.get(x, y as usize, z),
                            VoxelState::Solid,
                            "{kind:?} carved the skin at ({x}, {y}, {z}) of {coord:?}"
                        );
                    }
                }
            }
        }
    }
}

/// Test: With caves disabled every voxel up to the surface is solid.
#[test]
fn test_disabled_caves_leave_columns_whole() {
    let mut config = TerrainConfig::default();
    config.caves.enabled = false;
    let generator = generator_with(config);
    let volume = generator.generate_chunk(ChunkCoord::new(4, -9));
    for z in 0..CHUNK_SIZE {
        for x in 0..CHUNK_SIZE {
            let surface = volume.surface_height(x, z) as usize;
            assert!((0..=surface).all(|y| volume.get(x, y, z) == VoxelState::Solid));
        }
    }
}

/// Test: Water never reaches sea level, and every open ocean column is wet
/// just under the sea surface.
#[test]
fn test_water_below_sea_level_only() {
    for kind in KINDS {
        let generator = generator(kind);
        let sea_level = generator.config().world.sea_level;
        let ocean_threshold = generator.config().water.ocean_threshold;
        for coord in chunks() {
            let volume = generator.generate_chunk(coord);
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    for y in sea_level as usize..volume.height() {
                        assert_ne!(volume.get(x, y, z), VoxelState::Water, "{kind:?} water at y = {y}");
                    }
                    let surface = volume.surface(x, z);
                    if surface.params.continentalness < ocean_threshold && surface.height < sea_level - 1 {
                        assert_eq!(
                            volume.get(x, (sea_level - 1) as usize, z),
                            VoxelState::Water,
                            "{kind:?} dry ocean column ({x}, {z}) in {coord:?}"
                        );
                    }
                }
            }
        }
    }
}

/// Test: Disabling water leaves every chunk dry.
#[test]
fn test_disabled_water_leaves_chunks_dry() {
    let mut config = TerrainConfig::default();
    config.water.enabled = false;
    let generator = generator_with(config);
    for coord in chunks() {
        assert_eq!(generator.generate_chunk(coord).count(VoxelState::Water), 0);
    }
}

/// Test: Point columns never contain water.
#[test]
fn test_columns_are_solid_or_air() {
    let generator = generator(GeneratorKind::HybridSdf);
    for (x, z) in [(0, 0), (-700, 310), (1500, -2200)] {
        let column = generator.generate_column(x, z);
        assert_eq!(column.len(), generator.config().world.world_height as usize);
        assert!(column.iter().all(|cell| cell.state != VoxelState::Water));
        assert_eq!(column[0].state, VoxelState::Solid);
    }
}

/// Test: Primitives refuse degenerate shapes.
#[test]
fn test_primitives_reject_bad_radius() {
    let origin = Vec3::new(0.0, 40.0, 0.0);
    for radius in [0.0, -2.5, f32::NAN] {
        assert!(matches!(
            SdfPrimitive::sphere(origin, radius),
            Err(TerrainError::InvalidPrimitive { .. })
        ));
        assert!(SdfPrimitive::capsule(origin, Vec3::new(4.0, 40.0, 0.0), radius).is_err());
        assert!(SdfPrimitive::cylinder(origin, Vec3::new(0.0, 1.0, 0.0), radius, 3.0).is_err());
    }
    assert!(SdfPrimitive::sphere(Vec3::new(f32::INFINITY, 0.0, 0.0), 2.0).is_err());
    assert!(SdfPrimitive::sphere(origin, 2.0).is_ok());
}

/// Test: A sealed cave under land that samples as ocean stays dry while the
/// open sea beside it floods.
#[test]
fn test_sealed_cave_under_ocean_classed_land() {
    const SEA: i32 = 64;
    let mut volume = ChunkVolume::new(ChunkCoord::new(0, 0), 128);
    for z in 0..CHUNK_SIZE {
        for x in 0..CHUNK_SIZE {
            // West half is sea floor at 40, east half an island at 90.
            let ground = if x < 8 { 40 } else { 90 };
            for y in 0..=ground {
                volume.set(x, y, z, VoxelState::Solid);
            }
            volume.set_surface(
                x,
                z,
                ColumnSurface {
                    height: ground as i32,
                    params: ParameterVector {
                        continentalness: -0.6,
                        ..ParameterVector::NEUTRAL
                    },
                    ..ColumnSurface::default()
                },
            );
        }
    }
    // Sealed pocket inside the island, straddling sea level.
    for x in 10..15 {
        for y in 55..72 {
            volume.set(x, y, 8, VoxelState::Air);
        }
    }

    let filler = BasinFiller::new(SEA, WaterSettings::default());
    assert!(filler.ocean_entries(&volume).iter().all(|&(x, _, _)| x < 8));

    let flooded = filler.fill(&mut volume);
    let sea_column = (SEA - 1 - 40) as usize;
    assert_eq!(flooded, 8 * CHUNK_SIZE * sea_column);
    assert_eq!(volume.get(3, (SEA - 1) as usize, 3), VoxelState::Water);
    for y in 55..72 {
        assert_eq!(volume.get(12, y, 8), VoxelState::Air, "pocket flooded at y={y}");
    }
}

/// Test: Cave queries and water at the far corners of the world stay
/// in range and agree with their chunks.
#[test]
fn test_world_edge_chunks_carve_and_fill() {
    for kind in KINDS {
        let generator = generator(kind);
        for coord in [
            ChunkCoord::from_block_pos(i32::MAX, i32::MAX),
            ChunkCoord::from_block_pos(i32::MIN, i32::MIN),
        ] {
            let volume = generator.generate_chunk(coord);
            for (lx, lz) in [(0, 0), (CHUNK_SIZE - 1, CHUNK_SIZE - 1), (7, 9)] {
                let (x, z) = (coord.block_x(lx), coord.block_z(lz));
                let surface = volume.surface_height(lx, lz);
                for y in (1..surface).step_by(5) {
                    let density = generator.cave_density(x, y, z, surface);
                    assert!(density.is_finite() && density >= 0.0, "{kind:?} density {density} at ({x}, {y}, {z})");
                }
                let column = generator.generate_column(x, z);
                for cell in column {
                    let expected = match volume.get(lx, cell.y as usize, lz) {
                        VoxelState::Water => VoxelState::Air,
                        state => state,
                    };
                    assert_eq!(cell.state, expected, "{kind:?} ({x}, {}, {z})", cell.y);
                }
            }
        }
    }
}
