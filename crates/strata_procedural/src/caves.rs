//! # Cave Carving
//!
//! A cave carver answers `density(x, y, z, surface) >= 0`; anything above
//! zero turns a solid voxel into air. Two variants share the
//! [`CaveCarver`] trait:
//!
//! - [`NoiseCaveCarver`]: ridged 3D simplex. Ridges of the field become
//!   winding tunnels. No per-chunk state.
//! - [`SdfCaveCarver`]: explicit tunnels and chambers built from SDF
//!   primitives. Each chunk grows the cave systems seeded in and around it
//!   into a [`SpatialHashGrid`], queried once per voxel.
//!
//! Both variants are scaled by [`altitude_factor`] and return exactly zero
//! within `min_depth` blocks of the surface.
//!
//! ## Seams
//!
//! SDF seeds sit on a world-aligned grid. A chunk grows every seed within
//! one chunk width of its edges, and growth keeps each primitive within
//! [`SEED_REACH`] blocks of its seed horizontally. Any primitive that can
//! touch a voxel is therefore grown by the voxel's chunk, and neighbouring
//! chunks agree on every shared cave.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::chunk::{ChunkCoord, CHUNK_SIZE};
use crate::config::CaveSettings;
use crate::easing::altitude_fade;
use crate::geometry::Vec3;
use crate::hash::{position_hash, position_rng, purpose, unit_f32};
use crate::noise::{FractalNoise, WorldSeed};
use crate::sdf::SdfPrimitive;
use crate::spatial_grid::SpatialHashGrid;

/// Horizontal distance from its seed that no primitive surface may exceed.
pub const SEED_REACH: f32 = CHUNK_SIZE as f32;

/// Furthest a tunnel axis may wander from its seed horizontally.
const TUNNEL_AXIS_REACH: f32 = 12.0;

/// Thickest tunnel or shaft radius.
const MAX_TUNNEL_RADIUS: f32 = 3.5;

/// Seed purposes for the noise fields.
mod field {
    pub const CAVE_NOISE: u64 = 0x30;
    pub const SEED_DENSITY: u64 = 0x31;
}

/// Density weight of a voxel at height `y`: 0 near bedrock, ramping to 1 by
/// `peak_low_y`, 1 through `peak_high_y`, gone by `ceiling_y`.
#[must_use]
pub fn altitude_factor(y: i32, settings: &CaveSettings) -> f32 {
    altitude_fade(
        y as f32,
        (settings.floor_y as f32, settings.peak_low_y as f32),
        (settings.peak_high_y as f32, settings.ceiling_y as f32),
    )
}

/// Whether `y` is too close to the surface to carve.
#[inline]
fn within_min_depth(y: i32, surface: i32, settings: &CaveSettings) -> bool {
    i64::from(surface) - i64::from(y) < i64::from(settings.min_depth)
}

/// Cave density source.
///
/// `prepare_chunk` builds whatever per-chunk state the carver needs. The
/// field is shared behind an `Arc` between the chunk context and the point
/// query cache, so it must be readable from any thread.
pub trait CaveCarver: Send + Sync {
    /// Per-chunk state.
    type Field: Send + Sync;

    /// Builds the state for one chunk.
    fn prepare_chunk(&self, coord: ChunkCoord) -> Self::Field;

    /// Carve density at a voxel, `>= 0`. `surface` is the column height.
    fn density(&self, field: &Self::Field, x: i32, y: i32, z: i32, surface: i32) -> f32;
}

/// Ridged 3D noise caves.
pub struct NoiseCaveCarver {
    settings: CaveSettings,
    noise: FractalNoise,
}

impl NoiseCaveCarver {
    /// Ridge sharpness; higher pinches tunnels thinner.
    const SHARPNESS: f64 = 3.0;

    /// Creates the carver.
    #[must_use]
    pub fn new(seed: WorldSeed, settings: CaveSettings) -> Self {
        Self {
            noise: FractalNoise::new(seed.derive(field::CAVE_NOISE), settings.noise),
            settings,
        }
    }
}

impl CaveCarver for NoiseCaveCarver {
    type Field = ();

    fn prepare_chunk(&self, _coord: ChunkCoord) -> Self::Field {}

    fn density(&self, _field: &(), x: i32, y: i32, z: i32, surface: i32) -> f32 {
        let s = &self.settings;
        if !s.enabled || within_min_depth(y, surface, s) || y <= s.floor_y || y >= s.ceiling_y {
            return 0.0;
        }
        let factor = altitude_factor(y, s);
        if factor <= 0.0 {
            return 0.0;
        }
        let ridge = self.noise.ridged_3d(
            f64::from(x),
            f64::from(y),
            f64::from(z),
            s.noise_y_scale,
            Self::SHARPNESS,
        );
        if ridge <= s.noise_threshold {
            return 0.0;
        }
        let span = (1.0 - s.noise_threshold).max(f32::EPSILON);
        ((ridge - s.noise_threshold) / span * factor).max(0.0)
    }
}

/// What a qualifying seed grows into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaveKind {
    /// Chain of capsules, maybe ending in a shaft.
    Tunnel,
    /// Main sphere plus satellites.
    Chamber,
}

/// A qualifying seed position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaveSeed {
    /// World X.
    pub x: i32,
    /// World Z.
    pub z: i32,
}

/// Per-chunk SDF state.
pub struct SdfCaveField {
    grid: SpatialHashGrid,
    seeds: usize,
}

impl SdfCaveField {
    /// Primitive lookup grid.
    #[must_use]
    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    /// Number of seeds that grew a system.
    #[must_use]
    pub const fn seed_count(&self) -> usize {
        self.seeds
    }
}

/// SDF tunnel and chamber caves.
pub struct SdfCaveCarver {
    seed: WorldSeed,
    settings: CaveSettings,
    density_noise: FractalNoise,
}

impl SdfCaveCarver {
    /// Creates the carver.
    #[must_use]
    pub fn new(seed: WorldSeed, settings: CaveSettings) -> Self {
        Self {
            seed,
            density_noise: FractalNoise::new(seed.derive(field::SEED_DENSITY), settings.seed_density),
            settings,
        }
    }

    /// Whether a grid position spawns a cave system.
    #[must_use]
    pub fn qualifies(&self, x: i32, z: i32) -> bool {
        let s = &self.settings;
        if self.density_noise.sample(f64::from(x), f64::from(z)) < s.seed_threshold {
            return false;
        }
        unit_f32(position_hash(self.seed, x, 0, z, purpose::CAVE_SEED)) < s.seed_chance
    }

    /// Qualifying seeds for a chunk and a one-chunk border around it.
    #[must_use]
    pub fn seeds_for_chunk(&self, coord: ChunkCoord) -> Vec<CaveSeed> {
        let spacing = i64::from(self.settings.seed_spacing.max(1));
        let border = CHUNK_SIZE as i64;
        // Computed in i64; seeds past the i32 world edge are skipped.
        let span = |origin: i32| {
            let lo = i64::from(origin) - border;
            let hi = i64::from(origin) + CHUNK_SIZE as i64 - 1 + border;
            // First multiple of the spacing at or above `lo`.
            let first = lo.div_euclid(spacing) * spacing + if lo.rem_euclid(spacing) == 0 { 0 } else { spacing };
            (first..=hi)
                .step_by(spacing as usize)
                .filter_map(|v| i32::try_from(v).ok())
        };

        let mut seeds = Vec::new();
        for z in span(coord.world_z()) {
            for x in span(coord.world_x()) {
                if self.qualifies(x, z) {
                    seeds.push(CaveSeed { x, z });
                }
            }
        }
        seeds
    }

    /// Grows the full system for one seed.
    #[must_use]
    pub fn grow_system(&self, seed: CaveSeed) -> (CaveKind, Vec<SdfPrimitive>) {
        let s = &self.settings;
        let mut rng = position_rng(self.seed, seed.x, 0, seed.z, purpose::CAVE_GROWTH);
        let kind = if rng.gen::<f32>() < s.chamber_chance {
            CaveKind::Chamber
        } else {
            CaveKind::Tunnel
        };

        // Triangular draw biases systems toward the middle of the band.
        let t = (rng.gen::<f32>() + rng.gen::<f32>()) * 0.5;
        let y = s.peak_low_y as f32 + t * (s.peak_high_y - s.peak_low_y) as f32;
        let origin = Vec3::new(seed.x as f32 + 0.5, y, seed.z as f32 + 0.5);

        let primitives = match kind {
            CaveKind::Tunnel => grow_tunnel(&mut rng, origin, s),
            CaveKind::Chamber => grow_chamber(&mut rng, origin),
        };
        tracing::trace!(
            "Cave {:?} at ({}, {}) y={:.1}: {} primitives",
            kind,
            seed.x,
            seed.z,
            y,
            primitives.len()
        );
        (kind, primitives)
    }
}

impl CaveCarver for SdfCaveCarver {
    type Field = SdfCaveField;

    fn prepare_chunk(&self, coord: ChunkCoord) -> Self::Field {
        if !self.settings.enabled {
            return SdfCaveField {
                grid: SpatialHashGrid::build(Vec::new()),
                seeds: 0,
            };
        }
        let seeds = self.seeds_for_chunk(coord);
        let primitives: Vec<SdfPrimitive> = seeds
            .iter()
            .flat_map(|&seed| self.grow_system(seed).1)
            .collect();
        tracing::trace!(
            "Chunk [{},{}]: {} cave seeds, {} primitives",
            coord.x,
            coord.z,
            seeds.len(),
            primitives.len()
        );
        SdfCaveField {
            grid: SpatialHashGrid::build(primitives),
            seeds: seeds.len(),
        }
    }

    fn density(&self, field: &SdfCaveField, x: i32, y: i32, z: i32, surface: i32) -> f32 {
        let s = &self.settings;
        if !s.enabled || field.grid.is_empty() || within_min_depth(y, surface, s) {
            return 0.0;
        }
        let factor = altitude_factor(y, s);
        if factor <= 0.0 {
            return 0.0;
        }
        let distance = field.grid.min_distance(Vec3::block_center(x, y, z));
        if distance < 0.0 {
            -distance * factor
        } else {
            0.0
        }
    }
}

/// Pulls `p` back so its horizontal offset from `anchor` is at most `reach`.
fn limit_reach(p: Vec3, anchor: Vec3, reach: f32) -> Vec3 {
    let dist = p.horizontal_distance(anchor);
    if dist <= reach {
        return p;
    }
    let scale = reach / dist;
    Vec3::new(
        anchor.x + (p.x - anchor.x) * scale,
        p.y,
        anchor.z + (p.z - anchor.z) * scale,
    )
}

/// Grows a tunnel: 3 to 6 connected capsules wandering from `origin`, with
/// a one-in-four chance of a vertical shaft at the far end.
///
/// Pure in `(rng state, origin, settings)`.
pub fn grow_tunnel(rng: &mut ChaCha8Rng, origin: Vec3, settings: &CaveSettings) -> Vec<SdfPrimitive> {
    let segments = rng.gen_range(3..=6);
    let mid = (settings.peak_low_y + settings.peak_high_y) as f32 * 0.5;
    let lowest = (settings.floor_y + 2) as f32;
    let highest = settings.ceiling_y as f32;

    let mut primitives = Vec::with_capacity(segments + 1);
    let mut yaw = rng.gen_range(0.0..std::f32::consts::TAU);
    let mut start = origin;

    for _ in 0..segments {
        yaw += rng.gen_range(-0.8..0.8);
        // Drift back toward mid-depth.
        let bias = ((mid - start.y) / 40.0).clamp(-0.25, 0.25);
        let pitch = rng.gen_range(-0.35..0.35) + bias;
        let length = rng.gen_range(4.0..8.0);
        let radius = rng.gen_range(1.5..MAX_TUNNEL_RADIUS);

        let dir = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        let mut end = limit_reach(start + dir * length, origin, TUNNEL_AXIS_REACH);
        end.y = end.y.clamp(lowest, highest);

        if let Ok(capsule) = SdfPrimitive::capsule(start, end, radius) {
            primitives.push(capsule);
        }
        start = end;
    }

    if rng.gen::<f32>() < 0.25 {
        let radius = rng.gen_range(1.5..2.5);
        let half_height = rng.gen_range(4.0..10.0);
        let center = Vec3::new(start.x, start.y + half_height, start.z);
        if let Ok(shaft) = SdfPrimitive::cylinder(center, Vec3::Y, radius, half_height) {
            primitives.push(shaft);
        }
    }
    primitives
}

/// Grows a chamber: one sphere of radius 4 to 7 near `origin` plus 2 to 4
/// smaller spheres around its rim.
pub fn grow_chamber(rng: &mut ChaCha8Rng, origin: Vec3) -> Vec<SdfPrimitive> {
    let main_radius = rng.gen_range(4.0..7.0);
    let center = Vec3::new(
        origin.x + rng.gen_range(-2.0..2.0),
        origin.y,
        origin.z + rng.gen_range(-2.0..2.0),
    );

    let satellites = rng.gen_range(2..=4);
    let mut primitives = Vec::with_capacity(satellites + 1);
    if let Ok(main) = SdfPrimitive::sphere(center, main_radius) {
        primitives.push(main);
    }
    for _ in 0..satellites {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let offset = main_radius * rng.gen_range(0.6..0.9);
        let radius = rng.gen_range(2.0..MAX_TUNNEL_RADIUS);
        let p = Vec3::new(
            center.x + angle.cos() * offset,
            center.y + rng.gen_range(-2.0..2.0),
            center.z + angle.sin() * offset,
        );
        if let Ok(sphere) = SdfPrimitive::sphere(p, radius) {
            primitives.push(sphere);
        }
    }
    primitives
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn settings() -> CaveSettings {
        CaveSettings::default()
    }

    #[test]
    fn test_altitude_factor_shape() {
        let s = settings();
        assert_eq!(altitude_factor(0, &s), 0.0);
        assert_eq!(altitude_factor(s.floor_y, &s), 0.0);
        assert_eq!(altitude_factor(80, &s), 1.0);
        assert_eq!(altitude_factor(s.peak_high_y, &s), 1.0);
        assert_eq!(altitude_factor(s.ceiling_y, &s), 0.0);
        let ramp = altitude_factor(20, &s);
        assert!(ramp > 0.0 && ramp < 1.0);
    }

    #[test]
    fn test_noise_density_is_non_negative_and_respects_min_depth() {
        let carver = NoiseCaveCarver::new(WorldSeed::new(42), settings());
        let mut carved = 0;
        for x in 0..32 {
            for z in 0..32 {
                for y in 0..140 {
                    let d = carver.density(&(), x, y, z, 130);
                    assert!(d >= 0.0);
                    if y > 120 {
                        assert_eq!(d, 0.0, "carved inside min depth at y={y}");
                    }
                    if d > 0.0 {
                        carved += 1;
                    }
                }
            }
        }
        assert!(carved > 0, "noise caves never carved");
    }

    #[test]
    fn test_tunnel_chain_is_reproducible() {
        let s = settings();
        let origin = Vec3::new(8.5, 80.0, -23.5);
        let a = grow_tunnel(&mut ChaCha8Rng::seed_from_u64(1234), origin, &s);
        let b = grow_tunnel(&mut ChaCha8Rng::seed_from_u64(1234), origin, &s);
        assert_eq!(a, b);
        assert!(a.len() >= 3);

        // Segments form a connected chain starting at the origin.
        let capsules: Vec<(Vec3, Vec3)> = a
            .iter()
            .filter_map(|p| match *p {
                SdfPrimitive::Capsule { start, end, .. } => Some((start, end)),
                _ => None,
            })
            .collect();
        assert_eq!(capsules[0].0, origin);
        for pair in capsules.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn test_growth_stays_within_seed_reach() {
        let carver = SdfCaveCarver::new(WorldSeed::new(77), settings());
        for i in 0..400 {
            let seed = CaveSeed { x: i * 8 - 1600, z: (i % 37) * 8 };
            let anchor = Vec3::new(seed.x as f32 + 0.5, 0.0, seed.z as f32 + 0.5);
            let (_, primitives) = carver.grow_system(seed);
            for p in primitives {
                let b = p.aabb();
                for corner in [b.min, b.max, Vec3::new(b.min.x, 0.0, b.max.z), Vec3::new(b.max.x, 0.0, b.min.z)] {
                    let dx = (corner.x - anchor.x).abs();
                    let dz = (corner.z - anchor.z).abs();
                    assert!(dx <= SEED_REACH && dz <= SEED_REACH, "{p:?} escapes seed {seed:?}");
                }
            }
        }
    }

    #[test]
    fn test_chamber_has_satellites() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let chamber = grow_chamber(&mut rng, Vec3::new(0.0, 70.0, 0.0));
        assert!((3..=5).contains(&chamber.len()));
        assert!(chamber.iter().all(|p| matches!(p, SdfPrimitive::Sphere { .. })));
        let main = chamber[0].radius();
        assert!((4.0..7.0).contains(&main));
        assert!(chamber[1..].iter().all(|p| p.radius() < MAX_TUNNEL_RADIUS));
    }

    #[test]
    fn test_seed_grid_covers_border() {
        let mut s = settings();
        s.seed_threshold = -2.0;
        s.seed_chance = 1.0;
        let carver = SdfCaveCarver::new(WorldSeed::new(1), s);
        let seeds = carver.seeds_for_chunk(ChunkCoord::new(0, 0));
        // x and z each span -16..=31 on an 8 grid: 6 positions.
        assert_eq!(seeds.len(), 36);
        assert!(seeds.iter().all(|s| s.x % 8 == 0 && s.z % 8 == 0));
        assert!(seeds.contains(&CaveSeed { x: -16, z: 24 }));
    }

    #[test]
    fn test_sdf_density_is_seam_free() {
        let carver = SdfCaveCarver::new(WorldSeed::new(42), settings());
        let left = carver.prepare_chunk(ChunkCoord::new(0, 0));
        let right = carver.prepare_chunk(ChunkCoord::new(1, 0));
        // The boundary columns x=15 and x=16 are owned by different chunks;
        // each chunk's field must agree with a field grown around the other.
        for z in 0..16 {
            for y in 20..130 {
                let own = carver.density(&left, 15, y, z, 200);
                let other = carver.density(&right, 15, y, z, 200);
                assert_eq!(own, other, "seam at (15, {y}, {z})");
            }
        }
    }

    #[test]
    fn test_disabled_caves_carve_nothing() {
        let mut s = settings();
        s.enabled = false;
        let carver = SdfCaveCarver::new(WorldSeed::new(42), s.clone());
        let field = carver.prepare_chunk(ChunkCoord::new(3, 3));
        assert_eq!(field.seed_count(), 0);
        assert_eq!(carver.density(&field, 50, 60, 50, 200), 0.0);
        let noise = NoiseCaveCarver::new(WorldSeed::new(42), s);
        assert_eq!(noise.density(&(), 50, 60, 50, 200), 0.0);
    }
}
