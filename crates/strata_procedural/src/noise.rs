//! # Simplex Noise Implementation
//!
//! High-performance, deterministic noise generation.
//!
//! ## Layers
//!
//! - [`SimplexNoise`]: raw 2D/3D simplex, one permutation table per seed
//! - [`FractalNoise`]: octave sums plus the ridged and terraced derivatives
//!   that drive mountains and weirdness
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, this implementation will produce
//! **exactly** the same values on any platform, any time.
//!
//! ## Failure Mode
//!
//! Nothing here panics on finite input. A non-finite coordinate or an
//! intermediate NaN collapses to `0.0`, which terrain treats as "average".

use serde::{Deserialize, Serialize};

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose (e.g., humidity noise).
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // FNV-1a style mixing
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

/// Maps a possibly broken float to something terrain can use.
#[inline]
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl PermutationTable {
    /// 12 gradient vectors for 2D simplex.
    const GRAD2: [[i8; 2]; 12] = [
        [1, 0], [1, 1], [0, 1], [-1, 1],
        [-1, 0], [-1, -1], [0, -1], [1, -1],
        [1, 0], [0, 1], [-1, 0], [0, -1],
    ];

    /// 12 gradient vectors for 3D simplex (cube edge midpoints).
    const GRAD3: [[i8; 3]; 12] = [
        [1, 1, 0], [-1, 1, 0], [1, -1, 0], [-1, -1, 0],
        [1, 0, 1], [-1, 0, 1], [1, 0, -1], [-1, 0, -1],
        [0, 1, 1], [0, -1, 1], [0, 1, -1], [0, -1, -1],
    ];

    /// Creates a new permutation table from a seed.
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];

        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle; xorshift64 never leaves zero, so force a bit on
        let mut rng_state = seed.value() | 1;
        for i in (1..256).rev() {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 7;
            rng_state ^= rng_state << 17;

            let j = (rng_state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        // Double the table to avoid index wrapping
        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm }
    }

    /// Gets a permutation value (with automatic wrapping).
    #[inline]
    fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }

    #[inline]
    fn gradient2(hash: usize) -> [i8; 2] {
        Self::GRAD2[hash % 12]
    }

    #[inline]
    fn gradient3(hash: usize) -> [i8; 3] {
        Self::GRAD3[hash % 12]
    }
}

/// Simplex noise generator.
///
/// Produces smooth, continuous noise values in the range [-1, 1].
///
/// # Performance
///
/// - O(1) per sample
/// - No allocations
/// - Immutable after construction, so one instance serves every worker
pub struct SimplexNoise {
    /// The permutation table.
    perm_table: PermutationTable,
}

impl SimplexNoise {
    /// Skewing factor for 2D simplex grid.
    const F2: f64 = 0.366_025_403_784_439; // (sqrt(3) - 1) / 2
    /// Unskewing factor for 2D simplex grid.
    const G2: f64 = 0.211_324_865_405_187; // (3 - sqrt(3)) / 6
    /// Skewing factor for 3D simplex grid.
    const F3: f64 = 1.0 / 3.0;
    /// Unskewing factor for 3D simplex grid.
    const G3: f64 = 1.0 / 6.0;

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Samples 2D simplex noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1]; `0.0` for non-finite input.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        if !x.is_finite() || !y.is_finite() {
            return 0.0;
        }

        // Skew input coordinates to simplex grid
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        // Unskew to get first corner in simplex
        let unskew = f64::from(i.wrapping_add(j)) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        // Upper or lower triangle
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1 as u8) + Self::G2;
        let y1 = y0 - f64::from(j1 as u8) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let p = &self.perm_table;

        let gi0 = p.get(ii + p.get(jj));
        let gi1 = p.get(ii + i1 + p.get(jj + j1));
        let gi2 = p.get(ii + 1 + p.get(jj + 1));

        let n0 = Self::contribution2(x0, y0, gi0);
        let n1 = Self::contribution2(x1, y1, gi1);
        let n2 = Self::contribution2(x2, y2, gi2);

        // 70.0 normalizes the output to [-1, 1]
        finite_or_zero(70.0 * (n0 + n1 + n2)).clamp(-1.0, 1.0)
    }

    /// Samples 3D simplex noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1]; `0.0` for non-finite input.
    #[must_use]
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        if !x.is_finite() || !y.is_finite() || !z.is_finite() {
            return 0.0;
        }

        let skew = (x + y + z) * Self::F3;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);
        let k = fast_floor(z + skew);

        let unskew = f64::from(i.wrapping_add(j).wrapping_add(k)) * Self::G3;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);
        let z0 = z - (f64::from(k) - unskew);

        // Which of the six tetrahedra we are in
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - f64::from(i1 as u8) + Self::G3;
        let y1 = y0 - f64::from(j1 as u8) + Self::G3;
        let z1 = z0 - f64::from(k1 as u8) + Self::G3;
        let x2 = x0 - f64::from(i2 as u8) + 2.0 * Self::G3;
        let y2 = y0 - f64::from(j2 as u8) + 2.0 * Self::G3;
        let z2 = z0 - f64::from(k2 as u8) + 2.0 * Self::G3;
        let x3 = x0 - 1.0 + 3.0 * Self::G3;
        let y3 = y0 - 1.0 + 3.0 * Self::G3;
        let z3 = z0 - 1.0 + 3.0 * Self::G3;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let kk = (k & 255) as usize;
        let p = &self.perm_table;

        let gi0 = p.get(ii + p.get(jj + p.get(kk)));
        let gi1 = p.get(ii + i1 + p.get(jj + j1 + p.get(kk + k1)));
        let gi2 = p.get(ii + i2 + p.get(jj + j2 + p.get(kk + k2)));
        let gi3 = p.get(ii + 1 + p.get(jj + 1 + p.get(kk + 1)));

        let n0 = Self::contribution3(x0, y0, z0, gi0);
        let n1 = Self::contribution3(x1, y1, z1, gi1);
        let n2 = Self::contribution3(x2, y2, z2, gi2);
        let n3 = Self::contribution3(x3, y3, z3, gi3);

        // 32.0 normalizes the output to [-1, 1]
        finite_or_zero(32.0 * (n0 + n1 + n2 + n3)).clamp(-1.0, 1.0)
    }

    /// Calculates the contribution from one corner of a 2D simplex.
    #[inline]
    fn contribution2(x: f64, y: f64, gradient_index: usize) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let grad = PermutationTable::gradient2(gradient_index);
            let t2 = t * t;
            t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
        }
    }

    /// Calculates the contribution from one corner of a 3D simplex.
    #[inline]
    fn contribution3(x: f64, y: f64, z: f64, gradient_index: usize) -> f64 {
        let t = 0.6 - x * x - y * y - z * z;
        if t < 0.0 {
            0.0
        } else {
            let grad = PermutationTable::gradient3(gradient_index);
            let t2 = t * t;
            t2 * t2
                * (x * f64::from(grad[0]) + y * f64::from(grad[1]) + z * f64::from(grad[2]))
        }
    }

    /// Generates octaved (fractal) noise.
    ///
    /// Combines multiple layers of noise at different frequencies
    /// to create more natural-looking terrain.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Coordinates
    /// * `octaves` - Number of noise layers (typically 4-8)
    /// * `persistence` - Amplitude decay per octave (typically 0.5)
    /// * `lacunarity` - Frequency increase per octave (typically 2.0)
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    pub fn octaved(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude <= 0.0 {
            return 0.0;
        }
        finite_or_zero(total / max_amplitude).clamp(-1.0, 1.0)
    }

    /// Generates ridged noise (good for mountains and cave tubes).
    ///
    /// Each octave contributes `(1 - |noise|)^sharpness`, so the result lies
    /// in `[0, 1]` with ridges along the zero crossings of the base noise.
    #[must_use]
    pub fn ridged(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
        sharpness: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            let noise = self.sample(x * frequency, y * frequency);
            let ridge = (1.0 - noise.abs()).powf(sharpness);
            total += ridge * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude <= 0.0 {
            return 0.0;
        }
        finite_or_zero(total / max_amplitude).clamp(0.0, 1.0)
    }
}

/// Fast floor function.
///
/// Faster than `f64::floor()` for our use case.
#[inline]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) {
        xi - 1
    } else {
        xi
    }
}

/// Octave settings for one noise field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FractalSettings {
    /// Base frequency in cycles per block.
    pub frequency: f64,
    /// Number of octaves.
    pub octaves: u32,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
}

impl FractalSettings {
    /// Creates settings with the usual persistence 0.5 / lacunarity 2.0.
    #[must_use]
    pub const fn new(frequency: f64, octaves: u32) -> Self {
        Self {
            frequency,
            octaves,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl Default for FractalSettings {
    fn default() -> Self {
        Self::new(0.002, 4)
    }
}

/// A seeded simplex field with fixed octave settings.
///
/// This is the unit every terrain parameter is built from: one instance per
/// parameter, each with its own derived seed so the fields are independent.
pub struct FractalNoise {
    noise: SimplexNoise,
    settings: FractalSettings,
}

impl FractalNoise {
    /// Creates a fractal field.
    #[must_use]
    pub fn new(seed: WorldSeed, settings: FractalSettings) -> Self {
        Self {
            noise: SimplexNoise::new(seed),
            settings,
        }
    }

    /// Returns the octave settings.
    #[must_use]
    pub const fn settings(&self) -> FractalSettings {
        self.settings
    }

    /// Octaved 2D noise in `[-1, 1]`.
    #[inline]
    #[must_use]
    pub fn sample(&self, x: f64, z: f64) -> f32 {
        let s = &self.settings;
        self.noise.octaved(
            x * s.frequency,
            z * s.frequency,
            s.octaves,
            s.persistence,
            s.lacunarity,
        ) as f32
    }

    /// Ridged 2D noise remapped to `[-1, 1]`.
    ///
    /// `sharpness` is the ridge exponent; 2.0 gives the classic
    /// `(1 - |n|)²` profile, higher values pinch the ridges.
    #[must_use]
    pub fn ridged(&self, x: f64, z: f64, sharpness: f64) -> f32 {
        let s = &self.settings;
        let ridge = self.noise.ridged(
            x * s.frequency,
            z * s.frequency,
            s.octaves,
            s.persistence,
            s.lacunarity,
            sharpness,
        );
        (ridge * 2.0 - 1.0) as f32
    }

    /// Ridged 3D noise in `[0, 1]` (1 on the ridge).
    ///
    /// Octaves are summed the same way as the 2D variant; the vertical axis
    /// is squashed by `y_scale` so tunnels run mostly horizontal.
    #[must_use]
    pub fn ridged_3d(&self, x: f64, y: f64, z: f64, y_scale: f64, sharpness: f64) -> f32 {
        let s = &self.settings;
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = s.frequency;
        let mut max_amplitude = 0.0;

        for _ in 0..s.octaves {
            let n = self
                .noise
                .sample_3d(x * frequency, y * frequency * y_scale, z * frequency);
            total += (1.0 - n.abs()).powf(sharpness) * amplitude;
            max_amplitude += amplitude;
            amplitude *= s.persistence;
            frequency *= s.lacunarity;
        }

        if max_amplitude <= 0.0 {
            return 0.0;
        }
        finite_or_zero(total / max_amplitude).clamp(0.0, 1.0) as f32
    }

    /// Terraced ("weirdness") noise in `[-1, 1]`.
    ///
    /// The normalized value is quantized into `levels` plateaus; `blend`
    /// mixes the raw value back in (0 = hard steps, 1 = raw noise).
    #[must_use]
    pub fn terraced(&self, x: f64, z: f64, levels: u32, blend: f32) -> f32 {
        let raw = self.sample(x, z);
        crate::easing::quantize_signed(raw, levels, blend)
    }
}
