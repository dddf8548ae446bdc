//! Smoothing and easing helpers shared by the climate, height and cave code.
//!
//! Everything here is a pure `f32 -> f32` function. None of them panic;
//! degenerate edges (`edge0 == edge1`) fall back to a hard step.

/// Linear interpolation from `a` to `b`.
#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Standard bilinear blend of four corner values.
///
/// `v00` is at `(0, 0)`, `v10` at `(1, 0)`, `v01` at `(0, 1)`, `v11` at `(1, 1)`.
#[inline]
#[must_use]
pub fn bilinear(v00: f32, v10: f32, v01: f32, v11: f32, tx: f32, tz: f32) -> f32 {
    lerp(lerp(v00, v10, tx), lerp(v01, v11, tx), tz)
}

/// Hermite smoothstep of `x` between two edges, clamped to `[0, 1]`.
#[inline]
#[must_use]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if (edge1 - edge0).abs() <= f32::EPSILON {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Quantizes `value` into plateaus of height `step`.
///
/// The last `softness` fraction of every step is a smoothstep riser, so the
/// result stays continuous for `softness > 0`. `softness == 0` gives hard
/// stairs.
#[must_use]
pub fn terrace(value: f32, step: f32, softness: f32) -> f32 {
    if step <= 0.0 || !value.is_finite() {
        return value;
    }
    let k = value / step;
    let base = k.floor();
    let frac = k - base;
    let softness = softness.clamp(0.0, 1.0);
    let riser = if softness <= 0.0 {
        0.0
    } else {
        smoothstep(1.0 - softness, 1.0, frac)
    };
    (base + riser) * step
}

/// Trapezoid fade: 0 below `fade_in.0`, ramps to 1 by `fade_in.1`, holds,
/// then ramps back to 0 between `fade_out.0` and `fade_out.1`.
#[inline]
#[must_use]
pub fn altitude_fade(y: f32, fade_in: (f32, f32), fade_out: (f32, f32)) -> f32 {
    smoothstep(fade_in.0, fade_in.1, y) * (1.0 - smoothstep(fade_out.0, fade_out.1, y))
}

/// Quantizes a `[-1, 1]` value into `levels` evenly spaced plateaus.
///
/// `blend` mixes the raw value back in for softer plateau edges.
#[must_use]
pub fn quantize_signed(value: f32, levels: u32, blend: f32) -> f32 {
    if levels < 2 || !value.is_finite() {
        return if value.is_finite() { value } else { 0.0 };
    }
    let normalized = ((value + 1.0) * 0.5).clamp(0.0, 1.0);
    let top = (levels - 1) as f32;
    let level = (normalized * levels as f32).floor().min(top);
    let stepped = (level / top) * 2.0 - 1.0;
    lerp(stepped, value, blend.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(smoothstep(3.0, 3.0, 2.0), 0.0);
        assert_eq!(smoothstep(3.0, 3.0, 4.0), 1.0);
    }

    #[test]
    fn test_bilinear_midpoint_is_mean() {
        let mid = bilinear(1.0, 3.0, 5.0, 7.0, 0.5, 0.5);
        assert!((mid - 4.0).abs() < 1e-6);
        assert_eq!(bilinear(1.0, 3.0, 5.0, 7.0, 0.0, 0.0), 1.0);
        assert_eq!(bilinear(1.0, 3.0, 5.0, 7.0, 1.0, 1.0), 7.0);
    }

    #[test]
    fn test_terrace_is_monotonic_and_continuous() {
        let mut previous = terrace(0.0, 8.0, 0.3);
        let mut x = 0.0;
        while x < 64.0 {
            x += 0.05;
            let t = terrace(x, 8.0, 0.3);
            assert!(t + 1e-4 >= previous, "terrace went backwards at {x}");
            assert!(t - previous < 1.0, "terrace jumped at {x}");
            previous = t;
        }
        // Hard stairs sit exactly on multiples of the step.
        assert_eq!(terrace(13.0, 4.0, 0.0), 12.0);
    }

    #[test]
    fn test_altitude_fade_shape() {
        let fade = |y| altitude_fade(y, (5.0, 40.0), (120.0, 160.0));
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(80.0), 1.0);
        assert_eq!(fade(200.0), 0.0);
        assert!(fade(20.0) > 0.0 && fade(20.0) < 1.0);
    }

    #[test]
    fn test_quantize_signed() {
        assert_eq!(quantize_signed(-1.0, 3, 0.0), -1.0);
        assert_eq!(quantize_signed(1.0, 3, 0.0), 1.0);
        assert_eq!(quantize_signed(0.05, 3, 0.0), 0.0);
        assert_eq!(quantize_signed(0.3, 3, 1.0), 0.3);
        assert_eq!(quantize_signed(f32::NAN, 4, 0.5), 0.0);
    }
}
