//! Cubic Hermite splines over one parameter.
//!
//! Terrain shape is authored as control points ("at continentalness -0.2 the
//! coast sits at Y 62") and the spline fills in between. Outside the first
//! and last point the curve is held flat.

use crate::error::{TerrainError, TerrainResult};

/// One control point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplinePoint {
    /// Parameter value of the point.
    pub location: f32,
    /// Curve value at the point.
    pub value: f32,
    /// Slope at the point (value per unit of location).
    pub derivative: f32,
}

impl SplinePoint {
    /// Creates a control point.
    #[must_use]
    pub const fn new(location: f32, value: f32, derivative: f32) -> Self {
        Self {
            location,
            value,
            derivative,
        }
    }
}

/// Piecewise cubic Hermite curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Spline {
    points: Vec<SplinePoint>,
}

impl Spline {
    /// Builds a spline from explicit points and slopes.
    ///
    /// # Errors
    ///
    /// [`TerrainError::InvalidSpline`] for fewer than two points, locations
    /// that are not strictly increasing, or non-finite numbers.
    pub fn new(points: Vec<SplinePoint>) -> TerrainResult<Self> {
        if points.len() < 2 {
            return Err(TerrainError::InvalidSpline(format!(
                "need at least 2 points, got {}",
                points.len()
            )));
        }
        for p in &points {
            if !(p.location.is_finite() && p.value.is_finite() && p.derivative.is_finite()) {
                return Err(TerrainError::InvalidSpline(format!("non-finite point {p:?}")));
            }
        }
        for pair in points.windows(2) {
            if pair[1].location <= pair[0].location {
                return Err(TerrainError::InvalidSpline(format!(
                    "locations not increasing at {}",
                    pair[1].location
                )));
            }
        }
        Ok(Self { points })
    }

    /// Builds a spline through `(location, value)` pairs with
    /// Fritsch-Carlson slopes, so monotonic data gives a monotonic curve.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn monotone(pairs: &[(f32, f32)]) -> TerrainResult<Self> {
        let n = pairs.len();
        if n < 2 {
            return Self::new(Vec::new());
        }

        let secants: Vec<f32> = pairs
            .windows(2)
            .map(|w| {
                let dx = w[1].0 - w[0].0;
                if dx > 0.0 {
                    (w[1].1 - w[0].1) / dx
                } else {
                    0.0
                }
            })
            .collect();

        let mut slopes = vec![0.0; n];
        slopes[0] = secants[0];
        slopes[n - 1] = secants[n - 2];
        for i in 1..n - 1 {
            let (a, b) = (secants[i - 1], secants[i]);
            slopes[i] = if a * b <= 0.0 { 0.0 } else { (a + b) * 0.5 };
        }

        // Limit slopes so no segment overshoots.
        for (i, &secant) in secants.iter().enumerate() {
            if secant == 0.0 {
                slopes[i] = 0.0;
                slopes[i + 1] = 0.0;
                continue;
            }
            let alpha = slopes[i] / secant;
            let beta = slopes[i + 1] / secant;
            let magnitude = alpha * alpha + beta * beta;
            if magnitude > 9.0 {
                let tau = 3.0 / magnitude.sqrt();
                slopes[i] = tau * alpha * secant;
                slopes[i + 1] = tau * beta * secant;
            }
        }

        Self::new(
            pairs
                .iter()
                .zip(slopes)
                .map(|(&(location, value), derivative)| SplinePoint::new(location, value, derivative))
                .collect(),
        )
    }

    /// Control points.
    #[must_use]
    pub fn points(&self) -> &[SplinePoint] {
        &self.points
    }

    /// Evaluates the curve. Non-finite input yields the first point's value.
    #[must_use]
    pub fn evaluate(&self, x: f32) -> f32 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if !x.is_finite() || x <= first.location {
            return first.value;
        }
        if x >= last.location {
            return last.value;
        }

        // First point strictly right of x; always in 1..len here.
        let upper = self.points.partition_point(|p| p.location <= x);
        let p0 = self.points[upper - 1];
        let p1 = self.points[upper];

        let span = p1.location - p0.location;
        let t = (x - p0.location) / span;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * p0.value + h10 * span * p0.derivative + h01 * p1.value + h11 * span * p1.derivative
    }
}
