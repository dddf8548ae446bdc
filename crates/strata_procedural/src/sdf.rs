//! # Signed Distance Primitives
//!
//! Caves are unions of simple solids. Each primitive answers one question:
//! how far is this point from my surface? Negative inside, positive outside.
//!
//! Constructors validate dimensions and fail with
//! [`TerrainError::InvalidPrimitive`]; nothing is silently clamped.

use crate::error::{TerrainError, TerrainResult};
use crate::geometry::{Aabb, Vec3};

/// Distance reported when a primitive cannot affect a point.
pub const NO_EFFECT: f32 = f32::MAX;

/// A cave solid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SdfPrimitive {
    /// Ball.
    Sphere {
        /// Center point
        center: Vec3,
        /// Radius
        radius: f32,
    },
    /// Segment swept by a ball; tunnel pieces.
    Capsule {
        /// First endpoint
        start: Vec3,
        /// Second endpoint
        end: Vec3,
        /// Radius
        radius: f32,
    },
    /// Capped cylinder; vertical shafts.
    Cylinder {
        /// Center of the axis segment
        center: Vec3,
        /// Unit axis direction
        axis: Vec3,
        /// Radius
        radius: f32,
        /// Half the length along the axis
        half_height: f32,
    },
}

fn check_radius(shape: &'static str, radius: f32) -> TerrainResult<()> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(TerrainError::InvalidPrimitive {
            shape,
            reason: format!("radius must be positive, got {radius}"),
        })
    }
}

fn check_point(shape: &'static str, p: Vec3) -> TerrainResult<()> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(TerrainError::InvalidPrimitive {
            shape,
            reason: format!("non-finite point {p:?}"),
        })
    }
}

impl SdfPrimitive {
    /// Creates a sphere.
    ///
    /// # Errors
    ///
    /// Non-positive radius or non-finite center.
    pub fn sphere(center: Vec3, radius: f32) -> TerrainResult<Self> {
        check_radius("sphere", radius)?;
        check_point("sphere", center)?;
        Ok(Self::Sphere { center, radius })
    }

    /// Creates a capsule. Coincident endpoints give a sphere-shaped capsule.
    ///
    /// # Errors
    ///
    /// Non-positive radius or non-finite endpoints.
    pub fn capsule(start: Vec3, end: Vec3, radius: f32) -> TerrainResult<Self> {
        check_radius("capsule", radius)?;
        check_point("capsule", start)?;
        check_point("capsule", end)?;
        Ok(Self::Capsule { start, end, radius })
    }

    /// Creates a capped cylinder around `axis` (normalized here).
    ///
    /// # Errors
    ///
    /// Non-positive radius or half-height, zero axis, non-finite center.
    pub fn cylinder(center: Vec3, axis: Vec3, radius: f32, half_height: f32) -> TerrainResult<Self> {
        check_radius("cylinder", radius)?;
        check_point("cylinder", center)?;
        if !(half_height.is_finite() && half_height > 0.0) {
            return Err(TerrainError::InvalidPrimitive {
                shape: "cylinder",
                reason: format!("half height must be positive, got {half_height}"),
            });
        }
        let axis = axis.normalized().ok_or_else(|| TerrainError::InvalidPrimitive {
            shape: "cylinder",
            reason: "axis has zero length".to_string(),
        })?;
        Ok(Self::Cylinder {
            center,
            axis,
            radius,
            half_height,
        })
    }

    /// Radius of the primitive's cross-section.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        match *self {
            Self::Sphere { radius, .. } | Self::Capsule { radius, .. } | Self::Cylinder { radius, .. } => {
                radius
            }
        }
    }

    /// Signed distance from `p` to the surface. [`NO_EFFECT`] for
    /// non-finite points.
    #[must_use]
    pub fn distance(&self, p: Vec3) -> f32 {
        if !p.is_finite() {
            return NO_EFFECT;
        }
        match *self {
            Self::Sphere { center, radius } => p.distance(center) - radius,
            Self::Capsule { start, end, radius } => {
                let pa = p - start;
                let ba = end - start;
                let len_sq = ba.length_squared();
                let h = if len_sq > f32::EPSILON {
                    (pa.dot(ba) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                (pa - ba * h).length() - radius
            }
            Self::Cylinder {
                center,
                axis,
                radius,
                half_height,
            } => {
                let d = p - center;
                let along = d.dot(axis);
                let radial = (d - axis * along).length();
                let dr = radial - radius;
                let dh = along.abs() - half_height;
                let outside = (dr.max(0.0) * dr.max(0.0) + dh.max(0.0) * dh.max(0.0)).sqrt();
                outside + dr.max(dh).min(0.0)
            }
        }
    }

    /// Bounding box of the solid.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        match *self {
            Self::Sphere { center, radius } => Aabb::from_corners(center, center).inflate(radius),
            Self::Capsule { start, end, radius } => Aabb::from_corners(start, end).inflate(radius),
            Self::Cylinder {
                center,
                axis,
                radius,
                half_height,
            } => {
                let tip = axis * half_height;
                Aabb::from_corners(center - tip, center + tip).inflate(radius)
            }
        }
    }
}
