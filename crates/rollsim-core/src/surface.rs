use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::constants::{ANGLE_EPSILON, ROLLING_FRICTION_FRACTION};
use crate::error::SimError;
use crate::math::Vec2;

/// Axis-aligned rectangle on the surface plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawBounds")]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self, SimError> {
        let ordered = x_min <= x_max && y_min <= y_max;
        if !ordered {
            return Err(SimError::InvalidBounds(format!(
                "[{x_min}, {x_max}] x [{y_min}, {y_max}] is empty"
            )));
        }
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// Square `[-half, half]²` centred on the origin.
    pub fn square(half: f64) -> Result<Self, SimError> {
        Self::new(-half, half, -half, half)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        (self.x_min..=self.x_max).contains(&p.x) && (self.y_min..=self.y_max).contains(&p.y)
    }
}

#[derive(Deserialize)]
struct RawBounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl TryFrom<RawBounds> for Bounds {
    type Error = SimError;

    fn try_from(raw: RawBounds) -> Result<Self, Self::Error> {
        Self::new(raw.x_min, raw.x_max, raw.y_min, raw.y_max)
    }
}

/// The plane a ball rolls on.
///
/// The angle is given in degrees, must lie strictly inside (-90°, 90°) and is
/// kept in radians. Bounds are informational: nothing keeps a ball inside them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawSurface")]
pub struct Surface {
    friction_coeff: f64,
    angle: f64,
    bounds: Option<Bounds>,
}

impl Surface {
    pub fn new(
        friction_coeff: f64,
        angle_degrees: f64,
        bounds: Option<Bounds>,
    ) -> Result<Self, SimError> {
        if !angle_degrees.is_finite() || angle_degrees.abs() >= 90.0 {
            return Err(SimError::InvalidAngle(angle_degrees));
        }
        Self::from_radians(friction_coeff, angle_degrees.to_radians(), bounds)
    }

    fn from_radians(
        friction_coeff: f64,
        angle: f64,
        bounds: Option<Bounds>,
    ) -> Result<Self, SimError> {
        if !friction_coeff.is_finite() || friction_coeff < 0.0 {
            return Err(SimError::NegativeFriction(friction_coeff));
        }
        if !angle.is_finite() || angle.abs() >= FRAC_PI_2 {
            return Err(SimError::InvalidAngle(angle.to_degrees()));
        }
        Ok(Self {
            friction_coeff,
            angle,
            bounds,
        })
    }

    /// Horizontal surface without bounds.
    pub fn flat(friction_coeff: f64) -> Result<Self, SimError> {
        Self::new(friction_coeff, 0.0, None)
    }

    pub fn friction_coeff(&self) -> f64 {
        self.friction_coeff
    }

    /// Inclination in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn is_flat(&self) -> bool {
        self.angle.abs() <= ANGLE_EPSILON
    }

    /// Always true when the surface has no bounds.
    pub fn is_within_bounds(&self, position: Vec2) -> bool {
        self.bounds.is_none_or(|b| b.contains(position))
    }

    /// Smallest friction coefficient that keeps a solid sphere rolling on
    /// this slope: (2/7)·tanθ.
    pub fn critical_friction(&self) -> f64 {
        ROLLING_FRICTION_FRACTION * self.angle.tan()
    }
}

/// Serialized form; the angle is in radians here.
#[derive(Deserialize)]
struct RawSurface {
    friction_coeff: f64,
    angle: f64,
    bounds: Option<Bounds>,
}

impl TryFrom<RawSurface> for Surface {
    type Error = SimError;

    fn try_from(raw: RawSurface) -> Result<Self, Self::Error> {
        Self::from_radians(raw.friction_coeff, raw.angle, raw.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_stored_in_radians() {
        let surface = Surface::new(0.5, 30.0, None).unwrap();
        assert!((surface.angle() - std::f64::consts::FRAC_PI_6).abs() < 1e-12);
        assert!((surface.angle_degrees() - 30.0).abs() < 1e-9);
        assert!(!surface.is_flat());
        assert!(Surface::flat(0.2).unwrap().is_flat());
    }

    #[test]
    fn unbounded_surface_contains_everything() {
        let surface = Surface::flat(0.1).unwrap();
        assert!(surface.is_within_bounds(Vec2::new(1e9, -1e9)));
    }

    #[test]
    fn bounds_membership_is_inclusive() {
        let surface = Surface::new(0.1, 0.0, Some(Bounds::square(2.0).unwrap())).unwrap();
        assert!(surface.is_within_bounds(Vec2::new(2.0, -2.0)));
        assert!(surface.is_within_bounds(Vec2::ZERO));
        assert!(!surface.is_within_bounds(Vec2::new(2.01, 0.0)));
        assert!(!surface.is_within_bounds(Vec2::new(0.0, -3.0)));
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert_eq!(
            Surface::new(-0.1, 0.0, None),
            Err(SimError::NegativeFriction(-0.1))
        );
        assert!(Surface::new(0.1, f64::NAN, None).is_err());
        assert!(Bounds::new(1.0, -1.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn angle_must_stay_below_vertical() {
        assert_eq!(
            Surface::new(0.5, 90.0, None),
            Err(SimError::InvalidAngle(90.0))
        );
        assert_eq!(
            Surface::new(0.5, -120.0, None),
            Err(SimError::InvalidAngle(-120.0))
        );
        let steep = Surface::new(0.5, -89.0, None).unwrap();
        assert!(steep.critical_friction() < 0.0);
    }

    #[test]
    fn deserializing_goes_through_validation() {
        let surface = Surface::new(0.4, 20.0, Some(Bounds::square(1.5).unwrap())).unwrap();
        let json = serde_json::to_string(&surface).unwrap();
        assert_eq!(serde_json::from_str::<Surface>(&json).unwrap(), surface);

        let negative = r#"{"friction_coeff":-1.0,"angle":0.0,"bounds":null}"#;
        assert!(serde_json::from_str::<Surface>(negative).is_err());
        let vertical = r#"{"friction_coeff":0.5,"angle":1.5707963267948966,"bounds":null}"#;
        assert!(serde_json::from_str::<Surface>(vertical).is_err());
        let inverted = r#"{"x_min":1.0,"x_max":-1.0,"y_min":0.0,"y_max":1.0}"#;
        assert!(serde_json::from_str::<Bounds>(inverted).is_err());
    }

    #[test]
    fn critical_friction_at_thirty_degrees() {
        let surface = Surface::new(0.0, 30.0, None).unwrap();
        let expected = 2.0 / 7.0 * (30.0_f64).to_radians().tan();
        assert!((surface.critical_friction() - expected).abs() < 1e-12);
    }
}
