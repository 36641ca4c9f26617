use serde::{Deserialize, Serialize};

use crate::constants::SOLID_SPHERE_INERTIA_FACTOR;
use crate::error::{SimError, ensure_positive};
use crate::math::{Vec2, Vec3};

/// A solid sphere in contact with the surface.
///
/// Mass and radius are fixed at construction; the kinematic state is public
/// and is rewritten by the integrator every step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawBall")]
pub struct Ball {
    mass: f64,
    radius: f64,
    pub position: Vec2,
    pub velocity: Vec2,
    pub angular_velocity: Vec3,
}

impl Ball {
    pub fn new(
        mass: f64,
        radius: f64,
        position: Vec2,
        velocity: Vec2,
        angular_velocity: Vec3,
    ) -> Result<Self, SimError> {
        Ok(Self {
            mass: ensure_positive(mass, SimError::InvalidMass)?,
            radius: ensure_positive(radius, SimError::InvalidRadius)?,
            position,
            velocity,
            angular_velocity,
        })
    }

    /// A ball resting at `position` with no motion.
    pub fn at_rest(mass: f64, radius: f64, position: Vec2) -> Result<Self, SimError> {
        Self::new(mass, radius, position, Vec2::ZERO, Vec3::ZERO)
    }

    /// A ball moving with `velocity` and the spin that makes it roll without
    /// slipping.
    pub fn rolling(mass: f64, radius: f64, position: Vec2, velocity: Vec2) -> Result<Self, SimError> {
        let radius = ensure_positive(radius, SimError::InvalidRadius)?;
        let spin = Vec3::new(-velocity.y / radius, velocity.x / radius, 0.0);
        Self::new(mass, radius, position, velocity, spin)
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Moment of inertia of a solid sphere: (2/5)·m·r².
    pub fn moment_of_inertia(&self) -> f64 {
        SOLID_SPHERE_INERTIA_FACTOR * self.mass * self.radius * self.radius
    }

    pub fn translational_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    pub fn rotational_energy(&self) -> f64 {
        0.5 * self.moment_of_inertia() * self.angular_velocity.length_squared()
    }

    /// Translational plus rotational kinetic energy.
    pub fn kinetic_energy(&self) -> f64 {
        self.translational_energy() + self.rotational_energy()
    }

    pub fn angular_momentum(&self) -> Vec3 {
        self.angular_velocity * self.moment_of_inertia()
    }

    pub fn linear_momentum(&self) -> Vec2 {
        self.velocity * self.mass
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn angular_speed(&self) -> f64 {
        self.angular_velocity.length()
    }

    /// Mean density in kg/m³.
    pub fn density(&self) -> f64 {
        let volume = 4.0 / 3.0 * std::f64::consts::PI * self.radius.powi(3);
        self.mass / volume
    }

    /// Zero all motion.
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }
}

#[derive(Deserialize)]
struct RawBall {
    mass: f64,
    radius: f64,
    position: Vec2,
    velocity: Vec2,
    angular_velocity: Vec3,
}

impl TryFrom<RawBall> for Ball {
    type Error = SimError;

    fn try_from(raw: RawBall) -> Result<Self, Self::Error> {
        Self::new(
            raw.mass,
            raw.radius,
            raw.position,
            raw.velocity,
            raw.angular_velocity,
        )
    }
}
