//! Instantaneous dynamics of a sphere on a plane.
//!
//! Coordinates are plane-local: `x` points down the slope, `y` runs across it
//! and `z` is the surface normal. The contact point sits at `(0, 0, -R)` from
//! the centre, so the contact-point velocity is `v + ω × (0, 0, -R)` and
//! rolling without slipping means `ωy = vx / R`, `ωx = -vy / R`.
//!
//! The slipping branch applies kinetic friction at the contact point; its
//! torque spins the ball up toward the rolling relation above. The rolling
//! branch prescribes the acceleration and derives the angular acceleration
//! from the same relation.

use serde::{Deserialize, Serialize};

use crate::ball::Ball;
use crate::constants::{
    CONTACT_SLIP_EPSILON, RADIUS_EPSILON, ROLLING_ACCELERATION_FRACTION, ROLLING_FRICTION_FRACTION,
    ROLLING_VELOCITY_EPSILON, VELOCITY_EPSILON,
};
use crate::error::SimError;
use crate::math::{Vec2, Vec3};
use crate::state::StateVector;
use crate::surface::Surface;

/// Contact regime chosen by a derivative evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    #[default]
    Rolling,
    Slipping,
}

impl Regime {
    pub fn is_slipping(self) -> bool {
        self == Regime::Slipping
    }
}

/// Result of one derivative evaluation: the state derivative together with
/// the regime it was computed under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub derivative: StateVector,
    pub regime: Regime,
}

/// Evaluates the equations of motion for one ball on one surface.
///
/// Holds a copy of the ball's mass properties, so it stays valid while the
/// integrator mutates the ball's kinematic state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallDynamics {
    mass: f64,
    radius: f64,
    inertia: f64,
    surface: Surface,
    gravity: f64,
}

impl BallDynamics {
    pub fn new(ball: &Ball, surface: Surface, gravity: f64) -> Result<Self, SimError> {
        if !gravity.is_finite() || gravity < 0.0 {
            return Err(SimError::InvalidGravity(gravity));
        }
        Ok(Self {
            mass: ball.mass(),
            radius: ball.radius(),
            inertia: ball.moment_of_inertia(),
            surface,
            gravity,
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Downslope component of gravity (N), positive toward +x.
    pub fn downslope_force(&self) -> f64 {
        self.mass * self.gravity * self.surface.angle().sin()
    }

    /// N = m·g·cosθ. Contact is never lost.
    pub fn normal_force(&self) -> f64 {
        self.mass * self.gravity * self.surface.angle().cos()
    }

    /// Static friction needed to keep the ball rolling: (2/7)·m·g·sinθ.
    pub fn required_friction(&self) -> f64 {
        ROLLING_FRICTION_FRACTION * self.downslope_force().abs()
    }

    /// μ·N.
    pub fn max_static_friction(&self) -> f64 {
        self.surface.friction_coeff() * self.normal_force()
    }

    /// Regime the surface and mass properties impose. Flat surfaces always
    /// roll.
    pub fn regime(&self) -> Regime {
        if !self.surface.is_flat() && self.required_friction() > self.max_static_friction() {
            Regime::Slipping
        } else {
            Regime::Rolling
        }
    }

    /// Kinetic friction force for a slipping ball moving with `velocity`.
    ///
    /// Opposes the motion; a ball without meaningful speed gets friction
    /// opposing the downslope direction instead.
    pub fn kinetic_friction(&self, velocity: Vec2) -> Vec2 {
        let magnitude = self.surface.friction_coeff() * self.normal_force();
        let speed = velocity.length();
        if speed > VELOCITY_EPSILON {
            velocity * (-magnitude / speed)
        } else {
            let downslope = self.downslope_force();
            if downslope.abs() > VELOCITY_EPSILON {
                Vec2::new(-downslope.signum() * magnitude, 0.0)
            } else {
                Vec2::ZERO
            }
        }
    }

    /// Compute the time derivative of `state` and the regime it was computed
    /// under.
    pub fn evaluate(&self, state: &StateVector) -> Evaluation {
        let velocity = state.velocity();
        let regime = self.regime();

        let (acceleration, angular_acceleration) = match regime {
            Regime::Slipping => {
                let gravity = Vec2::new(self.downslope_force(), 0.0);
                let friction = self.kinetic_friction(velocity);
                let acceleration = (gravity + friction) * (1.0 / self.mass);

                let torque = self.contact_arm().cross(friction.extend());
                let angular = if self.radius > RADIUS_EPSILON {
                    torque * (1.0 / self.inertia)
                } else {
                    Vec3::ZERO
                };
                (acceleration, angular)
            },
            Regime::Rolling => {
                let acceleration = self.rolling_acceleration(velocity);
                (acceleration, self.no_slip_angular_acceleration(acceleration))
            },
        };

        Evaluation {
            derivative: StateVector::new(velocity, acceleration, angular_acceleration),
            regime,
        }
    }

    /// Acceleration while rolling: (5/7)·g·sinθ downslope on an incline, or
    /// rolling resistance (2/7)·μ·g against the motion on a flat surface.
    ///
    /// The flat-surface branch reuses the sliding friction coefficient as a
    /// rolling-resistance coefficient.
    fn rolling_acceleration(&self, velocity: Vec2) -> Vec2 {
        if !self.surface.is_flat() {
            return Vec2::new(
                ROLLING_ACCELERATION_FRACTION * self.gravity * self.surface.angle().sin(),
                0.0,
            );
        }
        let speed = velocity.length();
        if speed > ROLLING_VELOCITY_EPSILON {
            velocity * (-self.rolling_resistance() / speed)
        } else {
            Vec2::ZERO
        }
    }

    /// Magnitude of the flat-surface rolling-resistance deceleration:
    /// (2/7)·μ·g. Zero on an incline.
    pub fn rolling_resistance(&self) -> f64 {
        if self.surface.is_flat() {
            ROLLING_FRICTION_FRACTION * self.surface.friction_coeff() * self.gravity
        } else {
            0.0
        }
    }

    /// Whether rolling resistance brings a ball moving at `before` to a halt
    /// within a step of `dt` that ended at `after`.
    ///
    /// Resistance switches off below the stationary threshold, so a
    /// fixed-step integrator that straddles the stop cannot settle on its
    /// own; callers zero the motion when this returns true.
    pub fn halts_within_step(&self, before: Vec2, after: Vec2, dt: f64) -> bool {
        let deceleration = self.rolling_resistance();
        let speed = before.length();
        if deceleration <= 0.0 || speed <= ROLLING_VELOCITY_EPSILON {
            return false;
        }
        speed <= deceleration * dt || after.dot(before) <= 0.0
    }

    fn no_slip_angular_acceleration(&self, acceleration: Vec2) -> Vec3 {
        if self.radius > RADIUS_EPSILON {
            Vec3::new(
                -acceleration.y / self.radius,
                acceleration.x / self.radius,
                0.0,
            )
        } else {
            Vec3::ZERO
        }
    }

    fn contact_arm(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, -self.radius)
    }

    /// Velocity of the material point touching the surface.
    pub fn contact_velocity(&self, ball: &Ball) -> Vec2 {
        ball.velocity + ball.angular_velocity.cross(self.contact_arm()).truncate()
    }

    /// Whether the contact point is actually sliding over the surface.
    pub fn is_contact_slipping(&self, ball: &Ball) -> bool {
        self.contact_velocity(ball).length() > CONTACT_SLIP_EPSILON
    }
}
