use std::ops::{Add, Mul};

use crate::ball::Ball;
use crate::math::{Vec2, Vec3};

/// Flat `[x, y, vx, vy, ωx, ωy, ωz]` state exchanged with the ODE stepper.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateVector(pub [f64; 7]);

impl StateVector {
    pub fn new(position: Vec2, velocity: Vec2, angular_velocity: Vec3) -> Self {
        Self([
            position.x,
            position.y,
            velocity.x,
            velocity.y,
            angular_velocity.x,
            angular_velocity.y,
            angular_velocity.z,
        ])
    }

    pub fn from_ball(ball: &Ball) -> Self {
        Self::new(ball.position, ball.velocity, ball.angular_velocity)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.0[0], self.0[1])
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.0[2], self.0[3])
    }

    pub fn angular_velocity(&self) -> Vec3 {
        Vec3::new(self.0[4], self.0[5], self.0[6])
    }

    /// Write the kinematic state back into `ball`.
    pub fn apply_to(&self, ball: &mut Ball) {
        ball.position = self.position();
        ball.velocity = self.velocity();
        ball.angular_velocity = self.angular_velocity();
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Add for StateVector {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o += r;
        }
        Self(out)
    }
}

impl Mul<f64> for StateVector {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self(self.0.map(|v| v * rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ball_state_survives_extraction_and_write_back() {
        let mut ball = Ball::new(
            1.0,
            0.1,
            Vec2::new(1.0, 2.0),
            Vec2::new(3.0, 4.0),
            Vec3::new(5.0, 6.0, 7.0),
        )
        .unwrap();
        let state = StateVector::from_ball(&ball);
        assert_eq!(state.0, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);

        let shifted = state + StateVector([1.0; 7]) * 0.5;
        shifted.apply_to(&mut ball);
        assert_eq!(ball.position, Vec2::new(1.5, 2.5));
        assert_eq!(ball.angular_velocity, Vec3::new(5.5, 6.5, 7.5));
        assert_eq!(ball.mass(), 1.0);
    }
}
