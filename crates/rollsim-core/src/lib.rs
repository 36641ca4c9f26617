pub mod ball;
pub mod collision;
pub mod constants;
pub mod dynamics;
pub mod error;
pub mod math;
pub mod state;
pub mod surface;

pub use ball::Ball;
pub use collision::{Wall, resolve_ball_pair, resolve_wall};
pub use dynamics::{BallDynamics, Evaluation, Regime};
pub use error::{SimError, validate_restitution};
pub use math::{Axis, Vec2, Vec3};
pub use state::StateVector;
pub use surface::{Bounds, Surface};

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::ball::Ball;
    use crate::math::{Vec2, Vec3};
    use crate::surface::Surface;

    /// 1 kg, 10 cm ball at the origin with no motion.
    pub fn resting_ball() -> Ball {
        Ball::at_rest(1.0, 0.1, Vec2::ZERO).expect("valid ball")
    }

    /// Ball with the given mass and radius, moving along x with no spin.
    pub fn sliding_ball(mass: f64, radius: f64, x: f64, vx: f64) -> Ball {
        Ball::new(
            mass,
            radius,
            Vec2::new(x, 0.0),
            Vec2::new(vx, 0.0),
            Vec3::ZERO,
        )
        .expect("valid ball")
    }

    /// Ball rolling without slipping along x.
    pub fn rolling_ball(mass: f64, radius: f64, vx: f64) -> Ball {
        Ball::rolling(mass, radius, Vec2::ZERO, Vec2::new(vx, 0.0)).expect("valid ball")
    }

    pub fn incline(friction: f64, angle_degrees: f64) -> Surface {
        Surface::new(friction, angle_degrees, None).expect("valid surface")
    }

    pub fn flat(friction: f64) -> Surface {
        Surface::flat(friction).expect("valid surface")
    }

    /// Assert `actual` is within `rel` relative error of `expected`.
    pub fn assert_close(actual: f64, expected: f64, rel: f64) {
        let err = (actual - expected).abs() / expected.abs().max(f64::EPSILON);
        assert!(
            err < rel,
            "expected {expected}, got {actual} (relative error {err:.4} >= {rel})"
        );
    }
}
