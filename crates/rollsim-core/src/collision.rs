//! Discrete collision resolution against axis-aligned walls and other balls.
//!
//! Both resolvers test for penetration at the current positions only and
//! change linear velocity along the contact normal. Tangential velocity and
//! spin are left untouched. Restitution is expected to be validated by the
//! caller.

use serde::{Deserialize, Serialize};

use crate::ball::Ball;
use crate::constants::DISTANCE_EPSILON;
use crate::math::Axis;

/// An infinite wall perpendicular to `axis`, located at `position` on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Wall {
    pub position: f64,
    #[serde(default)]
    pub axis: Axis,
}

impl Wall {
    pub const fn new(position: f64, axis: Axis) -> Self {
        Self { position, axis }
    }

    /// The four walls of the square `[-half, half]²`, ordered +x, -x, +y, -y.
    pub fn square(half: f64) -> [Wall; 4] {
        [
            Wall::new(half, Axis::X),
            Wall::new(-half, Axis::X),
            Wall::new(half, Axis::Y),
            Wall::new(-half, Axis::Y),
        ]
    }
}

/// Bounce `ball` off `wall` if it is within one radius of it.
///
/// The normal velocity component becomes `-e·v` and the ball is placed
/// exactly one radius from the wall on the side its centre was on. Returns
/// whether a collision was resolved.
pub fn resolve_wall(ball: &mut Ball, wall: &Wall, restitution: f64) -> bool {
    let axis = wall.axis;
    let distance = ball.position.component(axis) - wall.position;
    if distance.abs() > ball.radius() {
        return false;
    }

    let v = ball.velocity.component(axis);
    ball.velocity.set_component(axis, -restitution * v);

    let clamped = if distance > 0.0 {
        wall.position + ball.radius()
    } else {
        wall.position - ball.radius()
    };
    ball.position.set_component(axis, clamped);

    tracing::trace!(wall = wall.position, ?axis, v_before = v, "wall collision");
    true
}

/// Resolve a frictionless impact between two overlapping balls.
///
/// Only approaching pairs exchange an impulse; the overlap is then split
/// equally between them along the contact normal. Returns whether a
/// collision was resolved.
pub fn resolve_ball_pair(a: &mut Ball, b: &mut Ball, restitution: f64) -> bool {
    let delta = a.position - b.position;
    let distance = delta.length();
    let contact = a.radius() + b.radius();

    if distance > contact || distance <= DISTANCE_EPSILON {
        return false;
    }

    let normal = delta * (1.0 / distance);
    let relative = a.velocity - b.velocity;
    let v_normal = relative.dot(normal);
    if v_normal >= 0.0 {
        return false;
    }

    let reduced_mass = a.mass() * b.mass() / (a.mass() + b.mass());
    let impulse = normal * (-(1.0 + restitution) * v_normal * reduced_mass);
    a.velocity += impulse * (1.0 / a.mass());
    b.velocity -= impulse * (1.0 / b.mass());

    let correction = normal * ((contact - distance) / 2.0);
    a.position += correction;
    b.position -= correction;

    tracing::trace!(v_normal, distance, "ball collision");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vec2, Vec3};

    fn ball(mass: f64, x: f64, vx: f64) -> Ball {
        Ball::new(
            mass,
            0.1,
            Vec2::new(x, 0.0),
            Vec2::new(vx, 0.0),
            Vec3::ZERO,
        )
        .unwrap()
    }

    #[test]
    fn wall_reflects_and_clamps_on_approach_side() {
        let mut b = ball(1.0, 0.95, 2.0);
        b.velocity.y = 0.7;
        let hit = resolve_wall(&mut b, &Wall::new(1.0, Axis::X), 0.5);

        assert!(hit);
        assert!((b.velocity.x + 1.0).abs() < 1e-12);
        assert_eq!(b.velocity.y, 0.7, "tangential velocity must be untouched");
        assert!((b.position.x - 0.9).abs() < 1e-12);
    }

    #[test]
    fn wall_clamps_to_far_side_when_centre_crossed() {
        let mut b = ball(1.0, 1.05, -2.0);
        assert!(resolve_wall(&mut b, &Wall::new(1.0, Axis::X), 1.0));
        assert!((b.position.x - 1.1).abs() < 1e-12);
        assert!((b.velocity.x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn wall_out_of_reach_is_ignored() {
        let mut b = ball(1.0, 0.0, 2.0);
        let before = b.clone();
        assert!(!resolve_wall(&mut b, &Wall::new(1.0, Axis::X), 1.0));
        assert_eq!(b, before);
    }

    #[test]
    fn wall_on_y_axis() {
        let mut b = ball(1.0, 0.0, 0.0);
        b.position.y = -1.92;
        b.velocity.y = -3.0;
        b.angular_velocity = Vec3::new(30.0, 0.0, 0.0);
        assert!(resolve_wall(&mut b, &Wall::new(-2.0, Axis::Y), 1.0));
        assert!((b.velocity.y - 3.0).abs() < 1e-12);
        assert!((b.position.y + 1.9).abs() < 1e-12);
        assert_eq!(b.angular_velocity, Vec3::new(30.0, 0.0, 0.0));
    }

    #[test]
    fn equal_masses_swap_velocities_elastically() {
        let mut a = ball(1.0, -0.09, 1.0);
        let mut b = ball(1.0, 0.09, -1.0);
        assert!(resolve_ball_pair(&mut a, &mut b, 1.0));
        assert!((a.velocity.x + 1.0).abs() < 1e-12);
        assert!((b.velocity.x - 1.0).abs() < 1e-12);
        // Overlap of 0.02 split evenly.
        assert!((a.position.x + 0.1).abs() < 1e-12);
        assert!((b.position.x - 0.1).abs() < 1e-12);
    }

    #[test]
    fn perfectly_inelastic_pair_moves_together() {
        let mut a = ball(2.0, -0.05, 3.0);
        let mut b = ball(1.0, 0.05, 0.0);
        assert!(resolve_ball_pair(&mut a, &mut b, 0.0));
        assert!((a.velocity.x - 2.0).abs() < 1e-12);
        assert!((b.velocity.x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn separating_pair_is_left_alone() {
        let mut a = ball(1.0, -0.05, -1.0);
        let mut b = ball(1.0, 0.05, 1.0);
        assert!(!resolve_ball_pair(&mut a, &mut b, 1.0));
        assert_eq!(a.position.x, -0.05);
    }

    #[test]
    fn coincident_centres_are_skipped() {
        let mut a = ball(1.0, 0.0, 1.0);
        let mut b = ball(1.0, 0.0, -1.0);
        assert!(!resolve_ball_pair(&mut a, &mut b, 1.0));
        assert!(a.velocity.x.is_finite());
    }

    #[test]
    fn square_walls_cover_both_axes() {
        let walls = Wall::square(2.0);
        assert_eq!(walls[0], Wall::new(2.0, Axis::X));
        assert_eq!(walls[3], Wall::new(-2.0, Axis::Y));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pair_collision_conserves_momentum(
                m1 in 0.1f64..10.0,
                m2 in 0.1f64..10.0,
                v1 in -5.0f64..5.0,
                v2 in -5.0f64..5.0,
                vy in -2.0f64..2.0,
                e in 0.0f64..=1.0,
            ) {
                let mut a = ball(m1, -0.08, v1);
                a.velocity.y = vy;
                let mut b = ball(m2, 0.08, v2);
                let before = a.linear_momentum() + b.linear_momentum();
                resolve_ball_pair(&mut a, &mut b, e);
                let after = a.linear_momentum() + b.linear_momentum();
                prop_assert!((after - before).length() < 1e-9);
            }

            #[test]
            fn pair_collision_never_gains_energy(
                m1 in 0.1f64..10.0,
                m2 in 0.1f64..10.0,
                v1 in 0.0f64..5.0,
                v2 in -5.0f64..0.0,
                e in 0.0f64..=1.0,
            ) {
                let mut a = ball(m1, -0.08, v1);
                let mut b = ball(m2, 0.08, v2);
                let before = a.kinetic_energy() + b.kinetic_energy();
                resolve_ball_pair(&mut a, &mut b, e);
                let after = a.kinetic_energy() + b.kinetic_energy();
                prop_assert!(after <= before + 1e-9);
            }

            #[test]
            fn wall_bounce_scales_normal_speed(
                x in 0.91f64..1.09,
                vx in -5.0f64..5.0,
                e in 0.0f64..=1.0,
            ) {
                let mut b = ball(1.0, x, vx);
                prop_assert!(resolve_wall(&mut b, &Wall::new(1.0, Axis::X), e));
                prop_assert!((b.velocity.x.abs() - e * vx.abs()).abs() < 1e-12);
                prop_assert!(((b.position.x - 1.0).abs() - 0.1).abs() < 1e-12);
            }
        }
    }
}
