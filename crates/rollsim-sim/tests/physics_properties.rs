//! End-to-end physical properties of the integrators: analytic rolling
//! kinematics, energy bookkeeping, friction, walls and ball collisions.

use rollsim_core::test_helpers::{
    assert_close, flat, incline, resting_ball, rolling_ball, sliding_ball,
};
use rollsim_core::{Axis, Wall};
use rollsim_sim::analysis::{rolling_acceleration, rolling_speed_after};
use rollsim_sim::{DEFAULT_TOLERANCE, MultiBallSimulation, RunOutcome, RunSummary, Simulation};

const G: f64 = 9.81;

fn thirty_degree_ramp(dt: f64, total_time: f64) -> Simulation {
    Simulation::new(resting_ball(), incline(0.7, 30.0), dt, total_time, G).unwrap()
}

#[test]
fn incline_acceleration_matches_rolling_prediction() {
    let mut sim = thirty_degree_ramp(0.001, 0.5);
    sim.run(&[], 1.0).unwrap();
    let results = sim.get_results();

    let i = results.index_near_time(0.1).unwrap();
    let measured = results.velocity[i].x / results.time[i];
    assert_close(measured, rolling_acceleration(G, 30f64.to_radians()), 0.05);
    assert!(!results.any_slipping());
}

#[test]
fn incline_speed_after_two_metres() {
    let mut sim = thirty_degree_ramp(0.01, 5.0);
    sim.run(&[], 1.0).unwrap();
    let results = sim.get_results();

    let i = results.index_near_x(2.0).unwrap();
    let expected = rolling_speed_after(G, 30f64.to_radians(), 2.0);
    assert!((expected - 3.74).abs() < 0.01);
    assert_close(results.velocity[i].length(), expected, 0.10);
}

#[test]
fn rolling_down_incline_conserves_energy() {
    let mut sim = thirty_degree_ramp(0.01, 2.0);
    assert_eq!(sim.run(&[], 1.0).unwrap(), RunOutcome::Horizon);
    assert!(sim.check_energy_conservation(DEFAULT_TOLERANCE));
    assert!(sim.check_angular_momentum_conservation(DEFAULT_TOLERANCE));

    let summary = RunSummary::from_results(&sim.get_results());
    assert_eq!(summary.slip_fraction, 0.0);
    assert!(summary.kinetic_energy_lost < 0.0, "ball gains speed downhill");
}

#[test]
fn rolling_resistance_brings_ball_to_a_stop() {
    let ball = rolling_ball(0.5, 0.05, 2.0);
    let mut sim = Simulation::new(ball, flat(0.3), 0.01, 5.0, G).unwrap();
    assert_eq!(sim.run(&[], 1.0).unwrap(), RunOutcome::AtRest);
    let results = sim.get_results();

    assert!(
        results.energy.windows(2).all(|w| w[1] < w[0]),
        "kinetic energy should fall every step until the stop"
    );
    assert_eq!(sim.ball().speed(), 0.0);
    assert!(sim.current_time() < 1.0);
}

#[test]
fn elastic_wall_reverses_velocity() {
    let mut sim =
        Simulation::new(rolling_ball(1.0, 0.1, 2.0), flat(0.05), 0.01, 2.0, G).unwrap();
    sim.run(&[Wall::new(1.0, Axis::X)], 1.0).unwrap();
    let results = sim.get_results();

    assert!(results.velocity.iter().any(|v| v.x > 0.0));
    assert!(results.velocity.iter().any(|v| v.x < 0.0));
    assert!(results.position.iter().all(|p| p.x <= 0.9 + 1e-9));
}

#[test]
fn head_on_collision_conserves_momentum() {
    let balls = vec![
        sliding_ball(1.0, 0.1, -0.5, 1.0),
        sliding_ball(1.0, 0.1, 0.5, -1.0),
    ];
    let mut sim = MultiBallSimulation::new(balls, flat(0.0), 0.001, 1.0, G).unwrap();
    let before = sim.total_linear_momentum();
    assert_eq!(sim.run(&[], 1.0).unwrap(), RunOutcome::Horizon);

    let after = sim.total_linear_momentum();
    assert!((after - before).length() < 0.1);
    // Equal masses swap velocities.
    assert!(sim.balls()[0].velocity.x < -0.9);
    assert!(sim.balls()[1].velocity.x > 0.9);

    let results = sim.get_results();
    let a = results.ball(0).unwrap();
    assert_eq!(a.len(), results.len());
    assert!(results.ball(2).is_none());
}

#[test]
fn steep_slick_incline_slips() {
    let mut sim = Simulation::new(resting_ball(), incline(0.1, 60.0), 0.01, 1.0, G).unwrap();
    sim.run(&[], 1.0).unwrap();
    let results = sim.get_results();
    assert!(results.any_slipping());
    // Slipping dissipates energy, but those samples are excluded from the check.
    assert!(sim.check_energy_conservation(DEFAULT_TOLERANCE));
}

#[test]
fn kinetic_friction_spins_a_slipping_ball_forward() {
    let mut sim = Simulation::new(resting_ball(), incline(0.1, 60.0), 0.01, 0.5, G).unwrap();
    sim.run(&[], 1.0).unwrap();
    let ball = sim.ball();

    assert!(ball.angular_velocity.y > 0.0, "spin should follow the slide");
    assert!(ball.angular_velocity.y * ball.radius() < ball.velocity.x);
    assert!(sim.dynamics().is_contact_slipping(ball));
}

#[test]
fn results_are_stable_across_reads() {
    let mut sim = thirty_degree_ramp(0.01, 1.0);
    sim.run(&[], 1.0).unwrap();

    let first = sim.get_results();
    let second = sim.get_results();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
