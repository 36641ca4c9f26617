use rollsim_core::{
    Ball, BallDynamics, Regime, SimError, StateVector, Surface, Vec2, Wall, resolve_ball_pair,
    resolve_wall, validate_restitution,
};

use crate::cancel::CancelToken;
use crate::results::{BallTrack, MultiBallResults, RunOutcome};
use crate::simulation::validate_timing;
use crate::stepper::rk4_step;

/// Several balls on one shared surface, integrated independently and
/// coupled only through pairwise collisions.
///
/// Collisions are resolved sequentially: walls per ball, then every pair
/// `i < j` once in index order. A ball touching two others in the same step
/// sees the second impulse computed from the velocity left by the first.
#[derive(Debug, Clone)]
pub struct MultiBallSimulation {
    balls: Vec<Ball>,
    dynamics: Vec<BallDynamics>,
    surface: Surface,
    dt: f64,
    total_time: f64,
    current_time: f64,
    regimes: Vec<Regime>,
    time: Vec<f64>,
    tracks: Vec<BallTrack>,
}

impl MultiBallSimulation {
    pub fn new(
        balls: Vec<Ball>,
        surface: Surface,
        dt: f64,
        total_time: f64,
        gravity: f64,
    ) -> Result<Self, SimError> {
        if balls.is_empty() {
            return Err(SimError::NoBalls);
        }
        validate_timing(dt, total_time)?;
        let dynamics = balls
            .iter()
            .map(|ball| BallDynamics::new(ball, surface, gravity))
            .collect::<Result<Vec<_>, _>>()?;
        let regimes = dynamics.iter().map(BallDynamics::regime).collect();
        let tracks = vec![BallTrack::default(); balls.len()];

        Ok(Self {
            balls,
            dynamics,
            surface,
            dt,
            total_time,
            current_time: 0.0,
            regimes,
            time: Vec::new(),
            tracks,
        })
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Σ m·v over all balls.
    pub fn total_linear_momentum(&self) -> Vec2 {
        self.balls
            .iter()
            .fold(Vec2::ZERO, |acc, b| acc + b.linear_momentum())
    }

    pub fn total_kinetic_energy(&self) -> f64 {
        self.balls.iter().map(Ball::kinetic_energy).sum()
    }

    /// Step every ball to the time horizon. There is no rest detection.
    pub fn run(&mut self, walls: &[Wall], restitution: f64) -> Result<RunOutcome, SimError> {
        self.run_with_cancel(walls, restitution, &CancelToken::new())
    }

    pub fn run_with_cancel(
        &mut self,
        walls: &[Wall],
        restitution: f64,
        cancel: &CancelToken,
    ) -> Result<RunOutcome, SimError> {
        let restitution = validate_restitution(restitution)?;

        self.time.clear();
        for track in &mut self.tracks {
            track.clear();
        }
        self.current_time = 0.0;
        for ((regime, dynamics), ball) in self
            .regimes
            .iter_mut()
            .zip(&self.dynamics)
            .zip(&self.balls)
        {
            *regime = dynamics.evaluate(&StateVector::from_ball(ball)).regime;
        }

        tracing::debug!(
            balls = self.balls.len(),
            dt = self.dt,
            total_time = self.total_time,
            walls = walls.len(),
            "starting multi-ball run"
        );

        let mut outcome = RunOutcome::Horizon;
        let mut steps: u64 = 0;
        let mut pair_hits: u64 = 0;

        while self.current_time < self.total_time {
            if cancel.is_cancelled() {
                outcome = RunOutcome::Cancelled;
                break;
            }

            self.snapshot();

            for ((ball, dynamics), regime) in self
                .balls
                .iter_mut()
                .zip(&self.dynamics)
                .zip(&mut self.regimes)
            {
                let before = ball.velocity;
                let step = rk4_step(dynamics, &StateVector::from_ball(ball), self.dt);
                step.state.apply_to(ball);
                *regime = step.regime;
                if dynamics.halts_within_step(before, ball.velocity, self.dt) {
                    ball.stop();
                }

                for wall in walls {
                    resolve_wall(ball, wall, restitution);
                }
            }

            pair_hits += self.resolve_pairs(restitution);

            steps += 1;
            self.current_time = steps as f64 * self.dt;
        }

        self.snapshot();

        tracing::info!(
            ?outcome,
            steps,
            pair_hits,
            samples = self.time.len(),
            "multi-ball run finished"
        );
        Ok(outcome)
    }

    fn resolve_pairs(&mut self, restitution: f64) -> u64 {
        let mut hits = 0;
        let n = self.balls.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = self.balls.split_at_mut(j);
                if resolve_ball_pair(&mut head[i], &mut tail[0], restitution) {
                    hits += 1;
                }
            }
        }
        hits
    }

    fn snapshot(&mut self) {
        self.time.push(self.current_time);
        for ((track, ball), regime) in self.tracks.iter_mut().zip(&self.balls).zip(&self.regimes) {
            track.record(ball, *regime);
        }
    }

    pub fn get_results(&self) -> MultiBallResults {
        MultiBallResults {
            time: self.time.clone(),
            balls: self.tracks.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollsim_core::Axis;
    use rollsim_core::test_helpers::{flat, rolling_ball, sliding_ball};

    #[test]
    fn empty_ball_list_is_rejected() {
        assert_eq!(
            MultiBallSimulation::new(Vec::new(), flat(0.1), 0.01, 1.0, 9.81).unwrap_err(),
            SimError::NoBalls
        );
    }

    #[test]
    fn runs_to_horizon_with_trailing_sample() {
        let balls = vec![
            sliding_ball(1.0, 0.1, -1.0, 0.0),
            sliding_ball(1.0, 0.1, 1.0, 0.0),
        ];
        let mut sim = MultiBallSimulation::new(balls, flat(0.1), 0.1, 1.0, 9.81).unwrap();
        // Resting balls on a flat surface would stop a single-ball run; here
        // the clock keeps going.
        assert_eq!(sim.run(&[], 1.0).unwrap(), RunOutcome::Horizon);

        let results = sim.get_results();
        assert_eq!(results.len(), 11);
        assert_eq!(results.balls.len(), 2);
        assert!(results.balls.iter().all(|t| t.len() == 11));
    }

    #[test]
    fn newtons_cradle_passes_momentum_down_the_line() {
        // Three touching balls; the first strikes the second, which is
        // already touching the third. Pairs resolve in index order.
        let balls = vec![
            sliding_ball(1.0, 0.1, -0.2, 1.0),
            sliding_ball(1.0, 0.1, 0.0, 0.0),
            sliding_ball(1.0, 0.1, 0.2, 0.0),
        ];
        let mut sim = MultiBallSimulation::new(balls, flat(0.0), 0.001, 0.01, 9.81).unwrap();
        sim.run(&[], 1.0).unwrap();

        let v: Vec<f64> = sim.balls().iter().map(|b| b.velocity.x).collect();
        assert!((v[0]).abs() < 1e-9, "striker should stop, got {v:?}");
        assert!((v[2] - 1.0).abs() < 1e-9, "last ball should leave, got {v:?}");
        assert!((sim.total_linear_momentum().x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn walls_apply_to_every_ball() {
        let balls = vec![
            sliding_ball(1.0, 0.1, 0.85, 2.0),
            sliding_ball(1.0, 0.1, -0.85, -2.0),
        ];
        let walls = [Wall::new(1.0, Axis::X), Wall::new(-1.0, Axis::X)];
        let mut sim = MultiBallSimulation::new(balls, flat(0.0), 0.01, 0.1, 9.81).unwrap();
        sim.run(&walls, 1.0).unwrap();

        assert!(sim.balls()[0].velocity.x < 0.0);
        assert!(sim.balls()[1].velocity.x > 0.0);
    }

    #[test]
    fn rolling_resistance_stops_every_ball() {
        let balls = vec![
            rolling_ball(1.0, 0.1, 1.0),
            Ball::rolling(1.0, 0.1, Vec2::new(0.0, 1.0), Vec2::new(0.0, -0.5)).unwrap(),
        ];
        let mut sim = MultiBallSimulation::new(balls, flat(0.3), 0.01, 2.0, 9.81).unwrap();
        assert_eq!(sim.run(&[], 1.0).unwrap(), RunOutcome::Horizon);

        assert!(sim.balls().iter().all(|b| b.speed() == 0.0 && b.angular_speed() == 0.0));
        assert_eq!(sim.total_kinetic_energy(), 0.0);
    }

    #[test]
    fn cancellation_stops_multi_ball_run() {
        let balls = vec![sliding_ball(1.0, 0.1, 0.0, 1.0)];
        let mut sim = MultiBallSimulation::new(balls, flat(0.1), 0.01, 3600.0, 9.81).unwrap();
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(
            sim.run_with_cancel(&[], 1.0, &token).unwrap(),
            RunOutcome::Cancelled
        );
        assert_eq!(sim.get_results().len(), 1);
    }
}
