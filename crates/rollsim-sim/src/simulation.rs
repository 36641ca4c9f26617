use rollsim_core::constants::{ENERGY_EPSILON, REST_EPSILON, STANDARD_GRAVITY};
use rollsim_core::{
    Ball, BallDynamics, Regime, SimError, StateVector, Surface, Wall, resolve_wall,
    validate_restitution,
};

use crate::cancel::CancelToken;
use crate::results::{BallTrack, RunOutcome, SimulationResults};
use crate::stepper::rk4_step;

/// Default integration step (s).
pub const DEFAULT_DT: f64 = 0.01;
/// Default time horizon (s).
pub const DEFAULT_TOTAL_TIME: f64 = 10.0;
/// Default tolerance for the conservation checks.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

pub(crate) fn validate_timing(dt: f64, total_time: f64) -> Result<(), SimError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(SimError::InvalidTimeStep(dt));
    }
    if !total_time.is_finite() || total_time <= 0.0 {
        return Err(SimError::InvalidDuration(total_time));
    }
    Ok(())
}

/// Fixed-step simulation of one ball on one surface.
#[derive(Debug, Clone)]
pub struct Simulation {
    ball: Ball,
    surface: Surface,
    dynamics: BallDynamics,
    dt: f64,
    total_time: f64,
    current_time: f64,
    regime: Regime,
    time: Vec<f64>,
    track: BallTrack,
}

impl Simulation {
    pub fn new(
        ball: Ball,
        surface: Surface,
        dt: f64,
        total_time: f64,
        gravity: f64,
    ) -> Result<Self, SimError> {
        validate_timing(dt, total_time)?;
        let dynamics = BallDynamics::new(&ball, surface, gravity)?;
        let regime = dynamics.evaluate(&StateVector::from_ball(&ball)).regime;
        Ok(Self {
            ball,
            surface,
            dynamics,
            dt,
            total_time,
            current_time: 0.0,
            regime,
            time: Vec::new(),
            track: BallTrack::default(),
        })
    }

    /// 10 s at 100 Hz under standard gravity.
    pub fn with_defaults(ball: Ball, surface: Surface) -> Result<Self, SimError> {
        Self::new(ball, surface, DEFAULT_DT, DEFAULT_TOTAL_TIME, STANDARD_GRAVITY)
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn dynamics(&self) -> &BallDynamics {
        &self.dynamics
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn gravity(&self) -> f64 {
        self.dynamics.gravity()
    }

    /// Simulation clock after the last run.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Step until the horizon, or until the ball comes to rest on a flat
    /// surface. Walls are resolved in the given order after every step.
    pub fn run(&mut self, walls: &[Wall], restitution: f64) -> Result<RunOutcome, SimError> {
        self.run_with_cancel(walls, restitution, &CancelToken::new())
    }

    /// Like [`run`](Self::run), but checks `cancel` before every step.
    pub fn run_with_cancel(
        &mut self,
        walls: &[Wall],
        restitution: f64,
        cancel: &CancelToken,
    ) -> Result<RunOutcome, SimError> {
        let restitution = validate_restitution(restitution)?;

        self.time.clear();
        self.track.clear();
        self.current_time = 0.0;
        self.regime = self
            .dynamics
            .evaluate(&StateVector::from_ball(&self.ball))
            .regime;

        tracing::debug!(
            dt = self.dt,
            total_time = self.total_time,
            angle_deg = self.surface.angle_degrees(),
            friction = self.surface.friction_coeff(),
            walls = walls.len(),
            "starting single-ball run"
        );

        let mut outcome = RunOutcome::Horizon;
        let mut steps: u64 = 0;
        let mut wall_hits: u64 = 0;

        while self.current_time < self.total_time {
            if cancel.is_cancelled() {
                outcome = RunOutcome::Cancelled;
                break;
            }

            self.snapshot();

            let before = self.ball.velocity;
            let step = rk4_step(&self.dynamics, &StateVector::from_ball(&self.ball), self.dt);
            step.state.apply_to(&mut self.ball);
            self.regime = step.regime;
            if self
                .dynamics
                .halts_within_step(before, self.ball.velocity, self.dt)
            {
                self.ball.stop();
            }

            for wall in walls {
                if resolve_wall(&mut self.ball, wall, restitution) {
                    wall_hits += 1;
                }
            }

            if self.ball.speed() < REST_EPSILON && self.ball.angular_speed() < REST_EPSILON {
                self.ball.stop();
                if self.surface.is_flat() {
                    outcome = RunOutcome::AtRest;
                    break;
                }
            }

            steps += 1;
            self.current_time = steps as f64 * self.dt;
        }

        if self.time.last().is_none_or(|&t| t < self.current_time) {
            self.snapshot();
        }

        tracing::info!(
            ?outcome,
            steps,
            wall_hits,
            samples = self.time.len(),
            time = self.current_time,
            "single-ball run finished"
        );
        Ok(outcome)
    }

    fn snapshot(&mut self) {
        self.time.push(self.current_time);
        self.track.record(&self.ball, self.regime);
    }

    /// Snapshot of everything recorded by the last run.
    pub fn get_results(&self) -> SimulationResults {
        SimulationResults::from_parts(&self.time, &self.track)
    }

    /// Kinetic plus gravitational potential energy per sample, with the
    /// starting height as zero (h = -x·sinθ).
    pub fn mechanical_energy(&self) -> Vec<f64> {
        let weight = self.ball.mass() * self.gravity();
        let sin = self.surface.angle().sin();
        self.track
            .energy
            .iter()
            .zip(&self.track.position)
            .map(|(kinetic, p)| kinetic + weight * (-p.x * sin))
            .collect()
    }

    /// Whether total mechanical energy stays within `tolerance` of its
    /// initial value on every rolling sample. Slipping samples are skipped
    /// since kinetic friction dissipates energy there.
    ///
    /// Deviations are measured relative to the larger of the initial total
    /// energy and the peak kinetic energy, so runs that start from rest at
    /// zero total energy are still checked meaningfully.
    pub fn check_energy_conservation(&self, tolerance: f64) -> bool {
        let totals = self.mechanical_energy();
        let Some(&initial) = totals.first() else {
            return true;
        };
        if totals.len() < 2 {
            return true;
        }

        let peak_kinetic = self.track.energy.iter().copied().fold(0.0, f64::max);
        let scale = initial.abs().max(peak_kinetic);
        if scale <= ENERGY_EPSILON {
            return true;
        }

        totals
            .iter()
            .zip(&self.track.is_slipping)
            .all(|(&total, &slipping)| slipping || (total - initial).abs() / scale <= tolerance)
    }

    /// Whether |L| stays within `tolerance` of its initial value. Only
    /// meaningful on a flat surface; inclined runs always pass.
    pub fn check_angular_momentum_conservation(&self, tolerance: f64) -> bool {
        if !self.surface.is_flat() || self.track.len() < 2 {
            return true;
        }
        let initial = self.track.angular_momentum[0].length();
        if initial <= 0.0 {
            return true;
        }
        self.track
            .angular_momentum
            .iter()
            .all(|l| (l.length() - initial).abs() / initial <= tolerance)
    }
}
