use serde::{Deserialize, Serialize};

use rollsim_core::{Ball, Regime, Vec2, Vec3};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Reached the time horizon.
    Horizon,
    /// Came to rest on a flat surface.
    AtRest,
    /// Stopped by a [`CancelToken`](crate::CancelToken).
    Cancelled,
}

/// Per-sample history of one ball.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BallTrack {
    pub position: Vec<Vec2>,
    pub velocity: Vec<Vec2>,
    pub angular_velocity: Vec<Vec3>,
    /// Kinetic energy only; potential energy is reconstructed on demand.
    pub energy: Vec<f64>,
    pub angular_momentum: Vec<Vec3>,
    pub is_slipping: Vec<bool>,
}

impl BallTrack {
    pub(crate) fn record(&mut self, ball: &Ball, regime: Regime) {
        self.position.push(ball.position);
        self.velocity.push(ball.velocity);
        self.angular_velocity.push(ball.angular_velocity);
        self.energy.push(ball.kinetic_energy());
        self.angular_momentum.push(ball.angular_momentum());
        self.is_slipping.push(regime.is_slipping());
    }

    pub(crate) fn clear(&mut self) {
        self.position.clear();
        self.velocity.clear();
        self.angular_velocity.clear();
        self.energy.clear();
        self.angular_momentum.clear();
        self.is_slipping.clear();
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }
}

/// Trajectory of a single-ball run. All arrays have the same length.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimulationResults {
    pub time: Vec<f64>,
    pub position: Vec<Vec2>,
    pub velocity: Vec<Vec2>,
    pub angular_velocity: Vec<Vec3>,
    pub energy: Vec<f64>,
    pub angular_momentum: Vec<Vec3>,
    pub is_slipping: Vec<bool>,
}

impl SimulationResults {
    pub(crate) fn from_parts(time: &[f64], track: &BallTrack) -> Self {
        Self {
            time: time.to_vec(),
            position: track.position.clone(),
            velocity: track.velocity.clone(),
            angular_velocity: track.angular_velocity.clone(),
            energy: track.energy.clone(),
            angular_momentum: track.angular_momentum.clone(),
            is_slipping: track.is_slipping.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Index of the sample whose time is closest to `t`.
    pub fn index_near_time(&self, t: f64) -> Option<usize> {
        nearest_index(self.time.iter().copied(), t)
    }

    /// Index of the sample whose downslope coordinate is closest to `x`.
    pub fn index_near_x(&self, x: f64) -> Option<usize> {
        nearest_index(self.position.iter().map(|p| p.x), x)
    }

    pub fn any_slipping(&self) -> bool {
        self.is_slipping.iter().any(|&s| s)
    }
}

/// Trajectories of a multi-ball run, sharing one time axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MultiBallResults {
    pub time: Vec<f64>,
    pub balls: Vec<BallTrack>,
}

impl MultiBallResults {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Single-ball view of ball `index`.
    pub fn ball(&self, index: usize) -> Option<SimulationResults> {
        self.balls
            .get(index)
            .map(|track| SimulationResults::from_parts(&self.time, track))
    }
}

fn nearest_index(values: impl Iterator<Item = f64>, target: f64) -> Option<usize> {
    values
        .enumerate()
        .min_by(|(_, a), (_, b)| (a - target).abs().total_cmp(&(b - target).abs()))
        .map(|(i, _)| i)
}
