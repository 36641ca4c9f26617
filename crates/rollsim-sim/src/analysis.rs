//! Closed-form predictions for a solid sphere on an incline, and summary
//! statistics over recorded runs.

use serde::{Deserialize, Serialize};

use rollsim_core::constants::ROLLING_ACCELERATION_FRACTION;
use rollsim_core::{Regime, Surface, Vec2};

use crate::results::{BallTrack, SimulationResults};

/// Regime the dynamics model will pick on `surface`.
pub fn predicted_regime(surface: &Surface) -> Regime {
    if !surface.is_flat() && surface.friction_coeff() < surface.critical_friction().abs() {
        Regime::Slipping
    } else {
        Regime::Rolling
    }
}

/// (5/7)·g·sinθ.
pub fn rolling_acceleration(gravity: f64, angle: f64) -> f64 {
    ROLLING_ACCELERATION_FRACTION * gravity * angle.sin()
}

/// g·(sinθ − μ·cosθ) for a sphere sliding down the slope.
pub fn slipping_acceleration(gravity: f64, angle: f64, friction: f64) -> f64 {
    gravity * (angle.sin() - friction * angle.cos())
}

/// Speed of a sphere that started from rest and rolled `distance` down the
/// slope: √((10/7)·g·d·sinθ).
pub fn rolling_speed_after(gravity: f64, angle: f64, distance: f64) -> f64 {
    (2.0 * rolling_acceleration(gravity, angle) * distance).sqrt()
}

/// Headline numbers for one ball's recorded trajectory.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub samples: usize,
    pub duration: f64,
    /// Fraction of samples recorded while slipping.
    pub slip_fraction: f64,
    pub max_speed: f64,
    pub final_speed: f64,
    /// Straight-line distance between the first and last positions.
    pub displacement: f64,
    /// Path length summed over consecutive samples.
    pub path_length: f64,
    /// Initial minus final kinetic energy.
    pub kinetic_energy_lost: f64,
}

impl RunSummary {
    pub fn from_results(results: &SimulationResults) -> Self {
        Self::compute(
            &results.time,
            &results.position,
            &results.velocity,
            &results.energy,
            &results.is_slipping,
        )
    }

    pub fn from_track(time: &[f64], track: &BallTrack) -> Self {
        Self::compute(
            time,
            &track.position,
            &track.velocity,
            &track.energy,
            &track.is_slipping,
        )
    }

    fn compute(
        time: &[f64],
        position: &[Vec2],
        velocity: &[Vec2],
        energy: &[f64],
        is_slipping: &[bool],
    ) -> Self {
        let samples = time.len();
        if samples == 0 {
            return Self::default();
        }

        let slipping = is_slipping.iter().filter(|&&s| s).count();
        let speeds = velocity.iter().map(|v| v.length());
        let path_length = position.windows(2).map(|w| (w[1] - w[0]).length()).sum();

        Self {
            samples,
            duration: time[samples - 1] - time[0],
            slip_fraction: slipping as f64 / samples as f64,
            max_speed: speeds.clone().fold(0.0, f64::max),
            final_speed: speeds.last().unwrap_or(0.0),
            displacement: match (position.first(), position.last()) {
                (Some(&a), Some(&b)) => (b - a).length(),
                _ => 0.0,
            },
            path_length,
            kinetic_energy_lost: match (energy.first(), energy.last()) {
                (Some(a), Some(b)) => a - b,
                _ => 0.0,
            },
        }
    }
}
