use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use rollsim_core::constants::STANDARD_GRAVITY;
use rollsim_core::{Ball, Bounds, SimError, Surface, Vec2, Vec3, Wall, validate_restitution};

use crate::multiball::MultiBallSimulation;
use crate::simulation::{DEFAULT_DT, DEFAULT_TOTAL_TIME, Simulation, validate_timing};

/// Lightest ball considered plausible (kg/m³); anything below floats in air.
pub const MIN_DENSITY: f64 = 10.0;
/// Densest ball considered plausible (kg/m³), roughly osmium.
pub const MAX_DENSITY: f64 = 22_000.0;
/// Fastest initial speed considered plausible for a rolling ball (m/s).
pub const MAX_REASONABLE_SPEED: f64 = 100.0;
/// Largest friction coefficient considered plausible.
pub const MAX_REASONABLE_FRICTION: f64 = 2.0;

/// Errors raised while loading or building a scenario.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, message: String },
    Parse(String),
    Invalid(SimError),
    UnknownPreset(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "failed to read {path}: {message}"),
            Self::Parse(m) => write!(f, "failed to parse scenario: {m}"),
            Self::Invalid(e) => write!(f, "invalid scenario: {e}"),
            Self::UnknownPreset(name) => write!(
                f,
                "unknown preset '{name}' (expected one of: {})",
                Preset::NAMES.join(", ")
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SimError> for ConfigError {
    fn from(e: SimError) -> Self {
        Self::Invalid(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Surface section of a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    pub friction: f64,
    pub angle_degrees: f64,
    /// `[x_min, x_max, y_min, y_max]`; membership only, never enforced.
    pub bounds: Option<[f64; 4]>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            friction: 0.5,
            angle_degrees: 0.0,
            bounds: None,
        }
    }
}

impl SurfaceConfig {
    pub fn build(&self) -> Result<Surface, SimError> {
        let bounds = self
            .bounds
            .map(|[x0, x1, y0, y1]| Bounds::new(x0, x1, y0, y1))
            .transpose()?;
        Surface::new(self.friction, self.angle_degrees, bounds)
    }
}

/// One ball of a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BallConfig {
    pub mass: f64,
    pub radius: f64,
    pub position: [f64; 2],
    pub velocity: [f64; 2],
    pub angular_velocity: [f64; 3],
    /// Derive the spin from the velocity so the ball starts rolling without
    /// slipping; `angular_velocity` is ignored when set.
    pub rolling: bool,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            radius: 0.1,
            position: [0.0, 0.0],
            velocity: [0.0, 0.0],
            angular_velocity: [0.0, 0.0, 0.0],
            rolling: false,
        }
    }
}

impl BallConfig {
    pub fn build(&self) -> Result<Ball, SimError> {
        let position = Vec2::from(self.position);
        let velocity = Vec2::from(self.velocity);
        if self.rolling {
            Ball::rolling(self.mass, self.radius, position, velocity)
        } else {
            Ball::new(
                self.mass,
                self.radius,
                position,
                velocity,
                Vec3::from(self.angular_velocity),
            )
        }
    }
}

/// A complete, data-driven simulation setup, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    pub dt: f64,
    pub total_time: f64,
    pub gravity: f64,
    pub restitution: f64,
    pub surface: SurfaceConfig,
    pub balls: Vec<BallConfig>,
    pub walls: Vec<Wall>,
    /// Where the runner writes its JSON results; stdout when unset.
    pub output: Option<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "custom".to_string(),
            dt: DEFAULT_DT,
            total_time: DEFAULT_TOTAL_TIME,
            gravity: STANDARD_GRAVITY,
            restitution: 1.0,
            surface: SurfaceConfig::default(),
            balls: vec![BallConfig::default()],
            walls: Vec::new(),
            output: None,
        }
    }
}

impl ScenarioConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a scenario file, then apply `ROLLSIM_*` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut config = Self::from_toml_str(&contents)?;
        tracing::info!(path = %path.display(), name = %config.name, "loaded scenario");
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override timing and restitution from `ROLLSIM_DT`,
    /// `ROLLSIM_TOTAL_TIME`, `ROLLSIM_GRAVITY` and `ROLLSIM_RESTITUTION`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ROLLSIM_DT")
            && let Ok(dt) = val.parse::<f64>()
        {
            self.dt = dt;
        }
        if let Ok(val) = std::env::var("ROLLSIM_TOTAL_TIME")
            && let Ok(t) = val.parse::<f64>()
        {
            self.total_time = t;
        }
        if let Ok(val) = std::env::var("ROLLSIM_GRAVITY")
            && let Ok(g) = val.parse::<f64>()
        {
            self.gravity = g;
        }
        if let Ok(val) = std::env::var("ROLLSIM_RESTITUTION")
            && let Ok(e) = val.parse::<f64>()
        {
            self.restitution = e;
        }
    }

    /// Check every parameter the engine would reject, and log a warning for
    /// each physically implausible one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timing(self.dt, self.total_time)?;
        validate_restitution(self.restitution)?;
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(SimError::InvalidGravity(self.gravity).into());
        }
        self.surface.build()?;
        if self.balls.is_empty() {
            return Err(SimError::NoBalls.into());
        }
        for ball in &self.balls {
            ball.build()?;
        }

        for warning in self.plausibility_warnings() {
            tracing::warn!(scenario = %self.name, "{warning}");
        }
        Ok(())
    }

    /// Physically suspicious but accepted parameters.
    pub fn plausibility_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.surface.friction > MAX_REASONABLE_FRICTION {
            warnings.push(format!(
                "friction coefficient {} exceeds {MAX_REASONABLE_FRICTION}",
                self.surface.friction
            ));
        }
        for (i, cfg) in self.balls.iter().enumerate() {
            let Ok(ball) = cfg.build() else {
                continue;
            };
            let density = ball.density();
            if density < MIN_DENSITY {
                warnings.push(format!(
                    "ball {i}: density {density:.1} kg/m³ is below {MIN_DENSITY} kg/m³"
                ));
            } else if density > MAX_DENSITY {
                warnings.push(format!(
                    "ball {i}: density {density:.1} kg/m³ is above {MAX_DENSITY} kg/m³"
                ));
            }
            if ball.speed() > MAX_REASONABLE_SPEED {
                warnings.push(format!(
                    "ball {i}: speed {:.1} m/s exceeds {MAX_REASONABLE_SPEED} m/s",
                    ball.speed()
                ));
            }
        }
        warnings
    }

    /// Single-ball simulation of the first ball.
    pub fn build_single(&self) -> Result<Simulation, ConfigError> {
        let ball = self
            .balls
            .first()
            .ok_or(ConfigError::Invalid(SimError::NoBalls))?
            .build()?;
        Ok(Simulation::new(
            ball,
            self.surface.build()?,
            self.dt,
            self.total_time,
            self.gravity,
        )?)
    }

    pub fn build_multi(&self) -> Result<MultiBallSimulation, ConfigError> {
        let balls = self
            .balls
            .iter()
            .map(BallConfig::build)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultiBallSimulation::new(
            balls,
            self.surface.build()?,
            self.dt,
            self.total_time,
            self.gravity,
        )?)
    }

    pub fn preset(preset: Preset) -> Self {
        preset.scenario()
    }
}

/// Ready-made scenarios covering each regime the engine models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Ball released from rest on a grippy 30° slope.
    Incline,
    /// Ball released on a slick 45° slope, below the critical friction.
    Slipping,
    /// Ball rolling across a flat surface until rolling resistance stops it.
    Horizontal,
    /// Ball bouncing inside a walled square.
    Walls,
    /// Two balls meeting head-on inside a walled square.
    Multi,
}

impl Preset {
    pub const NAMES: [&'static str; 5] = ["incline", "slipping", "horizontal", "walls", "multi"];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Incline => "incline",
            Preset::Slipping => "slipping",
            Preset::Horizontal => "horizontal",
            Preset::Walls => "walls",
            Preset::Multi => "multi",
        }
    }

    pub fn scenario(self) -> ScenarioConfig {
        let base = ScenarioConfig {
            name: self.name().to_string(),
            ..ScenarioConfig::default()
        };
        match self {
            Preset::Incline => ScenarioConfig {
                total_time: 3.0,
                surface: SurfaceConfig {
                    friction: 0.5,
                    angle_degrees: 30.0,
                    bounds: None,
                },
                ..base
            },
            Preset::Slipping => ScenarioConfig {
                total_time: 2.0,
                surface: SurfaceConfig {
                    friction: 0.1,
                    angle_degrees: 45.0,
                    bounds: None,
                },
                ..base
            },
            Preset::Horizontal => ScenarioConfig {
                total_time: 5.0,
                surface: SurfaceConfig {
                    friction: 0.3,
                    ..SurfaceConfig::default()
                },
                balls: vec![BallConfig {
                    mass: 0.5,
                    radius: 0.05,
                    velocity: [3.0, 2.0],
                    rolling: true,
                    ..BallConfig::default()
                }],
                ..base
            },
            Preset::Walls => ScenarioConfig {
                total_time: 10.0,
                restitution: 0.9,
                surface: SurfaceConfig {
                    friction: 0.1,
                    angle_degrees: 0.0,
                    bounds: Some([-2.0, 2.0, -2.0, 2.0]),
                },
                balls: vec![BallConfig {
                    mass: 0.5,
                    radius: 0.05,
                    velocity: [2.0, 1.5],
                    rolling: true,
                    ..BallConfig::default()
                }],
                walls: Wall::square(2.0).to_vec(),
                ..base
            },
            Preset::Multi => ScenarioConfig {
                total_time: 8.0,
                surface: SurfaceConfig {
                    friction: 0.05,
                    angle_degrees: 0.0,
                    bounds: Some([-3.0, 3.0, -3.0, 3.0]),
                },
                balls: vec![
                    BallConfig {
                        position: [-1.0, 0.0],
                        velocity: [1.0, 0.0],
                        ..BallConfig::default()
                    },
                    BallConfig {
                        position: [0.0, 0.0],
                        velocity: [-1.0, 0.0],
                        ..BallConfig::default()
                    },
                ],
                walls: Wall::square(3.0).to_vec(),
                ..base
            },
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incline" => Ok(Preset::Incline),
            "slipping" => Ok(Preset::Slipping),
            "horizontal" => Ok(Preset::Horizontal),
            "walls" => Ok(Preset::Walls),
            "multi" => Ok(Preset::Multi),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}
