pub mod analysis;
pub mod cancel;
pub mod config;
pub mod multiball;
pub mod results;
pub mod simulation;
pub mod stepper;
pub mod sweep;

pub use analysis::RunSummary;
pub use cancel::CancelToken;
pub use config::{ConfigError, Preset, ScenarioConfig};
pub use multiball::MultiBallSimulation;
pub use results::{BallTrack, MultiBallResults, RunOutcome, SimulationResults};
pub use simulation::{DEFAULT_DT, DEFAULT_TOLERANCE, DEFAULT_TOTAL_TIME, Simulation};
pub use stepper::{Step, rk4_step};
pub use sweep::{SweepRun, run_parallel};
