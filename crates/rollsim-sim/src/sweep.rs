//! Running batches of independent single-ball simulations in parallel.

use rollsim_core::{SimError, Wall};

use crate::cancel::CancelToken;
use crate::results::{RunOutcome, SimulationResults};
use crate::simulation::Simulation;

/// Result of one simulation in a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRun {
    pub outcome: RunOutcome,
    pub results: SimulationResults,
}

/// Run every simulation to completion on its own scoped thread, sharing
/// `walls`, `restitution` and `cancel`. Results come back in input order.
pub fn run_parallel(
    simulations: Vec<Simulation>,
    walls: &[Wall],
    restitution: f64,
    cancel: &CancelToken,
) -> Vec<Result<SweepRun, SimError>> {
    tracing::debug!(runs = simulations.len(), "starting parallel sweep");

    std::thread::scope(|scope| {
        let handles: Vec<_> = simulations
            .into_iter()
            .map(|mut sim| {
                scope.spawn(move || -> Result<SweepRun, SimError> {
                    let outcome = sim.run_with_cancel(walls, restitution, cancel)?;
                    Ok(SweepRun {
                        outcome,
                        results: sim.get_results(),
                    })
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(run) => run,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
