//! Constructive heuristics.
//!
//! Every heuristic builds a schedule from scratch on a private copy of the
//! instance by repeatedly
//! 1. picking one operation among [`Solution::available_operations`],
//! 2. picking one of its machines,
//! 3. calling [`Solution::schedule`].
//!
//! Recoverable placement failures (incompatible machine, horizon, retired
//! machine) only discard that choice. Construction stops when no
//! operation can be placed any more; whatever is left stays unassigned
//! and is reported as an [`InfeasibleResidualWarning`] through the log and
//! [`Solution::residual`]. Machines still running at the end are shut down
//! so that teardown is charged.
//!
//! # Heuristics
//!
//! | Heuristic | Operation choice | Machine choice |
//! |-----------|------------------|----------------|
//! | [`Greedy`] | earliest projected finish over all pairs | same |
//! | [`NonDeterminist`] | uniform | uniform |
//! | [`RandomHeuristic`] | uniform | shuffled variants |
//! | [`DispatchingHeuristic`] | rule engine | [`MachineSelection`](crate::dispatching::MachineSelection) |
//!
//! [`InfeasibleResidualWarning`]: crate::error::InfeasibleResidualWarning

mod greedy;
mod priority;
mod random;

pub use greedy::Greedy;
pub use priority::DispatchingHeuristic;
pub use random::{NonDeterminist, RandomHeuristic};

use log::{debug, warn};

use crate::error::ScheduleError;
use crate::models::{Instance, MachineId, OperationId};
use crate::solution::Solution;

/// Builds an initial solution for an instance.
pub trait ConstructiveHeuristic {
    /// Heuristic name (e.g., "Greedy", "SPT").
    fn name(&self) -> &'static str;

    /// Builds a solution on a reset copy of `instance`. The input is never
    /// modified.
    fn construct(&mut self, instance: &Instance) -> Solution;
}

/// Fresh solution over a reset copy of the instance.
pub(crate) fn blank_solution(instance: &Instance) -> Solution {
    let mut solution = Solution::new(instance.clone());
    solution.reset();
    solution
}

/// Shuts the machines down and reports what could not be scheduled.
pub(crate) fn finish_construction(solution: &mut Solution, heuristic: &str) {
    if let Err(e) = solution.shut_down_machines() {
        warn!("{heuristic}: shutting machines down failed: {e}");
    }
    if let Some(residual) = solution.residual() {
        warn!("{heuristic}: {residual}");
    }
    debug!(
        "{heuristic}: objective {} (energy {}, makespan {})",
        solution.objective(),
        solution.total_energy_consumption(),
        solution.cmax()
    );
}

/// Logs a placement attempt.
pub(crate) fn log_attempt(
    heuristic: &str,
    operation: OperationId,
    machine: MachineId,
    result: &Result<i64, ScheduleError>,
) {
    match result {
        Ok(start) => debug!("{heuristic}: {operation} on {machine} at {start}"),
        Err(e) if e.is_recoverable() => debug!("{heuristic}: {operation} on {machine} rejected: {e}"),
        Err(e) => warn!("{heuristic}: {operation} on {machine} failed: {e}"),
    }
}
