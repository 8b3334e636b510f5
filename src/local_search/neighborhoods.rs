//! Reassignment and swap neighborhoods.

use log::trace;

use super::Neighborhood;
use crate::models::{MachineId, OperationId};
use crate::solution::Solution;
use crate::validation::validate_structure;

/// Keeps a candidate only if it is fully placed and structurally sound.
fn settle(mut candidate: Solution, neighborhood: &str) -> Option<Solution> {
    if let Err(e) = candidate.shut_down_machines() {
        trace!("{neighborhood}: shut down failed: {e}");
        return None;
    }
    match validate_structure(candidate.instance()) {
        Ok(()) => Some(candidate),
        Err(violations) => {
            trace!(
                "{neighborhood}: candidate dropped ({} violations)",
                violations.len()
            );
            None
        }
    }
}

/// Moves one assigned operation to another of its machines, as early as
/// that machine allows. The rest of the schedule stays in place.
///
/// Candidates are generated operation by operation (id order), then
/// machine by machine (variant order).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReassignOneOperation;

impl ReassignOneOperation {
    fn reassign(solution: &Solution, operation: OperationId, machine: MachineId) -> Option<Solution> {
        let mut candidate = solution.deepcopy();
        candidate.unschedule(operation)?;
        if let Err(e) = candidate.schedule(operation, machine) {
            trace!("reassign: {operation} on {machine} rejected: {e}");
            return None;
        }
        settle(candidate, "reassign")
    }
}

impl Neighborhood for ReassignOneOperation {
    fn name(&self) -> &'static str {
        "ReassignOneOperation"
    }

    fn neighbors<'a>(
        &'a self,
        solution: &'a Solution,
    ) -> Box<dyn Iterator<Item = Solution> + 'a> {
        let moves = solution
            .instance()
            .operations()
            .iter()
            .filter_map(|op| op.assigned_machine().map(|current| (op, current)))
            .flat_map(|(op, current)| {
                op.variants()
                    .iter()
                    .filter(move |v| v.machine_id != current)
                    .map(move |v| (op.id(), v.machine_id))
            });
        Box::new(moves.filter_map(move |(op, machine)| Self::reassign(solution, op, machine)))
    }
}

/// Exchanges two operations in the start-ordered sequence of one machine
/// and replans that whole machine in the new order.
///
/// Machines are visited in instance order; pairs `(i, j)` with `i < j` in
/// lexicographic order. Operations on other machines keep their
/// placement, so a swap that pushes an operation past one of its
/// successors is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapOperationsOnOneMachine;

impl SwapOperationsOnOneMachine {
    fn swap(solution: &Solution, machine: MachineId, i: usize, j: usize) -> Option<Solution> {
        let mut candidate = solution.deepcopy();
        let mut sequence = candidate.clear_machine(machine).ok()?;
        sequence.swap(i, j);
        for op in sequence {
            if let Err(e) = candidate.schedule(op, machine) {
                trace!("swap: replanning {op} on {machine} failed: {e}");
                return None;
            }
        }
        settle(candidate, "swap")
    }
}

impl Neighborhood for SwapOperationsOnOneMachine {
    fn name(&self) -> &'static str {
        "SwapOperationsOnOneMachine"
    }

    fn neighbors<'a>(
        &'a self,
        solution: &'a Solution,
    ) -> Box<dyn Iterator<Item = Solution> + 'a> {
        let moves = solution
            .instance()
            .machines()
            .iter()
            .map(|m| (m.id(), m.scheduled_operations().len()))
            .filter(|&(_, n)| n >= 2)
            .flat_map(|(machine, n)| {
                (0..n).flat_map(move |i| (i + 1..n).map(move |j| (machine, i, j)))
            });
        Box::new(moves.filter_map(move |(machine, i, j)| Self::swap(solution, machine, i, j)))
    }
}
