//! Earliest-finish greedy heuristic.
//!
//! # Algorithm
//!
//! At every step, evaluate each (available operation, compatible machine)
//! pair by its projected finish
//! `max(min_start_time, machine.available_time) + setup_if_off + duration`
//! and place the pair finishing first. Ties keep encounter order
//! (operation id, then variant order). A rejected pair is never proposed
//! again; the next best pair is tried instead.
//!
//! # Complexity
//! O(n² · v) where n = operations, v = variants per operation.

use std::collections::HashSet;

use super::{blank_solution, finish_construction, log_attempt, ConstructiveHeuristic};
use crate::models::{Instance, MachineId, OperationId};
use crate::solution::Solution;

/// Deterministic earliest-finish heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl Greedy {
    pub fn new() -> Self {
        Self
    }
}

impl ConstructiveHeuristic for Greedy {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn construct(&mut self, instance: &Instance) -> Solution {
        let mut solution = blank_solution(instance);
        let mut rejected: HashSet<(OperationId, MachineId)> = HashSet::new();

        loop {
            let mut candidates: Vec<(i64, OperationId, MachineId)> = Vec::new();
            for op_id in solution.available_operations() {
                let Some(op) = solution.instance().operation(op_id) else {
                    continue;
                };
                for variant in op.variants() {
                    let pair = (op_id, variant.machine_id);
                    if rejected.contains(&pair) {
                        continue;
                    }
                    if let Some(finish) = solution.projected_finish(op_id, variant.machine_id) {
                        candidates.push((finish, op_id, variant.machine_id));
                    }
                }
            }
            candidates.sort_by_key(|&(finish, _, _)| finish);

            let mut placed = false;
            for (_, op_id, machine_id) in candidates {
                let result = solution.schedule(op_id, machine_id);
                log_attempt(self.name(), op_id, machine_id, &result);
                if result.is_ok() {
                    placed = true;
                    break;
                }
                rejected.insert((op_id, machine_id));
            }
            if !placed {
                break;
            }
        }

        finish_construction(&mut solution, self.name());
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_single_machine_example() {
        let s = Greedy::new().construct(&testing::single_machine_instance());
        assert!(s.is_feasible());
        assert_eq!(s.cmax(), 13);
        assert_eq!(s.total_energy_consumption(), 8);
        // O2 projects to 5 against 6 for O0, so it goes first.
        let inst = s.instance();
        assert_eq!(inst.operation(OperationId(2)).unwrap().start_time(), Some(1));
        assert_eq!(inst.operation(OperationId(0)).unwrap().start_time(), Some(5));
        assert_eq!(inst.operation(OperationId(1)).unwrap().start_time(), Some(10));
    }

    #[test]
    fn test_prefers_earliest_finish_machine() {
        let s = Greedy::new().construct(&testing::flexible_instance());
        let inst = s.instance();
        // O0: M1 finishes at 3 (vs 4 on M0)
        assert_eq!(
            inst.operation(OperationId(0)).unwrap().assigned_machine(),
            Some(MachineId(1))
        );
        assert!(s.is_feasible());
    }

    #[test]
    fn test_deterministic() {
        let inst = testing::three_job_instance();
        let a = Greedy::new().construct(&inst);
        let b = Greedy::new().construct(&inst);
        assert_eq!(a.export(), b.export());
    }
}
