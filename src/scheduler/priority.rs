//! Priority-rule heuristics.
//!
//! # Algorithm
//!
//! 1. Rank the available operations with the rule engine and take the
//!    best one.
//! 2. Try its preferred machine under the machine-selection policy.
//! 3. On rejection, try its remaining machines in variant order.
//! 4. An operation no machine accepts is left out for the rest of the run.

use std::collections::HashSet;

use super::{blank_solution, finish_construction, log_attempt, ConstructiveHeuristic};
use crate::dispatching::{rules, MachineSelection, RuleEngine, TieBreak};
use crate::models::{Instance, OperationId};
use crate::solution::Solution;

/// Rule-engine driven constructive heuristic.
///
/// # Example
///
/// ```
/// use u_ejsp::dispatching::MachineSelection;
/// use u_ejsp::models::{Instance, MachineRow, OperationRow};
/// use u_ejsp::scheduler::{ConstructiveHeuristic, DispatchingHeuristic};
///
/// let ops = [
///     OperationRow::new(0, 0, 0, 5, 2),
///     OperationRow::new(0, 0, 1, 3, 4),
///     OperationRow::new(1, 0, 1, 2, 1),
/// ];
/// let machines = [MachineRow::new(0, 20), MachineRow::new(1, 20)];
/// let instance = Instance::from_rows("demo", &ops, &machines).unwrap();
///
/// let mut spt = DispatchingHeuristic::spt().with_machine_selection(MachineSelection::LeastEnergy);
/// let solution = spt.construct(&instance);
/// assert!(solution.is_feasible());
/// ```
#[derive(Debug, Clone)]
pub struct DispatchingHeuristic {
    name: &'static str,
    engine: RuleEngine,
    machine_selection: MachineSelection,
}

impl DispatchingHeuristic {
    /// Custom rule engine and machine selection.
    pub fn new(name: &'static str, engine: RuleEngine, machine_selection: MachineSelection) -> Self {
        Self {
            name,
            engine,
            machine_selection,
        }
    }

    /// Operations in input order, first variant.
    pub fn fcfs() -> Self {
        Self::new(
            "FCFS",
            RuleEngine::new().then(rules::Fcfs),
            MachineSelection::FirstAvailable,
        )
    }

    /// Shortest processing time first, fastest machine.
    pub fn spt() -> Self {
        Self::new(
            "SPT",
            RuleEngine::new()
                .then(rules::Spt)
                .with_tie_break(TieBreak::LowestId),
            MachineSelection::Fastest,
        )
    }

    /// Longest processing time first, fastest machine.
    pub fn lpt() -> Self {
        Self::new(
            "LPT",
            RuleEngine::new()
                .then(rules::Lpt)
                .with_tie_break(TieBreak::LowestId),
            MachineSelection::Fastest,
        )
    }

    /// Lowest job id first, fastest machine.
    pub fn edd() -> Self {
        Self::new(
            "EDD",
            RuleEngine::new()
                .then(rules::Edd)
                .with_tie_break(TieBreak::LowestId),
            MachineSelection::Fastest,
        )
    }

    /// Job with the least remaining work first, fastest machine.
    pub fn lwkr() -> Self {
        Self::new(
            "LWKR",
            RuleEngine::new()
                .then(rules::Lwkr)
                .with_tie_break(TieBreak::LowestId),
            MachineSelection::Fastest,
        )
    }

    /// Job with the most remaining work first, fastest machine.
    pub fn mwkr() -> Self {
        Self::new(
            "MWKR",
            RuleEngine::new()
                .then(rules::Mwkr)
                .with_tie_break(TieBreak::LowestId),
            MachineSelection::Fastest,
        )
    }

    /// Cheapest weighted energy/time variant first, on that variant's
    /// machine.
    pub fn energy_aware(energy_weight: f64, time_weight: f64) -> Self {
        Self::new(
            "EnergyAware",
            RuleEngine::new()
                .then(rules::EnergyAware::new(energy_weight, time_weight))
                .with_tie_break(TieBreak::LowestId),
            MachineSelection::Weighted {
                energy_weight,
                time_weight,
            },
        )
    }

    pub fn with_machine_selection(mut self, machine_selection: MachineSelection) -> Self {
        self.machine_selection = machine_selection;
        self
    }

    pub fn machine_selection(&self) -> MachineSelection {
        self.machine_selection
    }

    fn next_operation(&self, solution: &Solution, blocked: &HashSet<OperationId>) -> Option<OperationId> {
        let open: Vec<OperationId> = solution
            .available_operations()
            .into_iter()
            .filter(|id| !blocked.contains(id))
            .collect();
        self.engine.best(&open, solution.instance())
    }
}

impl ConstructiveHeuristic for DispatchingHeuristic {
    fn name(&self) -> &'static str {
        self.name
    }

    fn construct(&mut self, instance: &Instance) -> Solution {
        let mut solution = blank_solution(instance);
        let mut blocked: HashSet<OperationId> = HashSet::new();

        while let Some(op_id) = self.next_operation(&solution, &blocked) {
            let Some(op) = solution.instance().operation(op_id) else {
                break;
            };
            let preferred = self.machine_selection.select(op, solution.instance());
            let mut machines: Vec<_> = preferred.into_iter().collect();
            machines.extend(
                op.variants()
                    .iter()
                    .map(|v| v.machine_id)
                    .filter(|&m| Some(m) != preferred),
            );

            let placed = machines.into_iter().any(|machine| {
                let result = solution.schedule(op_id, machine);
                log_attempt(self.name, op_id, machine, &result);
                result.is_ok()
            });
            if !placed {
                blocked.insert(op_id);
            }
        }

        finish_construction(&mut solution, self.name);
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MachineId, MachineRow, OperationRow};
    use crate::testing;

    fn machine_of(s: &Solution, id: usize) -> Option<MachineId> {
        s.instance()
            .operation(OperationId(id))
            .and_then(|op| op.assigned_machine())
    }

    fn start_of(s: &Solution, id: usize) -> Option<i64> {
        s.instance()
            .operation(OperationId(id))
            .and_then(|op| op.start_time())
    }

    #[test]
    fn test_fcfs_order() {
        let s = DispatchingHeuristic::fcfs().construct(&testing::single_machine_instance());
        assert_eq!(start_of(&s, 0), Some(1));
        assert_eq!(start_of(&s, 1), Some(6));
        assert_eq!(start_of(&s, 2), Some(9));
        assert_eq!(s.cmax(), 13);
        assert_eq!(s.total_energy_consumption(), 8);
    }

    #[test]
    fn test_spt_and_lpt() {
        let inst = testing::three_job_instance();
        let spt = DispatchingHeuristic::spt().construct(&inst);
        // O4 (1 on M1) is shortest and goes first.
        assert_eq!(machine_of(&spt, 4), Some(MachineId(1)));
        assert_eq!(start_of(&spt, 4), Some(1));

        let lpt = DispatchingHeuristic::lpt().construct(&inst);
        // O0 (up to 6) is longest; fastest machine is M0.
        assert_eq!(machine_of(&lpt, 0), Some(MachineId(0)));
        assert_eq!(start_of(&lpt, 0), Some(2));
        assert!(spt.is_feasible() && lpt.is_feasible());
    }

    #[test]
    fn test_edd_finishes_jobs_in_id_order() {
        let s = DispatchingHeuristic::edd().construct(&testing::single_machine_instance());
        assert_eq!(start_of(&s, 0), Some(1));
        assert_eq!(start_of(&s, 1), Some(6));
        assert_eq!(start_of(&s, 2), Some(9));
    }

    #[test]
    fn test_remaining_work_rules() {
        // Remaining work: job 0 and job 1 six units, job 2 one unit.
        let inst = testing::three_job_instance();
        let lwkr = DispatchingHeuristic::lwkr().construct(&inst);
        assert_eq!(machine_of(&lwkr, 4), Some(MachineId(1)));
        assert_eq!(start_of(&lwkr, 4), Some(1));

        // Tie between jobs 0 and 1 goes to the lowest id.
        let mwkr = DispatchingHeuristic::mwkr().construct(&inst);
        assert_eq!(machine_of(&mwkr, 0), Some(MachineId(0)));
        assert_eq!(start_of(&mwkr, 0), Some(2));
        assert!(lwkr.is_feasible() && mwkr.is_feasible());
    }

    #[test]
    fn test_energy_aware_with_other_selection() {
        let inst = testing::three_job_instance();
        let s = DispatchingHeuristic::energy_aware(1.0, 0.0)
            .with_machine_selection(MachineSelection::Fastest)
            .construct(&inst);
        // O0: 4 units on M0, 6 on M1
        assert_eq!(machine_of(&s, 0), Some(MachineId(0)));
        assert!(s.is_feasible());
    }

    #[test]
    fn test_energy_aware_picks_cheap_variant() {
        let inst = testing::three_job_instance();
        let s = DispatchingHeuristic::energy_aware(1.0, 0.0).construct(&inst);
        // O0: 8 on M0, 3 on M1
        assert_eq!(machine_of(&s, 0), Some(MachineId(1)));
        // O2: 3 on M0, 5 on M1
        assert_eq!(machine_of(&s, 2), Some(MachineId(0)));
        assert!(s.is_feasible());
    }

    #[test]
    fn test_falls_back_to_other_machine() {
        // M1 is faster but too short-lived for the operation.
        let ops = [
            OperationRow::new(0, 0, 0, 6, 1),
            OperationRow::new(0, 0, 1, 4, 1),
        ];
        let machines = [MachineRow::new(0, 20), MachineRow::new(1, 3)];
        let inst = Instance::from_rows("fallback", &ops, &machines).unwrap();
        let mut spt = DispatchingHeuristic::spt();
        assert_eq!(spt.machine_selection(), MachineSelection::Fastest);
        let s = spt.construct(&inst);
        assert_eq!(machine_of(&s, 0), Some(MachineId(0)));
        assert!(s.is_feasible());
    }

    #[test]
    fn test_names() {
        assert_eq!(DispatchingHeuristic::fcfs().name(), "FCFS");
        assert_eq!(DispatchingHeuristic::energy_aware(0.5, 0.5).name(), "EnergyAware");
        assert_eq!(DispatchingHeuristic::lwkr().name(), "LWKR");
        assert_eq!(DispatchingHeuristic::mwkr().name(), "MWKR");
    }
}
