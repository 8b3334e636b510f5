//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Order-based**: FCFS, EDD
//! - **Time-based**: SPT, LPT, LWKR, MWKR
//! - **Energy**: ENERGY (weighted energy/time of the cheapest variant)
//!
//! # Score Convention
//! All rules return lower scores for higher priority operations.

use super::{DispatchingRule, RuleScore};
use crate::models::{Instance, Operation};

// ======================== Order-based rules ========================

/// First Come First Served.
///
/// Operations are served in the order they were read from the input.
#[derive(Debug, Clone, Copy)]
pub struct Fcfs;

impl DispatchingRule for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn evaluate(&self, operation: &Operation, _instance: &Instance) -> RuleScore {
        operation.id().index() as f64
    }

    fn description(&self) -> &'static str {
        "First Come First Served"
    }
}

/// Earliest Due Date.
///
/// Jobs carry no due date, so the job id stands in for it: lower ids
/// are due first.
#[derive(Debug, Clone, Copy)]
pub struct Edd;

impl DispatchingRule for Edd {
    fn name(&self) -> &'static str {
        "EDD"
    }

    fn evaluate(&self, operation: &Operation, _instance: &Instance) -> RuleScore {
        operation.job_id().0 as f64
    }

    fn description(&self) -> &'static str {
        "Earliest Due Date (by job id)"
    }
}

// ======================== Time-based rules ========================

/// Shortest Processing Time.
///
/// Prioritizes operations whose fastest variant is shortest.
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, operation: &Operation, _instance: &Instance) -> RuleScore {
        operation
            .min_duration()
            .map_or(f64::INFINITY, |d| d as f64)
    }

    fn description(&self) -> &'static str {
        "Shortest Processing Time"
    }
}

/// Longest Processing Time.
///
/// Prioritizes operations whose slowest variant is longest.
#[derive(Debug, Clone, Copy)]
pub struct Lpt;

impl DispatchingRule for Lpt {
    fn name(&self) -> &'static str {
        "LPT"
    }

    fn evaluate(&self, operation: &Operation, _instance: &Instance) -> RuleScore {
        operation
            .max_duration()
            .map_or(f64::INFINITY, |d| -(d as f64))
    }

    fn description(&self) -> &'static str {
        "Longest Processing Time"
    }
}

/// Shortest-variant work left in the operation's job, the operation
/// itself included.
fn remaining_work(operation: &Operation, instance: &Instance) -> i64 {
    instance
        .job(operation.job_id())
        .map(|job| {
            job.operations()
                .iter()
                .filter_map(|&id| instance.operation(id))
                .filter(|op| !op.is_assigned())
                .filter_map(Operation::min_duration)
                .sum()
        })
        .unwrap_or(0)
}

/// Least Work Remaining.
///
/// Prioritizes jobs closer to completion.
#[derive(Debug, Clone, Copy)]
pub struct Lwkr;

impl DispatchingRule for Lwkr {
    fn name(&self) -> &'static str {
        "LWKR"
    }

    fn evaluate(&self, operation: &Operation, instance: &Instance) -> RuleScore {
        remaining_work(operation, instance) as f64
    }

    fn description(&self) -> &'static str {
        "Least Work Remaining"
    }
}

/// Most Work Remaining.
///
/// Prioritizes jobs with the most remaining work.
/// Prevents starvation of long jobs.
#[derive(Debug, Clone, Copy)]
pub struct Mwkr;

impl DispatchingRule for Mwkr {
    fn name(&self) -> &'static str {
        "MWKR"
    }

    fn evaluate(&self, operation: &Operation, instance: &Instance) -> RuleScore {
        -(remaining_work(operation, instance) as f64)
    }

    fn description(&self) -> &'static str {
        "Most Work Remaining"
    }
}

// ======================== Energy rules ========================

/// Energy-aware score.
///
/// `energy_weight · energy + time_weight · duration` of the operation's
/// cheapest variant.
#[derive(Debug, Clone, Copy)]
pub struct EnergyAware {
    pub energy_weight: f64,
    pub time_weight: f64,
}

impl EnergyAware {
    pub fn new(energy_weight: f64, time_weight: f64) -> Self {
        Self {
            energy_weight,
            time_weight,
        }
    }

    /// Score of one variant.
    pub fn variant_score(&self, energy: i64, duration: i64) -> f64 {
        self.energy_weight * energy as f64 + self.time_weight * duration as f64
    }
}

impl Default for EnergyAware {
    fn default() -> Self {
        Self::new(0.7, 0.3)
    }
}

impl DispatchingRule for EnergyAware {
    fn name(&self) -> &'static str {
        "ENERGY"
    }

    fn evaluate(&self, operation: &Operation, _instance: &Instance) -> RuleScore {
        operation
            .variants()
            .iter()
            .map(|v| self.variant_score(v.energy, v.duration))
            .fold(f64::INFINITY, f64::min)
    }

    fn description(&self) -> &'static str {
        "Weighted energy and processing time"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OperationId;
    use crate::testing;

    fn op(instance: &Instance, id: usize) -> &Operation {
        instance.operation(OperationId(id)).unwrap()
    }

    #[test]
    fn test_order_rules() {
        let inst = testing::three_job_instance();
        assert_eq!(Fcfs.evaluate(op(&inst, 3), &inst), 3.0);
        assert_eq!(Edd.evaluate(op(&inst, 3), &inst), 1.0);
        assert_eq!(Edd.evaluate(op(&inst, 4), &inst), 2.0);
    }

    #[test]
    fn test_processing_time_rules() {
        let inst = testing::three_job_instance();
        // O0: M0 4, M1 6
        assert_eq!(Spt.evaluate(op(&inst, 0), &inst), 4.0);
        assert_eq!(Lpt.evaluate(op(&inst, 0), &inst), -6.0);
    }

    #[test]
    fn test_remaining_work_rules() {
        let inst = testing::three_job_instance();
        // job 1: O2 min 2, O3 min 4
        assert_eq!(Lwkr.evaluate(op(&inst, 2), &inst), 6.0);
        assert_eq!(Mwkr.evaluate(op(&inst, 2), &inst), -6.0);
        // job 2: O4 min 1
        assert_eq!(Lwkr.evaluate(op(&inst, 4), &inst), 1.0);
    }

    #[test]
    fn test_energy_rule() {
        let inst = testing::three_job_instance();
        let rule = EnergyAware::default();
        // O0: M0 0.7*8 + 0.3*4 = 6.8, M1 0.7*3 + 0.3*6 = 3.9
        assert!((rule.evaluate(op(&inst, 0), &inst) - 3.9).abs() < 1e-9);
        assert_eq!(rule.name(), "ENERGY");
    }
}
