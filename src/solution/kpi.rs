//! Schedule quality metrics (KPIs).
//!
//! Computes energy and time indicators from an evaluated solution.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest job completion time |
//! | Total Energy | Setup + teardown + processing + idle energy |
//! | Utilization | Processing time / ON time, per machine |
//! | Avg Completion | Mean job completion time |
//! | Idle Ratio | Idle energy share of the total |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Solution;
use crate::models::{EnergyBreakdown, MachineId};

/// Indicators of one machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineKpi {
    pub energy: EnergyBreakdown,
    /// Number of start events.
    pub runs: usize,
    /// Time spent ON, setup included.
    pub working_time: i64,
    pub busy_time: i64,
    pub idle_time: i64,
    /// `busy_time / working_time`, 0 for a machine never started.
    pub utilization: f64,
}

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    pub makespan: i64,
    pub total_energy: i64,
    /// Energy summed over all machines, split by cause.
    pub energy: EnergyBreakdown,
    pub avg_completion_time: f64,
    /// Mean utilization of the machines that were started at least once.
    pub avg_utilization: f64,
    pub by_machine: BTreeMap<MachineId, MachineKpi>,
    pub feasible: bool,
}

impl ScheduleKpi {
    /// Computes KPIs from a solution.
    pub fn calculate(solution: &Solution) -> Self {
        let mut by_machine = BTreeMap::new();
        let mut energy = EnergyBreakdown::default();

        for machine in solution.instance().machines() {
            let breakdown = machine.energy_breakdown();
            energy.setup += breakdown.setup;
            energy.teardown += breakdown.teardown;
            energy.processing += breakdown.processing;
            energy.idle += breakdown.idle;

            let working_time = machine.working_time();
            let busy_time = machine.busy_time();
            let utilization = if working_time > 0 {
                busy_time as f64 / working_time as f64
            } else {
                0.0
            };
            by_machine.insert(
                machine.id(),
                MachineKpi {
                    energy: breakdown,
                    runs: machine.start_times().len(),
                    working_time,
                    busy_time,
                    idle_time: machine.idle_time(),
                    utilization,
                },
            );
        }

        let used: Vec<f64> = by_machine
            .values()
            .filter(|k| k.runs > 0)
            .map(|k| k.utilization)
            .collect();
        let avg_utilization = if used.is_empty() {
            0.0
        } else {
            used.iter().sum::<f64>() / used.len() as f64
        };

        Self {
            makespan: solution.cmax(),
            total_energy: solution.total_energy_consumption(),
            energy,
            avg_completion_time: solution.avg_completion_time(),
            avg_utilization,
            by_machine,
            feasible: solution.is_feasible(),
        }
    }

    /// Share of the total energy drawn while idle.
    pub fn idle_energy_ratio(&self) -> f64 {
        if self.total_energy == 0 {
            0.0
        } else {
            self.energy.idle as f64 / self.total_energy as f64
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_energy: i64, min_utilization: f64) -> bool {
        self.feasible && self.total_energy <= max_energy && self.avg_utilization >= min_utilization
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OperationId;
    use crate::testing;

    #[test]
    fn test_kpi_single_machine() {
        let mut s = Solution::new(testing::single_machine_instance());
        for id in 0..3 {
            s.schedule(OperationId(id), MachineId(1)).unwrap();
        }
        s.shut_down_machines().unwrap();

        let kpi = ScheduleKpi::calculate(&s);
        assert_eq!(kpi.makespan, 13);
        assert_eq!(kpi.total_energy, 8);
        assert_eq!(kpi.energy.total(), kpi.total_energy);
        assert_eq!(kpi.energy.processing, 6);
        let m = kpi.by_machine[&MachineId(1)];
        assert_eq!(m.runs, 1);
        assert_eq!(m.working_time, 13);
        assert_eq!(m.busy_time, 12);
        assert!((m.utilization - 12.0 / 13.0).abs() < 1e-10);
        assert!(kpi.feasible);
        assert!(kpi.meets_thresholds(8, 0.9));
        assert!(!kpi.meets_thresholds(7, 0.0));
    }

    #[test]
    fn test_kpi_idle_energy() {
        let mut s = Solution::new(testing::flexible_instance());
        // O0 on M1 ends at 3, O1 on M0 starts at 4, O2 on M0 at 6
        s.schedule(OperationId(0), MachineId(1)).unwrap();
        s.schedule(OperationId(1), MachineId(0)).unwrap();
        s.schedule(OperationId(2), MachineId(0)).unwrap();
        s.stop_machine(MachineId(0), 12).unwrap(); // idle 2 on M0
        s.shut_down_machines().unwrap();

        let kpi = ScheduleKpi::calculate(&s);
        let m0 = kpi.by_machine[&MachineId(0)];
        assert_eq!(m0.idle_time, 2);
        assert_eq!(m0.energy.idle, 2);
        assert_eq!(kpi.energy.idle, 2);
        assert!(kpi.idle_energy_ratio() > 0.0);
        assert_eq!(kpi.total_energy, s.total_energy_consumption());
    }

    #[test]
    fn test_kpi_empty_solution() {
        let s = Solution::new(testing::flexible_instance());
        let kpi = ScheduleKpi::calculate(&s);
        assert_eq!(kpi.makespan, 0);
        assert_eq!(kpi.total_energy, 0);
        assert_eq!(kpi.avg_utilization, 0.0);
        assert_eq!(kpi.idle_energy_ratio(), 0.0);
        assert!(!kpi.feasible);
    }
}
