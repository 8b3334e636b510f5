//! Schedule export records.
//!
//! A [`ScheduleExport`] is the flat, serializable picture of a solution:
//! one [`Assignment`] per placed operation and one [`RunRecord`] per
//! completed machine run. It is what an external writer stores and what
//! [`Solution::replay`](crate::solution::Solution::replay) consumes.

use serde::{Deserialize, Serialize};

use super::{MachineId, OperationId};

/// An operation placed on a machine at a start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub operation_id: OperationId,
    pub machine_id: MachineId,
    pub start_time: i64,
}

impl Assignment {
    pub fn new(operation_id: OperationId, machine_id: MachineId, start_time: i64) -> Self {
        Self {
            operation_id,
            machine_id,
            start_time,
        }
    }
}

/// A completed ON period of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub machine_id: MachineId,
    pub start: i64,
    pub stop: i64,
}

impl RunRecord {
    pub fn new(machine_id: MachineId, start: i64, stop: i64) -> Self {
        Self {
            machine_id,
            start,
            stop,
        }
    }
}

/// Assignments and run intervals of a solution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleExport {
    pub assignments: Vec<Assignment>,
    pub runs: Vec<RunRecord>,
}

impl ScheduleExport {
    /// Creates an empty export.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    pub fn add_run(&mut self, run: RunRecord) {
        self.runs.push(run);
    }

    /// Finds the assignment of an operation.
    pub fn assignment_for_operation(&self, id: OperationId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.operation_id == id)
    }

    /// Assignments of one machine, sorted by start time.
    pub fn assignments_for_machine(&self, id: MachineId) -> Vec<&Assignment> {
        let mut out: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.machine_id == id)
            .collect();
        out.sort_by_key(|a| a.start_time);
        out
    }

    /// Runs of one machine, sorted by start time.
    pub fn runs_for_machine(&self, id: MachineId) -> Vec<&RunRecord> {
        let mut out: Vec<&RunRecord> = self.runs.iter().filter(|r| r.machine_id == id).collect();
        out.sort_by_key(|r| r.start);
        out
    }

    /// Machines mentioned by any record, in first-appearance order.
    pub fn machine_ids(&self) -> Vec<MachineId> {
        let mut ids = Vec::new();
        let mentioned = self
            .runs
            .iter()
            .map(|r| r.machine_id)
            .chain(self.assignments.iter().map(|a| a.machine_id));
        for id in mentioned {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScheduleExport {
        let mut export = ScheduleExport::new();
        export.add_assignment(Assignment::new(OperationId(1), MachineId(0), 9));
        export.add_assignment(Assignment::new(OperationId(0), MachineId(0), 1));
        export.add_assignment(Assignment::new(OperationId(2), MachineId(3), 4));
        export.add_run(RunRecord::new(MachineId(3), 3, 8));
        export.add_run(RunRecord::new(MachineId(0), 0, 12));
        export
    }

    #[test]
    fn test_queries() {
        let export = sample();
        assert_eq!(
            export.assignment_for_operation(OperationId(2)).map(|a| a.start_time),
            Some(4)
        );
        let starts: Vec<i64> = export
            .assignments_for_machine(MachineId(0))
            .iter()
            .map(|a| a.start_time)
            .collect();
        assert_eq!(starts, vec![1, 9]);
        assert_eq!(export.runs_for_machine(MachineId(3)).len(), 1);
        assert_eq!(export.machine_ids(), vec![MachineId(3), MachineId(0)]);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&Assignment::new(OperationId(1), MachineId(2), 3)).unwrap();
        assert_eq!(json, r#"{"operation_id":1,"machine_id":2,"start_time":3}"#);
        let back: ScheduleExport =
            serde_json::from_str(&serde_json::to_string(&sample()).unwrap()).unwrap();
        assert_eq!(back, sample());
    }
}
