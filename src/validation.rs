//! Schedule validation.
//!
//! Checks the scheduling state of an instance against every constraint
//! of the problem and reports all detected issues:
//! - Unassigned operations
//! - Precedence violations inside a job
//! - Overlapping operations on a machine
//! - Operations placed outside an ON period (or inside its setup)
//! - Runs leaving `[0, horizon]`, teardown included
//! - Overlapping runs of the same machine
//!
//! [`validate_structure`] skips the first check; it accepts a partial
//! schedule as long as what is placed is consistent.

use std::fmt;

use crate::models::{Instance, Machine, MachineId, RunInterval, ScheduledSlot};

/// Validation result.
pub type ValidationResult = Result<(), Vec<Violation>>;

/// A constraint violation.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Violation category.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// An operation has no placement.
    Unassigned,
    /// An operation starts before its predecessor ends, or is placed while
    /// its predecessor is not.
    Precedence,
    /// Two operations of one machine overlap.
    Overlap,
    /// An operation is not covered by a run after its setup.
    OutsideRun,
    /// A run starts before 0 or cannot tear down by the horizon.
    HorizonExceeded,
    /// A run starts before the previous teardown is over.
    RunOverlap,
}

impl Violation {
    fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates a complete schedule.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(violations)` with all detected issues.
pub fn validate_solution(instance: &Instance) -> ValidationResult {
    let mut violations = Vec::new();
    for op in instance.operations() {
        if !op.is_assigned() {
            violations.push(Violation::new(
                ViolationKind::Unassigned,
                format!("Operation {} of job {} is not scheduled", op.id(), op.job_id()),
            ));
        }
    }
    check_structure(instance, &mut violations);
    finish(violations)
}

/// Validates what is scheduled, ignoring unassigned operations.
pub fn validate_structure(instance: &Instance) -> ValidationResult {
    let mut violations = Vec::new();
    check_structure(instance, &mut violations);
    finish(violations)
}

fn finish(violations: Vec<Violation>) -> ValidationResult {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check_structure(instance: &Instance, violations: &mut Vec<Violation>) {
    // Precedence
    for op in instance.operations() {
        let Some(start) = op.start_time() else {
            continue;
        };
        for &pred in op.predecessors() {
            match instance.end_time(pred) {
                Some(end) if end > start => violations.push(Violation::new(
                    ViolationKind::Precedence,
                    format!(
                        "Operation {} starts at {start} before predecessor {pred} ends at {end}",
                        op.id()
                    ),
                )),
                Some(_) => {}
                None => violations.push(Violation::new(
                    ViolationKind::Precedence,
                    format!("Operation {} is placed but predecessor {pred} is not", op.id()),
                )),
            }
        }
    }

    for machine in instance.machines() {
        check_machine(machine, violations);
    }
}

fn check_machine(machine: &Machine, violations: &mut Vec<Violation>) {
    check_timeline(
        machine.id(),
        machine.horizon(),
        machine.available_time(),
        machine.scheduled_operations(),
        &machine.run_intervals(),
        violations,
    );
}

fn check_timeline(
    id: MachineId,
    horizon: i64,
    cursor: i64,
    slots: &[ScheduledSlot],
    runs: &[RunInterval],
    violations: &mut Vec<Violation>,
) {
    for pair in slots.windows(2) {
        if pair[0].end() > pair[1].start {
            violations.push(Violation::new(
                ViolationKind::Overlap,
                format!(
                    "Operations {} and {} overlap on machine {id}",
                    pair[0].operation_id, pair[1].operation_id
                ),
            ));
        }
    }

    for run in runs {
        let end = run.stop.unwrap_or(cursor);
        if run.start < 0 || end + run.teardown_time > horizon {
            violations.push(Violation::new(
                ViolationKind::HorizonExceeded,
                format!(
                    "Run [{}, {end}] of machine {id} does not fit its horizon {horizon}",
                    run.start
                ),
            ));
        }
    }
    for pair in runs.windows(2) {
        let free_at = pair[0]
            .stop
            .map_or(i64::MAX, |stop| stop + pair[0].teardown_time);
        if pair[1].start < free_at {
            violations.push(Violation::new(
                ViolationKind::RunOverlap,
                format!(
                    "Run starting at {} on machine {id} overlaps the previous run",
                    pair[1].start
                ),
            ));
        }
    }

    for slot in slots {
        let covered = runs.iter().any(|run| {
            let end = run.stop.unwrap_or(cursor);
            slot.start >= run.start + run.setup_time && slot.end() <= end
        });
        if !covered {
            violations.push(Violation::new(
                ViolationKind::OutsideRun,
                format!(
                    "Operation {} [{}, {}) is outside every run of machine {id}",
                    slot.operation_id,
                    slot.start,
                    slot.end()
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobId, OperationId};
    use crate::solution::Solution;
    use crate::testing;

    fn kinds(result: ValidationResult) -> Vec<ViolationKind> {
        result
            .unwrap_err()
            .into_iter()
            .map(|v| v.kind)
            .collect()
    }

    #[test]
    fn test_valid_schedule() {
        let mut s = Solution::new(testing::single_machine_instance());
        for id in 0..3 {
            s.schedule(OperationId(id), MachineId(1)).unwrap();
        }
        s.shut_down_machines().unwrap();
        assert!(validate_solution(s.instance()).is_ok());
    }

    #[test]
    fn test_unassigned_only_in_full_check() {
        let mut s = Solution::new(testing::single_machine_instance());
        s.schedule(OperationId(0), MachineId(1)).unwrap();
        assert_eq!(
            kinds(validate_solution(s.instance())),
            vec![ViolationKind::Unassigned, ViolationKind::Unassigned]
        );
        assert!(validate_structure(s.instance()).is_ok());
    }

    #[test]
    fn test_precedence_violation() {
        let mut s = Solution::new(testing::flexible_instance());
        s.schedule(OperationId(0), MachineId(1)).unwrap();
        s.schedule(OperationId(1), MachineId(0)).unwrap();
        s.schedule(OperationId(2), MachineId(0)).unwrap();
        s.unschedule(OperationId(0));
        assert!(kinds(validate_structure(s.instance())).contains(&ViolationKind::Precedence));

        s.schedule(OperationId(0), MachineId(0)).unwrap();
        let errors = validate_structure(s.instance()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ViolationKind::Precedence);
        assert!(errors[0].message.contains("O1"));
    }

    fn slot(op: usize, start: i64, duration: i64) -> ScheduledSlot {
        ScheduledSlot {
            operation_id: OperationId(op),
            job_id: JobId(0),
            start,
            duration,
            energy: 1,
        }
    }

    fn run(start: i64, stop: Option<i64>) -> RunInterval {
        RunInterval {
            start,
            setup_time: 1,
            stop,
            teardown_time: 2,
        }
    }

    fn timeline(slots: &[ScheduledSlot], runs: &[RunInterval], horizon: i64) -> Vec<ViolationKind> {
        let mut violations = Vec::new();
        check_timeline(MachineId(0), horizon, 20, slots, runs, &mut violations);
        violations.into_iter().map(|v| v.kind).collect()
    }

    #[test]
    fn test_consistent_timeline() {
        let slots = [slot(0, 1, 3), slot(1, 4, 2), slot(2, 10, 2)];
        let runs = [run(0, Some(6)), run(8, Some(12))];
        assert!(timeline(&slots, &runs, 14).is_empty());
    }

    #[test]
    fn test_overlap() {
        let slots = [slot(0, 1, 3), slot(1, 3, 2)];
        let runs = [run(0, Some(6))];
        assert_eq!(timeline(&slots, &runs, 30), vec![ViolationKind::Overlap]);
    }

    #[test]
    fn test_slot_inside_setup_is_outside_run() {
        let slots = [slot(0, 0, 3)];
        let runs = [run(0, Some(6))];
        assert_eq!(timeline(&slots, &runs, 30), vec![ViolationKind::OutsideRun]);
    }

    #[test]
    fn test_run_checks() {
        // teardown of the second run ends at 15 > 14
        let runs = [run(0, Some(6)), run(8, Some(13))];
        assert_eq!(timeline(&[], &runs, 14), vec![ViolationKind::HorizonExceeded]);

        // second run starts during the first teardown (6 + 2 > 7)
        let runs = [run(0, Some(6)), run(7, Some(9))];
        assert_eq!(timeline(&[], &runs, 30), vec![ViolationKind::RunOverlap]);

        // open run ends at the cursor (20)
        let runs = [run(0, None)];
        assert_eq!(timeline(&[], &runs, 21), vec![ViolationKind::HorizonExceeded]);
        assert!(timeline(&[], &runs, 22).is_empty());
    }

    #[test]
    fn test_shut_down_schedule_is_structurally_valid() {
        let mut s = Solution::new(testing::rigid_chain_instance());
        s.schedule(OperationId(0), MachineId(0)).unwrap();
        s.stop_machine(MachineId(0), 3).unwrap();
        s.schedule(OperationId(1), MachineId(0)).unwrap();
        s.shut_down_machines().unwrap();
        assert!(validate_solution(s.instance()).is_ok());
        assert_eq!(s.instance().machine(MachineId(0)).unwrap().start_times(), &[0, 4]);
    }

    #[test]
    fn test_violation_display() {
        let v = Violation::new(ViolationKind::Overlap, "O1 and O2 overlap");
        assert_eq!(v.to_string(), "Overlap: O1 and O2 overlap");
    }
}
