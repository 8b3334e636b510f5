//! Operation model.
//!
//! An operation is the smallest schedulable unit of work. It belongs to a
//! job, may run on any of its machine variants (each with its own duration
//! and energy), and is linked to the neighbouring operations of its job by
//! precedence.
//!
//! Predecessor and successor links are id lists resolved through the
//! owning [`Instance`](super::Instance); an operation never owns another.

use serde::{Deserialize, Serialize};

use super::{JobId, MachineId, OperationId};

/// One way of executing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Machine able to run the operation.
    pub machine_id: MachineId,
    /// Processing time on that machine.
    pub duration: i64,
    /// Energy consumed while processing on that machine.
    pub energy: i64,
}

impl Variant {
    pub fn new(machine_id: MachineId, duration: i64, energy: i64) -> Self {
        Self {
            machine_id,
            duration,
            energy,
        }
    }
}

/// Placement of an assigned operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInfo {
    pub machine_id: MachineId,
    pub start_time: i64,
    pub duration: i64,
    pub energy: i64,
}

impl ScheduleInfo {
    #[inline]
    pub fn end_time(&self) -> i64 {
        self.start_time + self.duration
    }
}

/// An operation of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    id: OperationId,
    job_id: JobId,
    /// Position within the job (0-indexed).
    position: usize,
    variants: Vec<Variant>,
    predecessors: Vec<OperationId>,
    successors: Vec<OperationId>,
    schedule: Option<ScheduleInfo>,
}

impl Operation {
    /// Creates an unassigned operation without variants or links.
    pub fn new(id: OperationId, job_id: JobId) -> Self {
        Self {
            id,
            job_id,
            position: 0,
            variants: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
            schedule: None,
        }
    }

    /// Adds a machine variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    pub(crate) fn push_variant(&mut self, variant: Variant) {
        self.variants.push(variant);
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub(crate) fn add_predecessor(&mut self, id: OperationId) {
        if !self.predecessors.contains(&id) {
            self.predecessors.push(id);
        }
    }

    pub(crate) fn add_successor(&mut self, id: OperationId) {
        if !self.successors.contains(&id) {
            self.successors.push(id);
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn predecessors(&self) -> &[OperationId] {
        &self.predecessors
    }

    pub fn successors(&self) -> &[OperationId] {
        &self.successors
    }

    /// Variant for the given machine, if the operation can run there.
    pub fn variant_for(&self, machine_id: MachineId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.machine_id == machine_id)
    }

    /// Shortest duration over all variants.
    pub fn min_duration(&self) -> Option<i64> {
        self.variants.iter().map(|v| v.duration).min()
    }

    /// Longest duration over all variants.
    pub fn max_duration(&self) -> Option<i64> {
        self.variants.iter().map(|v| v.duration).max()
    }

    pub fn schedule_info(&self) -> Option<&ScheduleInfo> {
        self.schedule.as_ref()
    }

    pub fn is_assigned(&self) -> bool {
        self.schedule.is_some()
    }

    pub fn assigned_machine(&self) -> Option<MachineId> {
        self.schedule.map(|s| s.machine_id)
    }

    pub fn start_time(&self) -> Option<i64> {
        self.schedule.map(|s| s.start_time)
    }

    pub fn end_time(&self) -> Option<i64> {
        self.schedule.map(|s| s.end_time())
    }

    pub(crate) fn assign(&mut self, info: ScheduleInfo) {
        self.schedule = Some(info);
    }

    /// Clears the placement; variants and links are kept.
    pub fn reset(&mut self) {
        self.schedule = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Operation {
        Operation::new(OperationId(0), JobId(1))
            .with_variant(Variant::new(MachineId(0), 5, 2))
            .with_variant(Variant::new(MachineId(1), 3, 7))
    }

    #[test]
    fn test_variant_lookup() {
        let op = sample();
        assert_eq!(op.variant_for(MachineId(1)).map(|v| v.duration), Some(3));
        assert!(op.variant_for(MachineId(5)).is_none());
        assert_eq!(op.min_duration(), Some(3));
        assert_eq!(op.max_duration(), Some(5));
    }

    #[test]
    fn test_assign_and_reset() {
        let mut op = sample();
        assert!(!op.is_assigned());
        assert_eq!(op.end_time(), None);

        op.assign(ScheduleInfo {
            machine_id: MachineId(0),
            start_time: 4,
            duration: 5,
            energy: 2,
        });
        assert_eq!(op.assigned_machine(), Some(MachineId(0)));
        assert_eq!(op.start_time(), Some(4));
        assert_eq!(op.end_time(), Some(9));

        op.reset();
        assert!(!op.is_assigned());
        assert_eq!(op.variants().len(), 2);
    }

    #[test]
    fn test_links_deduplicated() {
        let mut op = sample();
        op.add_predecessor(OperationId(7));
        op.add_predecessor(OperationId(7));
        op.add_successor(OperationId(9));
        assert_eq!(op.predecessors(), &[OperationId(7)]);
        assert_eq!(op.successors(), &[OperationId(9)]);
    }

    #[test]
    fn test_no_variants() {
        let op = Operation::new(OperationId(0), JobId(0));
        assert_eq!(op.min_duration(), None);
    }
}
