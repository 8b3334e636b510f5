//! Job model.
//!
//! A job is a linear chain of operations: operation `i + 1` has operation
//! `i` as its only predecessor. The job only stores operation ids; timing
//! queries go through the owning [`Instance`](super::Instance).

use serde::{Deserialize, Serialize};

use super::{JobId, OperationId};

/// A job to be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    operations: Vec<OperationId>,
}

impl Job {
    /// Creates an empty job.
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            operations: Vec::new(),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    /// Operation ids in precedence order.
    pub fn operations(&self) -> &[OperationId] {
        &self.operations
    }

    /// Number of operations.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Last operation of the chain.
    pub fn last_operation(&self) -> Option<OperationId> {
        self.operations.last().copied()
    }

    /// Appends an operation and returns the previous tail, which becomes
    /// its predecessor.
    pub(crate) fn push_operation(&mut self, id: OperationId) -> Option<OperationId> {
        let previous = self.last_operation();
        self.operations.push(id);
        previous
    }
}
