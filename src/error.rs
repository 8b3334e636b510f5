//! Error types.
//!
//! Ingestion failures are fatal and surface as [`MalformedInstanceError`].
//! Every mutation of a schedule returns [`ScheduleError`]; heuristics and
//! neighborhoods recover locally from the recoverable kinds
//! (see [`ScheduleError::is_recoverable`]).

use std::fmt;

use thiserror::Error;

use crate::models::{JobId, MachineId, OperationId};

/// Inconsistent input rows. Fatal to instance construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedInstanceError {
    #[error("machine {0} is declared more than once")]
    DuplicateMachine(MachineId),

    #[error("job {job} operation {sequence} references unknown machine {machine}")]
    UnknownMachine {
        job: JobId,
        sequence: u32,
        machine: MachineId,
    },

    #[error("job {job} operation {sequence} lists machine {machine} twice")]
    DuplicateVariant {
        job: JobId,
        sequence: u32,
        machine: MachineId,
    },

    #[error("job {job} skips operation sequence {missing}")]
    NonContiguousOperations { job: JobId, missing: u32 },

    #[error("negative {field} ({value}) in row for {entity}")]
    NegativeValue {
        entity: String,
        field: &'static str,
        value: i64,
    },
}

/// The machine is not among the operation's variants, or the operation
/// is not ready yet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IncompatibleAssignmentError {
    #[error("operation {operation} cannot run on machine {machine}")]
    MachineNotInVariants {
        operation: OperationId,
        machine: MachineId,
    },

    #[error("operation {operation} has unassigned predecessors")]
    PredecessorsUnmet { operation: OperationId },
}

/// Placement would end (teardown included) after the machine's horizon.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("machine {machine} cannot finish by its horizon ({finish} > {horizon})")]
pub struct CapacityExceededError {
    pub machine: MachineId,
    /// `start + duration + teardown_time` of the rejected placement.
    pub finish: i64,
    pub horizon: i64,
}

/// Failure of a scheduling mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("operation {0} is already assigned")]
    AlreadyAssigned(OperationId),

    #[error("unknown operation {0}")]
    UnknownOperation(OperationId),

    #[error("unknown machine {0}")]
    UnknownMachine(MachineId),

    #[error(transparent)]
    Incompatible(#[from] IncompatibleAssignmentError),

    #[error(transparent)]
    CapacityExceeded(#[from] CapacityExceededError),

    #[error("machine {0} was shut down and may not be restarted")]
    MachineRetired(MachineId),

    #[error("machine {machine} cannot start at {at}")]
    InvalidStart { machine: MachineId, at: i64 },

    #[error("machine {machine} cannot stop at {at}")]
    InvalidStop { machine: MachineId, at: i64 },

    #[error("operation {operation} recorded at {recorded} but replays at {placed}")]
    ReplayMismatch {
        operation: OperationId,
        recorded: i64,
        placed: i64,
    },

    #[error("operation {operation} lies outside every recorded run of machine {machine}")]
    OutsideRun {
        operation: OperationId,
        machine: MachineId,
    },
}

impl ScheduleError {
    /// Whether a heuristic may swallow this error and try another
    /// operation/machine pair.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScheduleError::Incompatible(_)
                | ScheduleError::CapacityExceeded(_)
                | ScheduleError::MachineRetired(_)
        )
    }
}

/// Non-fatal signal: construction ran out of available operations while
/// some remained unassigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfeasibleResidualWarning {
    pub unassigned: Vec<OperationId>,
}

impl fmt::Display for InfeasibleResidualWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} operation(s) could not be scheduled:",
            self.unassigned.len()
        )?;
        for id in &self.unassigned {
            write!(f, " {id}")?;
        }
        Ok(())
    }
}
