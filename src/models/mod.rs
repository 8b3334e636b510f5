//! Scheduling domain models.
//!
//! The [`Instance`] is an arena owning every [`Job`], [`Operation`] and
//! [`Machine`]. Cross references (job membership, predecessors,
//! successors) are ids resolved through the instance, so cloning an
//! instance yields a fully independent scheduling state.
//!
//! # Domain Mappings
//!
//! | u-ejsp | Manufacturing | Data center |
//! |--------|---------------|-------------|
//! | Job | Order | Batch pipeline |
//! | Operation | Routing step | Pipeline stage |
//! | Variant | Eligible machine | Eligible server class |
//! | Machine | Machine tool | Server |

mod ids;
mod instance;
mod job;
mod machine;
mod operation;
mod schedule;

pub use ids::{JobId, MachineId, OperationId};
pub use instance::{Instance, MachineRow, OperationRow};
pub use job::Job;
pub use machine::{EnergyBreakdown, Machine, RunInterval, ScheduledSlot};
pub use operation::{Operation, ScheduleInfo, Variant};
pub use schedule::{Assignment, RunRecord, ScheduleExport};
