//! Problem instance.
//!
//! The instance is the arena owning every job, operation and machine. It is
//! built once from already-parsed input rows and is the unit of deep copy:
//! cloning it yields an isolated scheduling state.
//!
//! # Construction
//!
//! - One operation per distinct `(job, sequence)` pair, numbered in order
//!   of first appearance; repeated pairs add machine variants.
//! - Jobs in increasing job id, operations chained in increasing sequence.
//! - Machines in input order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::{Job, JobId, Machine, MachineId, Operation, OperationId, Variant};
use crate::config::RestartPolicy;
use crate::error::MalformedInstanceError;

/// One `(operation, machine variant)` input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRow {
    pub job_id: u32,
    pub operation_seq: u32,
    pub machine_id: u32,
    pub duration: i64,
    pub energy: i64,
}

impl OperationRow {
    pub fn new(job_id: u32, operation_seq: u32, machine_id: u32, duration: i64, energy: i64) -> Self {
        Self {
            job_id,
            operation_seq,
            machine_id,
            duration,
            energy,
        }
    }
}

/// One machine input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRow {
    pub machine_id: u32,
    pub setup_time: i64,
    pub setup_energy: i64,
    pub teardown_time: i64,
    pub teardown_energy: i64,
    pub idle_power: i64,
    pub horizon: i64,
}

impl MachineRow {
    /// A machine without setup, teardown or idle cost.
    pub fn new(machine_id: u32, horizon: i64) -> Self {
        Self {
            machine_id,
            setup_time: 0,
            setup_energy: 0,
            teardown_time: 0,
            teardown_energy: 0,
            idle_power: 0,
            horizon,
        }
    }

    pub fn with_setup(mut self, time: i64, energy: i64) -> Self {
        self.setup_time = time;
        self.setup_energy = energy;
        self
    }

    pub fn with_teardown(mut self, time: i64, energy: i64) -> Self {
        self.teardown_time = time;
        self.teardown_energy = energy;
        self
    }

    pub fn with_idle_power(mut self, power: i64) -> Self {
        self.idle_power = power;
        self
    }
}

fn non_negative(
    entity: impl FnOnce() -> String,
    fields: &[(&'static str, i64)],
) -> Result<(), MalformedInstanceError> {
    match fields.iter().find(|(_, v)| *v < 0) {
        Some(&(field, value)) => Err(MalformedInstanceError::NegativeValue {
            entity: entity(),
            field,
            value,
        }),
        None => Ok(()),
    }
}

/// A scheduling problem together with its current scheduling state.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    name: String,
    operations: Vec<Operation>,
    jobs: Vec<Job>,
    machines: Vec<Machine>,
    job_index: HashMap<JobId, usize>,
    machine_index: HashMap<MachineId, usize>,
}

impl Instance {
    /// Builds an instance from parsed rows.
    pub fn from_rows(
        name: impl Into<String>,
        operation_rows: &[OperationRow],
        machine_rows: &[MachineRow],
    ) -> Result<Self, MalformedInstanceError> {
        let mut machines = Vec::with_capacity(machine_rows.len());
        let mut machine_index = HashMap::with_capacity(machine_rows.len());
        for row in machine_rows {
            let id = MachineId(row.machine_id);
            non_negative(
                || id.to_string(),
                &[
                    ("setup_time", row.setup_time),
                    ("setup_energy", row.setup_energy),
                    ("teardown_time", row.teardown_time),
                    ("teardown_energy", row.teardown_energy),
                    ("idle_power", row.idle_power),
                    ("horizon", row.horizon),
                ],
            )?;
            if machine_index.insert(id, machines.len()).is_some() {
                return Err(MalformedInstanceError::DuplicateMachine(id));
            }
            machines.push(
                Machine::new(id, row.horizon)
                    .with_setup(row.setup_time, row.setup_energy)
                    .with_teardown(row.teardown_time, row.teardown_energy)
                    .with_idle_power(row.idle_power),
            );
        }

        let mut operations: Vec<Operation> = Vec::new();
        let mut by_key: HashMap<(u32, u32), OperationId> = HashMap::new();
        for row in operation_rows {
            let job = JobId(row.job_id);
            let machine = MachineId(row.machine_id);
            non_negative(
                || format!("{job} operation {}", row.operation_seq),
                &[("duration", row.duration), ("energy", row.energy)],
            )?;
            if !machine_index.contains_key(&machine) {
                return Err(MalformedInstanceError::UnknownMachine {
                    job,
                    sequence: row.operation_seq,
                    machine,
                });
            }
            let id = *by_key
                .entry((row.job_id, row.operation_seq))
                .or_insert_with(|| {
                    let id = OperationId(operations.len());
                    operations.push(Operation::new(id, job));
                    id
                });
            let op = &mut operations[id.index()];
            if op.variant_for(machine).is_some() {
                return Err(MalformedInstanceError::DuplicateVariant {
                    job,
                    sequence: row.operation_seq,
                    machine,
                });
            }
            op.push_variant(Variant::new(machine, row.duration, row.energy));
        }

        let mut grouped: BTreeMap<u32, BTreeMap<u32, OperationId>> = BTreeMap::new();
        for (&(job, seq), &id) in &by_key {
            grouped.entry(job).or_default().insert(seq, id);
        }

        let mut jobs = Vec::with_capacity(grouped.len());
        let mut job_index = HashMap::with_capacity(grouped.len());
        for (job_id, sequence) in grouped {
            let id = JobId(job_id);
            let mut expected = None;
            let mut job = Job::new(id);
            for (seq, op_id) in sequence {
                if let Some(expected) = expected {
                    if seq != expected {
                        return Err(MalformedInstanceError::NonContiguousOperations {
                            job: id,
                            missing: expected,
                        });
                    }
                }
                expected = Some(seq + 1);

                let position = job.operation_count();
                if let Some(previous) = job.push_operation(op_id) {
                    operations[op_id.index()].add_predecessor(previous);
                    operations[previous.index()].add_successor(op_id);
                }
                operations[op_id.index()].set_position(position);
            }
            job_index.insert(id, jobs.len());
            jobs.push(job);
        }

        Ok(Self {
            name: name.into(),
            operations,
            jobs,
            machines,
            job_index,
            machine_index,
        })
    }

    /// Applies a restart policy to every machine.
    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        for machine in &mut self.machines {
            machine.set_restart_policy(policy);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(id.index())
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.job_index.get(&id).map(|&i| &self.jobs[i])
    }

    pub fn machine(&self, id: MachineId) -> Option<&Machine> {
        self.machine_index.get(&id).map(|&i| &self.machines[i])
    }

    pub(crate) fn operation_mut(&mut self, id: OperationId) -> Option<&mut Operation> {
        self.operations.get_mut(id.index())
    }

    pub(crate) fn machine_mut(&mut self, id: MachineId) -> Option<&mut Machine> {
        let index = *self.machine_index.get(&id)?;
        Some(&mut self.machines[index])
    }

    pub(crate) fn machines_mut(&mut self) -> &mut [Machine] {
        &mut self.machines
    }

    /// End time of an operation, if assigned.
    pub fn end_time(&self, id: OperationId) -> Option<i64> {
        self.operation(id).and_then(Operation::end_time)
    }

    /// Whether every predecessor of `id` is assigned.
    pub fn predecessors_assigned(&self, id: OperationId) -> bool {
        self.operation(id).is_some_and(|op| {
            op.predecessors()
                .iter()
                .all(|&p| self.end_time(p).is_some())
        })
    }

    /// Whether every predecessor of `id` is assigned and done by `at`.
    pub fn is_ready(&self, id: OperationId, at: i64) -> bool {
        self.operation(id).is_some_and(|op| {
            op.predecessors()
                .iter()
                .all(|&p| self.end_time(p).is_some_and(|end| end <= at))
        })
    }

    /// Earliest start allowed by the assigned predecessors (0 without any).
    pub fn min_start_time(&self, id: OperationId) -> i64 {
        self.operation(id)
            .map(|op| {
                op.predecessors()
                    .iter()
                    .filter_map(|&p| self.end_time(p))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    /// End of the job's last operation, 0 while it is unassigned.
    pub fn job_completion_time(&self, job: &Job) -> i64 {
        job.last_operation()
            .and_then(|id| self.end_time(id))
            .unwrap_or(0)
    }

    /// First unassigned operation of the job.
    pub fn next_operation(&self, job: &Job) -> Option<OperationId> {
        job.operations()
            .iter()
            .copied()
            .find(|&id| self.operation(id).is_some_and(|op| !op.is_assigned()))
    }

    /// Clears every placement and machine timeline.
    pub fn reset(&mut self) {
        for op in &mut self.operations {
            op.reset();
        }
        for machine in &mut self.machines {
            machine.reset();
        }
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_M{}_J{}_O{}",
            self.name,
            self.machine_count(),
            self.job_count(),
            self.operation_count()
        )
    }
}
