//! Solution evaluator.
//!
//! A [`Solution`] owns one [`Instance`] and is the single entry point for
//! mutating its scheduling state. Every mutation is followed by a
//! recomputation of the cached metrics:
//!
//! - total energy (sum over machines)
//! - makespan (largest job completion time)
//! - average job completion time
//! - feasibility (every operation assigned, no precedence violation)
//! - objective
//!
//! # Objective
//!
//! Feasible: `alpha · energy + beta · makespan + gamma · avg_completion`.
//! Infeasible: [`PENALTY`] per unassigned operation and per precedence
//! violation, so any infeasible solution ranks behind realistic feasible
//! ones.

mod kpi;

pub use kpi::{MachineKpi, ScheduleKpi};

use log::warn;
use std::collections::HashMap;

use crate::config::{ObjectiveWeights, PENALTY};
use crate::error::{IncompatibleAssignmentError, InfeasibleResidualWarning, ScheduleError};
use crate::models::{
    Assignment, Instance, Machine, MachineId, OperationId, RunRecord, ScheduleExport,
    ScheduleInfo,
};

/// An instance together with its evaluated scheduling state.
#[derive(Debug, Clone)]
pub struct Solution {
    instance: Instance,
    weights: ObjectiveWeights,
    total_energy: i64,
    cmax: i64,
    sum_completion: i64,
    avg_completion: f64,
    unassigned: usize,
    precedence_violations: usize,
    feasible: bool,
    objective: f64,
}

impl Solution {
    /// Wraps an instance, keeping whatever state it already carries.
    pub fn new(instance: Instance) -> Self {
        let mut solution = Self {
            instance,
            weights: ObjectiveWeights::default(),
            total_energy: 0,
            cmax: 0,
            sum_completion: 0,
            avg_completion: 0.0,
            unassigned: 0,
            precedence_violations: 0,
            feasible: false,
            objective: 0.0,
        };
        solution.recompute();
        solution
    }

    /// Sets the objective weights.
    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self.recompute();
        self
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn into_instance(self) -> Instance {
        self.instance
    }

    pub fn weights(&self) -> ObjectiveWeights {
        self.weights
    }

    /// Independent copy of the solution and its whole instance.
    pub fn deepcopy(&self) -> Self {
        self.clone()
    }

    /// Schedules an operation on a machine as early as its predecessors
    /// and the machine allow. Returns the start time.
    pub fn schedule(
        &mut self,
        operation: OperationId,
        machine: MachineId,
    ) -> Result<i64, ScheduleError> {
        let requested = self.instance.min_start_time(operation);
        self.place(operation, machine, requested)
    }

    fn place(
        &mut self,
        operation: OperationId,
        machine: MachineId,
        requested: i64,
    ) -> Result<i64, ScheduleError> {
        let op = self
            .instance
            .operation(operation)
            .ok_or(ScheduleError::UnknownOperation(operation))?;
        if self.instance.machine(machine).is_none() {
            return Err(ScheduleError::UnknownMachine(machine));
        }
        if op.is_assigned() {
            return Err(ScheduleError::AlreadyAssigned(operation));
        }
        let variant = *op.variant_for(machine).ok_or(
            IncompatibleAssignmentError::MachineNotInVariants { operation, machine },
        )?;
        let job_id = op.job_id();
        if !self.instance.predecessors_assigned(operation) {
            return Err(IncompatibleAssignmentError::PredecessorsUnmet { operation }.into());
        }

        let start = self
            .instance
            .machine_mut(machine)
            .ok_or(ScheduleError::UnknownMachine(machine))?
            .add_operation(operation, job_id, requested, variant.duration, variant.energy)?;
        self.instance
            .operation_mut(operation)
            .ok_or(ScheduleError::UnknownOperation(operation))?
            .assign(ScheduleInfo {
                machine_id: machine,
                start_time: start,
                duration: variant.duration,
                energy: variant.energy,
            });
        self.recompute();
        Ok(start)
    }

    /// Finish time `schedule(operation, machine)` would produce, without
    /// checking the horizon. `None` for an incompatible pair.
    pub fn projected_finish(&self, operation: OperationId, machine: MachineId) -> Option<i64> {
        let variant = self.instance.operation(operation)?.variant_for(machine)?;
        let (start, _) = self
            .instance
            .machine(machine)?
            .projected_start(self.instance.min_start_time(operation));
        Some(start + variant.duration)
    }

    /// Removes an operation from its machine. Other operations keep their
    /// placement. Returns the cleared placement.
    pub fn unschedule(&mut self, operation: OperationId) -> Option<ScheduleInfo> {
        let info = *self.instance.operation(operation)?.schedule_info()?;
        self.instance
            .machine_mut(info.machine_id)?
            .remove_operation(operation);
        self.instance.operation_mut(operation)?.reset();
        self.recompute();
        Some(info)
    }

    /// Unassigns every operation of a machine and wipes its timeline.
    /// Returns the removed operations in start order.
    pub fn clear_machine(&mut self, machine: MachineId) -> Result<Vec<OperationId>, ScheduleError> {
        let m = self.machine_mut(machine)?;
        let mut cleared: Vec<(i64, OperationId)> = m
            .scheduled_operations()
            .iter()
            .map(|slot| (slot.start, slot.operation_id))
            .collect();
        m.reset();
        cleared.sort();
        for &(_, op) in &cleared {
            if let Some(operation) = self.instance.operation_mut(op) {
                operation.reset();
            }
        }
        self.recompute();
        Ok(cleared.into_iter().map(|(_, op)| op).collect())
    }

    /// Stops a machine at `at`.
    pub fn stop_machine(&mut self, machine: MachineId, at: i64) -> Result<(), ScheduleError> {
        self.instance
            .machine_mut(machine)
            .ok_or(ScheduleError::UnknownMachine(machine))?
            .stop(at)?;
        self.recompute();
        Ok(())
    }

    /// Stops every running machine as soon as its last operation is done.
    /// A machine that cannot stop does not keep the others running; the
    /// first such error is returned.
    pub fn shut_down_machines(&mut self) -> Result<(), ScheduleError> {
        let mut first_err = None;
        for machine in self.instance.machines_mut().iter_mut() {
            if let Err(e) = machine.shut_down() {
                first_err.get_or_insert(e);
            }
        }
        self.recompute();
        first_err.map_or(Ok(()), Err)
    }

    /// Clears every placement and machine timeline.
    pub fn reset(&mut self) {
        self.instance.reset();
        self.recompute();
    }

    /// Refreshes the cached metrics from the instance state.
    pub fn recompute(&mut self) {
        let instance = &self.instance;

        self.total_energy = instance
            .machines()
            .iter()
            .map(|m| m.total_energy_consumption())
            .sum();

        let completions: Vec<i64> = instance
            .jobs()
            .iter()
            .map(|job| instance.job_completion_time(job))
            .collect();
        self.cmax = completions.iter().copied().max().unwrap_or(0);
        self.sum_completion = completions.iter().sum();
        self.avg_completion = if completions.is_empty() {
            0.0
        } else {
            self.sum_completion as f64 / completions.len() as f64
        };

        self.unassigned = instance
            .operations()
            .iter()
            .filter(|op| !op.is_assigned())
            .count();
        self.precedence_violations = instance
            .operations()
            .iter()
            .filter_map(|op| op.start_time().map(|start| (op, start)))
            .map(|(op, start)| {
                op.predecessors()
                    .iter()
                    .filter(|&&p| instance.end_time(p).is_some_and(|end| end > start))
                    .count()
            })
            .sum();

        self.feasible = self.unassigned == 0 && self.precedence_violations == 0;
        self.objective = if self.feasible {
            self.weights
                .combine(self.total_energy, self.cmax, self.avg_completion)
        } else {
            PENALTY * (self.unassigned + self.precedence_violations) as f64
        };
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Makespan.
    pub fn cmax(&self) -> i64 {
        self.cmax
    }

    pub fn sum_completion_time(&self) -> i64 {
        self.sum_completion
    }

    pub fn avg_completion_time(&self) -> f64 {
        self.avg_completion
    }

    pub fn total_energy_consumption(&self) -> i64 {
        self.total_energy
    }

    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    pub fn precedence_violations(&self) -> usize {
        self.precedence_violations
    }

    /// Unassigned operations whose predecessors are all assigned.
    pub fn available_operations(&self) -> Vec<OperationId> {
        self.instance
            .operations()
            .iter()
            .filter(|op| !op.is_assigned() && self.instance.predecessors_assigned(op.id()))
            .map(|op| op.id())
            .collect()
    }

    /// Unassigned operations whose predecessors all end by `at`.
    pub fn ready_operations_at(&self, at: i64) -> Vec<OperationId> {
        self.instance
            .operations()
            .iter()
            .filter(|op| !op.is_assigned() && self.instance.is_ready(op.id(), at))
            .map(|op| op.id())
            .collect()
    }

    pub fn unassigned_operations(&self) -> Vec<OperationId> {
        self.instance
            .operations()
            .iter()
            .filter(|op| !op.is_assigned())
            .map(|op| op.id())
            .collect()
    }

    /// The operations left unassigned, if any.
    pub fn residual(&self) -> Option<InfeasibleResidualWarning> {
        let unassigned = self.unassigned_operations();
        (!unassigned.is_empty()).then_some(InfeasibleResidualWarning { unassigned })
    }

    /// Per-operation placements and completed machine runs.
    pub fn export(&self) -> ScheduleExport {
        let mut export = ScheduleExport::new();
        for op in self.instance.operations() {
            if let Some(info) = op.schedule_info() {
                export.add_assignment(Assignment::new(op.id(), info.machine_id, info.start_time));
            }
        }
        for machine in self.instance.machines() {
            for run in machine.run_intervals() {
                if let Some(stop) = run.stop {
                    export.add_run(RunRecord::new(machine.id(), run.start, stop));
                }
            }
        }
        export
    }

    /// Resets the solution and rebuilds the exported schedule by driving
    /// the machine timelines again: each recorded run is started and
    /// stopped explicitly and every operation must land exactly on its
    /// recorded start.
    pub fn replay(&mut self, export: &ScheduleExport) -> Result<(), ScheduleError> {
        self.reset();

        for a in &export.assignments {
            if self.instance.operation(a.operation_id).is_none() {
                warn!("replay references unknown operation {}", a.operation_id);
                return Err(ScheduleError::UnknownOperation(a.operation_id));
            }
        }
        for machine in export.machine_ids() {
            if self.instance.machine(machine).is_none() {
                warn!("replay references unknown machine {machine}");
                return Err(ScheduleError::UnknownMachine(machine));
            }
        }

        let mut order: Vec<&Assignment> = export.assignments.iter().collect();
        order.sort_by_key(|a| {
            let position = self
                .instance
                .operation(a.operation_id)
                .map_or(0, |op| op.position());
            (a.start_time, position)
        });

        let mut runs: HashMap<MachineId, RunCursor> = export
            .machine_ids()
            .into_iter()
            .map(|m| {
                let records = export
                    .runs_for_machine(m)
                    .into_iter()
                    .copied()
                    .collect::<Vec<_>>();
                (m, RunCursor::new(records))
            })
            .collect();

        for a in order {
            let duration = self
                .instance
                .operation(a.operation_id)
                .and_then(|op| op.variant_for(a.machine_id))
                .map(|v| v.duration)
                .ok_or(IncompatibleAssignmentError::MachineNotInVariants {
                    operation: a.operation_id,
                    machine: a.machine_id,
                })?;
            let cursor = runs
                .get_mut(&a.machine_id)
                .ok_or(ScheduleError::UnknownMachine(a.machine_id))?;
            self.open_run_for(cursor, a, duration)?;

            let placed = self.place(a.operation_id, a.machine_id, a.start_time)?;
            if placed != a.start_time {
                return Err(ScheduleError::ReplayMismatch {
                    operation: a.operation_id,
                    recorded: a.start_time,
                    placed,
                });
            }
        }

        for cursor in runs.values_mut() {
            while let Some(run) = cursor.current() {
                self.close_run(cursor, run)?;
            }
        }
        self.recompute();
        Ok(())
    }

    /// Advances the machine's run cursor to the run enclosing `a`, closing
    /// the runs that end before it and starting the enclosing one.
    fn open_run_for(
        &mut self,
        cursor: &mut RunCursor,
        a: &Assignment,
        duration: i64,
    ) -> Result<(), ScheduleError> {
        let outside = ScheduleError::OutsideRun {
            operation: a.operation_id,
            machine: a.machine_id,
        };
        loop {
            let run = cursor.current().ok_or_else(|| outside.clone())?;
            if a.start_time < run.start {
                return Err(outside);
            }
            if a.start_time + duration <= run.stop {
                if !cursor.open {
                    self.machine_mut(run.machine_id)?.start(run.start)?;
                    cursor.open = true;
                }
                return Ok(());
            }
            if a.start_time < run.stop {
                return Err(outside);
            }
            self.close_run(cursor, run)?;
        }
    }

    fn close_run(&mut self, cursor: &mut RunCursor, run: RunRecord) -> Result<(), ScheduleError> {
        let machine = self.machine_mut(run.machine_id)?;
        if !cursor.open {
            machine.start(run.start)?;
        }
        machine.stop(run.stop)?;
        cursor.open = false;
        cursor.next += 1;
        Ok(())
    }

    fn machine_mut(&mut self, machine: MachineId) -> Result<&mut Machine, ScheduleError> {
        self.instance
            .machine_mut(machine)
            .ok_or(ScheduleError::UnknownMachine(machine))
    }
}

/// Replay progress through the recorded runs of one machine.
struct RunCursor {
    runs: Vec<RunRecord>,
    next: usize,
    open: bool,
}

impl RunCursor {
    fn new(runs: Vec<RunRecord>) -> Self {
        Self {
            runs,
            next: 0,
            open: false,
        }
    }

    fn current(&self) -> Option<RunRecord> {
        self.runs.get(self.next).copied()
    }
}
