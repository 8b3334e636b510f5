//! Machine model and its timeline state machine.
//!
//! A machine is OFF at the beginning of the planning. Placing an operation
//! on an OFF machine starts it (setup time and energy), placing one on an
//! ON machine appends it after the availability cursor, and an explicit
//! stop shuts it down (teardown time and energy). Everything, teardown
//! included, must fit before the machine's horizon.
//!
//! # Energy
//!
//! `total = Σ setup_energy + Σ teardown_energy + Σ operation energy
//! + idle_time × idle_power`, where the idle time of a run is the part of
//! `[start + setup_time, stop)` not covered by a scheduled operation. A run
//! that is still open ends at the availability cursor.

use serde::{Deserialize, Serialize};

use super::{JobId, MachineId, OperationId};
use crate::config::RestartPolicy;
use crate::error::{CapacityExceededError, ScheduleError};

/// An operation placed on a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSlot {
    pub operation_id: OperationId,
    pub job_id: JobId,
    pub start: i64,
    pub duration: i64,
    pub energy: i64,
}

impl ScheduledSlot {
    #[inline]
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }
}

/// One ON period of a machine, as consumed by timeline renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInterval {
    pub start: i64,
    pub setup_time: i64,
    /// `None` while the machine is still running.
    pub stop: Option<i64>,
    pub teardown_time: i64,
}

/// Energy of a machine split by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyBreakdown {
    pub setup: i64,
    pub teardown: i64,
    pub processing: i64,
    pub idle: i64,
}

impl EnergyBreakdown {
    #[inline]
    pub fn total(&self) -> i64 {
        self.setup + self.teardown + self.processing + self.idle
    }
}

/// A machine with static energy attributes and a mutable timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    id: MachineId,
    setup_time: i64,
    setup_energy: i64,
    teardown_time: i64,
    teardown_energy: i64,
    idle_power: i64,
    horizon: i64,
    restart_policy: RestartPolicy,

    scheduled: Vec<ScheduledSlot>,
    start_times: Vec<i64>,
    stop_times: Vec<i64>,
    running: bool,
    available_time: i64,
}

impl Machine {
    /// Creates an OFF machine that must be shut down by `horizon`.
    pub fn new(id: MachineId, horizon: i64) -> Self {
        Self {
            id,
            setup_time: 0,
            setup_energy: 0,
            teardown_time: 0,
            teardown_energy: 0,
            idle_power: 0,
            horizon,
            restart_policy: RestartPolicy::default(),
            scheduled: Vec::new(),
            start_times: Vec::new(),
            stop_times: Vec::new(),
            running: false,
            available_time: 0,
        }
    }

    /// Sets the setup time and energy.
    pub fn with_setup(mut self, time: i64, energy: i64) -> Self {
        self.setup_time = time;
        self.setup_energy = energy;
        self
    }

    /// Sets the teardown time and energy.
    pub fn with_teardown(mut self, time: i64, energy: i64) -> Self {
        self.teardown_time = time;
        self.teardown_energy = energy;
        self
    }

    /// Sets the power drawn while ON and not processing.
    pub fn with_idle_power(mut self, power: i64) -> Self {
        self.idle_power = power;
        self
    }

    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    pub(crate) fn set_restart_policy(&mut self, policy: RestartPolicy) {
        self.restart_policy = policy;
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn setup_time(&self) -> i64 {
        self.setup_time
    }

    pub fn setup_energy(&self) -> i64 {
        self.setup_energy
    }

    pub fn teardown_time(&self) -> i64 {
        self.teardown_time
    }

    pub fn teardown_energy(&self) -> i64 {
        self.teardown_energy
    }

    pub fn idle_power(&self) -> i64 {
        self.idle_power
    }

    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    pub fn restart_policy(&self) -> RestartPolicy {
        self.restart_policy
    }

    /// Earliest time at which a new operation (or a restart) may begin.
    pub fn available_time(&self) -> i64 {
        self.available_time
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Scheduled operations in start-time order.
    pub fn scheduled_operations(&self) -> &[ScheduledSlot] {
        &self.scheduled
    }

    pub fn start_times(&self) -> &[i64] {
        &self.start_times
    }

    pub fn stop_times(&self) -> &[i64] {
        &self.stop_times
    }

    /// Start/stop pairs, the last one open while the machine runs.
    pub fn run_intervals(&self) -> Vec<RunInterval> {
        self.start_times
            .iter()
            .enumerate()
            .map(|(k, &start)| RunInterval {
                start,
                setup_time: self.setup_time,
                stop: self.stop_times.get(k).copied(),
                teardown_time: self.teardown_time,
            })
            .collect()
    }

    fn is_retired(&self) -> bool {
        self.restart_policy == RestartPolicy::SingleRun && !self.stop_times.is_empty()
    }

    /// Start time an operation requested at `requested` would get, and
    /// whether the placement would first start the machine.
    pub fn projected_start(&self, requested: i64) -> (i64, bool) {
        let actual = requested.max(self.available_time);
        if self.running {
            (actual, false)
        } else {
            (actual + self.setup_time, true)
        }
    }

    /// Checks a placement without touching the timeline.
    pub fn check_placement(&self, requested: i64, duration: i64) -> Result<i64, ScheduleError> {
        if !self.running && self.is_retired() {
            return Err(ScheduleError::MachineRetired(self.id));
        }
        let (start, _) = self.projected_start(requested);
        let finish = start + duration + self.teardown_time;
        if finish > self.horizon {
            return Err(CapacityExceededError {
                machine: self.id,
                finish,
                horizon: self.horizon,
            }
            .into());
        }
        Ok(start)
    }

    /// Appends an operation as soon as possible after `requested`,
    /// starting the machine first if it is OFF. Returns the actual start.
    ///
    /// A rejected placement leaves the timeline unchanged.
    pub fn add_operation(
        &mut self,
        operation_id: OperationId,
        job_id: JobId,
        requested: i64,
        duration: i64,
        energy: i64,
    ) -> Result<i64, ScheduleError> {
        let start = self.check_placement(requested, duration)?;
        if !self.running {
            self.start_times.push(start - self.setup_time);
            self.running = true;
        }
        self.scheduled.push(ScheduledSlot {
            operation_id,
            job_id,
            start,
            duration,
            energy,
        });
        self.available_time = start + duration;
        Ok(start)
    }

    /// OFF → ON at `at`.
    pub fn start(&mut self, at: i64) -> Result<(), ScheduleError> {
        if self.running || at < 0 || at < self.available_time {
            return Err(ScheduleError::InvalidStart {
                machine: self.id,
                at,
            });
        }
        if self.is_retired() {
            return Err(ScheduleError::MachineRetired(self.id));
        }
        let finish = at + self.setup_time + self.teardown_time;
        if finish > self.horizon {
            return Err(CapacityExceededError {
                machine: self.id,
                finish,
                horizon: self.horizon,
            }
            .into());
        }
        self.start_times.push(at);
        self.running = true;
        self.available_time = at + self.setup_time;
        Ok(())
    }

    /// ON → OFF at `at`. Stopping an OFF machine does nothing.
    pub fn stop(&mut self, at: i64) -> Result<(), ScheduleError> {
        if !self.running {
            return Ok(());
        }
        if at < self.available_time || at + self.teardown_time > self.horizon {
            return Err(ScheduleError::InvalidStop {
                machine: self.id,
                at,
            });
        }
        self.stop_times.push(at);
        self.running = false;
        self.available_time = at + self.teardown_time;
        Ok(())
    }

    /// Stops the machine as soon as its last operation is done.
    pub fn shut_down(&mut self) -> Result<(), ScheduleError> {
        self.stop(self.available_time)
    }

    /// Index of the run containing time `t`.
    fn run_index_at(&self, t: i64) -> Option<usize> {
        self.start_times.iter().rposition(|&s| s <= t)
    }

    /// Removes an operation from the timeline. A run left without any
    /// operation is removed with it. A run that loses its final operation
    /// stops as soon as its new final operation is done. The availability
    /// cursor only moves when the affected run is the last one.
    pub fn remove_operation(&mut self, operation_id: OperationId) -> Option<ScheduledSlot> {
        let idx = self
            .scheduled
            .iter()
            .position(|s| s.operation_id == operation_id)?;
        let slot = self.scheduled.remove(idx);

        let Some(k) = self.run_index_at(slot.start) else {
            return Some(slot);
        };
        let run_start = self.start_times[k];
        let next_start = self.start_times.get(k + 1).copied().unwrap_or(i64::MAX);
        let last_end = self
            .scheduled
            .iter()
            .filter(|s| s.start >= run_start && s.start < next_start)
            .map(ScheduledSlot::end)
            .max();
        match last_end {
            Some(end) if end < slot.end() => {
                self.trim_run(k, end);
                return Some(slot);
            }
            Some(_) => return Some(slot),
            None => {}
        }

        let was_last = k + 1 == self.start_times.len();
        self.start_times.remove(k);
        if k < self.stop_times.len() {
            self.stop_times.remove(k);
        }
        if was_last {
            self.running = false;
            self.available_time = self
                .stop_times
                .last()
                .map(|&stop| stop + self.teardown_time)
                .unwrap_or(0);
        }
        Some(slot)
    }

    /// Pulls the end of run `k` back to `end`.
    fn trim_run(&mut self, k: usize, end: i64) {
        let is_last_run = k + 1 == self.start_times.len();
        if let Some(stop) = self.stop_times.get_mut(k) {
            *stop = (*stop).min(end);
            if is_last_run {
                self.available_time = *stop + self.teardown_time;
            }
        } else if is_last_run {
            self.available_time = self.available_time.min(end);
        }
    }

    /// Clears the timeline; static attributes are kept.
    pub fn reset(&mut self) {
        self.scheduled.clear();
        self.start_times.clear();
        self.stop_times.clear();
        self.running = false;
        self.available_time = 0;
    }

    /// End of run `k`: its stop, or the cursor for the open run.
    fn run_end(&self, k: usize) -> i64 {
        self.stop_times
            .get(k)
            .copied()
            .unwrap_or(self.available_time)
    }

    /// Total time spent ON (setup included).
    pub fn working_time(&self) -> i64 {
        (0..self.start_times.len())
            .map(|k| self.run_end(k) - self.start_times[k])
            .sum()
    }

    /// Total processing time of the scheduled operations.
    pub fn busy_time(&self) -> i64 {
        self.scheduled.iter().map(|s| s.duration).sum()
    }

    /// ON time after setup not covered by any operation.
    pub fn idle_time(&self) -> i64 {
        (0..self.start_times.len())
            .map(|k| {
                let begin = self.start_times[k] + self.setup_time;
                let end = self.run_end(k);
                let busy: i64 = self
                    .scheduled
                    .iter()
                    .filter(|s| s.start >= begin && s.end() <= end)
                    .map(|s| s.duration)
                    .sum();
                (end - begin - busy).max(0)
            })
            .sum()
    }

    pub fn energy_breakdown(&self) -> EnergyBreakdown {
        EnergyBreakdown {
            setup: self.start_times.len() as i64 * self.setup_energy,
            teardown: self.stop_times.len() as i64 * self.teardown_energy,
            processing: self.scheduled.iter().map(|s| s.energy).sum(),
            idle: self.idle_time() * self.idle_power,
        }
    }

    pub fn total_energy_consumption(&self) -> i64 {
        self.energy_breakdown().total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> Machine {
        Machine::new(MachineId(0), 50)
            .with_setup(2, 10)
            .with_teardown(1, 4)
            .with_idle_power(3)
    }

    fn place(m: &mut Machine, op: usize, requested: i64, duration: i64) -> Result<i64, ScheduleError> {
        m.add_operation(OperationId(op), JobId(0), requested, duration, 5)
    }

    #[test]
    fn test_first_placement_starts_machine() {
        let mut m = machine();
        assert!(!m.is_running());
        let start = place(&mut m, 0, 3, 4).unwrap();
        assert_eq!(start, 5); // run starts at 3, setup 2
        assert!(m.is_running());
        assert_eq!(m.start_times(), &[3]);
        assert_eq!(m.available_time(), 9);
    }

    #[test]
    fn test_placement_while_on_appends() {
        let mut m = machine();
        place(&mut m, 0, 0, 4).unwrap();
        assert_eq!(place(&mut m, 1, 0, 3).unwrap(), 6);
        assert_eq!(place(&mut m, 2, 12, 1).unwrap(), 12);
        assert_eq!(m.start_times().len(), 1);
        let starts: Vec<i64> = m.scheduled_operations().iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![2, 6, 12]);
    }

    #[test]
    fn test_capacity_rejection_is_atomic() {
        let mut m = Machine::new(MachineId(1), 10).with_setup(2, 1).with_teardown(1, 1);
        let err = place(&mut m, 0, 0, 8).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::CapacityExceeded(CapacityExceededError {
                machine: MachineId(1),
                finish: 11,
                horizon: 10,
            })
        );
        assert!(!m.is_running());
        assert!(m.start_times().is_empty());
        assert_eq!(m.available_time(), 0);

        // exactly fits: 2 + 7 + 1 = 10
        assert_eq!(place(&mut m, 0, 0, 7).unwrap(), 2);
    }

    #[test]
    fn test_stop_preconditions() {
        let mut m = machine();
        place(&mut m, 0, 0, 4).unwrap(); // busy until 6
        assert!(matches!(m.stop(5), Err(ScheduleError::InvalidStop { .. })));
        assert!(matches!(m.stop(50), Err(ScheduleError::InvalidStop { .. })));
        m.stop(8).unwrap();
        assert!(!m.is_running());
        assert_eq!(m.stop_times(), &[8]);
        assert_eq!(m.available_time(), 9);
        // stopping again is a no-op
        m.stop(20).unwrap();
        assert_eq!(m.stop_times(), &[8]);
    }

    #[test]
    fn test_restart_after_stop() {
        let mut m = machine();
        place(&mut m, 0, 0, 4).unwrap();
        m.shut_down().unwrap(); // stop at 6, available 7
        let start = place(&mut m, 1, 0, 2).unwrap();
        assert_eq!(start, 9); // restart at 7, setup 2
        assert_eq!(m.start_times(), &[0, 7]);
        assert_eq!(m.stop_times(), &[6]);
    }

    #[test]
    fn test_single_run_policy_refuses_restart() {
        let mut m = machine().with_restart_policy(RestartPolicy::SingleRun);
        place(&mut m, 0, 0, 4).unwrap();
        m.shut_down().unwrap();
        assert_eq!(
            place(&mut m, 1, 0, 2),
            Err(ScheduleError::MachineRetired(MachineId(0)))
        );
        assert_eq!(m.start(20), Err(ScheduleError::MachineRetired(MachineId(0))));
    }

    #[test]
    fn test_explicit_start() {
        let mut m = machine();
        m.start(4).unwrap();
        assert_eq!(m.available_time(), 6);
        assert!(matches!(m.start(10), Err(ScheduleError::InvalidStart { .. })));
        assert_eq!(place(&mut m, 0, 0, 3).unwrap(), 6);
        assert_eq!(m.start_times(), &[4]);
    }

    #[test]
    fn test_explicit_start_must_leave_room_for_teardown() {
        let mut m = machine();
        assert!(matches!(
            m.start(48),
            Err(ScheduleError::CapacityExceeded(_))
        ));
        m.start(47).unwrap();
    }

    #[test]
    fn test_energy_single_run() {
        let mut m = machine();
        place(&mut m, 0, 0, 4).unwrap(); // [2,6)
        place(&mut m, 1, 9, 3).unwrap(); // [9,12), idle 3
        m.stop(14).unwrap(); // idle 2 more
        let e = m.energy_breakdown();
        assert_eq!(e.setup, 10);
        assert_eq!(e.teardown, 4);
        assert_eq!(e.processing, 10);
        assert_eq!(m.idle_time(), 5);
        assert_eq!(e.idle, 15);
        assert_eq!(m.total_energy_consumption(), 39);
    }

    #[test]
    fn test_energy_multiple_runs_matches_closed_form() {
        let mut m = machine();
        place(&mut m, 0, 0, 4).unwrap(); // run [0, 6), op [2,6)
        m.stop(7).unwrap(); // idle 1
        place(&mut m, 1, 10, 2).unwrap(); // run [10, ..), op [12,14)
        place(&mut m, 2, 15, 2).unwrap(); // op [15,17), idle 1
        m.shut_down().unwrap(); // stop 17

        let runs = m.run_intervals();
        assert_eq!(runs.len(), 2);
        let on_after_setup: i64 = runs
            .iter()
            .map(|r| r.stop.unwrap() - r.start - r.setup_time)
            .sum();
        let idle = on_after_setup - m.busy_time();
        assert_eq!(idle, 2);
        let expected = 2 * 10 + 2 * 4 + 3 * 5 + idle * 3;
        assert_eq!(m.total_energy_consumption(), expected);
    }

    #[test]
    fn test_open_run_ends_at_cursor() {
        let mut m = machine();
        place(&mut m, 0, 0, 4).unwrap();
        assert_eq!(m.idle_time(), 0);
        assert_eq!(m.working_time(), 6);
        assert_eq!(m.run_intervals()[0].stop, None);
        assert_eq!(m.energy_breakdown().teardown, 0);
    }

    #[test]
    fn test_remove_operation_keeps_run_when_shared() {
        let mut m = machine();
        place(&mut m, 0, 0, 4).unwrap();
        place(&mut m, 1, 0, 3).unwrap();
        m.shut_down().unwrap();
        let removed = m.remove_operation(OperationId(0)).unwrap();
        assert_eq!(removed.start, 2);
        assert_eq!(m.start_times(), &[0]);
        assert_eq!(m.stop_times(), &[9]);
        assert_eq!(m.idle_time(), 4);
    }

    #[test]
    fn test_remove_last_operation_drops_run() {
        let mut m = machine();
        place(&mut m, 0, 0, 4).unwrap();
        m.shut_down().unwrap();
        place(&mut m, 1, 0, 2).unwrap();
        m.shut_down().unwrap();
        assert_eq!(m.start_times().len(), 2);

        m.remove_operation(OperationId(1)).unwrap();
        assert_eq!(m.start_times(), &[0]);
        assert_eq!(m.stop_times(), &[6]);
        assert!(!m.is_running());
        assert_eq!(m.available_time(), 7);

        m.remove_operation(OperationId(0)).unwrap();
        assert!(m.start_times().is_empty());
        assert_eq!(m.available_time(), 0);
        assert_eq!(m.total_energy_consumption(), 0);
        assert!(m.remove_operation(OperationId(0)).is_none());
    }

    #[test]
    fn test_remove_final_operation_pulls_stop_back() {
        let mut m = machine();
        place(&mut m, 0, 0, 2).unwrap(); // [2,4)
        place(&mut m, 1, 0, 8).unwrap(); // [4,12)
        m.shut_down().unwrap();
        assert_eq!(m.stop_times(), &[12]);

        m.remove_operation(OperationId(1)).unwrap();
        assert_eq!(m.start_times(), &[0]);
        assert_eq!(m.stop_times(), &[4]);
        assert_eq!(m.available_time(), 5);
        assert_eq!(m.idle_time(), 0);
        assert_eq!(m.total_energy_consumption(), 10 + 4 + 5);
    }

    #[test]
    fn test_remove_final_operation_of_open_run_moves_cursor() {
        let mut m = machine();
        place(&mut m, 0, 0, 2).unwrap(); // [2,4)
        place(&mut m, 1, 6, 3).unwrap(); // [6,9)
        m.remove_operation(OperationId(1)).unwrap();
        assert!(m.is_running());
        assert_eq!(m.available_time(), 4);
        assert_eq!(m.idle_time(), 0);
        assert_eq!(place(&mut m, 2, 0, 1).unwrap(), 4);
    }

    #[test]
    fn test_remove_final_operation_of_earlier_run_keeps_cursor() {
        let mut m = machine();
        place(&mut m, 0, 0, 2).unwrap(); // [2,4)
        place(&mut m, 1, 0, 3).unwrap(); // [4,7)
        m.shut_down().unwrap(); // stop 7
        place(&mut m, 2, 0, 2).unwrap(); // restart 8, [10,12)
        m.shut_down().unwrap(); // stop 12

        m.remove_operation(OperationId(1)).unwrap();
        assert_eq!(m.start_times(), &[0, 8]);
        assert_eq!(m.stop_times(), &[4, 12]);
        assert_eq!(m.available_time(), 13);
        assert_eq!(m.idle_time(), 0);
    }

    #[test]
    fn test_remove_middle_run() {
        let mut m = machine();
        place(&mut m, 0, 0, 2).unwrap(); // run [0, 4), op [2,4)
        m.shut_down().unwrap(); // available 5
        place(&mut m, 1, 0, 3).unwrap(); // run [5, 10), op [7,10)
        m.shut_down().unwrap(); // available 11
        place(&mut m, 2, 0, 1).unwrap(); // run [11, 14), op [13,14)
        m.shut_down().unwrap(); // available 15
        assert_eq!(m.total_energy_consumption(), 3 * 10 + 3 * 4 + 3 * 5);

        let removed = m.remove_operation(OperationId(1)).unwrap();
        assert_eq!(removed.start, 7);
        assert_eq!(m.start_times(), &[0, 11]);
        assert_eq!(m.stop_times(), &[4, 14]);
        assert!(!m.is_running());
        assert_eq!(m.available_time(), 15);
        assert_eq!(m.idle_time(), 0);
        assert_eq!(m.total_energy_consumption(), 2 * 10 + 2 * 4 + 2 * 5);
        let starts: Vec<i64> = m.scheduled_operations().iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![2, 13]);
    }

    #[test]
    fn test_reset() {
        let mut m = machine();
        place(&mut m, 0, 0, 4).unwrap();
        m.reset();
        assert!(m.scheduled_operations().is_empty());
        assert!(!m.is_running());
        assert_eq!(m.available_time(), 0);
        assert_eq!(m.setup_time(), 2);
    }
}
