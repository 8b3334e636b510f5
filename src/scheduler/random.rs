//! Randomized constructive heuristics.
//!
//! Both heuristics own their pseudo-random source. A seeded heuristic
//! replays the same choices on every run; an unseeded one draws its seed
//! from the OS.

use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;

use super::{blank_solution, finish_construction, log_attempt, ConstructiveHeuristic};
use crate::models::{Instance, MachineId, OperationId};
use crate::solution::Solution;

fn machines_of(solution: &Solution, operation: OperationId) -> Vec<MachineId> {
    solution
        .instance()
        .operation(operation)
        .map(|op| op.variants().iter().map(|v| v.machine_id).collect())
        .unwrap_or_default()
}

/// Uniform operation, uniform machine.
///
/// A rejected (operation, machine) pair is discarded and never drawn
/// again, so every draw either places an operation or shrinks the pool.
#[derive(Debug, Clone)]
pub struct NonDeterminist {
    rng: SmallRng,
}

impl NonDeterminist {
    /// Seeds from the OS.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Reproducible sequence of choices.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for NonDeterminist {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructiveHeuristic for NonDeterminist {
    fn name(&self) -> &'static str {
        "NonDeterminist"
    }

    fn construct(&mut self, instance: &Instance) -> Solution {
        let mut solution = blank_solution(instance);
        let mut rejected: HashSet<(OperationId, MachineId)> = HashSet::new();

        loop {
            let open: Vec<(OperationId, Vec<MachineId>)> = solution
                .available_operations()
                .into_iter()
                .map(|op| {
                    let machines: Vec<MachineId> = machines_of(&solution, op)
                        .into_iter()
                        .filter(|&m| !rejected.contains(&(op, m)))
                        .collect();
                    (op, machines)
                })
                .filter(|(_, machines)| !machines.is_empty())
                .collect();

            let Some((op, machines)) = open.choose(&mut self.rng) else {
                break;
            };
            let Some(&machine) = machines.choose(&mut self.rng) else {
                break;
            };

            let result = solution.schedule(*op, machine);
            log_attempt(self.name(), *op, machine, &result);
            if result.is_err() {
                rejected.insert((*op, machine));
            }
        }

        finish_construction(&mut solution, self.name());
        solution
    }
}

/// Uniform operation, then its machines in random order until one
/// accepts it. An operation no machine accepts is left out.
#[derive(Debug, Clone)]
pub struct RandomHeuristic {
    rng: SmallRng,
}

impl RandomHeuristic {
    /// Seeds from the OS.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Reproducible sequence of choices.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructiveHeuristic for RandomHeuristic {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn construct(&mut self, instance: &Instance) -> Solution {
        let mut solution = blank_solution(instance);
        let mut blocked: HashSet<OperationId> = HashSet::new();

        loop {
            let open: Vec<OperationId> = solution
                .available_operations()
                .into_iter()
                .filter(|op| !blocked.contains(op))
                .collect();
            let Some(&op) = open.choose(&mut self.rng) else {
                break;
            };

            let mut machines = machines_of(&solution, op);
            machines.shuffle(&mut self.rng);
            let placed = machines.into_iter().any(|machine| {
                let result = solution.schedule(op, machine);
                log_attempt("Random", op, machine, &result);
                result.is_ok()
            });
            if !placed {
                blocked.insert(op);
            }
        }

        finish_construction(&mut solution, self.name());
        solution
    }
}
