//! Energy-aware flexible job-shop scheduling.
//!
//! Operations of several jobs run on machines that must be switched on
//! (setup time and energy) and off (teardown time and energy), and draw
//! idle power while on but unused. Each operation may run on any of its
//! machine variants, each with its own duration and energy. The goal is a
//! schedule that trades total energy against makespan.
//!
//! # Modules
//!
//! - **`models`**: Instance arena: `Operation`, `Job`, `Machine` timelines,
//!   row ingestion, schedule export records
//! - **`solution`**: `Solution` evaluator (energy, makespan, feasibility,
//!   objective), export/replay, KPIs
//! - **`scheduler`**: Constructive heuristics: Greedy, NonDeterminist,
//!   Random, priority rules (FCFS, SPT, LPT, EDD, LWKR, MWKR, energy-aware)
//! - **`dispatching`**: Priority rules, rule engine, machine selection
//! - **`local_search`**: Reassign/swap neighborhoods, first- and
//!   best-improvement descent
//! - **`validation`**: Structural checks of a scheduled instance
//! - **`config`**: Objective weights, restart policy, heuristic and search
//!   parameters
//! - **`error`**: Error taxonomy
//!
//! # Example
//!
//! ```
//! use u_ejsp::local_search::{FirstImprovement, ReassignOneOperation};
//! use u_ejsp::models::{Instance, MachineRow, OperationRow};
//! use u_ejsp::scheduler::Greedy;
//!
//! let ops = [
//!     OperationRow::new(0, 0, 1, 5, 2),
//!     OperationRow::new(0, 1, 1, 3, 1),
//!     OperationRow::new(1, 0, 1, 4, 3),
//! ];
//! let machines = [MachineRow::new(1, 20).with_setup(1, 1).with_teardown(1, 1)];
//! let instance = Instance::from_rows("demo", &ops, &machines).unwrap();
//!
//! let result = FirstImprovement::new().run(&instance, &mut Greedy::new(), &ReassignOneOperation);
//! let solution = result.solution();
//! assert!(solution.is_feasible());
//! assert_eq!(solution.cmax(), 13);
//! assert_eq!(solution.total_energy_consumption(), 8);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Mouzon, Yildirim & Twomey (2007), "Operational methods for minimization
//!   of energy consumption of manufacturing equipment"
//! - Dai et al. (2013), "Energy-efficient scheduling for a flexible flow shop
//!   using an improved genetic-simulated annealing algorithm"

pub mod config;
pub mod dispatching;
pub mod error;
pub mod local_search;
pub mod models;
pub mod scheduler;
pub mod solution;
pub mod validation;

#[cfg(test)]
mod testing;
