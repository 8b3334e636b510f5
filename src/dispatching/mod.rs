//! Operation priority rules and machine choice.
//!
//! [`DispatchingHeuristic`](crate::scheduler::DispatchingHeuristic) ranks
//! the available operations with a [`RuleEngine`] and places the winner on
//! the machine its [`MachineSelection`] prefers.
//!
//! ```
//! use u_ejsp::dispatching::{rules, RuleEngine, TieBreak};
//!
//! // Shortest first, job order among equals, then lowest id.
//! let engine = RuleEngine::new()
//!     .then(rules::Spt)
//!     .then(rules::Edd)
//!     .with_tie_break(TieBreak::LowestId);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod engine;
pub mod rules;
mod selection;

pub use engine::{Combination, RuleEngine, TieBreak};
pub use selection::MachineSelection;

use std::fmt::Debug;

use crate::models::{Instance, Operation};

/// Priority of an operation; lower runs first.
pub type RuleScore = f64;

/// Scores operations against the current scheduling state.
pub trait DispatchingRule: Send + Sync + Debug {
    /// Short rule name (e.g., "SPT").
    fn name(&self) -> &'static str;

    /// Score of `operation`; lower is scheduled earlier.
    fn evaluate(&self, operation: &Operation, instance: &Instance) -> RuleScore;

    fn description(&self) -> &'static str {
        self.name()
    }
}
