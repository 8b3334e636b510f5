//! Local search outcome and counters.

use std::fmt;

use crate::solution::Solution;

/// Why a local search run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// A full pass produced no improving neighbor.
    LocalOptimum,
    /// The iteration cap was reached.
    MaxIterations,
    /// Too many consecutive iterations without improvement.
    Stalled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::LocalOptimum => write!(f, "local optimum"),
            Termination::MaxIterations => write!(f, "maximum iterations reached"),
            Termination::Stalled => write!(f, "stalled"),
        }
    }
}

/// Counters collected during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Iterations started.
    pub iterations: usize,
    /// Neighbor candidates generated.
    pub candidates: usize,
    /// Accepted improving moves.
    pub improvements: usize,
}

impl SearchStatistics {
    #[inline]
    pub fn on_iteration(&mut self) {
        self.iterations = self.iterations.saturating_add(1);
    }

    #[inline]
    pub fn on_candidates(&mut self, count: usize) {
        self.candidates = self.candidates.saturating_add(count);
    }

    #[inline]
    pub fn on_improvement(&mut self) {
        self.improvements = self.improvements.saturating_add(1);
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} iterations, {} candidates, {} improvements",
            self.iterations, self.candidates, self.improvements
        )
    }
}

/// Final solution of a local search run.
#[derive(Debug, Clone)]
pub struct SearchResult {
    solution: Solution,
    initial_objective: f64,
    statistics: SearchStatistics,
    termination: Termination,
}

impl SearchResult {
    pub fn new(
        solution: Solution,
        initial_objective: f64,
        statistics: SearchStatistics,
        termination: Termination,
    ) -> Self {
        Self {
            solution,
            initial_objective,
            statistics,
            termination,
        }
    }

    #[inline]
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    #[inline]
    pub fn into_solution(self) -> Solution {
        self.solution
    }

    /// Objective of the constructed starting solution.
    #[inline]
    pub fn initial_objective(&self) -> f64 {
        self.initial_objective
    }

    #[inline]
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    #[inline]
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Objective decrease achieved by the search.
    pub fn improvement(&self) -> f64 {
        self.initial_objective - self.solution.objective()
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "objective {} -> {} ({}; {})",
            self.initial_objective,
            self.solution.objective(),
            self.termination,
            self.statistics
        )
    }
}
