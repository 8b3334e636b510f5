//! Neighborhood-based local search.
//!
//! A [`Neighborhood`] enumerates candidate solutions around a given one.
//! Every candidate is an independent deep copy with a single structural
//! change applied and re-evaluated; the solution being explored is never
//! touched. Candidates that cannot be placed, or that break precedence or
//! machine consistency, are skipped rather than yielded.
//!
//! Two drivers improve an initial constructive solution:
//!
//! | Driver | Per iteration | Stops on |
//! |--------|---------------|----------|
//! | [`FirstImprovement`] | first strictly better neighbor of one neighborhood | local optimum, iteration cap |
//! | [`BestImprovement`] | best neighbor over all neighborhoods | stall limit, iteration cap |
//!
//! # Reference
//! Hoos & Stützle (2004), "Stochastic Local Search: Foundations and Applications"

mod neighborhoods;
mod result;
mod search;

pub use neighborhoods::{ReassignOneOperation, SwapOperationsOnOneMachine};
pub use result::{SearchResult, SearchStatistics, Termination};
pub use search::{BestImprovement, FirstImprovement};

use crate::solution::Solution;

/// Outcome of scanning a neighborhood.
#[derive(Debug, Clone)]
pub struct Exploration {
    /// Improving candidate, if any was found.
    pub improved: Option<Solution>,
    /// Number of candidates generated during the scan.
    pub candidates: usize,
}

/// Generator of neighbor solutions.
///
/// Generation order is deterministic for a given solution, which keeps
/// first-improvement runs reproducible.
pub trait Neighborhood {
    /// Neighborhood name, used in logs.
    fn name(&self) -> &'static str;

    /// Lazily yields the valid neighbors of `solution`.
    fn neighbors<'a>(&'a self, solution: &'a Solution)
        -> Box<dyn Iterator<Item = Solution> + 'a>;

    /// Scans every neighbor and keeps the lowest objective strictly below
    /// that of `solution`. Equal objectives keep the earlier candidate.
    fn scan_best(&self, solution: &Solution) -> Exploration {
        let mut candidates = 0;
        let mut best: Option<Solution> = None;
        for candidate in self.neighbors(solution) {
            candidates += 1;
            let bound = best.as_ref().map_or(solution.objective(), |b| b.objective());
            if candidate.objective() < bound {
                best = Some(candidate);
            }
        }
        Exploration {
            improved: best,
            candidates,
        }
    }

    /// Stops at the first neighbor whose objective is strictly below that
    /// of `solution`.
    fn scan_first_better(&self, solution: &Solution) -> Exploration {
        let mut candidates = 0;
        let objective = solution.objective();
        for candidate in self.neighbors(solution) {
            candidates += 1;
            if candidate.objective() < objective {
                return Exploration {
                    improved: Some(candidate),
                    candidates,
                };
            }
        }
        Exploration {
            improved: None,
            candidates,
        }
    }

    /// Best neighbor, or a copy of `solution` when none improves on it.
    fn best_neighbor(&self, solution: &Solution) -> Solution {
        self.scan_best(solution)
            .improved
            .unwrap_or_else(|| solution.deepcopy())
    }

    /// First improving neighbor, or a copy of `solution` when none
    /// improves on it.
    fn first_better_neighbor(&self, solution: &Solution) -> Solution {
        self.scan_first_better(solution)
            .improved
            .unwrap_or_else(|| solution.deepcopy())
    }
}
