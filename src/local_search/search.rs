//! First- and best-improvement descent.
//!
//! Both drivers build the starting point with a constructive heuristic and
//! only ever replace the current solution by a strictly better one, so
//! the objective never increases along a run.

use log::{debug, info};

use super::{Neighborhood, SearchResult, SearchStatistics, Termination};
use crate::config::{LocalSearchConfig, ObjectiveWeights};
use crate::models::Instance;
use crate::scheduler::ConstructiveHeuristic;
use crate::solution::Solution;

fn initial_solution(
    instance: &Instance,
    heuristic: &mut dyn ConstructiveHeuristic,
    weights: ObjectiveWeights,
) -> Solution {
    let solution = heuristic.construct(instance).with_weights(weights);
    info!(
        "{}: initial objective {} on {}",
        heuristic.name(),
        solution.objective(),
        instance
    );
    solution
}

/// Moves to the first strictly better neighbor of a single neighborhood
/// until none exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstImprovement {
    config: LocalSearchConfig,
    weights: ObjectiveWeights,
}

impl FirstImprovement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: LocalSearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }

    /// Constructs a solution with `heuristic`, then descends.
    pub fn run(
        &self,
        instance: &Instance,
        heuristic: &mut dyn ConstructiveHeuristic,
        neighborhood: &dyn Neighborhood,
    ) -> SearchResult {
        let initial = initial_solution(instance, heuristic, self.weights);
        self.improve(initial, neighborhood)
    }

    /// Descends from an existing solution.
    pub fn improve(&self, initial: Solution, neighborhood: &dyn Neighborhood) -> SearchResult {
        let initial_objective = initial.objective();
        let mut current = initial;
        let mut stats = SearchStatistics::default();

        let termination = loop {
            if stats.iterations >= self.config.max_iterations {
                break Termination::MaxIterations;
            }
            stats.on_iteration();

            let scan = neighborhood.scan_first_better(&current);
            stats.on_candidates(scan.candidates);
            match scan.improved {
                Some(better) => {
                    debug!(
                        "{} iter {}: {} -> {}",
                        neighborhood.name(),
                        stats.iterations,
                        current.objective(),
                        better.objective()
                    );
                    current = better;
                    stats.on_improvement();
                }
                None => break Termination::LocalOptimum,
            }
        };

        let result = SearchResult::new(current, initial_objective, stats, termination);
        info!("first improvement ({}): {result}", neighborhood.name());
        result
    }
}

/// Moves to the best neighbor over all neighborhoods while it improves,
/// tolerating a bounded number of fruitless iterations.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestImprovement {
    config: LocalSearchConfig,
    weights: ObjectiveWeights,
}

impl BestImprovement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: LocalSearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }

    /// Constructs a solution with `heuristic`, then descends.
    pub fn run(
        &self,
        instance: &Instance,
        heuristic: &mut dyn ConstructiveHeuristic,
        neighborhoods: &[&dyn Neighborhood],
    ) -> SearchResult {
        let initial = initial_solution(instance, heuristic, self.weights);
        self.improve(initial, neighborhoods)
    }

    /// Descends from an existing solution.
    pub fn improve(&self, initial: Solution, neighborhoods: &[&dyn Neighborhood]) -> SearchResult {
        let initial_objective = initial.objective();
        let mut current = initial;
        let mut stats = SearchStatistics::default();
        let mut stall = 0;

        let termination = loop {
            if stats.iterations >= self.config.max_iterations {
                break Termination::MaxIterations;
            }
            if stall >= self.config.stall_limit {
                break Termination::Stalled;
            }
            stats.on_iteration();

            let mut best: Option<(Solution, &'static str)> = None;
            for neighborhood in neighborhoods {
                let scan = neighborhood.scan_best(&current);
                stats.on_candidates(scan.candidates);
                if let Some(candidate) = scan.improved {
                    if best
                        .as_ref()
                        .map_or(true, |(b, _)| candidate.objective() < b.objective())
                    {
                        best = Some((candidate, neighborhood.name()));
                    }
                }
            }

            match best {
                Some((better, name)) => {
                    debug!(
                        "{name} iter {}: {} -> {}",
                        stats.iterations,
                        current.objective(),
                        better.objective()
                    );
                    current = better;
                    stats.on_improvement();
                    stall = 0;
                }
                None => stall += 1,
            }
        };

        let result = SearchResult::new(current, initial_objective, stats, termination);
        info!("best improvement: {result}");
        result
    }
}
