//! Multi-rule ranking of candidate operations.
//!
//! Each candidate is scored once per rule; the score vectors are then
//! compared either lexicographically (later rules only separate ties of
//! earlier ones) or through their weighted sum.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{DispatchingRule, RuleScore};
use crate::models::{Instance, OperationId};

/// How the scores of several rules are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Combination {
    /// Rule by rule, in insertion order.
    #[default]
    Lexicographic,
    /// `Σ weight · score`.
    WeightedSum,
}

/// Order of candidates whose scores are all equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Keep the candidate order given by the caller.
    #[default]
    InputOrder,
    /// Lowest operation id first.
    LowestId,
}

#[derive(Debug, Clone)]
struct Criterion {
    rule: Arc<dyn DispatchingRule>,
    weight: f64,
}

/// Ranks operations under a list of dispatching rules.
///
/// # Example
/// ```
/// use u_ejsp::dispatching::{rules, Combination, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_combination(Combination::WeightedSum)
///     .weighted(rules::Spt, 0.5)
///     .weighted(rules::Lwkr, 0.5);
/// assert_eq!(engine.primary_rule(), Some("SPT"));
/// ```
#[derive(Debug, Clone)]
pub struct RuleEngine {
    criteria: Vec<Criterion>,
    combination: Combination,
    tie_break: TieBreak,
    epsilon: f64,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            criteria: Vec::new(),
            combination: Combination::Lexicographic,
            tie_break: TieBreak::InputOrder,
            epsilon: 1e-9,
        }
    }

    /// Appends a rule with weight 1.
    pub fn then<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.weighted(rule, 1.0)
    }

    /// Appends a rule with an explicit weight. Weights only matter for
    /// [`Combination::WeightedSum`].
    pub fn weighted<R: DispatchingRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.criteria.push(Criterion {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    pub fn with_combination(mut self, combination: Combination) -> Self {
        self.combination = combination;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Name of the first rule.
    pub fn primary_rule(&self) -> Option<&'static str> {
        self.criteria.first().map(|c| c.rule.name())
    }

    /// Raw score of `operation` under each rule, in insertion order.
    pub fn scores(&self, operation: OperationId, instance: &Instance) -> Vec<RuleScore> {
        let Some(op) = instance.operation(operation) else {
            return Vec::new();
        };
        self.criteria
            .iter()
            .map(|c| c.rule.evaluate(op, instance))
            .collect()
    }

    fn key(&self, operation: OperationId, instance: &Instance) -> Vec<RuleScore> {
        let scores = self.scores(operation, instance);
        match self.combination {
            Combination::Lexicographic => scores,
            Combination::WeightedSum => vec![scores
                .iter()
                .zip(&self.criteria)
                .map(|(s, c)| s * c.weight)
                .sum::<RuleScore>()],
        }
    }

    fn compare_keys(&self, a: &[RuleScore], b: &[RuleScore]) -> Ordering {
        a.iter()
            .zip(b)
            .find(|(x, y)| (*x - *y).abs() > self.epsilon)
            .map_or(Ordering::Equal, |(x, y)| {
                x.partial_cmp(y).unwrap_or(Ordering::Equal)
            })
    }

    /// Candidates from highest to lowest priority. Unknown ids are dropped.
    pub fn rank(&self, candidates: &[OperationId], instance: &Instance) -> Vec<OperationId> {
        let mut keyed: Vec<(OperationId, Vec<RuleScore>)> = candidates
            .iter()
            .filter(|&&id| instance.operation(id).is_some())
            .map(|&id| (id, self.key(id, instance)))
            .collect();
        keyed.sort_by(|(a, ka), (b, kb)| {
            self.compare_keys(ka, kb).then_with(|| match self.tie_break {
                TieBreak::InputOrder => Ordering::Equal,
                TieBreak::LowestId => a.cmp(b),
            })
        });
        keyed.into_iter().map(|(id, _)| id).collect()
    }

    /// Highest-priority candidate.
    pub fn best(&self, candidates: &[OperationId], instance: &Instance) -> Option<OperationId> {
        self.rank(candidates, instance).first().copied()
    }
}
