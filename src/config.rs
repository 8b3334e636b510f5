//! Run configuration.
//!
//! Every type here is serde-deserializable so an external driver can load
//! it from JSON/TOML next to the instance files. Missing fields fall back
//! to the defaults documented on each type.

use serde::{Deserialize, Serialize};

use crate::dispatching::MachineSelection;
use crate::scheduler::{
    ConstructiveHeuristic, DispatchingHeuristic, Greedy, NonDeterminist, RandomHeuristic,
};

/// Objective contribution of each unassigned operation or precedence
/// violation. Dominates any feasible objective of a realistic instance.
pub const PENALTY: f64 = 1_000_000.0;

/// Whether a machine may be started again after being stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    /// Any number of start/stop cycles within the horizon.
    #[default]
    Restartable,
    /// Start once, stop once.
    SingleRun,
}

/// Weights of the feasible objective
/// `alpha · energy + beta · makespan + gamma · average completion`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
            gamma: 0.0,
        }
    }
}

impl ObjectiveWeights {
    /// Creates weights; negative values are clamped to zero.
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            alpha: alpha.max(0.0),
            beta: beta.max(0.0),
            gamma: gamma.max(0.0),
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.max(0.0);
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta.max(0.0);
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma.max(0.0);
        self
    }

    /// Weighted sum of the three criteria.
    pub fn combine(&self, energy: i64, makespan: i64, avg_completion: f64) -> f64 {
        self.alpha * energy as f64 + self.beta * makespan as f64 + self.gamma * avg_completion
    }
}

/// Termination controls of the local search drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSearchConfig {
    /// Hard cap on search iterations (default: 100).
    pub max_iterations: usize,
    /// Consecutive non-improving iterations tolerated by best improvement
    /// (default: 10).
    pub stall_limit: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            stall_limit: 10,
        }
    }
}

impl LocalSearchConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_stall_limit(mut self, stall_limit: usize) -> Self {
        self.stall_limit = stall_limit;
        self
    }
}

fn default_energy_weight() -> f64 {
    0.7
}

fn default_time_weight() -> f64 {
    0.3
}

/// Selects and parameterizes a constructive heuristic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeuristicConfig {
    #[default]
    Greedy,
    NonDeterminist {
        #[serde(default)]
        seed: Option<u64>,
    },
    Random {
        #[serde(default)]
        seed: Option<u64>,
    },
    Fcfs {
        #[serde(default = "MachineSelection::first_available")]
        machine_selection: MachineSelection,
    },
    Spt {
        #[serde(default = "MachineSelection::fastest")]
        machine_selection: MachineSelection,
    },
    Lpt {
        #[serde(default = "MachineSelection::fastest")]
        machine_selection: MachineSelection,
    },
    Edd {
        #[serde(default = "MachineSelection::fastest")]
        machine_selection: MachineSelection,
    },
    Lwkr {
        #[serde(default = "MachineSelection::fastest")]
        machine_selection: MachineSelection,
    },
    Mwkr {
        #[serde(default = "MachineSelection::fastest")]
        machine_selection: MachineSelection,
    },
    EnergyAware {
        #[serde(default = "default_energy_weight")]
        energy_weight: f64,
        #[serde(default = "default_time_weight")]
        time_weight: f64,
        /// `None` weighs machines with the same energy and time weights.
        #[serde(default)]
        machine_selection: Option<MachineSelection>,
    },
}

impl HeuristicConfig {
    /// Instantiates the configured heuristic.
    pub fn build(&self) -> Box<dyn ConstructiveHeuristic> {
        match *self {
            HeuristicConfig::Greedy => Box::new(Greedy::new()),
            HeuristicConfig::NonDeterminist { seed } => Box::new(match seed {
                Some(seed) => NonDeterminist::seeded(seed),
                None => NonDeterminist::new(),
            }),
            HeuristicConfig::Random { seed } => Box::new(match seed {
                Some(seed) => RandomHeuristic::seeded(seed),
                None => RandomHeuristic::new(),
            }),
            HeuristicConfig::Fcfs { machine_selection } => {
                Box::new(DispatchingHeuristic::fcfs().with_machine_selection(machine_selection))
            }
            HeuristicConfig::Spt { machine_selection } => {
                Box::new(DispatchingHeuristic::spt().with_machine_selection(machine_selection))
            }
            HeuristicConfig::Lpt { machine_selection } => {
                Box::new(DispatchingHeuristic::lpt().with_machine_selection(machine_selection))
            }
            HeuristicConfig::Edd { machine_selection } => {
                Box::new(DispatchingHeuristic::edd().with_machine_selection(machine_selection))
            }
            HeuristicConfig::Lwkr { machine_selection } => {
                Box::new(DispatchingHeuristic::lwkr().with_machine_selection(machine_selection))
            }
            HeuristicConfig::Mwkr { machine_selection } => {
                Box::new(DispatchingHeuristic::mwkr().with_machine_selection(machine_selection))
            }
            HeuristicConfig::EnergyAware {
                energy_weight,
                time_weight,
                machine_selection,
            } => {
                let heuristic = DispatchingHeuristic::energy_aware(energy_weight, time_weight);
                Box::new(match machine_selection {
                    Some(selection) => heuristic.with_machine_selection(selection),
                    None => heuristic,
                })
            }
        }
    }
}
