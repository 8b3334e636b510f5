//! Machine selection policies.

use serde::{Deserialize, Serialize};

use crate::models::{Instance, MachineId, Operation, Variant};

/// How a priority-rule heuristic picks the machine of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineSelection {
    /// First variant in input order.
    #[default]
    FirstAvailable,
    /// Shortest processing time.
    Fastest,
    /// Lowest processing energy.
    LeastEnergy,
    /// Machine whose availability cursor is earliest.
    EarliestAvailable,
    /// Lowest `energy_weight · energy + time_weight · duration`.
    Weighted { energy_weight: f64, time_weight: f64 },
}

impl MachineSelection {
    pub fn first_available() -> Self {
        MachineSelection::FirstAvailable
    }

    pub fn fastest() -> Self {
        MachineSelection::Fastest
    }

    /// Compatible machines of `operation`, most preferred first. Equal
    /// candidates keep their variant order.
    pub fn rank(&self, operation: &Operation, instance: &Instance) -> Vec<MachineId> {
        let mut variants: Vec<&Variant> = operation
            .variants()
            .iter()
            .filter(|v| instance.machine(v.machine_id).is_some())
            .collect();
        match *self {
            MachineSelection::FirstAvailable => {}
            MachineSelection::Fastest => variants.sort_by_key(|v| v.duration),
            MachineSelection::LeastEnergy => variants.sort_by_key(|v| v.energy),
            MachineSelection::EarliestAvailable => variants.sort_by_key(|v| {
                instance
                    .machine(v.machine_id)
                    .map_or(i64::MAX, |m| m.available_time())
            }),
            MachineSelection::Weighted {
                energy_weight,
                time_weight,
            } => variants.sort_by(|a, b| {
                let score = |v: &Variant| {
                    energy_weight * v.energy as f64 + time_weight * v.duration as f64
                };
                score(a)
                    .partial_cmp(&score(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
        }
        variants.into_iter().map(|v| v.machine_id).collect()
    }

    /// Preferred machine of `operation`.
    pub fn select(&self, operation: &Operation, instance: &Instance) -> Option<MachineId> {
        self.rank(operation, instance).first().copied()
    }
}
