//! Building data structures for data-driven building definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Data-driven building definition.
///
/// Defines all static properties of a building type. The mutable part
/// (built flag / instance count) lives in the game state, keyed by `key`.
///
/// # Example RON
///
/// ```ron
/// BuildingData(
///     key: "workers_barracks",
///     name: "building.workers_barracks.name",
///     cost: { "wood": 80.0, "stone": 60.0, "clay": 30.0 },
///     upgrades_from: Some("workers_quarters"),
///     requires: (
///         tier: Some("small_village"),
///         building: Some((key: "workers_quarters")),
///     ),
///     effect: (
///         worker_limit: 25,
///         worker_slots: { "foreman": 1, "foreman_assistant": 4 },
///     ),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingData {
    /// Unique string identifier for this building type.
    pub key: String,

    /// Localization key for the building's display name.
    #[serde(default)]
    pub name: String,

    /// Construction cost per resource.
    #[serde(default)]
    pub cost: BTreeMap<String, f64>,

    /// Whether multiple instances can stand at once.
    ///
    /// Repeatable buildings track an instance count; unique buildings track
    /// a built flag.
    #[serde(default)]
    pub repeatable: bool,

    /// The building this one upgrades from, if any.
    ///
    /// Upgrade links form singly-linked chains; only the highest completed
    /// member of a chain contributes its effect.
    #[serde(default)]
    pub upgrades_from: Option<String>,

    /// Gates that must pass before construction can start.
    #[serde(default)]
    pub requires: BuildingRequires,

    /// What the completed building contributes.
    #[serde(default)]
    pub effect: BuildingEffect,
}

/// Pre-construction gates for a building.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingRequires {
    /// Minimum population.
    #[serde(default)]
    pub population: Option<u32>,

    /// Minimum settlement tier (by ordinal position).
    #[serde(default)]
    pub tier: Option<String>,

    /// A prerequisite building that must be functionally met.
    #[serde(default)]
    pub building: Option<PrerequisiteBuilding>,

    /// A minimum assigned count of a specific job, as `(job, count)`.
    #[serde(default)]
    pub worker: Option<(String, u32)>,
}

/// A prerequisite-building gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrerequisiteBuilding {
    /// Key of the required building.
    pub key: String,

    /// Whether the building must also be staffed.
    #[serde(default)]
    pub staffed: bool,

    /// Job minimums checked when `staffed` is set, as job -> assigned count.
    #[serde(default)]
    pub worker_minimums: BTreeMap<String, u32>,
}

/// Contribution of a completed building.
///
/// Scaled by the instance count for repeatable buildings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingEffect {
    /// Population capacity added.
    #[serde(default)]
    pub population: u32,

    /// Worker-limit capacity added.
    #[serde(default)]
    pub worker_limit: u32,

    /// Job slots added, as job -> slot count.
    #[serde(default)]
    pub worker_slots: BTreeMap<String, u32>,

    /// Storage capacity added, as resource -> amount.
    #[serde(default)]
    pub storage: BTreeMap<String, f64>,

    /// Feature keys unlocked on completion.
    #[serde(default)]
    pub unlocks: Vec<String>,

    /// Building feature keys unlocked on completion.
    #[serde(default)]
    pub building_unlocks: Vec<String>,

    /// Additive settler-arrival time bonus granted while staffed.
    #[serde(default)]
    pub settler_time_bonus: f64,
}

impl BuildingData {
    /// Whether this building upgrades another.
    #[must_use]
    pub fn is_upgrade(&self) -> bool {
        self.upgrades_from.is_some()
    }

    /// Sum of all cost amounts.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.cost.values().sum()
    }
}
