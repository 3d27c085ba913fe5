//! The mutable game-state aggregate.
//!
//! [`GameState`] is an explicitly owned value: constructed from config at
//! session start, mutated only through the simulation systems and commands,
//! serialized on demand. Derived fields (limits, slots, storage) are pure
//! functions of the building set and are rebuilt by
//! [`stats::recalculate`](crate::stats::recalculate), never patched.
//!
//! All maps are ordered so iteration, serialization, and the state digest are
//! stable.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::growth;
use crate::production;

/// Mutable per-building state. Static properties live in config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingState {
    /// Whether a unique building stands.
    #[serde(default)]
    pub is_built: bool,
    /// Standing instance count of a repeatable building.
    #[serde(default)]
    pub count: u32,
}

impl BuildingState {
    /// Number of standing units: `count` for repeatable buildings, the built
    /// flag as 0/1 otherwise.
    #[must_use]
    pub fn units(&self, repeatable: bool) -> u32 {
        if repeatable {
            self.count
        } else {
            u32::from(self.is_built)
        }
    }
}

/// One project in the build queue.
///
/// Only the head entry accumulates progress. `total_time` is `None` while the
/// build is stalled (zero build speed); the head's value is recomputed every
/// tick since the builder count can change mid-build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildQueueEntry {
    /// Key of the building under construction.
    pub building: String,
    /// Seconds of progress accumulated.
    pub progress: f64,
    /// Seconds required at the current build speed, if any speed exists.
    pub total_time: Option<f64>,
}

/// The complete simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Current settlement tier id.
    pub tier: String,
    /// Resource balances. Invariant: `0 <= resources[r] <= storage_limits[r]`.
    pub resources: BTreeMap<String, f64>,
    /// Derived storage caps per resource.
    pub storage_limits: BTreeMap<String, f64>,
    /// Mutable building state per building key.
    pub buildings: BTreeMap<String, BuildingState>,
    /// Assigned worker count per job.
    pub assigned_workers: BTreeMap<String, u32>,
    /// Derived slot capacity per job.
    pub worker_slots: BTreeMap<String, u32>,
    /// Population.
    pub total_workers: u32,
    /// Derived population cap.
    pub population_limit: u32,
    /// Derived cap on the sum of assigned workers.
    pub worker_limit: u32,
    /// Pending construction projects, head first.
    pub build_queue: Vec<BuildQueueEntry>,
    /// Seconds until the next settler arrives.
    pub next_settler_in: f64,
    /// Full length of the countdown last drawn (kept for display).
    pub next_settler_total: f64,
    /// Which foods workers may eat.
    pub supplied_foods: BTreeMap<String, bool>,
    /// Which goods are routed to the inn.
    pub inn_supplies: BTreeMap<String, bool>,
    /// Feature keys unlocked so far, in unlock order.
    pub unlocked_features: Vec<String>,
    /// Whether non-food production is halted for lack of food.
    pub production_halted: bool,
    /// Production multiplier computed by the food step this tick.
    pub production_bonus: f64,
    /// Per-second food consumption recorded this tick (display only).
    pub food_rates: BTreeMap<String, f64>,
}

impl GameState {
    /// Construct the default state for a configuration.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let resources = config.resources().map(|r| (r.id.clone(), 0.0)).collect();
        let storage_limits = config
            .resources()
            .map(|r| (r.id.clone(), r.base_storage))
            .collect();
        let buildings = config
            .buildings()
            .map(|b| (b.key.clone(), BuildingState::default()))
            .collect();
        let assigned_workers: BTreeMap<String, u32> =
            config.workers().map(|w| (w.id.clone(), 0)).collect();
        let worker_slots = assigned_workers.clone();
        let supplied_foods = config
            .foods()
            .map(|f| (f.resource.clone(), f.default_supplied))
            .collect();
        let food_rates = config.foods().map(|f| (f.resource.clone(), 0.0)).collect();
        let inn_supplies = production::INN_SUPPLY_GOODS
            .iter()
            .filter(|good| config.resource(good).is_some())
            .map(|good| ((*good).to_string(), false))
            .collect();

        let mut unlocked_features = Vec::new();
        for feature in config.initial_unlocks() {
            if !unlocked_features.contains(feature) {
                unlocked_features.push(feature.clone());
            }
        }

        Self {
            tier: config.first_tier().id.clone(),
            resources,
            storage_limits,
            buildings,
            assigned_workers,
            worker_slots,
            total_workers: 0,
            population_limit: 0,
            worker_limit: 0,
            build_queue: Vec::new(),
            next_settler_in: growth::BASE_SETTLER_TIME,
            next_settler_total: growth::BASE_SETTLER_TIME,
            supplied_foods,
            inn_supplies,
            unlocked_features,
            production_halted: false,
            production_bonus: 1.0,
            food_rates,
        }
    }

    /// Add `amount` (non-negative) to a resource, clamped to its storage
    /// limit. Unknown resource keys are ignored.
    pub fn add_resource(&mut self, resource: &str, amount: f64) {
        if let Some(balance) = self.resources.get_mut(resource) {
            let limit = self.storage_limits.get(resource).copied().unwrap_or(0.0);
            *balance = (*balance + amount).min(limit);
        }
    }

    /// Current balance of a resource (0 for unknown keys).
    #[must_use]
    pub fn resource(&self, resource: &str) -> f64 {
        self.resources.get(resource).copied().unwrap_or(0.0)
    }

    /// Current storage limit of a resource (0 for unknown keys).
    #[must_use]
    pub fn storage_limit(&self, resource: &str) -> f64 {
        self.storage_limits.get(resource).copied().unwrap_or(0.0)
    }

    /// Assigned count for a job (0 for unknown keys).
    #[must_use]
    pub fn assigned(&self, job: &str) -> u32 {
        self.assigned_workers.get(job).copied().unwrap_or(0)
    }

    /// Sum of all assigned workers.
    #[must_use]
    pub fn assigned_total(&self) -> u32 {
        self.assigned_workers.values().sum()
    }

    /// Whether a feature key has been unlocked.
    #[must_use]
    pub fn has_feature(&self, feature: &str) -> bool {
        self.unlocked_features.iter().any(|f| f == feature)
    }

    /// Stable 64-bit digest of the full state.
    ///
    /// Two states produce the same digest iff every field matches; float
    /// fields are hashed by bit pattern. Used by determinism tests and replay
    /// verification.
    #[must_use]
    pub fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tier.hash(&mut hasher);
        self.total_workers.hash(&mut hasher);
        self.population_limit.hash(&mut hasher);
        self.worker_limit.hash(&mut hasher);
        self.production_halted.hash(&mut hasher);
        self.production_bonus.to_bits().hash(&mut hasher);
        self.next_settler_in.to_bits().hash(&mut hasher);
        self.next_settler_total.to_bits().hash(&mut hasher);

        for (key, value) in &self.resources {
            key.hash(&mut hasher);
            value.to_bits().hash(&mut hasher);
        }
        for (key, value) in &self.storage_limits {
            key.hash(&mut hasher);
            value.to_bits().hash(&mut hasher);
        }
        for (key, building) in &self.buildings {
            key.hash(&mut hasher);
            building.is_built.hash(&mut hasher);
            building.count.hash(&mut hasher);
        }
        for (key, value) in &self.assigned_workers {
            key.hash(&mut hasher);
            value.hash(&mut hasher);
        }
        for (key, value) in &self.worker_slots {
            key.hash(&mut hasher);
            value.hash(&mut hasher);
        }
        for entry in &self.build_queue {
            entry.building.hash(&mut hasher);
            entry.progress.to_bits().hash(&mut hasher);
            entry.total_time.map(f64::to_bits).hash(&mut hasher);
        }
        for (key, value) in &self.supplied_foods {
            key.hash(&mut hasher);
            value.hash(&mut hasher);
        }
        for (key, value) in &self.inn_supplies {
            key.hash(&mut hasher);
            value.hash(&mut hasher);
        }
        for (key, value) in &self.food_rates {
            key.hash(&mut hasher);
            value.to_bits().hash(&mut hasher);
        }
        self.unlocked_features.hash(&mut hasher);

        hasher.finish()
    }
}
