//! Validated game configuration.
//!
//! [`GameConfig`] assembles the raw data tables into a lookup registry with a
//! prebuilt upgrade-successor index. Construction validates every
//! cross-reference so the simulation never has to re-check config integrity
//! at runtime.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::data::{BuildingData, FoodData, ResourceData, TierData, WorkerData};
use crate::error::ConfigError;

/// Raw config document as found in a RON file.
#[derive(Debug, Deserialize)]
struct ConfigDocument {
    tiers: Vec<TierData>,
    resources: Vec<ResourceData>,
    buildings: Vec<BuildingData>,
    workers: Vec<WorkerData>,
    #[serde(default)]
    foods: Vec<FoodData>,
    #[serde(default)]
    initial_unlocks: Vec<String>,
}

/// Validated, indexed game configuration.
///
/// Read-only input to the simulation: loaded once, never mutated by the
/// engine.
#[derive(Debug, Clone)]
pub struct GameConfig {
    tiers: Vec<TierData>,
    tier_ordinals: BTreeMap<String, usize>,
    resources: BTreeMap<String, ResourceData>,
    buildings: BTreeMap<String, BuildingData>,
    workers: BTreeMap<String, WorkerData>,
    foods: BTreeMap<String, FoodData>,
    /// key -> the building that upgrades from it.
    upgrade_targets: BTreeMap<String, String>,
    initial_unlocks: Vec<String>,
}

impl GameConfig {
    /// Assemble and validate a configuration from its tables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for duplicate keys, dangling
    /// cross-references, cyclic or conflicting upgrade links, or invalid
    /// numeric values.
    pub fn new(
        tiers: Vec<TierData>,
        resources: Vec<ResourceData>,
        buildings: Vec<BuildingData>,
        workers: Vec<WorkerData>,
        foods: Vec<FoodData>,
        initial_unlocks: Vec<String>,
    ) -> Result<Self, ConfigError> {
        if tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }

        let mut tier_ordinals = BTreeMap::new();
        for (ordinal, tier) in tiers.iter().enumerate() {
            if tier_ordinals.insert(tier.id.clone(), ordinal).is_some() {
                return Err(ConfigError::DuplicateKey {
                    kind: "tier",
                    key: tier.id.clone(),
                });
            }
        }

        let resources = keyed(resources, "resource", |r| r.id.clone())?;
        let buildings = keyed(buildings, "building", |b| b.key.clone())?;
        let workers = keyed(workers, "worker", |w| w.id.clone())?;
        let foods = keyed(foods, "food", |f| f.resource.clone())?;

        let mut upgrade_targets = BTreeMap::new();
        for building in buildings.values() {
            if let Some(from) = &building.upgrades_from {
                if let Some(previous) =
                    upgrade_targets.insert(from.clone(), building.key.clone())
                {
                    return Err(ConfigError::ConflictingUpgrade {
                        first: previous,
                        second: building.key.clone(),
                        from: from.clone(),
                    });
                }
            }
        }

        let config = Self {
            tiers,
            tier_ordinals,
            resources,
            buildings,
            workers,
            foods,
            upgrade_targets,
            initial_unlocks,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a RON config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed RON, or any validation
    /// error from [`GameConfig::new`].
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let doc: ConfigDocument =
            ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::new(
            doc.tiers,
            doc.resources,
            doc.buildings,
            doc.workers,
            doc.foods,
            doc.initial_unlocks,
        )
    }

    /// Tiers in ordinal order.
    #[must_use]
    pub fn tiers(&self) -> &[TierData] {
        &self.tiers
    }

    /// The starting tier.
    #[must_use]
    pub fn first_tier(&self) -> &TierData {
        &self.tiers[0]
    }

    /// Look up a tier by id.
    #[must_use]
    pub fn tier(&self, id: &str) -> Option<&TierData> {
        self.tier_ordinals.get(id).map(|&i| &self.tiers[i])
    }

    /// Ordinal position of a tier (0-based).
    #[must_use]
    pub fn tier_ordinal(&self, id: &str) -> Option<usize> {
        self.tier_ordinals.get(id).copied()
    }

    /// Resource definitions in key order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceData> {
        self.resources.values()
    }

    /// Look up a resource by id.
    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&ResourceData> {
        self.resources.get(id)
    }

    /// Building definitions in key order.
    pub fn buildings(&self) -> impl Iterator<Item = &BuildingData> {
        self.buildings.values()
    }

    /// Look up a building by key.
    #[must_use]
    pub fn building(&self, key: &str) -> Option<&BuildingData> {
        self.buildings.get(key)
    }

    /// Worker definitions in key order.
    pub fn workers(&self) -> impl Iterator<Item = &WorkerData> {
        self.workers.values()
    }

    /// Look up a worker by id.
    #[must_use]
    pub fn worker(&self, id: &str) -> Option<&WorkerData> {
        self.workers.get(id)
    }

    /// Food definitions in key order.
    pub fn foods(&self) -> impl Iterator<Item = &FoodData> {
        self.foods.values()
    }

    /// Look up a food profile by resource key.
    #[must_use]
    pub fn food(&self, resource: &str) -> Option<&FoodData> {
        self.foods.get(resource)
    }

    /// The building that upgrades from `key`, if any.
    #[must_use]
    pub fn upgrade_target(&self, key: &str) -> Option<&str> {
        self.upgrade_targets.get(key).map(String::as_str)
    }

    /// Feature keys unlocked in a fresh game.
    #[must_use]
    pub fn initial_unlocks(&self) -> &[String] {
        &self.initial_unlocks
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for building in self.buildings.values() {
            let ctx = |what: &str| format!("building {} {what}", building.key);

            for resource in building.cost.keys() {
                self.check_resource(resource, &ctx("cost"))?;
            }
            for resource in building.effect.storage.keys() {
                self.check_resource(resource, &ctx("storage effect"))?;
            }
            for job in building.effect.worker_slots.keys() {
                self.check_worker(job, &ctx("worker slots"))?;
            }
            if let Some(from) = &building.upgrades_from {
                self.check_building(from, &ctx("upgrade link"))?;
            }
            if let Some(tier) = &building.requires.tier {
                if self.tier_ordinal(tier).is_none() {
                    return Err(ConfigError::UnknownReference {
                        context: ctx("tier requirement"),
                        key: tier.clone(),
                    });
                }
            }
            if let Some(prereq) = &building.requires.building {
                self.check_building(&prereq.key, &ctx("building requirement"))?;
                for job in prereq.worker_minimums.keys() {
                    self.check_worker(job, &ctx("staffing requirement"))?;
                }
            }
            if let Some((job, _)) = &building.requires.worker {
                self.check_worker(job, &ctx("worker requirement"))?;
            }
        }

        for worker in self.workers.values() {
            let ctx = format!("worker {}", worker.id);
            for (resource, rate) in worker.produces.iter().chain(&worker.consumes) {
                self.check_resource(resource, &ctx)?;
                if *rate < 0.0 {
                    return Err(ConfigError::InvalidValue {
                        context: ctx.clone(),
                        message: format!("negative rate for {resource}"),
                    });
                }
            }
        }

        for food in self.foods.values() {
            let context = format!("food {}", food.resource);
            self.check_resource(&food.resource, &context)?;
            if food.consumption <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    context,
                    message: "consumption rate must be positive".to_string(),
                });
            }
        }

        // Upgrade chains must terminate; with at most one successor per key a
        // walk longer than the table size means a cycle.
        for key in self.buildings.keys() {
            let mut current = key.as_str();
            let mut steps = 0;
            while let Some(next) = self.upgrade_target(current) {
                steps += 1;
                if steps > self.buildings.len() {
                    return Err(ConfigError::UpgradeCycle { key: key.clone() });
                }
                current = next;
            }
        }

        Ok(())
    }

    fn check_resource(&self, id: &str, context: &str) -> Result<(), ConfigError> {
        if self.resources.contains_key(id) {
            Ok(())
        } else {
            Err(ConfigError::UnknownReference {
                context: context.to_string(),
                key: id.to_string(),
            })
        }
    }

    fn check_worker(&self, id: &str, context: &str) -> Result<(), ConfigError> {
        if self.workers.contains_key(id) {
            Ok(())
        } else {
            Err(ConfigError::UnknownReference {
                context: context.to_string(),
                key: id.to_string(),
            })
        }
    }

    fn check_building(&self, key: &str, context: &str) -> Result<(), ConfigError> {
        if self.buildings.contains_key(key) {
            Ok(())
        } else {
            Err(ConfigError::UnknownReference {
                context: context.to_string(),
                key: key.to_string(),
            })
        }
    }
}

fn keyed<T>(
    items: Vec<T>,
    kind: &'static str,
    key_of: impl Fn(&T) -> String,
) -> Result<BTreeMap<String, T>, ConfigError> {
    let mut map = BTreeMap::new();
    for item in items {
        let key = key_of(&item);
        if map.insert(key.clone(), item).is_some() {
            return Err(ConfigError::DuplicateKey { kind, key });
        }
    }
    Ok(map)
}
