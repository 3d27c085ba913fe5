//! Construction: requirement checks, the build queue, and demolition.
//!
//! Ordering one building deducts its full cost immediately and appends a
//! queue entry; only the queue head makes progress. Build speed is derived
//! from assigned builders each tick, so staffing changes take effect
//! mid-build.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{CommandError, CostShortfall, RequirementFailure, Result};
use crate::notice::Notice;
use crate::state::{BuildQueueEntry, GameState};
use crate::stats;
use crate::workforce::BUILDER_JOB;
use crate::{data::BuildingData, growth};

/// Maximum number of queued construction orders.
pub const MAX_QUEUE_LEN: usize = 5;

/// Fraction of the original cost returned on demolition, floored per line.
const DEMOLITION_REFUND: f64 = 0.5;

/// Divisor turning total resource cost into base build seconds.
const BUILD_TIME_COST_RATE: f64 = 5.0;

/// Build-speed factor gained per assigned builder.
const BUILDER_SPEED_BONUS: f64 = 0.1;

/// Build-time breakdown for one building at the current staffing level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BuildTime {
    /// Unmodified build seconds (total cost over the cost rate).
    pub base: f64,
    /// Effective build seconds, or `None` when construction is stalled.
    pub current: Option<f64>,
    /// Builders currently assigned.
    pub builders: u32,
    /// Speed multiplier applied to the base time.
    pub speed: f64,
}

/// One resource line of an affordability check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    /// Resource key.
    pub resource: String,
    /// Amount required.
    pub required: f64,
    /// Amount currently held.
    pub available: f64,
}

impl CostLine {
    /// Whether the held amount covers this line.
    #[must_use]
    pub fn met(&self) -> bool {
        self.available >= self.required
    }
}

/// Outcome of a full requirement check for one building.
///
/// All checks are evaluated; nothing short-circuits, so the report lists
/// every obstacle at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementReport {
    /// Non-cost requirements that failed, in check order.
    pub failures: Vec<RequirementFailure>,
    /// Cost breakdown, one line per resource in the price.
    pub cost: Vec<CostLine>,
}

impl RequirementReport {
    /// Whether every non-cost requirement holds.
    #[must_use]
    pub fn requirements_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether the full cost is affordable.
    #[must_use]
    pub fn cost_passed(&self) -> bool {
        self.cost.iter().all(CostLine::met)
    }

    /// Whether the building can be ordered right now.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.requirements_passed() && self.cost_passed()
    }

    /// The cost lines that fall short, as shortfalls.
    #[must_use]
    pub fn shortfalls(&self) -> Vec<CostShortfall> {
        self.cost
            .iter()
            .filter(|line| !line.met())
            .map(|line| CostShortfall {
                resource: line.resource.clone(),
                required: line.required,
                available: line.available,
            })
            .collect()
    }
}

/// An approved demolition awaiting confirmation.
///
/// Demolition is destructive, so the command is split: request it to learn
/// the refund, then confirm to apply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingDemolition {
    /// Building key.
    pub building: String,
    /// Refund per resource, already floored.
    pub refund: Vec<(String, f64)>,
}

/// Run the full requirement check for `key` without changing state.
pub fn check_requirements(
    state: &GameState,
    config: &GameConfig,
    key: &str,
) -> Result<RequirementReport> {
    let def = config
        .building(key)
        .ok_or_else(|| CommandError::UnknownBuilding {
            key: key.to_string(),
        })?;
    Ok(build_report(state, config, def))
}

fn build_report(state: &GameState, config: &GameConfig, def: &BuildingData) -> RequirementReport {
    let mut failures = Vec::new();

    if let Some(required) = def.requires.population {
        if state.total_workers < required {
            failures.push(RequirementFailure::Population {
                required,
                current: state.total_workers,
            });
        }
    }
    if let Some(tier) = &def.requires.tier {
        let required = config.tier_ordinal(tier).unwrap_or(usize::MAX);
        let current = config.tier_ordinal(&state.tier).unwrap_or(0);
        if current < required {
            failures.push(RequirementFailure::Tier {
                required: tier.clone(),
            });
        }
    }
    if let Some(prereq) = &def.requires.building {
        if !stats::is_functionally_met(state, config, &prereq.key) {
            failures.push(RequirementFailure::MissingBuilding {
                building: prereq.key.clone(),
            });
        }
        if prereq.staffed {
            let missing: Vec<(String, u32)> = prereq
                .worker_minimums
                .iter()
                .filter(|(job, min)| state.assigned(job) < **min)
                .map(|(job, min)| (job.clone(), *min))
                .collect();
            if !missing.is_empty() {
                failures.push(RequirementFailure::UnstaffedBuilding {
                    building: prereq.key.clone(),
                    missing,
                });
            }
        }
    }
    if let Some((job, required)) = &def.requires.worker {
        let assigned = state.assigned(job);
        if assigned < *required {
            failures.push(RequirementFailure::NotEnoughWorkers {
                job: job.clone(),
                required: *required,
                assigned,
            });
        }
    }

    let cost = def
        .cost
        .iter()
        .map(|(resource, required)| CostLine {
            resource: resource.clone(),
            required: *required,
            available: state.resource(resource),
        })
        .collect();

    RequirementReport { failures, cost }
}

/// Build time for `key` at the current builder count and tier.
///
/// Above the starting tier construction needs at least one builder; without
/// one the speed is zero and `current` is `None`. At the starting tier the
/// settlers raise buildings themselves at base speed.
#[must_use]
pub fn calculate_build_time(state: &GameState, config: &GameConfig, key: &str) -> BuildTime {
    let builders = state.assigned(BUILDER_JOB);
    let at_first_tier = state.tier == config.first_tier().id;
    let speed = if builders == 0 && !at_first_tier {
        0.0
    } else {
        1.0 + BUILDER_SPEED_BONUS * f64::from(builders)
    };

    let Some(def) = config.building(key) else {
        tracing::warn!(building = key, "build time requested for unknown building");
        return BuildTime {
            base: 0.0,
            current: None,
            builders,
            speed,
        };
    };

    let base = def.total_cost() / BUILD_TIME_COST_RATE;
    let current = (speed > 0.0).then(|| base / speed);
    BuildTime {
        base,
        current,
        builders,
        speed,
    }
}

/// Order construction of `key`: validate, deduct the full cost, enqueue.
pub fn start_building(
    state: &mut GameState,
    config: &GameConfig,
    key: &str,
) -> Result<Vec<Notice>> {
    let Some(def) = config.building(key) else {
        tracing::error!(building = key, "build order for unknown building");
        return Err(CommandError::UnknownBuilding {
            key: key.to_string(),
        });
    };
    if state.build_queue.len() >= MAX_QUEUE_LEN {
        return Err(CommandError::QueueFull);
    }

    let standing = state.buildings.get(key).is_some_and(|b| b.is_built);
    let queued = state.build_queue.iter().any(|e| e.building == key);
    if !def.repeatable && (standing || queued) {
        return Err(CommandError::AlreadyBuiltOrQueued {
            building: key.to_string(),
        });
    }

    // Upgrades replace an existing building, so they bypass the tier cap.
    if !def.is_upgrade() {
        let limit = config.tier(&state.tier).map_or(u32::MAX, |t| t.building_limit);
        if total_building_count(state, config) >= limit {
            return Err(CommandError::BuildingLimitReached {
                tier: state.tier.clone(),
                limit,
            });
        }
    }

    let report = build_report(state, config, def);
    if !report.passed() {
        if report.requirements_passed() {
            return Err(CommandError::CannotAfford {
                building: key.to_string(),
                shortfalls: report.shortfalls(),
            });
        }
        return Err(CommandError::RequirementsNotMet {
            building: key.to_string(),
            failures: report.failures,
        });
    }

    for (resource, amount) in &def.cost {
        if let Some(balance) = state.resources.get_mut(resource) {
            *balance -= amount;
        }
    }
    let total_time = calculate_build_time(state, config, key).current;
    state.build_queue.push(BuildQueueEntry {
        building: key.to_string(),
        progress: 0.0,
        total_time,
    });

    Ok(vec![Notice::BuildQueued {
        building: key.to_string(),
    }])
}

/// Remove the queue entry at `index` and refund its full cost.
pub fn cancel_building(
    state: &mut GameState,
    config: &GameConfig,
    index: usize,
) -> Result<Vec<Notice>> {
    if index >= state.build_queue.len() {
        return Err(CommandError::InvalidQueueIndex { index });
    }

    let entry = state.build_queue.remove(index);
    if let Some(def) = config.building(&entry.building) {
        for (resource, amount) in &def.cost {
            state.add_resource(resource, *amount);
        }
    }
    // A new head starts from the current staffing level.
    if index == 0 && !state.build_queue.is_empty() {
        let next = state.build_queue[0].building.clone();
        let total = calculate_build_time(state, config, &next).current;
        state.build_queue[0].total_time = total;
    }

    Ok(vec![Notice::BuildCancelled {
        building: entry.building,
    }])
}

/// Request demolition of one instance of a repeatable building.
///
/// Returns the refund the player would receive; nothing changes until
/// [`confirm_demolition`] is called with the returned token.
pub fn demolish_building(
    state: &GameState,
    config: &GameConfig,
    key: &str,
) -> Result<PendingDemolition> {
    let def = config
        .building(key)
        .ok_or_else(|| CommandError::UnknownBuilding {
            key: key.to_string(),
        })?;
    let count = state.buildings.get(key).map_or(0, |b| b.count);
    if !def.repeatable || count == 0 {
        return Err(CommandError::NotDemolishable {
            building: key.to_string(),
        });
    }

    let refund = def
        .cost
        .iter()
        .map(|(resource, amount)| (resource.clone(), (amount * DEMOLITION_REFUND).floor()))
        .collect();
    Ok(PendingDemolition {
        building: key.to_string(),
        refund,
    })
}

/// Apply a previously requested demolition.
///
/// The instance count is re-checked; state may have moved between request
/// and confirmation.
pub fn confirm_demolition(
    state: &mut GameState,
    config: &GameConfig,
    pending: &PendingDemolition,
) -> Result<Vec<Notice>> {
    match state.buildings.get_mut(&pending.building) {
        Some(slot) if slot.count > 0 => slot.count -= 1,
        _ => {
            return Err(CommandError::NotDemolishable {
                building: pending.building.clone(),
            })
        }
    }
    for (resource, amount) in &pending.refund {
        state.add_resource(resource, *amount);
    }
    stats::recalculate(state, config);

    Ok(vec![Notice::BuildingDemolished {
        building: pending.building.clone(),
    }])
}

/// Advance the queue head by `delta` seconds, completing it when done.
///
/// The head's total time is recomputed every tick from the live builder
/// count. At most one building completes per tick.
pub fn construction_system(
    state: &mut GameState,
    config: &GameConfig,
    delta: f64,
) -> Vec<Notice> {
    if state.build_queue.is_empty() {
        return Vec::new();
    }

    let key = state.build_queue[0].building.clone();
    let total_time = calculate_build_time(state, config, &key).current;
    let head = &mut state.build_queue[0];
    head.total_time = total_time;

    let finished = match total_time {
        Some(total) => {
            head.progress += delta;
            head.progress >= total
        }
        None => false,
    };
    if finished {
        complete_building(state, config)
    } else {
        Vec::new()
    }
}

/// Buildings standing plus orders queued, counted against the tier cap.
///
/// Upgrade tiers do not add to the count: a family occupies one slot at its
/// base key no matter how far it has been upgraded.
fn total_building_count(state: &GameState, config: &GameConfig) -> u32 {
    let mut total = state.build_queue.len() as u32;
    for def in config.buildings() {
        if def.is_upgrade() {
            continue;
        }
        if def.repeatable {
            total += state.buildings.get(&def.key).map_or(0, |b| b.count);
        } else if stats::is_functionally_met(state, config, &def.key) {
            total += 1;
        }
    }
    total
}

fn complete_building(state: &mut GameState, config: &GameConfig) -> Vec<Notice> {
    let entry = state.build_queue.remove(0);
    let mut notices = Vec::new();

    if let Some(def) = config.building(&entry.building) {
        let slot = state.buildings.entry(entry.building.clone()).or_default();
        if def.repeatable {
            slot.count += 1;
        } else {
            slot.is_built = true;
        }
        stats::recalculate(state, config);
        notices.push(Notice::BuildCompleted {
            building: entry.building.clone(),
        });
        notices.extend(growth::unlock_features(state, config, &def.effect.unlocks));
        notices.extend(growth::unlock_features(
            state,
            config,
            &def.effect.building_unlocks,
        ));
    }

    if !state.build_queue.is_empty() {
        let next = state.build_queue[0].building.clone();
        let total = calculate_build_time(state, config, &next).current;
        state.build_queue[0].total_time = total;
    }
    notices
}
