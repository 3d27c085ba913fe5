//! Derived-stat recalculation.
//!
//! Every derived value (population limit, worker limit, job slots, storage
//! limits) is rebuilt from scratch from the completed building set. Callers
//! run [`recalculate`] after any mutation that can change capacities; it is
//! idempotent.

use crate::config::GameConfig;
use crate::state::GameState;

/// Job key of the foreman.
pub const FOREMAN_JOB: &str = "foreman";
/// Job key of the foreman assistant.
pub const FOREMAN_ASSISTANT_JOB: &str = "foreman_assistant";
/// Flat worker-limit bonus while any foreman is assigned.
pub const FOREMAN_LIMIT_BONUS: u32 = 30;

/// Per-assistant worker-limit bonus by staffing-capacity building tier.
/// Highest functionally-met tier wins; the bonuses never stack.
const ASSISTANT_BONUS_TIERS: [(&str, u32); 3] = [
    ("workers_guildhall", 65),
    ("workers_barracks", 20),
    ("workers_quarters", 22),
];

/// Rebuild all derived stats from the building set, then reconcile.
///
/// For each building family only the highest completed tier of its upgrade
/// chain contributes, scaled by its unit count. After capacities are rebuilt,
/// over-assigned workers are let go until every job fits its slots and the
/// roster fits the worker limit, and over-limit balances are clamped down to
/// the new storage limits.
pub fn recalculate(state: &mut GameState, config: &GameConfig) {
    state.population_limit = 0;
    state.worker_limit = 0;
    state.worker_slots = config.workers().map(|w| (w.id.clone(), 0)).collect();
    state.storage_limits = config
        .resources()
        .map(|r| (r.id.clone(), r.base_storage))
        .collect();

    for def in config.buildings() {
        if superseded_by_upgrade(state, config, &def.key) {
            continue;
        }
        let count = state
            .buildings
            .get(&def.key)
            .map_or(0, |b| b.units(def.repeatable));
        if count == 0 {
            continue;
        }

        state.population_limit += def.effect.population * count;
        state.worker_limit += def.effect.worker_limit * count;
        for (job, slots) in &def.effect.worker_slots {
            *state.worker_slots.entry(job.clone()).or_insert(0) += slots * count;
        }
        for (resource, amount) in &def.effect.storage {
            *state.storage_limits.entry(resource.clone()).or_insert(0.0) +=
                amount * f64::from(count);
        }
    }

    if state.assigned(FOREMAN_JOB) > 0 {
        state.worker_limit += FOREMAN_LIMIT_BONUS;
    }
    let assistants = state.assigned(FOREMAN_ASSISTANT_JOB);
    if assistants > 0 {
        for (building, bonus) in ASSISTANT_BONUS_TIERS {
            if is_functionally_met(state, config, building) {
                state.worker_limit += assistants * bonus;
                break;
            }
        }
    }

    // Capacity may have shrunk: let excess workers go, job by job.
    for (job, assigned) in &mut state.assigned_workers {
        let slots = state.worker_slots.get(job).copied().unwrap_or(0);
        if *assigned > slots {
            *assigned = slots;
        }
    }

    // The roster as a whole must also fit the worker limit; shed the
    // remainder from the back of the roster.
    let mut excess = state.assigned_total().saturating_sub(state.worker_limit);
    for assigned in state.assigned_workers.values_mut().rev() {
        if excess == 0 {
            break;
        }
        let let_go = excess.min(*assigned);
        *assigned -= let_go;
        excess -= let_go;
    }

    // Storage may have shrunk too; the ledger invariant holds after every
    // mutation, so overflow is discarded here rather than on the next add.
    for (resource, balance) in &mut state.resources {
        let limit = state.storage_limits.get(resource).copied().unwrap_or(0.0);
        if *balance > limit {
            *balance = limit;
        }
    }
}

/// Whether a building key is functionally met: the building itself stands,
/// or any transitive upgrade successor of it does.
#[must_use]
pub fn is_functionally_met(state: &GameState, config: &GameConfig, key: &str) -> bool {
    let mut current = Some(key);
    while let Some(k) = current {
        let repeatable = config.building(k).is_some_and(|d| d.repeatable);
        if state.buildings.get(k).map_or(0, |b| b.units(repeatable)) > 0 {
            return true;
        }
        current = config.upgrade_target(k);
    }
    false
}

/// Whether this building's direct upgrade is completed. The chain walk stops
/// at the first unbuilt successor, so a building only stops contributing once
/// the next tier actually stands.
fn superseded_by_upgrade(state: &GameState, config: &GameConfig, key: &str) -> bool {
    config
        .upgrade_target(key)
        .is_some_and(|next| state.buildings.get(next).is_some_and(|b| b.is_built))
}
