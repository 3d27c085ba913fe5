//! The simulation engine: command surface plus the fixed-order tick.

use serde_json::Value;

use crate::config::GameConfig;
use crate::construction::{self, BuildTime, PendingDemolition, RequirementReport};
use crate::error::{CommandError, Result};
use crate::food;
use crate::growth::{self, SettlerTime};
use crate::notice::Notice;
use crate::persist;
use crate::production;
use crate::state::GameState;
use crate::stats;
use crate::workforce;

/// Longest wall-clock gap offline replay will simulate, in seconds.
pub const MAX_OFFLINE_SECONDS: f64 = 86_400.0;

/// Gaps shorter than this are ignored rather than replayed.
pub const MIN_OFFLINE_SECONDS: f64 = 10.0;

/// Deterministic settlement simulation over a fixed config.
///
/// The engine owns the game state and serializes all access to it: player
/// commands mutate it synchronously, and [`Engine::advance`] runs one tick.
/// Identical command/tick sequences over identical configs produce
/// identical states, byte for byte.
///
/// ```
/// use hamlet_core::prelude::*;
///
/// let mut engine = Engine::new(hamlet_core::data::standard_config());
/// let notices = engine.advance(1.0);
/// assert!(notices.is_empty());
/// ```
pub struct Engine {
    config: GameConfig,
    state: GameState,
}

impl Engine {
    /// Start a fresh settlement from `config`.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let mut state = GameState::new(&config);
        stats::recalculate(&mut state, &config);
        Self { config, state }
    }

    /// Resume from a saved snapshot, merging it over a fresh default state.
    ///
    /// Malformed snapshots are discarded and a fresh settlement is started.
    #[must_use]
    pub fn from_saved(config: GameConfig, saved: &Value) -> Self {
        let state = persist::restore(&config, saved);
        Self { config, state }
    }

    /// The static configuration this engine runs on.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The live game state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Run one tick of `delta` seconds.
    ///
    /// Step order is fixed: food, production, inn supplies, construction,
    /// settler arrival, tier check. The famine flag computed by the food
    /// step gates production in the same tick, and a settler arriving in
    /// step five can trigger the tier check in step six.
    pub fn advance(&mut self, delta: f64) -> Vec<Notice> {
        let mut notices = food::food_system(&mut self.state, &self.config, delta);
        production::production_system(&mut self.state, &self.config, delta);
        production::inn_supply_system(&mut self.state, &self.config, delta);
        notices.extend(construction::construction_system(
            &mut self.state,
            &self.config,
            delta,
        ));
        notices.extend(growth::settler_system(&mut self.state, &self.config, delta));
        notices.extend(growth::tier_system(&mut self.state, &self.config));

        #[cfg(feature = "debug-validation")]
        self.validate_invariants();

        notices
    }

    /// Catch up after a wall-clock absence by replaying whole seconds.
    ///
    /// Gaps under [`MIN_OFFLINE_SECONDS`] are ignored; longer gaps are
    /// capped at [`MAX_OFFLINE_SECONDS`]. Per-tick notices are discarded
    /// and a single summary reports time away, settlers gained, and every
    /// resource that rose by at least two whole units.
    pub fn replay_offline(&mut self, elapsed_seconds: f64) -> Vec<Notice> {
        if elapsed_seconds < MIN_OFFLINE_SECONDS {
            return Vec::new();
        }
        let replayed = elapsed_seconds.min(MAX_OFFLINE_SECONDS);
        let steps = replayed.floor() as u64;

        let population_before = self.state.total_workers;
        let resources_before = self.state.resources.clone();

        for _ in 0..steps {
            self.advance(1.0);
        }

        let mut resource_gains = Vec::new();
        for (resource, balance) in &self.state.resources {
            let before = resources_before.get(resource).copied().unwrap_or(0.0);
            let gained = (balance - before).floor() as i64;
            if gained > 1 {
                resource_gains.push((resource.clone(), gained));
            }
        }

        vec![Notice::OfflineSummary {
            away: format!("{}h {}m", steps / 3600, (steps % 3600) / 60),
            population_gained: self.state.total_workers - population_before,
            resource_gains,
        }]
    }

    /// Order construction of a building.
    pub fn start_building(&mut self, key: &str) -> Result<Vec<Notice>> {
        construction::start_building(&mut self.state, &self.config, key)
    }

    /// Cancel the queued order at `index`, refunding its full cost.
    pub fn cancel_building(&mut self, index: usize) -> Result<Vec<Notice>> {
        construction::cancel_building(&mut self.state, &self.config, index)
    }

    /// Request demolition of one instance of a repeatable building.
    pub fn demolish_building(&self, key: &str) -> Result<PendingDemolition> {
        construction::demolish_building(&self.state, &self.config, key)
    }

    /// Apply a demolition returned by [`Engine::demolish_building`].
    pub fn confirm_demolition(&mut self, pending: &PendingDemolition) -> Result<Vec<Notice>> {
        construction::confirm_demolition(&mut self.state, &self.config, pending)
    }

    /// Assign one idle settler to `job`.
    pub fn assign_worker(&mut self, job: &str) -> Result<()> {
        workforce::assign_worker(&mut self.state, &self.config, job)
    }

    /// Return one worker from `job` to the idle pool.
    pub fn unassign_worker(&mut self, job: &str, force: bool) -> Result<()> {
        workforce::unassign_worker(&mut self.state, &self.config, job, force)
    }

    /// Flip whether a food may be eaten. Returns the new setting.
    pub fn toggle_food_supply(&mut self, food: &str) -> Result<bool> {
        if self.config.food(food).is_none() {
            return Err(CommandError::UnknownResource {
                key: food.to_string(),
            });
        }
        let supplied = !self
            .state
            .supplied_foods
            .get(food)
            .copied()
            .unwrap_or(false);
        self.state.supplied_foods.insert(food.to_string(), supplied);
        Ok(supplied)
    }

    /// Flip whether the inn stocks `good`. Returns the new setting.
    ///
    /// A good with nothing in storage cannot be switched on.
    pub fn toggle_inn_supply(&mut self, good: &str) -> Result<bool> {
        if !self.state.inn_supplies.contains_key(good) {
            return Err(CommandError::UnknownResource {
                key: good.to_string(),
            });
        }
        let stocked = if self.state.resource(good) > 0.0 {
            !self.state.inn_supplies.get(good).copied().unwrap_or(false)
        } else {
            false
        };
        self.state.inn_supplies.insert(good.to_string(), stocked);
        Ok(stocked)
    }

    /// Gather one unit of `resource` by hand.
    ///
    /// Hand gathering is how a brand-new settlement bootstraps itself; it
    /// stops working once the settlement outgrows its first tier.
    pub fn gather(&mut self, resource: &str) -> Result<()> {
        if self.config.resource(resource).is_none() {
            return Err(CommandError::UnknownResource {
                key: resource.to_string(),
            });
        }
        if self.state.tier != self.config.first_tier().id {
            return Err(CommandError::GatherUnavailable);
        }
        self.state.add_resource(resource, 1.0);
        Ok(())
    }

    /// Requirement report for `key` against the current state.
    pub fn check_requirements(&self, key: &str) -> Result<RequirementReport> {
        construction::check_requirements(&self.state, &self.config, key)
    }

    /// Build-time breakdown for `key` at current staffing.
    #[must_use]
    pub fn build_time(&self, key: &str) -> BuildTime {
        construction::calculate_build_time(&self.state, &self.config, key)
    }

    /// Countdown the next settler would start from.
    #[must_use]
    pub fn next_settler_time(&self) -> SettlerTime {
        growth::next_settler_time(&self.state, &self.config)
    }

    /// Serialize the state to a plain JSON tree.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        persist::snapshot(&self.state)
    }

    /// Throw the settlement away and start over.
    pub fn reset(&mut self) {
        let mut state = GameState::new(&self.config);
        stats::recalculate(&mut state, &self.config);
        self.state = state;
    }

    /// Stable 64-bit hash of the full state, for determinism checks.
    #[must_use]
    pub fn digest(&self) -> u64 {
        self.state.digest()
    }

    #[cfg(feature = "debug-validation")]
    fn validate_invariants(&self) {
        for (resource, balance) in &self.state.resources {
            let limit = self.state.storage_limit(resource);
            assert!(
                *balance >= 0.0 && *balance <= limit,
                "resource {resource} outside [0, {limit}]: {balance}"
            );
        }
        for (job, assigned) in &self.state.assigned_workers {
            let slots = self.state.worker_slots.get(job).copied().unwrap_or(0);
            assert!(*assigned <= slots, "job {job} over-assigned: {assigned}/{slots}");
        }
        assert!(
            self.state.assigned_total() <= self.state.worker_limit,
            "roster over the worker limit: {}/{}",
            self.state.assigned_total(),
            self.state.worker_limit
        );
        assert!(
            self.state.build_queue.len() <= construction::MAX_QUEUE_LEN,
            "build queue over capacity"
        );
    }
}
