//! Test fixtures and helpers.
//!
//! Pre-built configs, engines, and scripted actions for consistent testing.

use hamlet_core::config::GameConfig;
use hamlet_core::data::standard_config;
use hamlet_core::engine::Engine;

/// Job keys available in the compact config.
pub const COMPACT_JOBS: [&str; 4] = ["builder", "woodcutter", "farmer", "baker"];

/// Resource keys available in the compact config.
pub const COMPACT_RESOURCES: [&str; 3] = ["wood", "grain", "bread"];

/// Building keys available in the compact config.
pub const COMPACT_BUILDINGS: [&str; 3] = ["cabin", "reeves_house", "house"];

/// A small, fast-to-simulate village config.
///
/// Two tiers, three buildings, a grain-and-bread food economy. The farmer
/// rate is set so two farmers feed three assigned workers with a small
/// surplus, keeping long scripted runs out of famine unless a test starves
/// them on purpose.
pub const COMPACT_CONFIG_RON: &str = r#"(
    tiers: [
        (id: "settlement", name: "tier.settlement.name", population: 0, building_limit: 6),
        (id: "small_village", name: "tier.small_village.name", population: 6, building_limit: 12),
    ],
    resources: [
        (id: "wood", base_storage: 200.0),
        (id: "grain", base_storage: 100.0, food_chain: true),
        (id: "bread", base_storage: 50.0, food_chain: true),
    ],
    buildings: [
        (
            key: "cabin",
            name: "building.cabin.name",
            cost: {"wood": 5.0},
            effect: (
                population: 6,
                worker_limit: 6,
                worker_slots: {"builder": 1, "woodcutter": 2, "farmer": 2, "baker": 1},
            ),
        ),
        (
            key: "reeves_house",
            name: "building.reeves_house.name",
            cost: {"wood": 10.0},
            requires: (population: Some(3)),
        ),
        (
            key: "house",
            name: "building.house.name",
            cost: {"wood": 10.0},
            repeatable: true,
            requires: (population: Some(2)),
            effect: (population: 4),
        ),
    ],
    workers: [
        (id: "builder"),
        (id: "woodcutter", produces: {"wood": 0.2}),
        (id: "farmer", produces: {"grain": 0.5}),
        (id: "baker", consumes: {"grain": 0.1}, produces: {"bread": 0.05}),
    ],
    foods: [
        (resource: "grain", consumption: 0.3, default_supplied: true),
        (resource: "bread", consumption: 0.2, bonus: 0.03),
    ],
    initial_unlocks: ["wood", "grain", "cabin_building"],
)"#;

/// Parse the compact config.
///
/// # Panics
///
/// Panics if the embedded document fails to parse; that is a bug in the
/// fixture, not in the caller.
#[must_use]
pub fn compact_config() -> GameConfig {
    GameConfig::from_ron(COMPACT_CONFIG_RON).expect("compact fixture config parses")
}

/// A fresh engine on the compact config.
#[must_use]
pub fn compact_engine() -> Engine {
    Engine::new(compact_config())
}

/// A fresh engine on the built-in standard data set.
#[must_use]
pub fn standard_engine() -> Engine {
    Engine::new(standard_config())
}

/// A compact engine a few minutes in: cabin standing, three settlers
/// housed, one on the builder post and two farming, with a small pantry
/// gathered. The food balance runs at a slight surplus.
#[must_use]
pub fn bootstrapped_engine() -> Engine {
    let mut engine = compact_engine();
    for _ in 0..5 {
        let _ = engine.gather("wood");
    }
    for _ in 0..20 {
        let _ = engine.gather("grain");
    }
    let _ = engine.start_building("cabin");
    advance_seconds(&mut engine, 40);
    let _ = engine.assign_worker("builder");
    let _ = engine.assign_worker("farmer");
    let _ = engine.assign_worker("farmer");
    engine
}

/// Advance `seconds` one-second ticks, discarding notices.
pub fn advance_seconds(engine: &mut Engine, seconds: u32) {
    for _ in 0..seconds {
        engine.advance(1.0);
    }
}

/// A scripted player action, for determinism and property tests.
///
/// Rejected commands are ignored when applied; scripts stay valid across
/// randomly generated sequences where most orders cannot be afforded yet.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Gather one unit of a resource by hand.
    Gather(&'static str),
    /// Assign one settler to a job.
    Assign(&'static str),
    /// Return one worker from a job to the idle pool.
    Unassign(&'static str),
    /// Order construction of a building.
    Start(&'static str),
    /// Cancel the queue entry at an index.
    Cancel(usize),
    /// Flip a food supply toggle.
    ToggleFood(&'static str),
    /// Advance this many one-second ticks.
    Tick(u32),
}

/// Apply one action, ignoring rejected commands.
pub fn apply_action(engine: &mut Engine, action: &Action) {
    match action {
        Action::Gather(resource) => {
            let _ = engine.gather(resource);
        }
        Action::Assign(job) => {
            let _ = engine.assign_worker(job);
        }
        Action::Unassign(job) => {
            let _ = engine.unassign_worker(job, false);
        }
        Action::Start(building) => {
            let _ = engine.start_building(building);
        }
        Action::Cancel(index) => {
            let _ = engine.cancel_building(*index);
        }
        Action::ToggleFood(food) => {
            let _ = engine.toggle_food_supply(food);
        }
        Action::Tick(seconds) => advance_seconds(engine, *seconds),
    }
}

/// Run a whole script against `engine`.
pub fn run_script(engine: &mut Engine, script: &[Action]) {
    for action in script {
        apply_action(engine, action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_config_parses_and_validates() {
        let config = compact_config();
        assert_eq!(config.first_tier().id, "settlement");
        assert!(config.building("cabin").is_some());
        assert!(config.food("grain").is_some());
    }

    #[test]
    fn test_bootstrapped_engine_is_settled_and_fed() {
        let engine = bootstrapped_engine();
        let state = engine.state();

        assert_eq!(state.total_workers, 3);
        assert!(state.buildings["cabin"].is_built);
        assert_eq!(state.assigned("farmer"), 2);
        assert!(!state.production_halted);
        assert!(state.resource("grain") > 0.0);
    }

    #[test]
    fn test_scripts_apply_in_order() {
        let mut engine = compact_engine();
        run_script(
            &mut engine,
            &[
                Action::Gather("wood"),
                Action::Gather("wood"),
                Action::Gather("wood"),
                Action::Gather("wood"),
                Action::Gather("wood"),
                Action::Start("cabin"),
                Action::Tick(2),
            ],
        );

        assert!(engine.state().buildings["cabin"].is_built);
    }
}
