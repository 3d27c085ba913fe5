//! Per-job resource production and the inn's standing orders.

use crate::config::GameConfig;
use crate::data::WorkerData;
use crate::state::GameState;

/// Goods the inn can keep stocked.
pub const INN_SUPPLY_GOODS: [&str; 3] = ["bread", "beer", "meat"];

/// Inn consumption per supplied good, per tier level, per second.
pub const INN_SUPPLY_RATE: f64 = 0.5;

/// Run production for every staffed job.
///
/// Inputs are all-or-nothing per job: a tick that cannot cover every input
/// at `rate × count × delta` produces and consumes nothing for that job.
/// Outputs are scaled by the tick's production bonus and clamped to
/// storage. While production is halted only food-chain jobs keep working,
/// so a famine can end.
pub fn production_system(state: &mut GameState, config: &GameConfig, delta: f64) {
    for worker in config.workers() {
        let count = state.assigned(&worker.id);
        if count == 0 {
            continue;
        }
        if state.production_halted && !feeds_food_chain(config, worker) {
            continue;
        }

        let scale = f64::from(count) * delta;
        let covered = worker
            .consumes
            .iter()
            .all(|(resource, rate)| state.resource(resource) >= rate * scale);
        if !covered {
            continue;
        }

        for (resource, rate) in &worker.consumes {
            if let Some(balance) = state.resources.get_mut(resource) {
                *balance -= rate * scale;
            }
        }
        for (resource, rate) in &worker.produces {
            state.add_resource(resource, rate * scale * state.production_bonus);
        }
    }
}

/// Consume the inn's supplied goods at `0.5 × tier level` per second each.
///
/// A good whose balance cannot cover the tick is quietly unflagged instead
/// of going negative.
pub fn inn_supply_system(state: &mut GameState, config: &GameConfig, delta: f64) {
    let tier_level = config.tier_ordinal(&state.tier).map_or(1, |i| i + 1);
    let draw = INN_SUPPLY_RATE * tier_level as f64 * delta;

    for good in INN_SUPPLY_GOODS {
        if !state.inn_supplies.get(good).copied().unwrap_or(false) {
            continue;
        }
        if state.resource(good) >= draw {
            if let Some(balance) = state.resources.get_mut(good) {
                *balance -= draw;
            }
        } else {
            state.inn_supplies.insert(good.to_string(), false);
        }
    }
}

fn feeds_food_chain(config: &GameConfig, worker: &WorkerData) -> bool {
    worker
        .produces
        .keys()
        .any(|resource| config.resource(resource).is_some_and(|r| r.food_chain))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::{ResourceData, TierData, WorkerData};

    fn resource(id: &str, food_chain: bool) -> ResourceData {
        ResourceData {
            id: id.to_string(),
            base_storage: 100.0,
            food_chain,
        }
    }

    fn worker(id: &str, produces: &[(&str, f64)], consumes: &[(&str, f64)]) -> WorkerData {
        let map = |pairs: &[(&str, f64)]| -> BTreeMap<String, f64> {
            pairs
                .iter()
                .map(|(key, rate)| ((*key).to_string(), *rate))
                .collect()
        };
        WorkerData {
            id: id.to_string(),
            name: String::new(),
            produces: map(produces),
            consumes: map(consumes),
        }
    }

    fn tier(id: &str, population: u32) -> TierData {
        TierData {
            id: id.to_string(),
            name: String::new(),
            population,
            building_limit: 20,
            unlocks: Vec::new(),
            celebrate: false,
        }
    }

    fn test_config() -> GameConfig {
        GameConfig::new(
            vec![tier("settlement", 0), tier("small_village", 10)],
            vec![
                resource("wood", false),
                resource("grain", true),
                resource("flour", true),
                resource("water", true),
                resource("bread", true),
            ],
            vec![],
            vec![
                worker("woodcutter", &[("wood", 0.1)], &[]),
                worker("farmer", &[("grain", 0.15)], &[]),
                worker("miller", &[("flour", 0.1)], &[("grain", 0.2)]),
                worker("baker", &[("bread", 0.06)], &[("flour", 0.08), ("water", 0.08)]),
            ],
            vec![],
            vec![],
        )
        .unwrap()
    }

    fn staffed(config: &GameConfig, job: &str, count: u32) -> GameState {
        let mut state = GameState::new(config);
        state.total_workers = count;
        state.assigned_workers.insert(job.to_string(), count);
        state
    }

    #[test]
    fn test_outputs_scale_with_count_delta_and_bonus() {
        let config = test_config();
        let mut state = staffed(&config, "miller", 2);
        state.add_resource("grain", 10.0);
        state.production_bonus = 1.5;

        production_system(&mut state, &config, 2.0);

        // Inputs are deducted at face value, outputs carry the bonus.
        assert!((state.resource("grain") - (10.0 - 0.2 * 2.0 * 2.0)).abs() < 1e-9);
        assert!((state.resource("flour") - 0.1 * 2.0 * 2.0 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_input_skips_the_job_entirely() {
        let config = test_config();
        let mut state = staffed(&config, "baker", 1);
        state.add_resource("flour", 10.0);
        // No water at all: the baker must not consume the flour.

        production_system(&mut state, &config, 1.0);

        assert_eq!(state.resource("flour"), 10.0);
        assert_eq!(state.resource("bread"), 0.0);
    }

    #[test]
    fn test_halt_freezes_jobs_outside_the_food_chain() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.total_workers = 4;
        state.assigned_workers.insert("woodcutter".to_string(), 2);
        state.assigned_workers.insert("farmer".to_string(), 2);
        state.production_halted = true;

        production_system(&mut state, &config, 1.0);

        assert_eq!(state.resource("wood"), 0.0);
        assert!((state.resource("grain") - 0.15 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_clamps_at_storage_limit() {
        let config = test_config();
        let mut state = staffed(&config, "woodcutter", 1);
        state.add_resource("wood", 100.0);

        production_system(&mut state, &config, 1.0);

        assert_eq!(state.resource("wood"), 100.0);
    }

    #[test]
    fn test_inn_draw_scales_with_tier_level() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.tier = "small_village".to_string();
        state.add_resource("bread", 10.0);
        state.inn_supplies.insert("bread".to_string(), true);

        inn_supply_system(&mut state, &config, 1.0);

        // Second tier: 0.5 × 2 per second.
        assert!((state.resource("bread") - 9.0).abs() < 1e-9);
        assert!(state.inn_supplies["bread"]);
    }

    #[test]
    fn test_inn_shortfall_unflags_instead_of_going_negative() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.add_resource("bread", 0.4);
        state.inn_supplies.insert("bread".to_string(), true);

        inn_supply_system(&mut state, &config, 1.0);

        assert_eq!(state.resource("bread"), 0.4);
        assert!(!state.inn_supplies["bread"]);
    }

    #[test]
    fn test_disabled_supplies_are_untouched() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.add_resource("bread", 10.0);

        inn_supply_system(&mut state, &config, 1.0);

        assert_eq!(state.resource("bread"), 10.0);
    }
}
