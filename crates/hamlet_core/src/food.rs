//! Food consumption and the famine halt.
//!
//! Workers draw satiation from whichever supplied foods hold a positive
//! balance. Cheap foods are eaten in larger shares; varied diets stack
//! production bonuses. When the supplied foods cannot cover the tick,
//! production halts until food returns.

use crate::config::GameConfig;
use crate::data::FoodData;
use crate::notice::Notice;
use crate::state::GameState;

/// Consume food for every assigned worker and set the tick's production
/// bonus, halting production on a shortfall.
///
/// One worker needs one satiation unit per second. Each available food
/// contributes `balance / consumption` satiation; consumption is split
/// across available foods by attractiveness, so the total satiation drawn
/// is exactly `workers × delta` when balances suffice. A shortfall halts
/// production without consuming anything.
pub fn food_system(state: &mut GameState, config: &GameConfig, delta: f64) -> Vec<Notice> {
    let workers = state.assigned_total();

    state.production_bonus = 1.0;
    for rate in state.food_rates.values_mut() {
        *rate = 0.0;
    }
    let was_halted = state.production_halted;
    state.production_halted = false;

    if workers == 0 {
        return Vec::new();
    }

    let available: Vec<&FoodData> = config
        .foods()
        .filter(|food| {
            state
                .supplied_foods
                .get(&food.resource)
                .copied()
                .unwrap_or(false)
                && state.resource(&food.resource) > 0.0
        })
        .collect();
    let total_attractiveness: f64 = available.iter().map(|f| f.attractiveness()).sum();

    if total_attractiveness > 0.0 {
        let satiation: f64 = available
            .iter()
            .map(|food| state.resource(&food.resource) / food.consumption)
            .sum();
        let needed = f64::from(workers) * delta;

        if satiation >= needed {
            state.production_bonus = 1.0 + available.iter().map(|f| f.bonus).sum::<f64>();
            for food in &available {
                let share = food.attractiveness() / total_attractiveness;
                let per_second = f64::from(workers) * share * food.consumption;
                let eaten = (per_second * delta).min(state.resource(&food.resource));
                if let Some(balance) = state.resources.get_mut(&food.resource) {
                    *balance -= eaten;
                }
                state.food_rates.insert(food.resource.clone(), per_second);
            }
        } else {
            state.production_halted = true;
        }
    } else {
        state.production_halted = true;
    }

    if state.production_halted && !was_halted {
        vec![Notice::ProductionHalted]
    } else {
        Vec::new()
    }
}
