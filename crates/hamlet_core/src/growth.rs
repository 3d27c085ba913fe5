//! Settler arrival and tier progression.

use serde::Serialize;

use crate::config::GameConfig;
use crate::notice::Notice;
use crate::state::GameState;
use crate::stats;

/// Arrival countdown for an empty settlement, in seconds.
pub const BASE_SETTLER_TIME: f64 = 10.0;
/// Seconds added per current settler, up to [`POP_PENALTY_CAP`].
const TIME_PER_POP: f64 = 1.5;
/// Settlers beyond this count no longer slow arrivals further.
const POP_PENALTY_CAP: u32 = 50;
/// Arrival countdown never drops below this many seconds.
const MIN_SETTLER_TIME: f64 = 5.0;

const INN: &str = "inn";
const INNKEEPER: &str = "innkeeper";
const TAVERN: &str = "tavern";
const TAVERN_MAID: &str = "tavern_maid";
const CHURCH: &str = "church";
const PRIEST: &str = "priest";
const HEALERS_HUT: &str = "healers_hut";
const HEALER: &str = "healer";

/// Flat settler-time bonus per good stocked at the inn.
const INN_SUPPLY_BONUSES: [(&str, f64); 3] = [("bread", 0.05), ("beer", 0.05), ("meat", 0.10)];

/// Breakdown of the next settler's arrival countdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SettlerTime {
    /// Countdown before amenity bonuses, grown by crowding.
    pub base: f64,
    /// Sum of all active amenity bonuses (additive fractions).
    pub bonus: f64,
    /// Final countdown in seconds, floored at the minimum.
    pub total: f64,
}

/// Compute the countdown the next settler would start from.
///
/// Crowding slows arrivals; amenities speed them up. Each amenity bonus
/// needs its building functionally met and its host worker assigned; the
/// tavern only adds on top of a staffed inn. Stocked inn goods add flat
/// bonuses whenever the inn stands, staffed or not.
#[must_use]
pub fn next_settler_time(state: &GameState, config: &GameConfig) -> SettlerTime {
    let crowd = state.total_workers.min(POP_PENALTY_CAP);
    let base = BASE_SETTLER_TIME + f64::from(crowd) * TIME_PER_POP;

    let mut bonus = 0.0;
    let inn_met = stats::is_functionally_met(state, config, INN);
    if inn_met && state.assigned(INNKEEPER) > 0 {
        bonus += amenity_bonus(config, INN);
        if stats::is_functionally_met(state, config, TAVERN) && state.assigned(TAVERN_MAID) > 0 {
            bonus += amenity_bonus(config, TAVERN);
        }
    }
    if stats::is_functionally_met(state, config, CHURCH) && state.assigned(PRIEST) > 0 {
        bonus += amenity_bonus(config, CHURCH);
    }
    if stats::is_functionally_met(state, config, HEALERS_HUT) && state.assigned(HEALER) > 0 {
        bonus += amenity_bonus(config, HEALERS_HUT);
    }
    if inn_met {
        for (good, extra) in INN_SUPPLY_BONUSES {
            if state.inn_supplies.get(good).copied().unwrap_or(false) {
                bonus += extra;
            }
        }
    }

    let total = (base * (1.0 - bonus)).max(MIN_SETTLER_TIME);
    SettlerTime { base, bonus, total }
}

fn amenity_bonus(config: &GameConfig, key: &str) -> f64 {
    config
        .building(key)
        .map_or(0.0, |def| def.effect.settler_time_bonus)
}

/// Count down to the next settler while housing is available.
///
/// On arrival the population grows by one and a fresh countdown is drawn,
/// reflecting the newcomer's crowding penalty and current amenities.
pub fn settler_system(state: &mut GameState, config: &GameConfig, delta: f64) -> Vec<Notice> {
    if state.total_workers >= state.population_limit {
        return Vec::new();
    }
    state.next_settler_in -= delta;
    if state.next_settler_in > 0.0 {
        return Vec::new();
    }

    state.total_workers += 1;
    let next = next_settler_time(state, config);
    state.next_settler_in = next.total;
    state.next_settler_total = next.total;
    vec![Notice::SettlerArrived]
}

/// Civic building each tier transition demands. Transitions without a rule
/// here cannot be taken regardless of population.
fn tier_gate(tier: &str) -> Option<&'static str> {
    match tier {
        "small_village" => Some("reeves_house"),
        "village" => Some("village_hall"),
        _ => None,
    }
}

/// Advance the settlement tier when population and civic gate allow it.
///
/// The candidate is the highest tier whose population threshold is met. A
/// failed gate blocks the whole transition; there is no fallback to an
/// intermediate tier. The tier never regresses.
pub fn tier_system(state: &mut GameState, config: &GameConfig) -> Vec<Notice> {
    let Some(current) = config.tier_ordinal(&state.tier) else {
        return Vec::new();
    };
    let Some(candidate) = config
        .tiers()
        .iter()
        .rev()
        .find(|tier| state.total_workers >= tier.population)
    else {
        return Vec::new();
    };
    let target = config.tier_ordinal(&candidate.id).unwrap_or(0);
    if target <= current {
        return Vec::new();
    }

    let gate_met = match tier_gate(&candidate.id) {
        Some(gate) => stats::is_functionally_met(state, config, gate),
        None => false,
    };
    if !gate_met {
        return Vec::new();
    }

    state.tier = candidate.id.clone();
    let mut notices = vec![Notice::TierAdvanced {
        tier: candidate.id.clone(),
    }];
    notices.extend(unlock_features(state, config, &candidate.unlocks));
    if candidate.celebrate {
        notices.push(Notice::TierCelebration {
            tier: candidate.id.clone(),
        });
    }
    notices
}

/// Add each feature the state does not hold yet, announcing every new one.
///
/// A `<key>_building` feature whose building has no definition is still
/// recorded but announced only in the log.
pub(crate) fn unlock_features(
    state: &mut GameState,
    config: &GameConfig,
    features: &[String],
) -> Vec<Notice> {
    let mut notices = Vec::new();
    for feature in features {
        if state.has_feature(feature) {
            continue;
        }
        state.unlocked_features.push(feature.clone());
        if let Some(key) = feature.strip_suffix("_building") {
            if config.building(key).is_none() {
                tracing::error!(building = key, "unlocked a building with no definition");
                continue;
            }
        }
        notices.push(Notice::FeatureUnlocked {
            feature: feature.clone(),
        });
    }
    notices
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::{BuildingData, BuildingEffect, ResourceData, TierData, WorkerData};

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

    fn amenity(key: &str, settler_time_bonus: f64) -> BuildingData {
        BuildingData {
            key: key.to_string(),
            name: String::new(),
            cost: BTreeMap::new(),
            repeatable: false,
            upgrades_from: None,
            requires: Default::default(),
            effect: BuildingEffect {
                settler_time_bonus,
                ..BuildingEffect::default()
            },
        }
    }

    fn worker(id: &str) -> WorkerData {
        WorkerData {
            id: id.to_string(),
            name: String::new(),
            produces: BTreeMap::new(),
            consumes: BTreeMap::new(),
        }
    }

    fn test_config() -> GameConfig {
        let mut village = tier("village", 30);
        village.unlocks = vec!["toolsmithy_building".to_string()];
        village.celebrate = true;

        GameConfig::new(
            vec![tier("settlement", 0), tier("small_village", 10), village],
            vec![
                ResourceData {
                    id: "bread".to_string(),
                    base_storage: 100.0,
                    food_chain: true,
                },
                ResourceData {
                    id: "beer".to_string(),
                    base_storage: 100.0,
                    food_chain: true,
                },
                ResourceData {
                    id: "meat".to_string(),
                    base_storage: 100.0,
                    food_chain: true,
                },
            ],
            vec![
                amenity("inn", 0.15),
                amenity("tavern", 0.10),
                amenity("church", 0.10),
                amenity("healers_hut", 0.10),
                amenity("reeves_house", 0.0),
                amenity("village_hall", 0.0),
                amenity("toolsmithy", 0.0),
            ],
            vec![
                worker("innkeeper"),
                worker("tavern_maid"),
                worker("priest"),
                worker("healer"),
            ],
            vec![],
            vec![],
        )
        .unwrap()
    }

    fn built(state: &mut GameState, key: &str) {
        state.buildings.get_mut(key).unwrap().is_built = true;
    }

    fn assign(state: &mut GameState, job: &str, count: u32) {
        state.assigned_workers.insert(job.to_string(), count);
    }

    #[test]
    fn test_base_time_grows_with_crowding_up_to_the_cap() {
        let config = test_config();
        let mut state = GameState::new(&config);

        state.total_workers = 10;
        assert_eq!(next_settler_time(&state, &config).base, 25.0);

        state.total_workers = 200;
        assert_eq!(next_settler_time(&state, &config).base, 85.0);
    }

    #[test]
    fn test_amenity_bonuses_stack_additively() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.total_workers = 50;
        built(&mut state, "inn");
        assign(&mut state, "innkeeper", 1);
        built(&mut state, "tavern");
        assign(&mut state, "tavern_maid", 1);
        state.inn_supplies.insert("bread".to_string(), true);
        state.inn_supplies.insert("meat".to_string(), true);

        let time = next_settler_time(&state, &config);

        // inn 0.15 + tavern 0.10 + bread 0.05 + meat 0.10
        assert!((time.bonus - 0.40).abs() < 1e-12);
        assert!((time.total - 85.0 * 0.60).abs() < 1e-9);
    }

    #[test]
    fn test_tavern_needs_a_staffed_inn() {
        let config = test_config();
        let mut state = GameState::new(&config);
        built(&mut state, "inn");
        built(&mut state, "tavern");
        assign(&mut state, "tavern_maid", 1);
        // No innkeeper: neither inn nor tavern bonus applies.

        assert_eq!(next_settler_time(&state, &config).bonus, 0.0);
    }

    #[test]
    fn test_stocked_goods_count_only_with_an_inn() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.inn_supplies.insert("bread".to_string(), true);
        state.inn_supplies.insert("beer".to_string(), true);

        assert_eq!(next_settler_time(&state, &config).bonus, 0.0);

        built(&mut state, "inn");
        // Stocked goods apply even without an innkeeper.
        let time = next_settler_time(&state, &config);
        assert!((time.bonus - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_countdown_floor_is_five_seconds() {
        let config = test_config();
        let mut state = GameState::new(&config);
        built(&mut state, "inn");
        assign(&mut state, "innkeeper", 1);
        built(&mut state, "tavern");
        assign(&mut state, "tavern_maid", 1);
        built(&mut state, "church");
        assign(&mut state, "priest", 1);
        built(&mut state, "healers_hut");
        assign(&mut state, "healer", 1);
        state.inn_supplies.insert("bread".to_string(), true);
        state.inn_supplies.insert("beer".to_string(), true);
        state.inn_supplies.insert("meat".to_string(), true);
        // Bonus 0.65 against a 10s base would give 3.5s.

        assert_eq!(next_settler_time(&state, &config).total, 5.0);
    }

    #[test]
    fn test_settlers_arrive_only_below_the_population_limit() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.total_workers = 3;
        state.population_limit = 3;
        state.next_settler_in = 1.0;

        assert!(settler_system(&mut state, &config, 5.0).is_empty());
        assert_eq!(state.next_settler_in, 1.0);
        assert_eq!(state.total_workers, 3);
    }

    #[test]
    fn test_arrival_grows_population_and_redraws_the_countdown() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.population_limit = 5;
        state.next_settler_in = 0.5;

        let notices = settler_system(&mut state, &config, 1.0);

        assert_eq!(notices, vec![Notice::SettlerArrived]);
        assert_eq!(state.total_workers, 1);
        // New countdown includes the newcomer's crowding penalty.
        assert_eq!(state.next_settler_in, 11.5);
        assert_eq!(state.next_settler_total, 11.5);
    }

    #[test]
    fn test_tier_advances_through_its_gate() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.total_workers = 10;

        // Gate building missing: population alone is not enough.
        assert!(tier_system(&mut state, &config).is_empty());
        assert_eq!(state.tier, "settlement");

        built(&mut state, "reeves_house");
        let notices = tier_system(&mut state, &config);

        assert_eq!(
            notices,
            vec![Notice::TierAdvanced {
                tier: "small_village".to_string()
            }]
        );
        assert_eq!(state.tier, "small_village");
    }

    #[test]
    fn test_failed_gate_blocks_without_intermediate_fallback() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.total_workers = 30;
        built(&mut state, "reeves_house");
        // Candidate is village; its hall is missing. No advancement at all,
        // not even to small_village.

        assert!(tier_system(&mut state, &config).is_empty());
        assert_eq!(state.tier, "settlement");
    }

    #[test]
    fn test_tier_jump_lands_on_the_candidate() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.total_workers = 30;
        built(&mut state, "village_hall");

        let notices = tier_system(&mut state, &config);

        assert_eq!(state.tier, "village");
        assert_eq!(
            notices,
            vec![
                Notice::TierAdvanced {
                    tier: "village".to_string()
                },
                Notice::FeatureUnlocked {
                    feature: "toolsmithy_building".to_string()
                },
                Notice::TierCelebration {
                    tier: "village".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_tier_never_regresses() {
        let config = test_config();
        let mut state = GameState::new(&config);
        state.tier = "village".to_string();
        state.total_workers = 0;

        assert!(tier_system(&mut state, &config).is_empty());
        assert_eq!(state.tier, "village");
    }

    #[test]
    fn test_unlocks_are_deduplicated() {
        let config = test_config();
        let mut state = GameState::new(&config);
        let features = vec!["brewing".to_string(), "brewing".to_string()];

        let notices = unlock_features(&mut state, &config, &features);
        assert_eq!(notices.len(), 1);

        let notices = unlock_features(&mut state, &config, &features);
        assert!(notices.is_empty());
        assert_eq!(state.unlocked_features, vec!["brewing".to_string()]);
    }

    #[test]
    fn test_undefined_building_unlock_is_recorded_but_silent() {
        let config = test_config();
        let mut state = GameState::new(&config);
        let features = vec!["ghost_mill_building".to_string(), "inn_building".to_string()];

        let notices = unlock_features(&mut state, &config, &features);

        assert_eq!(
            notices,
            vec![Notice::FeatureUnlocked {
                feature: "inn_building".to_string()
            }]
        );
        assert!(state.has_feature("ghost_mill_building"));
    }
}
