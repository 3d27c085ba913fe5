//! The built-in standard data set.
//!
//! A complete playable village: five tiers, the food chain from grain to
//! beer, the staffing-capacity building ladder, and the civic buildings the
//! tier gates name. Hosts wanting different balance load their own RON
//! document through [`GameConfig::from_ron`] instead.

use std::collections::BTreeMap;

use crate::config::GameConfig;

use super::{
    BuildingData, BuildingEffect, BuildingRequires, FoodData, PrerequisiteBuilding, ResourceData,
    TierData, WorkerData,
};

/// The standard tables as a validated config.
#[must_use]
pub fn standard_config() -> GameConfig {
    match GameConfig::new(
        tiers(),
        resources(),
        buildings(),
        workers(),
        foods(),
        names(&["wood", "stone", "clay", "grain", "settlers_cabin_building"]),
    ) {
        Ok(config) => config,
        Err(error) => unreachable!("standard tables failed validation: {error}"),
    }
}

fn tiers() -> Vec<TierData> {
    vec![
        tier("settlement", 0, 5, &[], false),
        tier(
            "small_village",
            10,
            10,
            &[
                "fishermans_hut_building",
                "ranch_building",
                "hop_farm_building",
                "apiary_building",
                "herb_garden_building",
                "inn_building",
                "workers_barracks_building",
                "village_hall_building",
            ],
            false,
        ),
        tier(
            "village",
            30,
            15,
            &[
                "church_building",
                "toolsmithy_building",
                "workers_guildhall_building",
            ],
            true,
        ),
        tier("small_town", 60, 20, &[], true),
        tier("town", 100, 25, &[], true),
    ]
}

fn resources() -> Vec<ResourceData> {
    vec![
        resource("wood", 100.0, false),
        resource("stone", 100.0, false),
        resource("clay", 100.0, false),
        resource("grain", 100.0, true),
        resource("flour", 0.0, true),
        resource("water", 0.0, true),
        resource("bread", 0.0, true),
        resource("fish", 0.0, true),
        resource("cattle", 0.0, true),
        resource("meat", 0.0, true),
        resource("hops", 0.0, true),
        resource("beer", 0.0, true),
        resource("honey", 0.0, true),
        resource("herbs", 0.0, false),
        resource("tools", 0.0, false),
    ]
}

#[allow(clippy::too_many_lines)]
fn buildings() -> Vec<BuildingData> {
    vec![
        building(
            "settlers_cabin",
            &[("wood", 10.0)],
            BuildingRequires::default(),
            BuildingEffect {
                population: 5,
                worker_limit: 5,
                worker_slots: counts(&[
                    ("builder", 2),
                    ("clay_digger", 1),
                    ("farmer", 2),
                    ("stonecutter", 2),
                    ("woodcutter", 2),
                ]),
                building_unlocks: names(&[
                    "house_building",
                    "storehouse_building",
                    "lumber_camp_building",
                    "quarry_building",
                    "clay_pit_building",
                    "farm_building",
                    "workers_quarters_building",
                ]),
                ..BuildingEffect::default()
            },
        ),
        repeatable(
            "house",
            &[("wood", 20.0), ("clay", 5.0)],
            needs_population(3),
            BuildingEffect {
                population: 5,
                ..BuildingEffect::default()
            },
        ),
        repeatable(
            "storehouse",
            &[("wood", 25.0)],
            needs_population(5),
            BuildingEffect {
                storage: amounts(&[("wood", 100.0), ("stone", 100.0), ("clay", 100.0)]),
                ..BuildingEffect::default()
            },
        ),
        repeatable(
            "granary",
            &[("wood", 20.0), ("clay", 10.0)],
            needs_population(5),
            BuildingEffect {
                storage: amounts(&[
                    ("grain", 100.0),
                    ("flour", 50.0),
                    ("bread", 50.0),
                    ("fish", 50.0),
                    ("meat", 50.0),
                    ("honey", 25.0),
                ]),
                ..BuildingEffect::default()
            },
        ),
        repeatable(
            "lumber_camp",
            &[("wood", 15.0)],
            needs_population(4),
            BuildingEffect {
                worker_slots: counts(&[("woodcutter", 3)]),
                ..BuildingEffect::default()
            },
        ),
        repeatable(
            "quarry",
            &[("wood", 20.0)],
            needs_population(4),
            BuildingEffect {
                worker_slots: counts(&[("stonecutter", 3)]),
                ..BuildingEffect::default()
            },
        ),
        repeatable(
            "clay_pit",
            &[("wood", 15.0)],
            needs_population(4),
            BuildingEffect {
                worker_slots: counts(&[("clay_digger", 2)]),
                ..BuildingEffect::default()
            },
        ),
        repeatable(
            "farm",
            &[("wood", 25.0), ("stone", 5.0)],
            needs_population(5),
            BuildingEffect {
                worker_slots: counts(&[("farmer", 3)]),
                storage: amounts(&[("grain", 50.0)]),
                building_unlocks: names(&[
                    "well_building",
                    "mill_building",
                    "granary_building",
                ]),
                ..BuildingEffect::default()
            },
        ),
        repeatable(
            "well",
            &[("stone", 15.0), ("clay", 5.0)],
            needs_population(5),
            BuildingEffect {
                worker_slots: counts(&[("water_carrier", 2)]),
                storage: amounts(&[("water", 50.0)]),
                unlocks: names(&["water"]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "mill",
            &[("wood", 30.0), ("stone", 20.0)],
            BuildingRequires {
                population: Some(8),
                building: Some(met("farm")),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("miller", 2)]),
                storage: amounts(&[("flour", 50.0)]),
                unlocks: names(&["flour"]),
                building_unlocks: names(&["bakery_building"]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "bakery",
            &[("wood", 25.0), ("stone", 15.0), ("clay", 10.0)],
            BuildingRequires {
                population: Some(10),
                building: Some(met("mill")),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("baker", 2)]),
                storage: amounts(&[("bread", 50.0)]),
                unlocks: names(&["bread"]),
                ..BuildingEffect::default()
            },
        ),
        repeatable(
            "fishermans_hut",
            &[("wood", 20.0)],
            BuildingRequires {
                population: Some(6),
                tier: Some("small_village".to_string()),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("fisherman", 2)]),
                storage: amounts(&[("fish", 30.0)]),
                unlocks: names(&["fish"]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "ranch",
            &[("wood", 35.0), ("stone", 10.0)],
            BuildingRequires {
                population: Some(12),
                tier: Some("small_village".to_string()),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("rancher", 2)]),
                storage: amounts(&[("cattle", 20.0)]),
                unlocks: names(&["cattle"]),
                building_unlocks: names(&["butchery_building"]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "butchery",
            &[("wood", 25.0), ("stone", 15.0)],
            BuildingRequires {
                population: Some(14),
                building: Some(staffed("ranch", &[("rancher", 1)])),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("butcher", 2)]),
                storage: amounts(&[("meat", 40.0)]),
                unlocks: names(&["meat"]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "hop_farm",
            &[("wood", 25.0)],
            BuildingRequires {
                population: Some(12),
                tier: Some("small_village".to_string()),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("hop_farmer", 2)]),
                storage: amounts(&[("hops", 40.0)]),
                unlocks: names(&["hops"]),
                building_unlocks: names(&["brewery_building"]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "brewery",
            &[("wood", 30.0), ("stone", 20.0), ("clay", 10.0)],
            BuildingRequires {
                population: Some(15),
                building: Some(met("hop_farm")),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("brewer", 2)]),
                storage: amounts(&[("beer", 40.0)]),
                unlocks: names(&["beer"]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "apiary",
            &[("wood", 15.0)],
            BuildingRequires {
                population: Some(10),
                tier: Some("small_village".to_string()),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("beekeeper", 1)]),
                storage: amounts(&[("honey", 20.0)]),
                unlocks: names(&["honey"]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "herb_garden",
            &[("wood", 10.0)],
            BuildingRequires {
                population: Some(10),
                tier: Some("small_village".to_string()),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("herbalist", 1)]),
                storage: amounts(&[("herbs", 20.0)]),
                unlocks: names(&["herbs"]),
                building_unlocks: names(&["healers_hut_building"]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "healers_hut",
            &[("wood", 30.0), ("stone", 10.0)],
            BuildingRequires {
                population: Some(20),
                tier: Some("village".to_string()),
                building: Some(staffed("herb_garden", &[("herbalist", 1)])),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("healer", 1)]),
                settler_time_bonus: 0.10,
                ..BuildingEffect::default()
            },
        ),
        building(
            "toolsmithy",
            &[("wood", 30.0), ("stone", 25.0)],
            BuildingRequires {
                population: Some(25),
                tier: Some("village".to_string()),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("toolmaker", 2)]),
                storage: amounts(&[("tools", 20.0)]),
                unlocks: names(&["tools"]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "workers_quarters",
            &[("wood", 15.0)],
            needs_population(5),
            BuildingEffect {
                worker_limit: 10,
                worker_slots: counts(&[("foreman", 1), ("foreman_assistant", 2)]),
                building_unlocks: names(&["reeves_house_building"]),
                ..BuildingEffect::default()
            },
        ),
        upgrade(
            "workers_barracks",
            "workers_quarters",
            &[("wood", 40.0), ("stone", 20.0)],
            BuildingRequires {
                population: Some(15),
                tier: Some("small_village".to_string()),
                building: Some(met("workers_quarters")),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_limit: 25,
                worker_slots: counts(&[("foreman", 1), ("foreman_assistant", 4)]),
                ..BuildingEffect::default()
            },
        ),
        upgrade(
            "workers_guildhall",
            "workers_barracks",
            &[("wood", 80.0), ("stone", 60.0), ("clay", 30.0)],
            BuildingRequires {
                population: Some(35),
                tier: Some("village".to_string()),
                building: Some(met("workers_barracks")),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_limit: 50,
                worker_slots: counts(&[("foreman", 1), ("foreman_assistant", 6)]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "reeves_house",
            &[("wood", 20.0), ("stone", 10.0)],
            needs_population(8),
            BuildingEffect {
                worker_limit: 5,
                ..BuildingEffect::default()
            },
        ),
        building(
            "village_hall",
            &[("wood", 50.0), ("stone", 30.0), ("clay", 15.0)],
            BuildingRequires {
                population: Some(25),
                tier: Some("small_village".to_string()),
                building: Some(met("reeves_house")),
                worker: Some(("builder".to_string(), 2)),
            },
            BuildingEffect {
                population: 2,
                worker_limit: 10,
                ..BuildingEffect::default()
            },
        ),
        building(
            "inn",
            &[("wood", 50.0), ("stone", 20.0)],
            BuildingRequires {
                population: Some(10),
                tier: Some("small_village".to_string()),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("innkeeper", 1)]),
                storage: amounts(&[("bread", 20.0), ("beer", 20.0), ("meat", 20.0)]),
                settler_time_bonus: 0.15,
                building_unlocks: names(&["tavern_building"]),
                ..BuildingEffect::default()
            },
        ),
        building(
            "tavern",
            &[("wood", 40.0), ("stone", 15.0)],
            BuildingRequires {
                population: Some(18),
                tier: Some("small_village".to_string()),
                building: Some(staffed("inn", &[("innkeeper", 1)])),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("tavern_maid", 2)]),
                settler_time_bonus: 0.10,
                ..BuildingEffect::default()
            },
        ),
        building(
            "church",
            &[("wood", 60.0), ("stone", 40.0)],
            BuildingRequires {
                population: Some(30),
                tier: Some("village".to_string()),
                ..BuildingRequires::default()
            },
            BuildingEffect {
                worker_slots: counts(&[("priest", 1)]),
                settler_time_bonus: 0.10,
                ..BuildingEffect::default()
            },
        ),
    ]
}

fn workers() -> Vec<WorkerData> {
    vec![
        worker("builder", &[], &[]),
        worker("woodcutter", &[("wood", 0.1)], &[]),
        worker("stonecutter", &[("stone", 0.08)], &[]),
        worker("clay_digger", &[("clay", 0.08)], &[]),
        worker("farmer", &[("grain", 0.15)], &[]),
        worker("miller", &[("flour", 0.1)], &[("grain", 0.2)]),
        worker("water_carrier", &[("water", 0.15)], &[]),
        worker(
            "baker",
            &[("bread", 0.06)],
            &[("flour", 0.08), ("water", 0.08)],
        ),
        worker("fisherman", &[("fish", 0.07)], &[]),
        worker("rancher", &[("cattle", 0.04)], &[("grain", 0.05)]),
        worker("butcher", &[("meat", 0.05)], &[("cattle", 0.06)]),
        worker("hop_farmer", &[("hops", 0.08)], &[]),
        worker(
            "brewer",
            &[("beer", 0.05)],
            &[("hops", 0.06), ("water", 0.08), ("grain", 0.04)],
        ),
        worker("beekeeper", &[("honey", 0.03)], &[]),
        worker("herbalist", &[("herbs", 0.05)], &[]),
        worker(
            "toolmaker",
            &[("tools", 0.02)],
            &[("wood", 0.05), ("stone", 0.05)],
        ),
        worker("foreman", &[], &[]),
        worker("foreman_assistant", &[], &[]),
        worker("innkeeper", &[], &[]),
        worker("tavern_maid", &[], &[]),
        worker("priest", &[], &[]),
        worker("healer", &[], &[]),
    ]
}

fn foods() -> Vec<FoodData> {
    vec![
        FoodData {
            resource: "grain".to_string(),
            consumption: 0.3,
            bonus: 0.0,
            default_supplied: true,
        },
        food("bread", 0.2, 0.03),
        food("fish", 0.25, 0.03),
        food("meat", 0.15, 0.05),
        food("beer", 0.18, 0.03),
        food("honey", 0.17, 0.02),
    ]
}

fn tier(id: &str, population: u32, building_limit: u32, unlocks: &[&str], celebrate: bool) -> TierData {
    TierData {
        id: id.to_string(),
        name: format!("tier.{id}.name"),
        population,
        building_limit,
        unlocks: names(unlocks),
        celebrate,
    }
}

fn resource(id: &str, base_storage: f64, food_chain: bool) -> ResourceData {
    ResourceData {
        id: id.to_string(),
        base_storage,
        food_chain,
    }
}

fn food(resource: &str, consumption: f64, bonus: f64) -> FoodData {
    FoodData {
        resource: resource.to_string(),
        consumption,
        bonus,
        default_supplied: false,
    }
}

fn worker(id: &str, produces: &[(&str, f64)], consumes: &[(&str, f64)]) -> WorkerData {
    WorkerData {
        id: id.to_string(),
        name: format!("worker.{id}.name"),
        produces: amounts(produces),
        consumes: amounts(consumes),
    }
}

fn building(
    key: &str,
    cost: &[(&str, f64)],
    requires: BuildingRequires,
    effect: BuildingEffect,
) -> BuildingData {
    BuildingData {
        key: key.to_string(),
        name: format!("building.{key}.name"),
        cost: amounts(cost),
        repeatable: false,
        upgrades_from: None,
        requires,
        effect,
    }
}

fn repeatable(
    key: &str,
    cost: &[(&str, f64)],
    requires: BuildingRequires,
    effect: BuildingEffect,
) -> BuildingData {
    BuildingData {
        repeatable: true,
        ..building(key, cost, requires, effect)
    }
}

fn upgrade(
    key: &str,
    from: &str,
    cost: &[(&str, f64)],
    requires: BuildingRequires,
    effect: BuildingEffect,
) -> BuildingData {
    BuildingData {
        upgrades_from: Some(from.to_string()),
        ..building(key, cost, requires, effect)
    }
}

fn needs_population(count: u32) -> BuildingRequires {
    BuildingRequires {
        population: Some(count),
        ..BuildingRequires::default()
    }
}

fn met(key: &str) -> PrerequisiteBuilding {
    PrerequisiteBuilding {
        key: key.to_string(),
        staffed: false,
        worker_minimums: BTreeMap::new(),
    }
}

fn staffed(key: &str, minimums: &[(&str, u32)]) -> PrerequisiteBuilding {
    PrerequisiteBuilding {
        key: key.to_string(),
        staffed: true,
        worker_minimums: counts(minimums),
    }
}

fn amounts(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

fn counts(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}
