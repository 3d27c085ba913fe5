//! Worker assignment commands.
//!
//! Settlers are a single pool; assigning one to a job consumes an idle
//! settler, unassigning returns it. Every successful change triggers a full
//! stat recalculation so capacity bonuses (foreman, assistants) apply at once.

use crate::config::GameConfig;
use crate::error::{CommandError, Result};
use crate::state::GameState;
use crate::stats;

/// Job key of the builder. Construction speed and the last-builder guard
/// key off this job.
pub(crate) const BUILDER_JOB: &str = "builder";

/// Assign one idle settler to `job`.
///
/// Fails when no settler is idle, the staffing limit is reached, or the job
/// has no open slot.
pub fn assign_worker(state: &mut GameState, config: &GameConfig, job: &str) -> Result<()> {
    if config.worker(job).is_none() {
        return Err(CommandError::UnknownJob {
            key: job.to_string(),
        });
    }
    let assigned_total = state.assigned_total();
    if assigned_total >= state.total_workers {
        return Err(CommandError::NoIdleSettlers);
    }
    if assigned_total >= state.worker_limit {
        return Err(CommandError::WorkerLimitReached {
            limit: state.worker_limit,
        });
    }
    let slots = state.worker_slots.get(job).copied().unwrap_or(0);
    if state.assigned(job) >= slots {
        return Err(CommandError::NoOpenSlots {
            job: job.to_string(),
        });
    }

    *state.assigned_workers.entry(job.to_string()).or_insert(0) += 1;
    stats::recalculate(state, config);
    Ok(())
}

/// Return one worker from `job` to the idle pool.
///
/// Removing the last builder while construction is pending is refused above
/// the starting tier (where settlers no longer build unaided) unless `force`
/// is set. Unassigning from an empty job is a quiet no-op.
pub fn unassign_worker(
    state: &mut GameState,
    config: &GameConfig,
    job: &str,
    force: bool,
) -> Result<()> {
    if config.worker(job).is_none() {
        return Err(CommandError::UnknownJob {
            key: job.to_string(),
        });
    }
    if !force
        && job == BUILDER_JOB
        && !state.build_queue.is_empty()
        && state.assigned(BUILDER_JOB) <= 1
        && state.tier != config.first_tier().id
    {
        return Err(CommandError::BuilderNeeded {
            building: state.build_queue[0].building.clone(),
        });
    }

    let Some(assigned) = state.assigned_workers.get_mut(job) else {
        return Ok(());
    };
    if *assigned == 0 {
        return Ok(());
    }
    *assigned -= 1;
    stats::recalculate(state, config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::{BuildingData, BuildingEffect, ResourceData, TierData, WorkerData};
    use crate::state::BuildQueueEntry;

    fn worker(id: &str) -> WorkerData {
        WorkerData {
            id: id.to_string(),
            name: String::new(),
            produces: BTreeMap::new(),
            consumes: BTreeMap::new(),
        }
    }

    fn test_config() -> GameConfig {
        let camp = BuildingData {
            key: "camp".to_string(),
            name: String::new(),
            cost: BTreeMap::new(),
            repeatable: false,
            upgrades_from: None,
            requires: Default::default(),
            effect: BuildingEffect {
                population: 10,
                worker_limit: 3,
                worker_slots: BTreeMap::from([
                    ("woodcutter".to_string(), 2),
                    ("builder".to_string(), 2),
                    ("foreman".to_string(), 1),
                ]),
                ..BuildingEffect::default()
            },
        };
        GameConfig::new(
            vec![
                TierData {
                    id: "settlement".to_string(),
                    name: String::new(),
                    population: 0,
                    building_limit: 20,
                    unlocks: Vec::new(),
                    celebrate: false,
                },
                TierData {
                    id: "small_village".to_string(),
                    name: String::new(),
                    population: 10,
                    building_limit: 20,
                    unlocks: Vec::new(),
                    celebrate: false,
                },
            ],
            vec![ResourceData {
                id: "wood".to_string(),
                base_storage: 100.0,
                food_chain: false,
            }],
            vec![camp],
            vec![worker("woodcutter"), worker("builder"), worker("foreman")],
            vec![],
            vec![],
        )
        .unwrap()
    }

    fn test_state(config: &GameConfig, settlers: u32) -> GameState {
        let mut state = GameState::new(config);
        state.buildings.get_mut("camp").unwrap().is_built = true;
        state.total_workers = settlers;
        stats::recalculate(&mut state, config);
        state
    }

    #[test]
    fn test_assign_requires_idle_settler() {
        let config = test_config();
        let mut state = test_state(&config, 0);

        let err = assign_worker(&mut state, &config, "woodcutter").unwrap_err();

        assert_eq!(err, CommandError::NoIdleSettlers);
        assert_eq!(state.assigned("woodcutter"), 0);
    }

    #[test]
    fn test_assign_respects_worker_limit() {
        let config = test_config();
        let mut state = test_state(&config, 10);
        assign_worker(&mut state, &config, "woodcutter").unwrap();
        assign_worker(&mut state, &config, "woodcutter").unwrap();
        assign_worker(&mut state, &config, "builder").unwrap();

        // Limit of 3 reached even though slots remain.
        let err = assign_worker(&mut state, &config, "builder").unwrap_err();

        assert_eq!(err, CommandError::WorkerLimitReached { limit: 3 });
    }

    #[test]
    fn test_assign_respects_job_slots() {
        let config = test_config();
        let mut state = test_state(&config, 10);
        assign_worker(&mut state, &config, "foreman").unwrap();

        let err = assign_worker(&mut state, &config, "foreman").unwrap_err();

        assert_eq!(
            err,
            CommandError::NoOpenSlots {
                job: "foreman".to_string()
            }
        );
    }

    #[test]
    fn test_assign_recalculates_capacity_bonuses() {
        let config = test_config();
        let mut state = test_state(&config, 10);

        assign_worker(&mut state, &config, "foreman").unwrap();

        // Foreman bonus lands immediately.
        assert_eq!(state.worker_limit, 3 + 30);
    }

    #[test]
    fn test_unknown_job_is_rejected() {
        let config = test_config();
        let mut state = test_state(&config, 10);

        let err = assign_worker(&mut state, &config, "alchemist").unwrap_err();

        assert_eq!(
            err,
            CommandError::UnknownJob {
                key: "alchemist".to_string()
            }
        );
    }

    #[test]
    fn test_last_builder_is_kept_while_queue_pending() {
        let config = test_config();
        let mut state = test_state(&config, 10);
        state.tier = "small_village".to_string();
        assign_worker(&mut state, &config, "builder").unwrap();
        state.build_queue.push(BuildQueueEntry {
            building: "camp".to_string(),
            progress: 0.0,
            total_time: Some(10.0),
        });

        let err = unassign_worker(&mut state, &config, "builder", false).unwrap_err();
        assert_eq!(
            err,
            CommandError::BuilderNeeded {
                building: "camp".to_string()
            }
        );

        unassign_worker(&mut state, &config, "builder", true).unwrap();
        assert_eq!(state.assigned("builder"), 0);
    }

    #[test]
    fn test_last_builder_guard_skipped_at_first_tier() {
        let config = test_config();
        let mut state = test_state(&config, 10);
        assign_worker(&mut state, &config, "builder").unwrap();
        state.build_queue.push(BuildQueueEntry {
            building: "camp".to_string(),
            progress: 0.0,
            total_time: Some(10.0),
        });

        unassign_worker(&mut state, &config, "builder", false).unwrap();

        assert_eq!(state.assigned("builder"), 0);
    }

    #[test]
    fn test_unassign_from_empty_job_is_a_no_op() {
        let config = test_config();
        let mut state = test_state(&config, 10);

        unassign_worker(&mut state, &config, "woodcutter", false).unwrap();

        assert_eq!(state.assigned("woodcutter"), 0);
    }
}
