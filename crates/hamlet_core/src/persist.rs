//! Saving and restoring game state as plain JSON trees.
//!
//! A save is merged over a freshly constructed default state before
//! parsing, so fields added to the game after the save was written are
//! backfilled with their defaults instead of failing the load. Malformed
//! saves are discarded; the engine never crashes on bad persisted data.

use serde_json::Value;

use crate::config::GameConfig;
use crate::state::GameState;
use crate::stats;

/// Serialize `state` to a plain JSON tree.
#[must_use]
pub fn snapshot(state: &GameState) -> Value {
    match serde_json::to_value(state) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!(%error, "game state failed to serialize");
            Value::Null
        }
    }
}

/// Rebuild a state from a saved tree, merging it over defaults.
///
/// Saved leaves win over defaults; missing fields keep their default
/// value; saves that do not parse at all yield a fresh state. Derived
/// stats are recalculated, never trusted from the save.
#[must_use]
pub fn restore(config: &GameConfig, saved: &Value) -> GameState {
    let mut state = restore_raw(config, saved);
    stats::recalculate(&mut state, config);
    state
}

fn restore_raw(config: &GameConfig, saved: &Value) -> GameState {
    let defaults = GameState::new(config);
    if !saved.is_object() {
        tracing::warn!("saved state is not an object, starting fresh");
        return defaults;
    }

    let mut merged = match serde_json::to_value(&defaults) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!(%error, "default state failed to serialize");
            return defaults;
        }
    };
    deep_merge(&mut merged, saved);

    match serde_json::from_value(merged) {
        Ok(state) => state,
        Err(error) => {
            tracing::warn!(%error, "discarding malformed save");
            defaults
        }
    }
}

/// Overlay `saved` onto `base`, recursing through objects.
///
/// Non-object values, arrays included, replace the base wholesale. Keys
/// present only in the save are kept; the parser ignores the unknown ones.
pub fn deep_merge(base: &mut Value, saved: &Value) {
    match (base, saved) {
        (Value::Object(base_map), Value::Object(saved_map)) => {
            for (key, value) in saved_map {
                match base_map.get_mut(key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}
