//! # Hamlet Core
//!
//! Deterministic simulation core for the Hamlet settlement game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No wall-clock access
//! - No randomness
//!
//! This separation enables:
//! - Identical results frame-by-frame or fast-forwarded (offline catch-up)
//! - Headless runners and CI verification
//! - Determinism testing against state digests
//!
//! ## Crate Structure
//!
//! - [`config`] - validated game configuration (tiers, buildings, workers, foods)
//! - [`data`] - serde data types for config tables, plus the standard data set
//! - [`state`] - the mutable game-state aggregate
//! - [`stats`] - derived-stat recalculation
//! - [`workforce`] - worker assignment commands
//! - [`construction`] - build queue commands and progress
//! - [`food`] / [`production`] - the per-tick economy
//! - [`growth`] - settler arrival, tier advancement, feature unlocks
//! - [`engine`] - the tick orchestrator and command surface
//! - [`persist`] - snapshot/restore with deep merge over defaults

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod construction;
pub mod data;
pub mod engine;
pub mod error;
pub mod food;
pub mod growth;
pub mod notice;
pub mod persist;
pub mod production;
pub mod state;
pub mod stats;
pub mod workforce;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::GameConfig;
    pub use crate::construction::{BuildTime, PendingDemolition, RequirementReport, MAX_QUEUE_LEN};
    pub use crate::data::{
        BuildingData, BuildingEffect, BuildingRequires, FoodData, ResourceData, TierData,
        WorkerData,
    };
    pub use crate::engine::Engine;
    pub use crate::error::{CommandError, ConfigError, CostShortfall, RequirementFailure, Result};
    pub use crate::notice::{Notice, Severity};
    pub use crate::state::{BuildQueueEntry, BuildingState, GameState};
}
