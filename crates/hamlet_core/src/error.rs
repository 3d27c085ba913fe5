//! Error types for the simulation core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`CommandError`].
pub type Result<T> = std::result::Result<T, CommandError>;

/// Rejection returned by a player command.
///
/// Validation variants describe why the command was refused; state is left
/// untouched. The `Unknown*` variants are data-integrity failures (a key with
/// no config entry) and indicate a caller bug, not a player mistake.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// The build queue already holds the maximum number of entries.
    #[error("the build queue is full")]
    QueueFull,

    /// A unique building is already standing or already queued.
    #[error("{building} is already built or queued")]
    AlreadyBuiltOrQueued {
        /// Building key.
        building: String,
    },

    /// The current tier's building-count limit has been reached.
    #[error("building limit for tier {tier} reached ({limit})")]
    BuildingLimitReached {
        /// Current tier id.
        tier: String,
        /// The tier's building-count limit.
        limit: u32,
    },

    /// One or more non-cost requirements failed.
    #[error("requirements not met for {building}")]
    RequirementsNotMet {
        /// Building key.
        building: String,
        /// Every requirement that failed, in check order.
        failures: Vec<RequirementFailure>,
    },

    /// The full cost is not affordable.
    #[error("cannot afford {building}")]
    CannotAfford {
        /// Building key.
        building: String,
        /// Every resource that falls short.
        shortfalls: Vec<CostShortfall>,
    },

    /// Every settler already holds a job.
    #[error("no idle settlers available")]
    NoIdleSettlers,

    /// The derived worker limit has been reached.
    #[error("worker limit reached ({limit})")]
    WorkerLimitReached {
        /// Current derived worker limit.
        limit: u32,
    },

    /// Every slot for this job is taken.
    #[error("no open {job} slots")]
    NoOpenSlots {
        /// Job key.
        job: String,
    },

    /// Dropping the last builder would stall the active build.
    #[error("cannot unassign the last builder while {building} is under construction")]
    BuilderNeeded {
        /// Key of the building at the queue head.
        building: String,
    },

    /// Demolition target is not repeatable or has no standing instances.
    #[error("{building} cannot be demolished")]
    NotDemolishable {
        /// Building key.
        building: String,
    },

    /// Cancel index outside the queue.
    #[error("no build queue entry at index {index}")]
    InvalidQueueIndex {
        /// Requested index.
        index: usize,
    },

    /// Manual gathering is restricted to the first tier.
    #[error("manual gathering is no longer available")]
    GatherUnavailable,

    /// Building key with no config entry.
    #[error("unknown building key: {key}")]
    UnknownBuilding {
        /// The offending key.
        key: String,
    },

    /// Job key with no config entry.
    #[error("unknown job key: {key}")]
    UnknownJob {
        /// The offending key.
        key: String,
    },

    /// Resource key with no config entry.
    #[error("unknown resource key: {key}")]
    UnknownResource {
        /// The offending key.
        key: String,
    },
}

/// A single failed (non-cost) building requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementFailure {
    /// Population below the required threshold.
    Population {
        /// Required population.
        required: u32,
        /// Current population.
        current: u32,
    },
    /// Settlement tier below the required tier.
    Tier {
        /// Required tier id.
        required: String,
    },
    /// Prerequisite building not functionally met.
    MissingBuilding {
        /// Required building key.
        building: String,
    },
    /// Prerequisite building met but not staffed to its minimums.
    UnstaffedBuilding {
        /// Required building key.
        building: String,
        /// Job minimums that are not met, as `(job, required)`.
        missing: Vec<(String, u32)>,
    },
    /// Too few workers assigned to a specific job.
    NotEnoughWorkers {
        /// Job key.
        job: String,
        /// Required assigned count.
        required: u32,
        /// Currently assigned count.
        assigned: u32,
    },
}

/// One resource line of a failed affordability check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostShortfall {
    /// Resource key.
    pub resource: String,
    /// Amount the building costs.
    pub required: f64,
    /// Amount currently held.
    pub available: f64,
}

/// Error raised while loading or validating game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Failed to parse a RON config document.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// The tier table is empty.
    #[error("config defines no tiers")]
    NoTiers,

    /// Two table entries share a key.
    #[error("duplicate {kind} key: {key}")]
    DuplicateKey {
        /// Table name (tier, resource, building, worker, food).
        kind: &'static str,
        /// The duplicated key.
        key: String,
    },

    /// A table entry references a key that no table defines.
    #[error("{context} references unknown key: {key}")]
    UnknownReference {
        /// Where the reference appears.
        context: String,
        /// The missing key.
        key: String,
    },

    /// Upgrade links form a cycle.
    #[error("upgrade chain through {key} is cyclic")]
    UpgradeCycle {
        /// A key on the cycle.
        key: String,
    },

    /// Two buildings claim the same upgrade predecessor.
    #[error("buildings {first} and {second} both upgrade from {from}")]
    ConflictingUpgrade {
        /// First claimant.
        first: String,
        /// Second claimant.
        second: String,
        /// The shared predecessor.
        from: String,
    },

    /// A numeric field holds a value outside its valid range.
    #[error("{context}: {message}")]
    InvalidValue {
        /// Where the value appears.
        context: String,
        /// What is wrong with it.
        message: String,
    },
}
