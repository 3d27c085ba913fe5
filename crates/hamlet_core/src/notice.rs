//! Notices emitted by ticks and commands.
//!
//! The core never formats user-facing text. A [`Notice`] is a structured
//! message kind plus its parameters; the host maps it to localized display.

use serde::{Deserialize, Serialize};

/// Display severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Routine information.
    Info,
    /// A positive event worth highlighting.
    Success,
    /// Something went wrong or was refused.
    Error,
}

/// A structured notification from the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    /// A feature became available (a resource key, or `<building>_building`).
    FeatureUnlocked {
        /// The unlocked feature key.
        feature: String,
    },

    /// A building project entered the queue.
    BuildQueued {
        /// Building key.
        building: String,
    },

    /// A building project finished.
    BuildCompleted {
        /// Building key.
        building: String,
    },

    /// A queued project was cancelled and refunded.
    BuildCancelled {
        /// Building key.
        building: String,
    },

    /// A standing building was torn down.
    BuildingDemolished {
        /// Building key.
        building: String,
    },

    /// Food ran short and non-food production stopped.
    ProductionHalted,

    /// A new settler joined the settlement.
    SettlerArrived,

    /// The settlement advanced to a new tier.
    TierAdvanced {
        /// The new tier id.
        tier: String,
    },

    /// One-time celebration prompt for a tier flagged for it.
    TierCelebration {
        /// The new tier id.
        tier: String,
    },

    /// Summary of an offline catch-up run.
    OfflineSummary {
        /// Elapsed time formatted `"{hours}h {minutes}m"`.
        away: String,
        /// Settlers that arrived while away.
        population_gained: u32,
        /// Resources with a floored net gain of at least 2 units.
        resource_gains: Vec<(String, i64)>,
    },
}

impl Notice {
    /// Display severity for this notice.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Notice::ProductionHalted => Severity::Error,
            Notice::SettlerArrived => Severity::Success,
            _ => Severity::Info,
        }
    }
}
