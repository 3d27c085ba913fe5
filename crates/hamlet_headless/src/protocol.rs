//! JSON protocol for driving a village without a UI.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the driving process
//! **Output (stdout):** Village state and event responses
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","tick":0}`
//! 2. Driver sends commands as JSON lines
//! 3. Runner answers every command; `tick` replies carry the events the
//!    elapsed seconds produced
//! 4. `{"cmd":"quit"}` is answered with `{"type":"bye"}` and the runner exits
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0}
//! -> {"cmd":"gather","resource":"wood"}
//! <- {"type":"ack","cmd":"gather"}
//! -> {"cmd":"build","building":"settlers_cabin"}
//! <- {"type":"events","tick":0,"events":[{"severity":"info","kind":"build_queued","building":"settlers_cabin"}]}
//! -> {"cmd":"tick","count":60}
//! <- {"type":"events","tick":60,"events":[{"severity":"info","kind":"build_completed","building":"settlers_cabin"}]}
//! -> {"cmd":"query"}
//! <- {"type":"state","tick":60,"tier":"settlement",...}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hamlet_core::error::RequirementFailure;
use hamlet_core::notice::{Notice, Severity};

// ============================================================================
// Input Commands (Driver -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the village by N whole seconds (default: 1).
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Report the current village state without advancing time.
    Query,

    /// Gather one unit of a resource by hand.
    Gather {
        /// Resource key.
        resource: String,
    },

    /// Queue a building for construction.
    Build {
        /// Building key.
        building: String,
    },

    /// Cancel the queued order at `index`, refunding its cost.
    CancelBuild {
        /// Zero-based queue position.
        index: usize,
    },

    /// Tear down one instance of a repeatable building for a half refund.
    Demolish {
        /// Building key.
        building: String,
    },

    /// Assign one idle settler to a job.
    Assign {
        /// Job key.
        job: String,
    },

    /// Return one worker from a job to the idle pool.
    Unassign {
        /// Job key.
        job: String,
        /// Pull the last builder off an active build site.
        #[serde(default)]
        force: bool,
    },

    /// Flip whether workers may eat a food.
    SupplyFood {
        /// Food resource key.
        food: String,
    },

    /// Flip whether the inn stocks a good.
    StockInn {
        /// Good resource key.
        good: String,
    },

    /// Report why a building can or cannot be ordered.
    Requirements {
        /// Building key.
        building: String,
    },

    /// Report the build-time breakdown for a building.
    BuildTime {
        /// Building key.
        building: String,
    },

    /// Report the settler arrival countdown.
    SettlerEta,

    /// Report the state digest (for determinism verification).
    Digest,

    /// Write the village to a save file.
    Save {
        /// Destination path.
        path: String,
    },

    /// Load a save file, catching up on the time away.
    Load {
        /// Source path.
        path: String,
    },

    /// Throw the village away and start over.
    Reset,

    /// Quit the runner.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

// ============================================================================
// Output Responses (Runner -> Driver)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Seconds simulated so far this session.
        tick: u64,
    },

    /// Acknowledgment of a command with no other output.
    Ack {
        /// The acknowledged command name.
        cmd: String,
    },

    /// Error processing a command.
    Error {
        /// Human-readable reason.
        message: String,
        /// The offending command name, if it parsed.
        cmd: Option<String>,
    },

    /// Events produced by elapsed time or by a command.
    Events {
        /// Session tick the events landed on.
        tick: u64,
        /// The events, in emission order.
        events: Vec<Event>,
    },

    /// Current village state.
    State {
        /// Seconds simulated so far this session.
        tick: u64,
        /// Current settlement tier id.
        tier: String,
        /// Population block.
        population: PopulationView,
        /// Whether non-food production is halted for lack of food.
        production_halted: bool,
        /// Resource balances.
        resources: BTreeMap<String, f64>,
        /// Standing unit count per building that has any.
        buildings: BTreeMap<String, u32>,
        /// Assignment and slot counts per job.
        jobs: BTreeMap<String, JobView>,
        /// Pending construction projects, head first.
        queue: Vec<QueueView>,
        /// State digest.
        digest: u64,
    },

    /// A demolition went through.
    Demolished {
        /// Building key.
        building: String,
        /// Refund per resource, already floored.
        refund: Vec<(String, f64)>,
    },

    /// A supply flag was flipped.
    Toggled {
        /// The command that flipped it.
        cmd: String,
        /// Food or good key.
        key: String,
        /// The new setting.
        enabled: bool,
    },

    /// Requirement breakdown for a building.
    Requirements {
        /// Building key.
        building: String,
        /// Whether the building can be ordered right now.
        passed: bool,
        /// Human-readable lines for each failed requirement.
        failures: Vec<String>,
        /// Cost breakdown, one line per resource in the price.
        cost: Vec<CostView>,
    },

    /// Build-time breakdown for a building.
    BuildTime {
        /// Building key.
        building: String,
        /// Unmodified build seconds.
        base: f64,
        /// Effective build seconds, or `None` when construction is stalled.
        current: Option<f64>,
        /// Builders currently assigned.
        builders: u32,
        /// Speed multiplier applied to the base time.
        speed: f64,
    },

    /// Settler arrival countdown.
    SettlerEta {
        /// Seconds left on the running countdown.
        seconds_remaining: f64,
        /// Countdown before amenity bonuses.
        base: f64,
        /// Sum of active amenity bonuses.
        bonus: f64,
        /// Full countdown the next settler would start from.
        total: f64,
        /// Whether arrivals are frozen at the housing cap.
        frozen: bool,
    },

    /// State digest for determinism verification.
    Digest {
        /// Seconds simulated so far this session.
        tick: u64,
        /// State digest.
        digest: u64,
    },

    /// The village was written to disk.
    Saved {
        /// Destination path.
        path: String,
    },

    /// A save file was restored.
    Loaded {
        /// Source path.
        path: String,
    },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Views
// ============================================================================

/// Population block of a state response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationView {
    /// Settlers living in the village.
    pub workers: u32,
    /// Settlers without a job.
    pub idle: u32,
    /// Housing cap on settlers.
    pub limit: u32,
    /// Cap on the sum of assigned workers.
    pub worker_limit: u32,
    /// Seconds until the next settler arrives.
    pub next_settler_in: f64,
}

/// Per-job block of a state response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JobView {
    /// Workers assigned to the job.
    pub assigned: u32,
    /// Slots the standing buildings provide.
    pub slots: u32,
}

/// One build-queue entry of a state response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueView {
    /// Building under construction.
    pub building: String,
    /// Seconds of progress accumulated.
    pub progress: f64,
    /// Seconds required at the current build speed, if any exists.
    pub total: Option<f64>,
}

/// One resource line of a requirement cost breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostView {
    /// Resource key.
    pub resource: String,
    /// Amount required.
    pub required: f64,
    /// Amount currently held.
    pub available: f64,
}

// ============================================================================
// Events
// ============================================================================

/// A village event on the wire.
///
/// Mirrors [`Notice`] with a stable snake_case tag plus the display
/// severity the host should render it with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Display severity: `"info"`, `"success"`, or `"error"`.
    pub severity: String,
    /// The event payload.
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Event payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A feature became available.
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

impl From<&Notice> for Event {
    fn from(notice: &Notice) -> Self {
        let severity = match notice.severity() {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        };
        let kind = match notice {
            Notice::FeatureUnlocked { feature } => EventKind::FeatureUnlocked {
                feature: feature.clone(),
            },
            Notice::BuildQueued { building } => EventKind::BuildQueued {
                building: building.clone(),
            },
            Notice::BuildCompleted { building } => EventKind::BuildCompleted {
                building: building.clone(),
            },
            Notice::BuildCancelled { building } => EventKind::BuildCancelled {
                building: building.clone(),
            },
            Notice::BuildingDemolished { building } => EventKind::BuildingDemolished {
                building: building.clone(),
            },
            Notice::ProductionHalted => EventKind::ProductionHalted,
            Notice::SettlerArrived => EventKind::SettlerArrived,
            Notice::TierAdvanced { tier } => EventKind::TierAdvanced { tier: tier.clone() },
            Notice::TierCelebration { tier } => EventKind::TierCelebration { tier: tier.clone() },
            Notice::OfflineSummary {
                away,
                population_gained,
                resource_gains,
            } => EventKind::OfflineSummary {
                away: away.clone(),
                population_gained: *population_gained,
                resource_gains: resource_gains.clone(),
            },
        };
        Self {
            severity: severity.to_string(),
            kind,
        }
    }
}

/// Render one failed requirement as a short human-readable line.
#[must_use]
pub fn describe_failure(failure: &RequirementFailure) -> String {
    match failure {
        RequirementFailure::Population { required, current } => {
            format!("population {current}/{required}")
        }
        RequirementFailure::Tier { required } => format!("requires tier {required}"),
        RequirementFailure::MissingBuilding { building } => format!("requires {building}"),
        RequirementFailure::UnstaffedBuilding { building, missing } => {
            let staff: Vec<String> = missing
                .iter()
                .map(|(job, count)| format!("{count} {job}"))
                .collect();
            format!("{building} missing staff: {}", staff.join(", "))
        }
        RequirementFailure::NotEnoughWorkers {
            job,
            required,
            assigned,
        } => format!("{job} {assigned}/{required}"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    #[must_use]
    pub fn ready(tick: u64) -> Self {
        Self::Ready {
            version: "1.0".to_string(),
            tick,
        }
    }

    /// Create an acknowledgment.
    #[must_use]
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to a JSON line (with newline).
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"Serialization failed: {}"}}"#,
                e
            )
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error for malformed or unknown commands.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get the command name for acknowledgments and error reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Gather { .. } => "gather",
            Self::Build { .. } => "build",
            Self::CancelBuild { .. } => "cancel_build",
            Self::Demolish { .. } => "demolish",
            Self::Assign { .. } => "assign",
            Self::Unassign { .. } => "unassign",
            Self::SupplyFood { .. } => "supply_food",
            Self::StockInn { .. } => "stock_inn",
            Self::Requirements { .. } => "requirements",
            Self::BuildTime { .. } => "build_time",
            Self::SettlerEta => "settler_eta",
            Self::Digest => "digest",
            Self::Save { .. } => "save",
            Self::Load { .. } => "load",
            Self::Reset => "reset",
            Self::Quit => "quit",
        }
    }
}
