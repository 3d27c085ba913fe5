//! Worker (job) data structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Data-driven job definition.
///
/// Rates are per assigned worker per second. Jobs with neither production nor
/// consumption (builder, foreman, innkeeper, ...) act through other systems.
///
/// # Example RON
///
/// ```ron
/// WorkerData(
///     id: "baker",
///     consumes: { "flour": 0.08, "water": 0.08 },
///     produces: { "bread": 0.06 },
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerData {
    /// Unique string identifier for this job.
    pub id: String,

    /// Localization key for the job's display name.
    #[serde(default)]
    pub name: String,

    /// Resources produced, as resource -> rate.
    #[serde(default)]
    pub produces: BTreeMap<String, f64>,

    /// Resources consumed, as resource -> rate.
    #[serde(default)]
    pub consumes: BTreeMap<String, f64>,
}

impl WorkerData {
    /// Whether this job produces any resource at all.
    #[must_use]
    pub fn is_producer(&self) -> bool {
        !self.produces.is_empty()
    }
}
