//! Settlement tier data structures.

use serde::{Deserialize, Serialize};

/// Data-driven settlement tier definition.
///
/// Tiers form a totally ordered chain; their order in the config's tier table
/// is their ordinal order.
///
/// # Example RON
///
/// ```ron
/// TierData(
///     id: "small_village",
///     name: "tier.small_village.name",
///     population: 10,
///     building_limit: 10,
///     unlocks: ["ranch_building", "inn_building"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierData {
    /// Unique string identifier for this tier.
    pub id: String,

    /// Localization key for the tier's display name.
    #[serde(default)]
    pub name: String,

    /// Population threshold at which this tier becomes the candidate.
    pub population: u32,

    /// Maximum completed+queued building count while on this tier.
    pub building_limit: u32,

    /// Feature keys unlocked on reaching this tier.
    #[serde(default)]
    pub unlocks: Vec<String>,

    /// Whether reaching this tier triggers a one-time celebration prompt.
    #[serde(default)]
    pub celebrate: bool,
}
