//! Resource and food data structures.

use serde::{Deserialize, Serialize};

/// Data-driven resource definition.
///
/// # Example RON
///
/// ```ron
/// ResourceData(
///     id: "grain",
///     base_storage: 100.0,
///     food_chain: true,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Unique string identifier for this resource.
    pub id: String,

    /// Storage capacity available before any storage building stands.
    #[serde(default)]
    pub base_storage: f64,

    /// Whether this resource belongs to the food supply chain.
    ///
    /// Jobs producing a food-chain resource keep running during a production
    /// halt so the food economy can recover.
    #[serde(default)]
    pub food_chain: bool,
}

/// Consumption profile of a food resource.
///
/// Only resources listed in the food table can be toggled as supplied and
/// eaten by workers.
///
/// # Example RON
///
/// ```ron
/// FoodData(
///     resource: "bread",
///     consumption: 0.2,
///     bonus: 0.03,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodData {
    /// Resource key of the food.
    pub resource: String,

    /// Units one worker eats per second when living on this food alone.
    pub consumption: f64,

    /// Additive production bonus granted while this food is available.
    #[serde(default)]
    pub bonus: f64,

    /// Whether this food starts toggled as supplied.
    #[serde(default)]
    pub default_supplied: bool,
}

impl FoodData {
    /// Weighting of this food in the consumption mix.
    ///
    /// Cheaper foods (lower consumption rate) are weighted more heavily.
    #[must_use]
    pub fn attractiveness(&self) -> f64 {
        1.0 / self.consumption
    }
}
