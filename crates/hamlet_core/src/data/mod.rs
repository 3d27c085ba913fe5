//! Data structures for game configuration.
//!
//! This module contains pure data structures that define tiers, resources,
//! buildings, workers, and foods. All structs are designed to be deserialized
//! from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types and the
//! built-in standard data set. File loading is handled by the host.

mod building_data;
mod resource_data;
mod standard;
mod tier_data;
mod worker_data;

pub use building_data::{BuildingData, BuildingEffect, BuildingRequires, PrerequisiteBuilding};
pub use resource_data::{FoodData, ResourceData};
pub use standard::standard_config;
pub use tier_data::TierData;
pub use worker_data::WorkerData;
