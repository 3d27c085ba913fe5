//! # Hamlet Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Fixture configs and pre-built engines
//! - Growth and food-balance analysis
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod progression;

/// Re-export proptest for convenience.
pub use proptest;
