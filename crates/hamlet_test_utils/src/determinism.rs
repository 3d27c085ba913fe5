//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Saves must replay bit-for-bit, and an offline catch-up must land on the
//! same state as a live session that ticked through the same seconds.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Safe here only because every run performs the
//!   same operations in the same order. Systems run in a fixed sequence and
//!   never reorder work.
//!
//! - **Map iteration order**: Ledgers, rosters, and queues live in
//!   `BTreeMap` keyed by string, so iteration is always sorted.
//!
//! - **System randomness**: The simulation takes no random input at all.
//!   Settler arrivals and production are pure functions of state and delta.
//!
//! - **Hashing**: State digests go through [`std::collections::hash_map::DefaultHasher`]
//!   with floats hashed via `to_bits`, so equal states digest equally.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual system determinism (food, production, growth)
//! 2. **Property tests**: Random command scripts must still replay identically
//! 3. **Integration tests**: Full village scenarios are reproducible
//! 4. **Parallel tests**: Running N engines in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use hamlet_core::engine::Engine;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Digests from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique digests (should be 1 for a deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different digests across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique digests: {} (expected 1)\n\
                 All digests: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel engine runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state digest from each engine.
    pub hashes: Vec<u64>,
    /// Number of ticks each engine ran.
    pub ticks: u64,
    /// Number of engines run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all engines produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all engines matched.
    ///
    /// # Panics
    ///
    /// Panics if engines produced different digests.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique digests: {}\n\
                 All digests: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance the simulation by one tick
/// * `hash` - Function to compute a state digest
///
/// # Example
///
/// ```ignore
/// use hamlet_test_utils::determinism::verify_determinism;
/// use hamlet_test_utils::fixtures::bootstrapped_engine;
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     100, // 100 ticks each
///     bootstrapped_engine,
///     |engine| { engine.advance(1.0); },
///     |engine| engine.digest(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Simplified determinism verification for [`Engine`].
///
/// Runs the engine twice with identical setup at one-second ticks and
/// verifies the final state digests match exactly.
///
/// # Arguments
///
/// * `setup_fn` - Function that creates and configures an engine
/// * `num_ticks` - Number of ticks to run
///
/// # Returns
///
/// `true` if both runs produced identical state digests.
pub fn verify_engine_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Engine,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |engine| {
            engine.advance(1.0);
        },
        Engine::digest,
    );
    result.is_deterministic
}

/// Run N engines in parallel and collect final digests.
///
/// This is useful for catching non-determinism that only manifests
/// under thread scheduling variations, memory layout differences, etc.
///
/// # Arguments
///
/// * `setup_fn` - Function that creates and configures an engine (must be thread-safe)
/// * `num_sims` - Number of parallel engines to run
/// * `num_ticks` - Number of ticks to run each engine
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_engines<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> ParallelSimResult
where
    F: Fn() -> Engine + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut engine = setup_fn();
                    for _ in 0..num_ticks {
                        engine.advance(1.0);
                    }
                    engine.digest()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two engine runs tick-by-tick, finding the first divergence.
///
/// Useful for debugging non-determinism by finding exactly when
/// the runs start to differ.
///
/// # Returns
///
/// `None` if the runs are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Engine,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    // Check initial state
    if first.digest() != second.digest() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        first.advance(1.0);
        second.advance(1.0);

        if first.digest() != second.digest() {
            return Some(tick);
        }
    }

    None
}

/// Verify that a snapshot round-trip preserves engine state exactly.
///
/// This is critical for save/load: a restored village must digest to the
/// same value as the one it was saved from.
pub fn verify_snapshot_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Engine,
{
    let mut engine = setup_fn();

    for _ in 0..num_ticks {
        engine.advance(1.0);
    }

    let digest_before = engine.digest();

    let saved: serde_json::Value = engine.snapshot();
    let restored = Engine::from_saved(engine.config().clone(), &saved);

    digest_before == restored.digest()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible command scripts
/// against the compact fixture config.
pub mod strategies {
    use proptest::prelude::*;

    use crate::fixtures::{Action, COMPACT_BUILDINGS, COMPACT_JOBS, COMPACT_RESOURCES};

    /// Generate a resource key from the compact config.
    pub fn arb_resource() -> impl Strategy<Value = &'static str> {
        proptest::sample::select(COMPACT_RESOURCES.to_vec())
    }

    /// Generate a job key from the compact config.
    pub fn arb_job() -> impl Strategy<Value = &'static str> {
        proptest::sample::select(COMPACT_JOBS.to_vec())
    }

    /// Generate a building key from the compact config.
    pub fn arb_building() -> impl Strategy<Value = &'static str> {
        proptest::sample::select(COMPACT_BUILDINGS.to_vec())
    }

    /// Generate a tick step on a coarse grid, 0.1s to 4.9s.
    ///
    /// The grid keeps deltas exactly representable so repeated runs perform
    /// identical float operations.
    pub fn arb_delta() -> impl Strategy<Value = f64> {
        (1u32..50u32).prop_map(|tenths| f64::from(tenths) / 10.0)
    }

    /// Generate a single player action.
    ///
    /// Rejected commands are ignored on apply, so any mix is a valid script.
    pub fn arb_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            arb_resource().prop_map(Action::Gather),
            arb_job().prop_map(Action::Assign),
            arb_job().prop_map(Action::Unassign),
            arb_building().prop_map(Action::Start),
            (0usize..4).prop_map(Action::Cancel),
            arb_resource().prop_map(Action::ToggleFood),
            (1u32..30).prop_map(Action::Tick),
        ]
    }

    /// Generate a command script of up to `max_len` actions.
    pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<Action>> {
        proptest::collection::vec(arb_action(), 0..max_len)
    }
}
