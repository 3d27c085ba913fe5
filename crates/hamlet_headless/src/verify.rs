//! Determinism verification across repeated runs.
//!
//! Replays the same village several times in parallel and compares state
//! digests at fixed checkpoints. Any divergence means something
//! non-deterministic crept into the tick path. Each run also restores a
//! mid-run snapshot and checks it lands on the same digest.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use hamlet_core::config::GameConfig;
use hamlet_core::engine::Engine;

use crate::protocol::Command;
use crate::report;

/// Outcome of re-running the same village several times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Number of runs compared.
    pub runs: u32,
    /// Whole seconds each run simulated after its script.
    pub ticks: u64,
    /// Final digest per run.
    pub digests: Vec<u64>,
    /// First checkpoint tick where any run disagreed, if one exists.
    pub divergence_tick: Option<u64>,
    /// Whether every mid-run snapshot restored to an identical digest.
    pub snapshot_ok: bool,
}

impl VerifyReport {
    /// Whether every run agreed everywhere.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.divergence_tick.is_none() && self.snapshot_ok
    }
}

struct RunTrace {
    checkpoints: Vec<(u64, u64)>,
    snapshot_ok: bool,
}

/// Re-run the same village `runs` times in parallel and compare digests.
///
/// Each run plays `script` first (rejections and all), then ticks for
/// `ticks` whole seconds, recording a digest every `checkpoint_every`
/// ticks. Checkpoint ticks count from the end of the script.
#[must_use]
pub fn verify_determinism(
    config: &GameConfig,
    script: &[Command],
    runs: u32,
    ticks: u64,
    checkpoint_every: u64,
) -> VerifyReport {
    // Fewer than two runs compare nothing.
    let runs = runs.max(2);
    let checkpoint_every = checkpoint_every.clamp(1, ticks.max(1));
    tracing::info!(runs, ticks, checkpoint_every, "verifying determinism");

    let traces: Vec<RunTrace> = (0..runs)
        .into_par_iter()
        .map(|_| trace_run(config, script, ticks, checkpoint_every))
        .collect();

    let divergence_tick = traces.first().and_then(|first| {
        first
            .checkpoints
            .iter()
            .enumerate()
            .find_map(|(index, &(tick, digest))| {
                let diverged = traces[1..]
                    .iter()
                    .any(|trace| trace.checkpoints.get(index).map(|c| c.1) != Some(digest));
                diverged.then_some(tick)
            })
    });

    let digests = traces
        .iter()
        .map(|t| t.checkpoints.last().map_or(0, |c| c.1))
        .collect();
    let snapshot_ok = traces.iter().all(|t| t.snapshot_ok);

    VerifyReport {
        runs,
        ticks,
        digests,
        divergence_tick,
        snapshot_ok,
    }
}

fn trace_run(
    config: &GameConfig,
    script: &[Command],
    ticks: u64,
    checkpoint_every: u64,
) -> RunTrace {
    let mut engine = Engine::new(config.clone());
    let _ = report::run_scripted(&mut engine, script, 0);

    let midpoint = ticks / 2;
    let mut checkpoints = Vec::new();
    let mut snapshot_ok = true;

    for tick in 1..=ticks {
        engine.advance(1.0);
        if tick % checkpoint_every == 0 || tick == ticks {
            checkpoints.push((tick, engine.digest()));
        }
        if tick == midpoint {
            let saved = engine.snapshot();
            let restored = Engine::from_saved(engine.config().clone(), &saved);
            snapshot_ok = restored.digest() == engine.digest();
        }
    }

    RunTrace {
        checkpoints,
        snapshot_ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hamlet_test_utils::fixtures::compact_config;

    fn opening_script() -> Vec<Command> {
        let mut script: Vec<Command> = (0..5)
            .map(|_| Command::Gather {
                resource: "wood".to_string(),
            })
            .collect();
        script.push(Command::Build {
            building: "cabin".to_string(),
        });
        script.push(Command::Tick { count: 40 });
        script.push(Command::Assign {
            job: "builder".to_string(),
        });
        script.push(Command::Assign {
            job: "farmer".to_string(),
        });
        script.push(Command::Assign {
            job: "farmer".to_string(),
        });
        script
    }

    #[test]
    fn test_fresh_village_is_deterministic() {
        let report = verify_determinism(&compact_config(), &[], 3, 60, 10);
        assert!(report.passed());
        assert_eq!(report.digests.len(), 3);
        assert!(report.digests.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_scripted_village_is_deterministic() {
        let report = verify_determinism(&compact_config(), &opening_script(), 4, 120, 30);
        assert!(report.passed());
        assert!(report.divergence_tick.is_none());
        assert!(report.snapshot_ok);
    }

    #[test]
    fn test_at_least_two_runs_are_compared() {
        let report = verify_determinism(&compact_config(), &[], 0, 10, 5);
        assert_eq!(report.runs, 2);
        assert_eq!(report.digests.len(), 2);
    }

    #[test]
    fn test_divergence_fails_the_report() {
        let report = VerifyReport {
            runs: 2,
            ticks: 100,
            digests: vec![1, 2],
            divergence_tick: Some(50),
            snapshot_ok: true,
        };
        assert!(!report.passed());
    }

    #[test]
    fn test_broken_snapshot_fails_the_report() {
        let report = VerifyReport {
            runs: 2,
            ticks: 100,
            digests: vec![1, 1],
            divergence_tick: None,
            snapshot_ok: false,
        };
        assert!(!report.passed());
    }
}
