//! Unattended runs and growth reporting.
//!
//! A [`RunReport`] aggregates every event a headless run produced, plus a
//! closing snapshot of the village. Runs can play a command script first
//! (the same JSON commands the interactive session accepts) and then let
//! the clock spin unattended.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use hamlet_core::engine::Engine;
use hamlet_core::notice::Notice;

use crate::protocol::Command;

/// Aggregated record of one headless run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Whole seconds simulated.
    pub ticks: u64,
    /// Script commands the engine accepted.
    pub commands_applied: u32,
    /// Script commands the engine refused.
    pub commands_rejected: u32,
    /// Settlers that arrived.
    pub settlers_arrived: u32,
    /// Buildings finished, in completion order.
    pub buildings_completed: Vec<String>,
    /// Building instances torn down.
    pub buildings_demolished: u32,
    /// Times production halted for lack of food.
    pub halt_events: u32,
    /// Tiers reached, in order.
    pub tiers_advanced: Vec<String>,
    /// Features unlocked, in order.
    pub features_unlocked: Vec<String>,
    /// Tier at the end of the run.
    pub final_tier: String,
    /// Population at the end of the run.
    pub final_population: u32,
    /// Resource balances at the end of the run.
    pub final_resources: BTreeMap<String, f64>,
    /// State digest at the end of the run.
    pub final_digest: u64,
}

impl RunReport {
    /// Save the report to a JSON file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns any filesystem error, or a serialization failure as
    /// [`io::Error::other`].
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load a report from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns any filesystem error, or a parse failure as
    /// [`io::Error::other`].
    pub fn load(path: &Path) -> io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(io::Error::other)
    }

    fn record(&mut self, tick: u64, notice: &Notice) {
        match notice {
            Notice::SettlerArrived => {
                self.settlers_arrived += 1;
                tracing::debug!(tick, "settler arrived");
            }
            Notice::BuildCompleted { building } => {
                self.buildings_completed.push(building.clone());
                tracing::info!(tick, building = %building, "construction finished");
            }
            Notice::BuildingDemolished { building } => {
                self.buildings_demolished += 1;
                tracing::info!(tick, building = %building, "building torn down");
            }
            Notice::ProductionHalted => {
                self.halt_events += 1;
                tracing::warn!(tick, "food ran out, production halted");
            }
            Notice::TierAdvanced { tier } => {
                self.tiers_advanced.push(tier.clone());
                tracing::info!(tick, tier = %tier, "settlement advanced");
            }
            Notice::FeatureUnlocked { feature } => {
                self.features_unlocked.push(feature.clone());
                tracing::debug!(tick, feature = %feature, "feature unlocked");
            }
            Notice::BuildQueued { .. }
            | Notice::BuildCancelled { .. }
            | Notice::TierCelebration { .. }
            | Notice::OfflineSummary { .. } => {}
        }
    }

    fn finalize(&mut self, engine: &Engine) {
        let state = engine.state();
        self.final_tier = state.tier.clone();
        self.final_population = state.total_workers;
        self.final_resources = state.resources.clone();
        self.final_digest = engine.digest();
    }
}

/// Play the village forward `ticks` whole seconds with no player input.
pub fn run_unattended(engine: &mut Engine, ticks: u64) -> RunReport {
    run_scripted(engine, &[], ticks)
}

/// Play a command script, then let the clock spin for `trailing_ticks`.
///
/// Only `tick` entries move time; refused commands are counted and logged
/// rather than ending the run. A `quit` entry stops the script early.
pub fn run_scripted(engine: &mut Engine, commands: &[Command], trailing_ticks: u64) -> RunReport {
    let mut report = RunReport::default();
    let mut tick = 0u64;

    for command in commands {
        if matches!(command, Command::Quit) {
            break;
        }
        apply(engine, command, &mut tick, &mut report);
    }
    advance_recording(engine, trailing_ticks, &mut tick, &mut report);

    report.ticks = tick;
    report.finalize(engine);
    tracing::debug!(
        ticks = report.ticks,
        settlers = report.settlers_arrived,
        halts = report.halt_events,
        tier = %report.final_tier,
        "headless run complete"
    );
    report
}

/// Load a script of protocol commands from a JSON-lines file.
///
/// Blank lines are skipped. Parse failures report the offending line.
///
/// # Errors
///
/// Returns any filesystem error, or a parse failure as [`io::Error::other`].
pub fn load_script(path: &Path) -> io::Result<Vec<Command>> {
    let contents = std::fs::read_to_string(path)?;
    let mut commands = Vec::new();
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command = Command::from_json(line)
            .map_err(|e| io::Error::other(format!("line {}: {}", number + 1, e)))?;
        commands.push(command);
    }
    Ok(commands)
}

fn advance_recording(engine: &mut Engine, seconds: u64, tick: &mut u64, report: &mut RunReport) {
    for _ in 0..seconds {
        let notices = engine.advance(1.0);
        *tick += 1;
        for notice in &notices {
            report.record(*tick, notice);
        }
    }
}

fn apply(engine: &mut Engine, command: &Command, tick: &mut u64, report: &mut RunReport) {
    let outcome = match command {
        Command::Tick { count } => {
            advance_recording(engine, u64::from(*count), tick, report);
            report.commands_applied += 1;
            return;
        }
        Command::Gather { resource } => engine.gather(resource).map(|()| Vec::new()),
        Command::Build { building } => engine.start_building(building),
        Command::CancelBuild { index } => engine.cancel_building(*index),
        Command::Demolish { building } => engine
            .demolish_building(building)
            .and_then(|pending| engine.confirm_demolition(&pending)),
        Command::Assign { job } => engine.assign_worker(job).map(|()| Vec::new()),
        Command::Unassign { job, force } => {
            engine.unassign_worker(job, *force).map(|()| Vec::new())
        }
        Command::SupplyFood { food } => engine.toggle_food_supply(food).map(|_| Vec::new()),
        Command::StockInn { good } => engine.toggle_inn_supply(good).map(|_| Vec::new()),
        Command::Reset => {
            engine.reset();
            Ok(Vec::new())
        }
        // Read-only and session commands have no effect on a scripted run.
        Command::Query
        | Command::Requirements { .. }
        | Command::BuildTime { .. }
        | Command::SettlerEta
        | Command::Digest
        | Command::Save { .. }
        | Command::Load { .. }
        | Command::Quit => {
            tracing::debug!(cmd = command.name(), "skipping read-only script command");
            return;
        }
    };

    match outcome {
        Ok(notices) => {
            report.commands_applied += 1;
            for notice in &notices {
                report.record(*tick, notice);
            }
        }
        Err(e) => {
            report.commands_rejected += 1;
            tracing::warn!(cmd = command.name(), error = %e, "script command refused");
        }
    }
}
