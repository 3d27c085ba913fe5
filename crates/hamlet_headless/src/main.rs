//! Headless village runner.
//!
//! This binary runs the simulation without a UI, controlled via JSON on
//! stdin/stdout. Designed for scripted drivers, CI testing, and long-run
//! simulation.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p hamlet_headless
//!
//! # Interactive mode with a persistent save
//! cargo run -p hamlet_headless -- run --save saves/village.json
//!
//! # Simulate an hour of play with a command script
//! cargo run -p hamlet_headless -- simulate --ticks 3600 --script opening.jsonl
//!
//! # Verify determinism
//! cargo run -p hamlet_headless -- verify --runs 8 --ticks 1000
//!
//! # Benchmark raw tick throughput
//! cargo run -p hamlet_headless -- benchmark --ticks 100000
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hamlet_core::config::GameConfig;
use hamlet_core::engine::Engine;

use hamlet_headless::{
    protocol::Command,
    report::{load_script, run_scripted},
    runner::{Session, SessionConfig},
    save::SaveFile,
    verify::verify_determinism,
};

#[derive(Parser)]
#[command(name = "hamlet_headless")]
#[command(about = "Headless village runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Game data file (RON). Defaults to the built-in standard tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single interactive session
    Run {
        /// Save file to resume from and write back on exit
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Output state after every tick
        #[arg(long)]
        auto_state: bool,
    },

    /// Run a village for N ticks and report the outcome
    Simulate {
        /// Number of ticks to run after the script
        #[arg(short, long, default_value = "3600")]
        ticks: u64,

        /// Command script to play first (JSON lines)
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify determinism by running the same village multiple times
    Verify {
        /// Number of verification runs
        #[arg(short, long, default_value = "4")]
        runs: u32,

        /// Ticks per run
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Digest checkpoint interval in ticks
        #[arg(long, default_value = "100")]
        checkpoint: u64,

        /// Command script to play before the clock runs (JSON lines)
        #[arg(short, long)]
        script: Option<PathBuf>,
    },

    /// Run N ticks for benchmarking
    Benchmark {
        /// Number of ticks to run
        #[arg(short, long, default_value = "100000")]
        ticks: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let config = load_game_config(cli.config);

    match cli.command {
        Some(Commands::Run { save, auto_state }) => {
            cmd_run(config, save, auto_state);
        }
        Some(Commands::Simulate {
            ticks,
            script,
            output,
        }) => {
            cmd_simulate(config, ticks, script, output);
        }
        Some(Commands::Verify {
            runs,
            ticks,
            checkpoint,
            script,
        }) => {
            cmd_verify(config, runs, ticks, checkpoint, script);
        }
        Some(Commands::Benchmark { ticks }) => {
            cmd_benchmark(config, ticks);
        }
        None => {
            // Default: interactive mode
            cmd_run(config, None, false);
        }
    }
}

/// Load the game data tables, from a RON file or the built-in set.
fn load_game_config(path: Option<PathBuf>) -> GameConfig {
    let Some(path) = path else {
        return hamlet_core::data::standard_config();
    };

    tracing::info!("Loading game data from: {}", path.display());
    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read game data '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    };
    match GameConfig::from_ron(&contents) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid game data '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

/// Run a single interactive session
fn cmd_run(config: GameConfig, save: Option<PathBuf>, auto_state: bool) {
    tracing::info!("Starting interactive session");

    let engine = match &save {
        Some(path) if path.exists() => match SaveFile::load(path) {
            Ok(file) => {
                let (engine, notices) = file.restore(config);
                tracing::info!(
                    path = %path.display(),
                    catch_up_events = notices.len(),
                    "resumed from save"
                );
                engine
            }
            Err(e) => {
                eprintln!("Failed to load save '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        _ => Engine::new(config),
    };

    let mut session = Session::with_config(
        engine,
        SessionConfig {
            auto_state,
            save_on_exit: save,
        },
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    if let Err(e) = session.run(stdin.lock(), &mut stdout) {
        eprintln!("Session I/O error: {}", e);
        std::process::exit(1);
    }
}

/// Run a village for N ticks and report the outcome
fn cmd_simulate(config: GameConfig, ticks: u64, script: Option<PathBuf>, output: Option<PathBuf>) {
    let commands = load_script_or_exit(script.as_deref());

    tracing::info!(
        ticks = ticks,
        script_commands = commands.len(),
        "Starting simulation"
    );

    let mut engine = Engine::new(config);
    let report = run_scripted(&mut engine, &commands, ticks);

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("SIMULATION COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Ticks: {}", report.ticks);
    eprintln!(
        "Script commands: {} applied, {} rejected",
        report.commands_applied, report.commands_rejected
    );
    eprintln!("Settlers arrived: {}", report.settlers_arrived);
    eprintln!("Buildings completed: {}", report.buildings_completed.len());
    eprintln!("Production halts: {}", report.halt_events);
    eprintln!("Final tier: {}", report.final_tier);
    eprintln!("Final population: {}", report.final_population);
    eprintln!("Final digest: {:016x}", report.final_digest);

    if let Some(path) = output {
        if let Err(e) = report.save(&path) {
            eprintln!("Failed to save report: {}", e);
            std::process::exit(1);
        }
        eprintln!("\nReport saved to: {}", path.display());
    } else {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Verify determinism
fn cmd_verify(
    config: GameConfig,
    runs: u32,
    ticks: u64,
    checkpoint: u64,
    script: Option<PathBuf>,
) {
    let commands = load_script_or_exit(script.as_deref());

    tracing::info!(
        "Verifying determinism: {} runs of {} ticks (checkpoint every {})",
        runs,
        ticks,
        checkpoint
    );

    let report = verify_determinism(&config, &commands, runs, ticks, checkpoint);

    if report.passed() {
        eprintln!("PASS: All {} runs produced identical results", report.runs);
        eprintln!(
            "  Final digest: {:016x}",
            report.digests.first().copied().unwrap_or(0)
        );
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        if let Some(tick) = report.divergence_tick {
            eprintln!("  First divergence at tick {}", tick);
        }
        if !report.snapshot_ok {
            eprintln!("  Snapshot restore did not reproduce the state");
        }
        std::process::exit(1);
    }
}

/// Run benchmark
fn cmd_benchmark(config: GameConfig, ticks: u64) {
    use std::time::Instant;

    tracing::info!("Running {} tick benchmark", ticks);

    let mut engine = Engine::new(config);

    eprintln!("Running {} ticks...", ticks);

    // Warmup
    for _ in 0..100 {
        engine.advance(1.0);
    }

    // Benchmark
    let start = Instant::now();
    for _ in 0..ticks {
        engine.advance(1.0);
    }
    let elapsed = start.elapsed();

    let tps = ticks as f64 / elapsed.as_secs_f64();
    let state = engine.state();

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BENCHMARK RESULTS");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Ticks: {}", ticks);
    eprintln!("Duration: {:.3}s", elapsed.as_secs_f64());
    eprintln!("Ticks/second: {:.1}", tps);
    eprintln!("ms/tick: {:.4}", elapsed.as_millis() as f64 / ticks as f64);
    eprintln!("Final population: {}", state.total_workers);
    eprintln!("Final tier: {}", state.tier);
    eprintln!("State digest: {:016x}", engine.digest());
}

fn load_script_or_exit(path: Option<&std::path::Path>) -> Vec<Command> {
    let Some(path) = path else {
        return Vec::new();
    };
    match load_script(path) {
        Ok(commands) => commands,
        Err(e) => {
            eprintln!("Failed to load script '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
