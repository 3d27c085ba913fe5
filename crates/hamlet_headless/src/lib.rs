//! Headless village runner for scripted play and CI verification.
//!
//! This crate drives the simulation without a UI, controlled via JSON
//! commands on stdin with responses on stdout. This enables:
//!
//! - **Scripted play**: A driving process can play the village without graphics
//! - **CI verification**: Automated testing of game logic and determinism
//! - **Long-run simulation**: Fast-forward a village and inspect the outcome
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the driver (tick, build, assign, etc.)
//! - **stdout**: State updates and responses (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See [`protocol`] module for the full command/response specification.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"tick","count":60}' | cargo run -p hamlet_headless
//!
//! # Simulate an hour of play with a command script
//! cargo run -p hamlet_headless -- simulate --ticks 3600 --script opening.jsonl
//!
//! # Verify determinism across repeated runs
//! cargo run -p hamlet_headless -- verify --runs 8 --ticks 1000
//! ```

pub mod protocol;
pub mod report;
pub mod runner;
pub mod save;
pub mod verify;

pub use protocol::{Command, Event, Response};
pub use report::{load_script, run_scripted, run_unattended, RunReport};
pub use runner::{Session, SessionConfig};
pub use save::{SaveError, SaveFile};
pub use verify::{verify_determinism, VerifyReport};
