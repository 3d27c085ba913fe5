//! Save files and offline catch-up.
//!
//! A save is the engine snapshot plus the wall-clock moment it was taken.
//! Restoring computes the time away and replays it through the engine, so
//! a village keeps growing while the process is down.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use hamlet_core::config::GameConfig;
use hamlet_core::engine::Engine;
use hamlet_core::notice::Notice;

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// Error type for save-file operations.
#[derive(Error, Debug)]
pub enum SaveError {
    /// File not found.
    #[error("save file not found: {0}")]
    NotFound(String),
    /// Failed to read or write the file.
    #[error("failed to access save file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse the JSON document.
    #[error("failed to parse save file: {0}")]
    Parse(#[from] serde_json::Error),
    /// The file was written by a newer format.
    #[error("unsupported save version: {0}")]
    Version(u32),
}

/// A village snapshot plus the moment it was taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    /// Save format version.
    pub version: u32,
    /// Unix timestamp (seconds) of the save.
    pub saved_at: u64,
    /// Engine snapshot.
    pub state: Value,
}

impl SaveFile {
    /// Capture the engine as a save stamped with the current wall clock.
    #[must_use]
    pub fn capture(engine: &Engine) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: unix_now(),
            state: engine.snapshot(),
        }
    }

    /// Load a save from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::NotFound`] for a missing file, [`SaveError::Parse`]
    /// for a malformed document, and [`SaveError::Version`] when the file was
    /// written by a newer format than this build understands.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SaveError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SaveError::NotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let save: SaveFile = serde_json::from_str(&contents)?;
        if save.version > SAVE_VERSION {
            return Err(SaveError::Version(save.version));
        }
        Ok(save)
    }

    /// Write the save to a JSON file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Io`] when the directory or file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Seconds elapsed between the save and `now`, clamped at zero.
    #[must_use]
    pub fn seconds_away(&self, now: u64) -> f64 {
        now.saturating_sub(self.saved_at) as f64
    }

    /// Restore an engine from this save and replay the time away.
    ///
    /// Returns the engine plus the offline summary the replay produced
    /// (empty when the gap was too short to matter).
    #[must_use]
    pub fn restore(&self, config: GameConfig) -> (Engine, Vec<Notice>) {
        self.restore_at(config, unix_now())
    }

    /// Restore as of a specific wall-clock moment.
    #[must_use]
    pub fn restore_at(&self, config: GameConfig, now: u64) -> (Engine, Vec<Notice>) {
        let mut engine = Engine::from_saved(config, &self.state);
        let notices = engine.replay_offline(self.seconds_away(now));
        (engine, notices)
    }
}

/// Current wall clock as unix seconds.
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
