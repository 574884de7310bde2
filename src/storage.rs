//! JSON persistence for calibration, settings and session history.
//!
//! Everything is stored as small JSON documents under one data directory.
//! Store failures are local by design: reads that fail are treated as absent
//! values (logged at warn level), so the engine always proceeds with
//! in-memory defaults.

use crate::calibration::CalibrationBaseline;
use crate::config::Settings;
use crate::constants::SESSION_RETENTION_MS;
use crate::error::Result;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const CALIBRATION_FILE: &str = "calibration.json";
const SETTINGS_FILE: &str = "settings.json";
const SESSIONS_FILE: &str = "sessions.json";

/// Current wall-clock time as milliseconds since the Unix epoch
#[must_use]
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Summary of one finished monitoring session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub started_at_ms: u64,
    pub ended_at_ms: u64,
    pub duration_ms: u64,
    /// Mean smoothed score over the session
    pub average_score: f64,
    /// Number of scored frames contributing to the average
    pub samples: u32,
}

/// Key-value JSON store rooted at a data directory
#[derive(Debug, Clone)]
pub struct PostureStore {
    dir: PathBuf,
}

impl PostureStore {
    /// Open a store, creating the data directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the directory cannot be created.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.dir.join(file);
        if !path.exists() {
            return None;
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to parse {}: {e}", path.display());
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    fn remove(&self, file: &str) {
        let path = self.dir.join(file);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed to remove {}: {e}", path.display());
            }
        }
    }

    /// Stored calibration baseline, if any
    #[must_use]
    pub fn calibration(&self) -> Option<CalibrationBaseline> {
        self.read_json(CALIBRATION_FILE)
    }

    /// Persist a calibration baseline.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written; callers treat this
    /// as a local failure and keep the in-memory baseline.
    pub fn set_calibration(&self, baseline: &CalibrationBaseline) -> Result<()> {
        self.write_json(CALIBRATION_FILE, baseline)
    }

    pub fn clear_calibration(&self) {
        self.remove(CALIBRATION_FILE);
    }

    /// Stored user settings, if any
    #[must_use]
    pub fn settings(&self) -> Option<Settings> {
        self.read_json(SETTINGS_FILE)
    }

    /// Persist user settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn set_settings(&self, settings: &Settings) -> Result<()> {
        self.write_json(SETTINGS_FILE, settings)
    }

    /// Session history, oldest first; empty when absent or unreadable
    #[must_use]
    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.read_json(SESSIONS_FILE).unwrap_or_default()
    }

    /// Append a session record, pruning entries older than the 30-day
    /// retention window.
    ///
    /// # Errors
    ///
    /// Returns an error when the history cannot be written back.
    pub fn add_session(&self, record: SessionRecord, now_ms: u64) -> Result<()> {
        let mut sessions = self.sessions();
        sessions.push(record);
        let cutoff = now_ms.saturating_sub(SESSION_RETENTION_MS);
        sessions.retain(|s| s.started_at_ms > cutoff);
        self.write_json(SESSIONS_FILE, &sessions)
    }

    /// Remove every stored document
    pub fn clear_all(&self) {
        self.remove(CALIBRATION_FILE);
        self.remove(SETTINGS_FILE);
        self.remove(SESSIONS_FILE);
    }
}
