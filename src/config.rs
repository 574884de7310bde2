//! Configuration management for the posture monitoring application.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User-tunable monitoring settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scores below this threshold can fire an alert (0-100)
    pub alert_threshold: u8,

    /// Play a sound with alerts (presentation-layer concern)
    pub sound_enabled: bool,

    /// Alert sound volume (0.0-1.0)
    pub sound_volume: f32,

    /// Desired seconds between alerts (10-120).
    ///
    /// Accepted and persisted, but the throttle currently runs on a fixed
    /// 30 s cooldown regardless of this value.
    /// TODO: wire this into the alert cooldown once the intended
    /// interaction with the fixed gate is decided.
    pub alert_frequency_secs: u32,

    /// Dark UI theme (presentation-layer concern, ignored by the engine)
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alert_threshold: 70,
            sound_enabled: true,
            sound_volume: 0.5,
            alert_frequency_secs: 30,
            dark_mode: false,
        }
    }
}

impl Settings {
    /// Validate settings ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.alert_threshold > 100 {
            return Err(Error::Config(
                "Alert threshold must be between 0 and 100".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.sound_volume) {
            return Err(Error::Config(
                "Sound volume must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(10..=120).contains(&self.alert_frequency_secs) {
            return Err(Error::Config(
                "Alert frequency must be between 10 and 120 seconds".to_string(),
            ));
        }
        Ok(())
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Monitoring settings (may be superseded by values in the store)
    pub settings: Settings,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Replay configuration
    pub replay: ReplayConfig,
}

/// Persistent store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding calibration, settings and session documents
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".posture-coach"),
        }
    }
}

/// Recorded pose stream input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Path to a recorded pose stream (JSON, one entry per frame)
    pub pose_stream: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the whole configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a value is out of range.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Posture monitoring configuration

settings:
  alert_threshold: 70
  sound_enabled: true
  sound_volume: 0.5
  alert_frequency_secs: 30
  dark_mode: false

storage:
  data_dir: ".posture-coach"

replay:
  pose_stream: "recordings/session.json"
"#;
