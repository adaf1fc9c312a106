//! Configuration for X3GBridge
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Machine profile (type, extruder count, steps-per-mm)
//! - Session tunables (reply capacity, listing cache growth, print start grace)
//! - Daemon line limits
//! - Logging output

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
pub use x3gbridge_core::{MachineProfile, StepsPerMm};

/// Directory name under the platform config directory
pub const APP_DIR: &str = "x3gbridge";

/// Default configuration file name
pub const CONFIG_FILE: &str = "config.toml";

/// Per-connection session tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Reply buffer capacity in bytes
    pub reply_capacity: usize,
    /// Growth chunk of the SD listing cache
    pub listing_chunk: usize,
    /// Seconds "not printing" is suppressed after starting an SD print
    pub start_grace_secs: i64,
    /// Grace deadlines further away than this are treated as a clock jump
    pub clock_skew_secs: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            reply_capacity: 1024,
            listing_chunk: 10,
            start_grace_secs: 3,
            clock_skew_secs: 4,
        }
    }
}

/// Daemon loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    /// Longest accepted host line in characters
    pub line_limit: usize,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self { line_limit: 1024 }
    }
}

/// Logging output settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Raise the default filter from info to debug
    pub verbose: bool,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    /// Append to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

/// Complete bridge configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Machine profile
    pub machine: MachineProfile,
    /// Session tunables
    pub session: SessionSettings,
    /// Daemon settings
    pub daemon: DaemonSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
    }
}

impl BridgeConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform default location of the configuration file
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load config from `path`, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        // Validate machine profile
        if self.machine.machine_type.trim().is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "machine.machine_type".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if !(1..=2).contains(&self.machine.extruder_count) {
            return Err(SettingsError::InvalidSetting {
                key: "machine.extruder_count".to_string(),
                reason: "must be 1 or 2".to_string(),
            });
        }

        let steps = &self.machine.steps_per_mm;
        for (axis, value) in [
            ("x", steps.x),
            ("y", steps.y),
            ("z", steps.z),
            ("a", steps.a),
            ("b", steps.b),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(
                    ConfigError::out_of_range(&format!("machine.steps_per_mm.{}", axis), value)
                        .into(),
                );
            }
        }

        // Validate session settings
        if self.session.reply_capacity == 0 {
            return Err(ConfigError::out_of_range("session.reply_capacity", 0).into());
        }

        if self.session.listing_chunk == 0 {
            return Err(ConfigError::out_of_range("session.listing_chunk", 0).into());
        }

        if self.session.start_grace_secs < 0 {
            return Err(ConfigError::out_of_range(
                "session.start_grace_secs",
                self.session.start_grace_secs,
            )
            .into());
        }

        if self.session.clock_skew_secs <= 0 {
            return Err(ConfigError::out_of_range(
                "session.clock_skew_secs",
                self.session.clock_skew_secs,
            )
            .into());
        }

        // Validate daemon settings
        if self.daemon.line_limit == 0 {
            return Err(ConfigError::out_of_range("daemon.line_limit", 0).into());
        }

        Ok(())
    }
}
