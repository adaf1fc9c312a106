//! X3GBridge Settings Crate
//!
//! Handles bridge configuration: file loading and saving, defaults and
//! validation.

pub mod config;
pub mod error;

pub use config::{
    BridgeConfig, DaemonSettings, LoggingSettings, MachineProfile, SessionSettings, StepsPerMm,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
