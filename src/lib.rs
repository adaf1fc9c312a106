//! # X3GBridge
//!
//! Translates the binary replies of x3g/s3g printers (MakerBot, Sailfish)
//! back into the RepRap text stream that host software expects, including
//! the "ok" turn-taking acknowledgments, temperature and position reports,
//! SD card listings and print status lines.
//!
//! ## Architecture
//!
//! X3GBridge is organized as a workspace with multiple crates:
//!
//! 1. **x3gbridge-core** - Error taxonomy, shared machine state, type aliases
//! 2. **x3gbridge-communication** - Response translation, result mapping, daemon line loop
//! 3. **x3gbridge-settings** - Configuration files and validation
//! 4. **x3gbridge** - This facade: logging setup and wiring
//!
//! The forward text-to-x3g translator and the serial transport are supplied
//! by the embedding application through the [`ForwardTranslator`] and
//! [`Transport`] traits.

use anyhow::Context;
use std::io::{BufRead, Write};

pub use x3gbridge_communication::{firmware, translation};

pub use x3gbridge_core::{
    thread_safe_rw, AxisMask, Error, MachineProfile, MachineState, Position,
    ProgramState, Result, SharedMachine, StepsPerMm, TableError,
};

pub use x3gbridge_communication::{
    decode_outcome, Bridge, BuildStatus, CancelState, Clock, Command, ControlMessage,
    DaemonBridge, DaemonConfig, DeviceCode, DeviceResponse, FirmwareVariant, ForwardTranslator,
    HostCommand, ManualClock, MotherboardFlags, Outcome, OutcomeText, Packet, ReplyBuffer,
    ResponseSink, ResponseTranslator, Session, SessionConfig, StringTable, SystemClock,
    ToolQuery, Transport,
};

pub use x3gbridge_settings::{
    BridgeConfig, ConfigError, DaemonSettings, LoggingSettings, SessionSettings, SettingsError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(settings: &LoggingSettings) -> &'static str {
    if settings.verbose {
        "debug"
    } else {
        "info"
    }
}

/// Initialize logging from the logging settings
///
/// Sets up structured logging with:
/// - RUST_LOG environment variable support, falling back to info (debug when verbose)
/// - Human-readable or JSON lines
/// - stderr, or a log file opened for append
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use std::fs::OpenOptions;
    use std::sync::Mutex;
    use tracing_subscriber::fmt;
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(settings)));

    let writer = match &settings.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if settings.json {
        registry
            .with(fmt::layer().json().with_writer(writer).with_target(true))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(settings.log_file.is_none()),
            )
            .try_init()
    }
    .context("Failed to install the tracing subscriber")?;

    Ok(())
}

/// Session tunables from configuration
pub fn session_config(settings: &SessionSettings) -> SessionConfig {
    SessionConfig {
        reply_capacity: settings.reply_capacity,
        listing_chunk: settings.listing_chunk,
        start_grace_secs: settings.start_grace_secs,
        clock_skew_secs: settings.clock_skew_secs,
    }
}

/// Daemon loop settings from configuration
pub fn daemon_config(settings: &DaemonSettings) -> DaemonConfig {
    DaemonConfig {
        line_limit: settings.line_limit,
    }
}

/// Build a bridge around `forward` for the configured machine
///
/// `machine` is the state shared with the forward translator; it is reset to
/// the configured profile.
pub fn new_bridge<F: ForwardTranslator>(
    config: &BridgeConfig,
    forward: F,
    machine: SharedMachine,
) -> anyhow::Result<Bridge<F>> {
    {
        let mut state = machine.write();
        state.reset(config.machine.clone());
    }
    let session = Session::new(machine, session_config(&config.session))
        .context("Failed to allocate session state")?;
    Ok(Bridge::new(
        forward,
        ResponseTranslator::with_system_clock(session),
    ))
}

/// Serve a host endpoint until it closes
pub fn run_daemon<F, R, W>(
    config: &BridgeConfig,
    forward: F,
    machine: SharedMachine,
    upstream_in: R,
    upstream_out: W,
) -> anyhow::Result<()>
where
    F: ForwardTranslator,
    R: BufRead,
    W: Write,
{
    let mut bridge = new_bridge(config, forward, machine)?;
    bridge.connect();

    tracing::info!(
        "x3gbridge {} ({}) serving {} with {} extruder(s)",
        VERSION,
        BUILD_DATE,
        config.machine.machine_type,
        config.machine.extruder_count
    );

    let mut daemon = DaemonBridge::new(upstream_in, upstream_out, daemon_config(&config.daemon));
    let result = daemon.run(&mut bridge);
    bridge.disconnect();

    result.context("Daemon bridge stopped")?;
    Ok(())
}
