//! Host-facing communication glue

pub mod daemon;

pub use daemon::{DaemonBridge, DaemonConfig, DEFAULT_LINE_LIMIT, GREETING};
