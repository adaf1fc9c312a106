//! # X3GBridge Communication
//!
//! Reverse half of an x3g/RepRap bridge: interprets the binary replies of
//! MakerBot/Sailfish printers and answers the host in RepRap text, keeping
//! the turn-taking ("ok") discipline that host software relies on.
//! Also provides the blocking daemon loop that serves a text endpoint.

pub mod communication;
pub mod firmware;
pub mod translation;

pub use communication::{DaemonBridge, DaemonConfig};

pub use firmware::x3g::{
    decode_outcome, BuildStatus, Command, DeviceCode, DeviceResponse, FirmwareVariant,
    HostCommand, MotherboardFlags, Outcome, OutcomeText, Packet, ToolQuery,
};

pub use translation::{
    Bridge, CancelState, Clock, ControlMessage, ForwardTranslator, ManualClock, ReplyBuffer,
    ResponseSink, ResponseTranslator, Session, SessionConfig, StringTable, SystemClock,
    Transport,
};
