//! Packets, decoded device responses and the host command context
//!
//! A [`Packet`] is the unframed x3g payload produced by the forward
//! translator. The transport sends it and decodes the reply into a
//! [`DeviceResponse`]; the two are paired into a [`ResponseEnvelope`] before
//! interpretation.

use super::codes::{BuildStatus, Command, FirmwareVariant, MotherboardFlags, ToolQuery};
use serde::{Deserialize, Serialize};

const COMMAND_OFFSET: usize = 0;
const TOOL_OFFSET: usize = 1;
const QUERY_OFFSET: usize = 2;

/// An unframed x3g command payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    payload: Vec<u8>,
}

impl Packet {
    /// Wrap a payload; the first byte is the command code
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    /// Packet for "get extended position" (21)
    pub fn extended_position() -> Self {
        Self::new(vec![Command::ExtendedPosition.code()])
    }

    /// Raw command code, 0 for an empty payload
    pub fn command_code(&self) -> u8 {
        self.byte(COMMAND_OFFSET)
    }

    /// Decoded command
    pub fn command(&self) -> Command {
        Command::from_code(self.command_code())
    }

    /// Addressed tool index
    pub fn tool(&self) -> u8 {
        self.byte(TOOL_OFFSET)
    }

    /// Tool query sub-code
    pub fn query(&self) -> ToolQuery {
        ToolQuery::from_code(self.byte(QUERY_OFFSET))
    }

    /// Payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    fn byte(&self, offset: usize) -> u8 {
        self.payload.get(offset).copied().unwrap_or(0)
    }
}

/// Bot position in steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub a: i32,
    pub b: i32,
}

/// Build statistics payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildStatistics {
    /// Build state
    pub status: BuildStatus,
    /// Line number of the SD file currently executing
    pub line_number: u32,
}

/// Firmware version payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareInfo {
    /// Version as major * 100 + minor
    pub version: u16,
    /// Firmware variant
    pub variant: FirmwareVariant,
}

impl FirmwareInfo {
    /// Major version number
    pub fn major(&self) -> u16 {
        self.version / 100
    }

    /// Minor version number
    pub fn minor(&self) -> u16 {
        self.version % 100
    }
}

impl Default for FirmwareInfo {
    fn default() -> Self {
        Self {
            version: 0,
            variant: FirmwareVariant::Unknown(0),
        }
    }
}

/// SD card payload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SdResponse {
    /// SD response code, 0 is success
    pub status: u8,
    /// Filename, empty at the end of a listing
    pub filename: String,
}

/// Fields decoded by the transport from a device reply
///
/// Only the fields relevant to the command that was sent are meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceResponse {
    /// Temperature in degrees C
    pub temperature: u16,
    /// Readiness flag
    pub is_ready: bool,
    /// Position in steps
    pub position: StepPosition,
    /// Motherboard status bits
    pub motherboard: MotherboardFlags,
    /// Build statistics
    pub build: BuildStatistics,
    /// Firmware version
    pub firmware: FirmwareInfo,
    /// SD card reply
    pub sd: SdResponse,
}

impl DeviceResponse {
    /// Response carrying a temperature
    pub fn temperature(temperature: u16) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }

    /// Response carrying a readiness flag
    pub fn ready(is_ready: bool) -> Self {
        Self {
            is_ready,
            ..Self::default()
        }
    }

    /// Response carrying build statistics
    pub fn build(status: BuildStatus, line_number: u32) -> Self {
        Self {
            build: BuildStatistics {
                status,
                line_number,
            },
            ..Self::default()
        }
    }

    /// Response carrying an SD reply
    pub fn sd(status: u8, filename: impl Into<String>) -> Self {
        Self {
            sd: SdResponse {
                status,
                filename: filename.into(),
            },
            ..Self::default()
        }
    }

    /// Response carrying a position
    pub fn position(position: StepPosition) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Response carrying motherboard status bits
    pub fn motherboard(flags: MotherboardFlags) -> Self {
        Self {
            motherboard: flags,
            ..Self::default()
        }
    }

    /// Response carrying firmware information
    pub fn firmware(version: u16, variant: FirmwareVariant) -> Self {
        Self {
            firmware: FirmwareInfo { version, variant },
            ..Self::default()
        }
    }
}

/// A command paired with the device's reply to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseEnvelope<'a> {
    /// Command that was sent
    pub command: Command,
    /// Addressed tool index
    pub tool: u8,
    /// Tool query sub-code (meaningful for [`Command::ToolQuery`] only)
    pub query: ToolQuery,
    /// Decoded reply
    pub response: &'a DeviceResponse,
}

impl<'a> ResponseEnvelope<'a> {
    /// Pair a packet with its decoded reply
    pub fn new(packet: &Packet, response: &'a DeviceResponse) -> Self {
        Self {
            command: packet.command(),
            tool: packet.tool(),
            query: packet.query(),
            response,
        }
    }
}

/// The host text command that produced the current packets
///
/// Threaded explicitly through every response so interpretation that depends
/// on what the host asked for (M21 vs M20, M27, M115) never relies on
/// ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostCommand {
    /// M code, when the line carried one
    pub m: Option<u16>,
    /// Free-text argument, e.g. a filename
    pub arg: Option<String>,
}

impl HostCommand {
    /// Command with an M code
    pub fn m(code: u16) -> Self {
        Self {
            m: Some(code),
            arg: None,
        }
    }

    /// Attach an argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    /// Whether this is the given M code
    pub fn is_m(&self, code: u16) -> bool {
        self.m == Some(code)
    }
}
