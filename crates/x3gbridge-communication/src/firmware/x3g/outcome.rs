//! Outcome codes and their reply text
//!
//! Every packet round trip and every host line ends in an [`Outcome`]: a
//! success, a transport/OS failure, or a status byte reported by the bot.
//! [`decode_outcome`] converts the terminal ones to the text a RepRap host
//! expects to see.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status bytes reported by the bot in place of a success reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceCode {
    /// 0x80 - Generic packet error
    GenericPacketError,
    /// 0x82 - Action buffer overflow
    BufferOverflow,
    /// 0x83 - CRC mismatch
    CrcMismatch,
    /// 0x84 - Query packet too big
    QueryTooBig,
    /// 0x85 - Command not supported or recognized
    NotSupported,
    /// 0x87 - Downstream timeout
    DownstreamTimeout,
    /// 0x88 - Tool lock timeout
    ToolLockTimeout,
    /// 0x89 - Build cancelled
    CancelBuild,
    /// 0x8A - Bot is printing from SD
    SdPrinting,
    /// 0x8B - Overheat
    Overheat,
    /// 0x8C - Packet timeout
    PacketTimeout,
}

impl DeviceCode {
    /// Map a status byte, `None` for codes outside the table
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0x80 => Some(Self::GenericPacketError),
            0x82 => Some(Self::BufferOverflow),
            0x83 => Some(Self::CrcMismatch),
            0x84 => Some(Self::QueryTooBig),
            0x85 => Some(Self::NotSupported),
            0x87 => Some(Self::DownstreamTimeout),
            0x88 => Some(Self::ToolLockTimeout),
            0x89 => Some(Self::CancelBuild),
            0x8A => Some(Self::SdPrinting),
            0x8B => Some(Self::Overheat),
            0x8C => Some(Self::PacketTimeout),
            _ => None,
        }
    }

    /// Status byte
    pub fn code(&self) -> i32 {
        match self {
            Self::GenericPacketError => 0x80,
            Self::BufferOverflow => 0x82,
            Self::CrcMismatch => 0x83,
            Self::QueryTooBig => 0x84,
            Self::NotSupported => 0x85,
            Self::DownstreamTimeout => 0x87,
            Self::ToolLockTimeout => 0x88,
            Self::CancelBuild => 0x89,
            Self::SdPrinting => 0x8A,
            Self::Overheat => 0x8B,
            Self::PacketTimeout => 0x8C,
        }
    }
}

/// Result of a packet round trip or of a whole host line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Completed
    Success,
    /// Input exhausted; treated as success
    EndOfFile,
    /// The OS refused access to the port
    OsError,
    /// Internal translator failure
    Internal,
    /// Serial write failed
    SerialWrite,
    /// Serial read failed
    SerialRead,
    /// Framing error
    SerialFrame,
    /// No reply in time
    SerialTimeout,
    /// Checksum error on the reply
    SerialCrc,
    /// Status byte from the bot
    Device(DeviceCode),
    /// A code nobody recognizes
    Unrecognized(i32),
}

impl Outcome {
    /// Map an integer code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::EndOfFile,
            -1 => Self::OsError,
            -2 => Self::Internal,
            -3 => Self::SerialWrite,
            -4 => Self::SerialRead,
            -5 => Self::SerialFrame,
            -6 => Self::SerialTimeout,
            -7 => Self::SerialCrc,
            other => DeviceCode::from_code(other)
                .map(Self::Device)
                .unwrap_or(Self::Unrecognized(other)),
        }
    }

    /// Integer code
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::EndOfFile => 1,
            Self::OsError => -1,
            Self::Internal => -2,
            Self::SerialWrite => -3,
            Self::SerialRead => -4,
            Self::SerialFrame => -5,
            Self::SerialTimeout => -6,
            Self::SerialCrc => -7,
            Self::Device(device) => device.code(),
            Self::Unrecognized(code) => *code,
        }
    }

    /// Whether the outcome lets the line complete normally
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::EndOfFile)
    }
}

impl From<DeviceCode> for Outcome {
    fn from(code: DeviceCode) -> Self {
        Self::Device(code)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// How a terminal outcome shows up in the reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeText {
    /// Nothing to add
    Silent,
    /// Replace the reply with an error line
    Error(String),
    /// Append a status line to whatever is there
    Status(&'static str),
    /// Replace the reply with a status line
    ReplaceStatus(&'static str),
}

/// Decode a terminal outcome to its reply text
///
/// `Device(CancelBuild)` and `Device(BufferOverflow)` also carry state
/// changes; those are applied by the result mapper, this only covers text.
pub fn decode_outcome(outcome: Outcome) -> OutcomeText {
    match outcome {
        Outcome::Success | Outcome::EndOfFile => OutcomeText::Silent,
        Outcome::OsError => {
            OutcomeText::Error("Error: OS error trying to access X3G port".to_string())
        }
        Outcome::Internal => OutcomeText::Error("Error: GPX error".to_string()),
        Outcome::SerialWrite | Outcome::SerialRead | Outcome::SerialFrame | Outcome::SerialCrc => {
            OutcomeText::Error(format!(
                "Error: Serial communication error on X3G port. code = {}",
                outcome.code()
            ))
        }
        Outcome::SerialTimeout => OutcomeText::Error("Error: Timeout on X3G port".to_string()),
        Outcome::Device(device) => match device {
            DeviceCode::GenericPacketError => {
                OutcomeText::Error("Error: X3G generic packet error".to_string())
            }
            DeviceCode::BufferOverflow => OutcomeText::Status("Status: Buffer full"),
            // TODO: resend the packet once the transport exposes a retry hook
            DeviceCode::CrcMismatch => {
                OutcomeText::Error("Error: X3G checksum mismatch".to_string())
            }
            DeviceCode::QueryTooBig => {
                OutcomeText::Error("Error: X3G query packet too big".to_string())
            }
            DeviceCode::NotSupported => {
                OutcomeText::Error("Error: X3G command not supported or recognized".to_string())
            }
            DeviceCode::DownstreamTimeout => {
                OutcomeText::Error("Error: X3G timeout downstream".to_string())
            }
            DeviceCode::ToolLockTimeout => {
                OutcomeText::Error("Error: X3G timeout for tool lock".to_string())
            }
            DeviceCode::CancelBuild => OutcomeText::Status("Build cancelled"),
            DeviceCode::SdPrinting => OutcomeText::ReplaceStatus("SD printing"),
            DeviceCode::Overheat => OutcomeText::Error(
                "Error: RC_BOT_OVERHEAT Printer reports overheat condition".to_string(),
            ),
            DeviceCode::PacketTimeout => OutcomeText::Error("Error: timeout".to_string()),
        },
        Outcome::Unrecognized(code) => {
            OutcomeText::Error(format!("Error: Unknown error code: {}", code))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_map_both_ways() {
        for code in [0, 1, -1, -2, -3, -4, -5, -6, -7, 0x80, 0x82, 0x83, 0x84, 0x85, 0x87, 0x88, 0x89, 0x8A, 0x8B, 0x8C] {
            let outcome = Outcome::from_code(code);
            assert!(!matches!(outcome, Outcome::Unrecognized(_)), "{}", code);
            assert_eq!(outcome.code(), code);
        }
        assert_eq!(Outcome::from_code(0x81), Outcome::Unrecognized(0x81));
        assert_eq!(Outcome::from_code(0x86), Outcome::Unrecognized(0x86));
    }

    #[test]
    fn test_decode_transport_failures() {
        assert_eq!(
            decode_outcome(Outcome::SerialCrc),
            OutcomeText::Error("Error: Serial communication error on X3G port. code = -7".to_string())
        );
        assert_eq!(
            decode_outcome(Outcome::SerialTimeout),
            OutcomeText::Error("Error: Timeout on X3G port".to_string())
        );
        assert_eq!(decode_outcome(Outcome::EndOfFile), OutcomeText::Silent);
    }

    #[test]
    fn test_decode_device_codes() {
        assert_eq!(
            decode_outcome(DeviceCode::BufferOverflow.into()),
            OutcomeText::Status("Status: Buffer full")
        );
        assert_eq!(
            decode_outcome(DeviceCode::SdPrinting.into()),
            OutcomeText::ReplaceStatus("SD printing")
        );
        assert!(matches!(
            decode_outcome(DeviceCode::ToolLockTimeout.into()),
            OutcomeText::Error(text) if text.contains("tool lock")
        ));
    }

    #[test]
    fn test_decode_unknown() {
        assert_eq!(
            decode_outcome(Outcome::Unrecognized(42)),
            OutcomeText::Error("Error: Unknown error code: 42".to_string())
        );
    }
}
