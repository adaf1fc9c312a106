//! x3g command and status codes
//!
//! Closed enumerations over the command codes whose responses carry meaning
//! for the host, plus an explicit `Unrecognized` variant for everything else.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bit that marks a command as appended to the bot's motion queue
pub const QUEUEABLE_BIT: u8 = 0x80;

/// Whether a raw command code is queueable
pub fn is_queueable(code: u8) -> bool {
    code & QUEUEABLE_BIT != 0
}

/// x3g command codes the response translator reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// 03 - Clear buffer
    ClearBuffer,
    /// 07 - Abort immediately
    Abort,
    /// 10 - Tool query
    ToolQuery,
    /// 11 - Is ready?
    IsReady,
    /// 14 - Begin capture to file
    CaptureToFile,
    /// 15 - End capture
    EndCapture,
    /// 16 - Play back capture (print from SD)
    PlaybackCapture,
    /// 17 - Reset
    Reset,
    /// 18 - Get next filename
    NextFilename,
    /// 21 - Get extended position
    ExtendedPosition,
    /// 23 - Get motherboard status
    MotherboardStatus,
    /// 24 - Get build statistics
    BuildStatistics,
    /// 27 - Get advanced version number
    AdvancedVersion,
    /// 131 - Find axes minimums
    FindAxesMinimums,
    /// 132 - Find axes maximums
    FindAxesMaximums,
    /// 133 - Delay
    Delay,
    /// 135 - Wait for tool ready
    WaitForTool,
    /// 141 - Wait for build platform ready
    WaitForPlatform,
    /// 144 - Recall home positions
    RecallHomePositions,
    /// 148 - Display message to LCD
    DisplayMessage,
    /// 149 - Wait for button
    WaitForButton,
    /// Any other command code
    Unrecognized(u8),
}

impl Command {
    /// Map a raw command byte
    pub fn from_code(code: u8) -> Self {
        match code {
            3 => Self::ClearBuffer,
            7 => Self::Abort,
            10 => Self::ToolQuery,
            11 => Self::IsReady,
            14 => Self::CaptureToFile,
            15 => Self::EndCapture,
            16 => Self::PlaybackCapture,
            17 => Self::Reset,
            18 => Self::NextFilename,
            21 => Self::ExtendedPosition,
            23 => Self::MotherboardStatus,
            24 => Self::BuildStatistics,
            27 => Self::AdvancedVersion,
            131 => Self::FindAxesMinimums,
            132 => Self::FindAxesMaximums,
            133 => Self::Delay,
            135 => Self::WaitForTool,
            141 => Self::WaitForPlatform,
            144 => Self::RecallHomePositions,
            148 => Self::DisplayMessage,
            149 => Self::WaitForButton,
            other => Self::Unrecognized(other),
        }
    }

    /// Raw command byte
    pub fn code(&self) -> u8 {
        match self {
            Self::ClearBuffer => 3,
            Self::Abort => 7,
            Self::ToolQuery => 10,
            Self::IsReady => 11,
            Self::CaptureToFile => 14,
            Self::EndCapture => 15,
            Self::PlaybackCapture => 16,
            Self::Reset => 17,
            Self::NextFilename => 18,
            Self::ExtendedPosition => 21,
            Self::MotherboardStatus => 23,
            Self::BuildStatistics => 24,
            Self::AdvancedVersion => 27,
            Self::FindAxesMinimums => 131,
            Self::FindAxesMaximums => 132,
            Self::Delay => 133,
            Self::WaitForTool => 135,
            Self::WaitForPlatform => 141,
            Self::RecallHomePositions => 144,
            Self::DisplayMessage => 148,
            Self::WaitForButton => 149,
            Self::Unrecognized(code) => *code,
        }
    }

    /// Whether the command goes through the bot's motion queue
    pub fn is_queueable(&self) -> bool {
        is_queueable(self.code())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized(code) => write!(f, "command {}", code),
            other => write!(f, "{:?} ({})", other, other.code()),
        }
    }
}

/// Sub-codes of the tool query command (10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolQuery {
    /// 00 - Firmware version
    Version,
    /// 02 - Extruder temperature
    ExtruderTemperature,
    /// 22 - Is extruder ready
    ExtruderReady,
    /// 30 - Build platform temperature
    PlatformTemperature,
    /// 32 - Extruder target temperature
    ExtruderTarget,
    /// 33 - Build platform target temperature
    PlatformTarget,
    /// 35 - Is build platform ready
    PlatformReady,
    /// 36 - Extruder status
    ExtruderStatus,
    /// 37 - PID state
    PidState,
    /// Any other sub-code
    Unrecognized(u8),
}

impl ToolQuery {
    /// Map a raw query byte
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Version,
            2 => Self::ExtruderTemperature,
            22 => Self::ExtruderReady,
            30 => Self::PlatformTemperature,
            32 => Self::ExtruderTarget,
            33 => Self::PlatformTarget,
            35 => Self::PlatformReady,
            36 => Self::ExtruderStatus,
            37 => Self::PidState,
            other => Self::Unrecognized(other),
        }
    }

    /// Raw query byte
    pub fn code(&self) -> u8 {
        match self {
            Self::Version => 0,
            Self::ExtruderTemperature => 2,
            Self::ExtruderReady => 22,
            Self::PlatformTemperature => 30,
            Self::ExtruderTarget => 32,
            Self::PlatformTarget => 33,
            Self::PlatformReady => 35,
            Self::ExtruderStatus => 36,
            Self::PidState => 37,
            Self::Unrecognized(code) => *code,
        }
    }
}

/// Build state reported by the build statistics query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildStatus {
    /// No build initialized
    #[default]
    None,
    /// Build running
    Running,
    /// Build finished normally
    FinishedNormally,
    /// Build paused
    Paused,
    /// Build cancelled
    Cancelled,
    /// Build is being cancelled
    Cancelling,
    /// Status byte outside the known range
    Unrecognized(u8),
}

impl BuildStatus {
    /// Map a raw status byte
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Running,
            2 => Self::FinishedNormally,
            3 => Self::Paused,
            4 => Self::Cancelled,
            5 => Self::Cancelling,
            other => Self::Unrecognized(other),
        }
    }

    /// Whether a bot-side cancel could still be in progress
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Paused | Self::Cancelling)
    }
}

bitflags! {
    /// Motherboard status bits (command 23)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct MotherboardFlags: u8 {
        const PREHEAT = 0x01;
        const MANUAL_MODE = 0x02;
        const ONBOARD_SCRIPT = 0x04;
        const ONBOARD_PROCESS = 0x08;
        const WAIT_FOR_BUTTON = 0x10;
        const BUILD_CANCELLING = 0x20;
        const HEAT_SHUTDOWN = 0x40;
        const POWER_ERROR = 0x80;
    }
}

/// SD status byte meaning "file not found" in the playback response
pub const SD_FILE_NOT_FOUND: u8 = 7;

/// Firmware variant identifiers from the advanced version query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirmwareVariant {
    /// Stock MakerBot firmware
    Makerbot,
    /// Sailfish
    Sailfish,
    /// Anything else
    Unknown(u8),
}

impl FirmwareVariant {
    /// Map a raw variant byte
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => Self::Makerbot,
            0x80 => Self::Sailfish,
            other => Self::Unknown(other),
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Makerbot => "Makerbot",
            Self::Sailfish => "Sailfish",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Reference URL, or "Unknown"
    pub fn url(&self) -> &'static str {
        match self {
            Self::Makerbot => "https://support.makerbot.com/learn/earlier-products/replicator-original/updating-firmware-for-the-makerbot-replicator-via-replicatorg_13302",
            Self::Sailfish => "http://www.sailfishfirmware.com",
            Self::Unknown(_) => "Unknown",
        }
    }
}
