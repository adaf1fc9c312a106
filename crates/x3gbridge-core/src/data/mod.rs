//! Data models for the machine and the live session
//!
//! This module provides:
//! - The machine profile (type name, tool count, steps-per-mm per axis)
//! - Logical position tracking for the five x3g axes (X, Y, Z, A, B)
//! - The "axis known" bitmask used to decide which axes may be backfilled
//! - Program state (ready, running, ended)
//! - [`MachineState`], the state shared between the forward translator and
//!   the response translator

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps-per-millimetre for each stepper axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepsPerMm {
    /// X axis
    pub x: f64,
    /// Y axis
    pub y: f64,
    /// Z axis
    pub z: f64,
    /// A axis (right/first extruder)
    pub a: f64,
    /// B axis (left/second extruder)
    pub b: f64,
}

impl Default for StepsPerMm {
    fn default() -> Self {
        // Replicator 2
        Self {
            x: 88.573186,
            y: 88.573186,
            z: 400.0,
            a: 96.275_201_870_333_66,
            b: 96.275_201_870_333_66,
        }
    }
}

/// Static description of the connected machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineProfile {
    /// Short machine type identifier, e.g. "r2" or "r1d"
    pub machine_type: String,
    /// Number of extruders fitted
    pub extruder_count: u8,
    /// Steps-per-mm for each axis
    pub steps_per_mm: StepsPerMm,
}

impl Default for MachineProfile {
    fn default() -> Self {
        Self {
            machine_type: "r2".to_string(),
            extruder_count: 1,
            steps_per_mm: StepsPerMm::default(),
        }
    }
}

/// Logical position of the five x3g axes in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
    /// A-axis (extruder 0) position
    pub a: f64,
    /// B-axis (extruder 1) position
    pub b: f64,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X:{:.3} Y:{:.3} Z:{:.3} A:{:.3} B:{:.3}",
            self.x, self.y, self.z, self.a, self.b
        )
    }
}

bitflags! {
    /// Axes whose logical position the translator is confident about
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct AxisMask: u8 {
        const X = 0x01;
        const Y = 0x02;
        const Z = 0x04;
        const A = 0x08;
        const B = 0x10;
    }
}

/// Program state of the host's print stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProgramState {
    /// Ready for a new program
    #[default]
    Ready,
    /// A program is streaming
    Running,
    /// The program ended; becomes `Ready` when the next line is finalized
    Ended,
}

impl ProgramState {
    /// Whether the state is past `Running`
    pub fn has_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Running => write!(f, "running"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Accumulated extrusion that has not been sent to the bot yet
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtruderExcess {
    /// Excess on the A axis
    pub a: f64,
    /// Excess on the B axis
    pub b: f64,
}

/// Machine and session state shared by both translation directions
///
/// The forward translator owns most of the writes; the response translator
/// reads the profile and mutates program state, known axes and the
/// backfilled position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MachineState {
    /// Machine profile
    pub profile: MachineProfile,
    /// Currently selected tool index
    pub current_extruder: u8,
    /// Current logical position
    pub position: Position,
    /// Axes whose position is known
    pub position_known: AxisMask,
    /// Program state
    pub program_state: ProgramState,
    /// Whether macro expansion is enabled in the forward translator
    pub macros_enabled: bool,
    /// Pending extrusion excess
    pub excess: ExtruderExcess,
    /// File chosen by the last SD select command
    pub selected_filename: Option<String>,
}

impl MachineState {
    /// Create state for the given profile
    pub fn new(profile: MachineProfile) -> Self {
        Self {
            profile,
            macros_enabled: true,
            ..Self::default()
        }
    }

    /// Forget everything learned during a connection and install `profile`
    pub fn reset(&mut self, profile: MachineProfile) {
        tracing::debug!(
            "machine state reset: {} with {} extruder(s)",
            profile.machine_type,
            profile.extruder_count
        );
        *self = Self::new(profile);
    }

    /// Steps-per-mm of the extruder axis used by the active tool
    pub fn extruder_steps(&self) -> f64 {
        if self.current_extruder == 1 {
            self.profile.steps_per_mm.b
        } else {
            self.profile.steps_per_mm.a
        }
    }

    /// Whether the machine has more than one tool
    pub fn is_multi_tool(&self) -> bool {
        self.profile.extruder_count > 1
    }
}
