//! Wait conditions
//!
//! Each flag names a real-world condition the host's last command is
//! blocked on. Flags are raised and cleared only by observed device state;
//! outside this crate only [`WaitState::any`] is meaningful.

use bitflags::bitflags;

bitflags! {
    /// Individual wait conditions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Wait: u16 {
        /// Extruder 0 heating
        const EXTRUDER_A = 0x0001;
        /// Extruder 1 heating
        const EXTRUDER_B = 0x0002;
        /// Build platform heating
        const PLATFORM = 0x0004;
        /// Motion queue draining
        const EMPTY_QUEUE = 0x0008;
        /// User must press a button on the LCD panel
        const BUTTON = 0x0010;
        /// SD print started but not yet reported running
        const START = 0x0020;
        /// Bot has been told to abort and has not confirmed
        const BOT_CANCEL = 0x0040;
        /// Bot's action buffer is full
        const BUFFER = 0x0080;
        /// Build paused from the LCD panel
        const UNPAUSE = 0x0100;
        /// Host cancelled before the bot's cancel event arrived
        const CANCEL_SYNC = 0x0200;
    }
}

/// The set of active wait conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaitState {
    flags: Wait,
}

impl WaitState {
    /// No conditions set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any condition is set
    pub fn any(&self) -> bool {
        !self.flags.is_empty()
    }

    pub(crate) fn set(&mut self, wait: Wait) {
        self.flags.insert(wait);
    }

    pub(crate) fn clear(&mut self, wait: Wait) {
        self.flags.remove(wait);
    }

    pub(crate) fn is_set(&self, wait: Wait) -> bool {
        self.flags.intersects(wait)
    }

    pub(crate) fn clear_all(&mut self) {
        self.flags = Wait::empty();
    }

    /// Active conditions
    pub fn flags(&self) -> Wait {
        self.flags
    }
}
