//! Per-connection translation context
//!
//! A [`Session`] owns the wait state, the reply being built, the cached SD
//! listing and the one-shot flags that carry the conversation with the host
//! from one line to the next. One session exists per live connection;
//! reconnecting resets it rather than replacing it.

use super::reply_buffer::{ReplyBuffer, DEFAULT_CAPACITY};
use super::string_table::{StringTable, DEFAULT_CHUNK};
use super::wait_state::{Wait, WaitState};
use x3gbridge_core::{AxisMask, ExtruderExcess, MachineProfile, ProgramState, SharedMachine, TableError};

/// Tunables for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Reply buffer capacity in bytes
    pub reply_capacity: usize,
    /// Growth chunk of the directory listing cache
    pub listing_chunk: usize,
    /// Seconds after starting an SD print during which "not printing" is suppressed
    pub start_grace_secs: i64,
    /// A grace deadline further away than this is treated as a clock jump
    pub clock_skew_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reply_capacity: DEFAULT_CAPACITY,
            listing_chunk: DEFAULT_CHUNK,
            start_grace_secs: 3,
            clock_skew_secs: 4,
        }
    }
}

/// Where the session stands in reconciling a cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelState {
    /// No cancellation in flight
    Normal,
    /// The bot cancelled; waiting for the host to acknowledge
    CancelPending,
    /// The host cancelled first; waiting for the bot's cancel event
    CancelSyncWait,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SessionFlags {
    pub ok_pending: bool,
    pub cancel_pending: bool,
    pub get_pos_when_ready: bool,
    pub listing_files: bool,
    pub wait_cleared_by_cancel: bool,
}

/// Translation state for one connection
#[derive(Debug)]
pub struct Session {
    pub(crate) waits: WaitState,
    pub(crate) reply: ReplyBuffer,
    pub(crate) listing: StringTable,
    pub(crate) flags: SessionFlags,
    /// Grace period deadline in wall-clock seconds, 0 when inactive
    pub(crate) start_deadline: i64,
    pub(crate) machine: SharedMachine,
    profile: MachineProfile,
    config: SessionConfig,
}

impl Session {
    /// Create a session bound to `machine`. The machine's current profile is
    /// remembered and restored whenever the session is reset.
    pub fn new(machine: SharedMachine, config: SessionConfig) -> Result<Self, TableError> {
        let profile = machine.read().profile.clone();
        Ok(Self {
            waits: WaitState::new(),
            reply: ReplyBuffer::new(config.reply_capacity),
            listing: StringTable::with_capacity(config.listing_chunk)?,
            flags: SessionFlags::default(),
            start_deadline: 0,
            machine,
            profile,
            config,
        })
    }

    /// Return to the freshly connected state
    pub fn reset(&mut self) {
        self.waits.clear_all();
        self.reply.reset();
        self.listing.clear();
        self.flags = SessionFlags::default();
        self.start_deadline = 0;
        self.machine.write().reset(self.profile.clone());
        tracing::debug!("session reset");
    }

    /// Prepare for a new host line
    pub fn begin_line(&mut self) {
        self.reply.reset();
        self.waits.clear(Wait::BUFFER);
        self.flags.ok_pending = !self.waits.any();
    }

    /// Close the current host line's reply
    pub fn end_line(&mut self) {
        self.flags.ok_pending = false;
        self.reply.append("\n");
    }

    /// Current reply text
    pub fn reply(&self) -> &str {
        self.reply.as_str()
    }

    /// Mutable access to the reply, for callers that add framing
    pub fn reply_mut(&mut self) -> &mut ReplyBuffer {
        &mut self.reply
    }

    /// Whether any wait condition is active
    pub fn is_waiting(&self) -> bool {
        self.waits.any()
    }

    /// Active wait conditions
    pub fn waits(&self) -> &WaitState {
        &self.waits
    }

    /// Whether the turn-taking acknowledgment is owed to the host
    pub fn ok_pending(&self) -> bool {
        self.flags.ok_pending
    }

    /// Cached SD directory listing
    pub fn listing(&self) -> &StringTable {
        &self.listing
    }

    /// Whether an active wait was abandoned because of a cancellation
    /// rather than satisfied
    pub fn wait_cleared_by_cancel(&self) -> bool {
        self.flags.wait_cleared_by_cancel
    }

    /// Shared machine state
    pub fn machine(&self) -> &SharedMachine {
        &self.machine
    }

    /// Session tunables
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Cancellation reconciliation state
    pub fn cancel_state(&self) -> CancelState {
        if self.flags.cancel_pending {
            CancelState::CancelPending
        } else if self.waits.is_set(Wait::CANCEL_SYNC) {
            CancelState::CancelSyncWait
        } else {
            CancelState::Normal
        }
    }

    /// Emit the acknowledgment owed from the previous line, if any
    pub(crate) fn emit_pending_ok(&mut self) {
        if self.flags.ok_pending {
            self.flags.ok_pending = false;
            self.reply.append("ok");
        }
    }

    /// Reset the reply because a wait-type command replaces any output
    pub(crate) fn start_wait(&mut self, wait: Wait) {
        self.reply.reset();
        self.waits.set(wait);
    }

    /// The bot cancelled: forget in-flight state and wait for the queue
    pub(crate) fn clear_state_for_cancel(&mut self) {
        {
            let mut machine = self.machine.write();
            machine.program_state = ProgramState::Ready;
            machine.position_known = AxisMask::empty();
            machine.excess = ExtruderExcess::default();
        }
        if self.waits.any() {
            self.flags.wait_cleared_by_cancel = true;
            tracing::debug!("setting wait_cleared_by_cancel");
        }
        self.waits.clear_all();
        self.waits.set(Wait::EMPTY_QUEUE);
        self.flags.get_pos_when_ready = false;
    }

    /// The host acknowledged a cancellation
    pub(crate) fn acknowledge_cancel(&mut self) {
        let running = self.machine.read().program_state == ProgramState::Running;
        if !self.flags.cancel_pending && running {
            tracing::debug!("got clear_cancel before the bot's cancel event, waiting for abort");
            self.waits.set(Wait::CANCEL_SYNC);
        } else {
            self.flags.cancel_pending = false;
            self.waits.set(Wait::EMPTY_QUEUE);
        }
    }
}
