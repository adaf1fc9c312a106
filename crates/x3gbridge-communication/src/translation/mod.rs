//! Reverse translation: x3g replies back to RepRap text
//!
//! The forward translator (not part of this crate) turns each host line into
//! x3g packets. This module interprets the bot's replies to those packets,
//! keeps the per-connection state that carries the conversation between
//! lines, and builds the text the host reads back.

pub mod clock;
pub mod interfaces;
#[cfg(test)]
pub(crate) mod log_capture;
pub mod pipeline;
pub mod reply_buffer;
pub mod result_mapper;
pub mod session;
pub mod string_table;
pub mod translator;
pub mod wait_state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use interfaces::{ControlMessage, ForwardTranslator, ResponseSink, Transport};
pub use pipeline::Bridge;
pub use reply_buffer::ReplyBuffer;
pub use result_mapper::IMPLICIT_POLL;
pub use session::{CancelState, Session, SessionConfig};
pub use string_table::StringTable;
pub use translator::ResponseTranslator;
pub use wait_state::{Wait, WaitState};
