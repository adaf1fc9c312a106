//! Final mapping of a line's outcome to reply text
//!
//! Runs once per host line after the forward translator returns. Handles
//! the implicit temperature poll while waiting, the error and status text,
//! the device-initiated cancel, and the closing "ok" when a wait ends.

use super::clock::Clock;
use super::interfaces::ForwardTranslator;
use super::translator::ResponseTranslator;
use super::wait_state::Wait;
use crate::firmware::x3g::{decode_outcome, DeviceCode, Outcome, OutcomeText};
use x3gbridge_core::ProgramState;

/// Line the bridge injects to poll the bot while a wait is active
pub const IMPLICIT_POLL: &str = "M105";

impl<C: Clock> ResponseTranslator<C> {
    /// Map `outcome` for the line just translated and return the final outcome
    pub fn finalize(&mut self, outcome: Outcome, forward: &mut dyn ForwardTranslator) -> Outcome {
        let waiting = self.session.waits.any();

        {
            let mut machine = self.session.machine.write();
            if machine.program_state.has_ended() {
                machine.program_state = ProgramState::Ready;
            }
            machine.macros_enabled = true;
        }

        let mut outcome = outcome;
        // nothing was said while we wait: query temperatures so the host sees progress
        if outcome == Outcome::Success && waiting && self.session.reply.is_empty() {
            tracing::debug!("implicit {}", IMPLICIT_POLL);
            outcome = forward.convert_line(IMPLICIT_POLL, self);
            tracing::debug!("implicit {} returned {}", IMPLICIT_POLL, outcome);
        }

        let outcome = self.apply_outcome(outcome);

        if waiting && !self.session.waits.any() {
            tracing::debug!("wait cleared, acknowledging");
            self.session.reply.ensure_line_start();
            self.session.reply.append("ok");
        } else if self.session.reply.ends_with_newline() {
            self.session.reply.trim_trailing_newline();
        }

        outcome
    }

    fn apply_outcome(&mut self, outcome: Outcome) -> Outcome {
        match outcome {
            Outcome::Device(DeviceCode::CancelBuild) if self.session.waits.is_set(Wait::BOT_CANCEL) => {
                // the abort we sent ourselves coming back
                tracing::debug!("clearing bot cancel wait");
                self.session.waits.clear(Wait::BOT_CANCEL);
                return Outcome::Success;
            }
            Outcome::Device(DeviceCode::CancelBuild) => {
                tracing::info!("Build cancelled by the bot, waiting for host acknowledgment");
                self.session.flags.cancel_pending = true;
                self.session.clear_state_for_cancel();
                self.session.reply.ensure_line_start();
            }
            Outcome::Device(DeviceCode::BufferOverflow) => {
                self.session.waits.set(Wait::BUFFER);
            }
            Outcome::Unrecognized(code) => {
                tracing::warn!("Unknown outcome code: {}", code);
            }
            _ => {}
        }

        match decode_outcome(outcome) {
            OutcomeText::Silent => {}
            OutcomeText::Error(text) => {
                self.session.reply.reset();
                self.session.reply.append(&text);
            }
            OutcomeText::Status(text) => {
                self.session.reply.append_and_log(format_args!("{}", text));
            }
            OutcomeText::ReplaceStatus(text) => {
                self.session.reply.reset();
                self.session.reply.append(text);
            }
        }

        outcome
    }
}
