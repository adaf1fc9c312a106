//! Line pipeline: forward translation, then result mapping

use super::clock::{Clock, SystemClock};
use super::interfaces::{ControlMessage, ForwardTranslator, ResponseSink};
use super::session::Session;
use super::translator::ResponseTranslator;
use crate::firmware::x3g::Outcome;

/// Drives host lines through a forward translator and the response translator
#[derive(Debug)]
pub struct Bridge<F, C = SystemClock> {
    translator: ResponseTranslator<C>,
    forward: F,
}

impl<F: ForwardTranslator, C: Clock> Bridge<F, C> {
    /// Create a bridge
    pub fn new(forward: F, translator: ResponseTranslator<C>) -> Self {
        Self {
            translator,
            forward,
        }
    }

    /// Start a fresh connection; the reply holds the greeting
    pub fn connect(&mut self) {
        self.translator.session.reset();
        self.translator.session.reply.append("start\n");
        tracing::info!("Bridge connected");
    }

    /// Drop the connection state
    pub fn disconnect(&mut self) {
        self.translator.session.reset();
        tracing::info!("Bridge disconnected");
    }

    /// Translate one host line, leaving its answer in the reply
    pub fn write_line(&mut self, line: &str) -> Outcome {
        let outcome = self.write_line_core(line);
        self.translator.finalize(outcome, &mut self.forward)
    }

    fn write_line_core(&mut self, line: &str) -> Outcome {
        let waiting = self.translator.session.waits.any();
        if waiting {
            tracing::debug!("waiting in write_line");
        }

        let outcome = self.forward.convert_line(line, &mut self.translator);
        tracing::debug!("convert_line({:?}) returned {}", line, outcome);

        let session = &mut self.translator.session;
        if session.flags.ok_pending {
            // nothing consumed the acknowledgment
            session.reply.append("ok");
        } else if waiting && !session.waits.any() {
            session.reply.append("\nok");
        }
        session.flags.ok_pending = false;

        outcome
    }

    /// Deliver an out-of-band control message
    pub fn control(&mut self, message: ControlMessage) {
        self.translator.on_control(message);
    }

    /// Prepare for a new host line
    pub fn begin_line(&mut self) {
        self.translator.session.begin_line();
    }

    /// Close the current line's reply
    pub fn end_line(&mut self) {
        self.translator.session.end_line();
    }

    /// Current reply text
    pub fn reply(&self) -> &str {
        self.translator.session.reply()
    }

    /// Translation state
    pub fn session(&self) -> &Session {
        &self.translator.session
    }

    /// The response translator
    pub fn translator(&self) -> &ResponseTranslator<C> {
        &self.translator
    }

    /// The forward translator
    pub fn forward(&self) -> &F {
        &self.forward
    }

    /// Mutable access to the forward translator
    pub fn forward_mut(&mut self) -> &mut F {
        &mut self.forward
    }
}
