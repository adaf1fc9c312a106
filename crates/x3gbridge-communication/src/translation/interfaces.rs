//! Seams between the response translator and its collaborators
//!
//! The forward translator turns a host line into packets and drives the
//! round trips. For every packet it hands the [`ResponseSink`] the packet and
//! a [`Transport`]; the sink decides whether to send it, interprets the reply
//! and may issue follow-up packets of its own.

use crate::firmware::x3g::{DeviceResponse, HostCommand, Outcome, Packet};

/// Performs one packet exchange with the printer
///
/// Framing, checksums and retries live behind this trait.
pub trait Transport {
    /// Send `packet` and decode the reply, or report why that failed
    fn exchange(&mut self, packet: &Packet) -> Result<DeviceResponse, Outcome>;
}

/// Out-of-band control messages from the host loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// The host acknowledged a cancellation
    ClearCancel,
}

/// Receiver of everything the forward translator produces for one line
pub trait ResponseSink {
    /// A packet is ready: send it through `transport` (or discard it) and
    /// interpret the reply. Returns the round trip's outcome.
    fn on_packet(
        &mut self,
        host: &HostCommand,
        packet: &Packet,
        transport: &mut dyn Transport,
    ) -> Outcome;

    /// The line translated to no packet at all but may still need an
    /// emulated text reply.
    fn on_untranslated(&mut self, host: &HostCommand) -> Outcome;

    /// Informational text from the forward translator
    fn on_message(&mut self, text: &str);

    /// A control message
    fn on_control(&mut self, message: ControlMessage);
}

/// Text-to-x3g translator (external)
pub trait ForwardTranslator {
    /// Translate `line` and drive every resulting packet through `sink`.
    /// Returns the outcome for the whole line.
    fn convert_line(&mut self, line: &str, sink: &mut dyn ResponseSink) -> Outcome;
}
