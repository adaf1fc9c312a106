//! x3g response interpretation
//!
//! Rebuilds the RepRap conversation from stateless x3g replies: temperature
//! and position text, SD listing framing, print status lines, and the wait
//! conditions that decide when the host may send its next line.

use super::clock::{Clock, SystemClock};
use super::interfaces::{ControlMessage, ResponseSink, Transport};
use super::session::Session;
use super::wait_state::Wait;
use crate::firmware::x3g::{
    BuildStatus, Command, DeviceCode, HostCommand, MotherboardFlags, Outcome, Packet,
    ResponseEnvelope, ToolQuery, SD_FILE_NOT_FOUND,
};
use x3gbridge_core::AxisMask;

/// Interprets device replies into reply text and wait state
#[derive(Debug)]
pub struct ResponseTranslator<C = SystemClock> {
    pub(crate) session: Session,
    pub(crate) clock: C,
}

impl ResponseTranslator<SystemClock> {
    /// Translator reading the system clock
    pub fn with_system_clock(session: Session) -> Self {
        Self::new(session, SystemClock)
    }
}

impl<C: Clock> ResponseTranslator<C> {
    /// Create a translator over `session`
    pub fn new(session: Session, clock: C) -> Self {
        Self { session, clock }
    }

    /// Translation state
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable translation state
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Interpret a successful round trip. Returns `Success` unless the reply
    /// must escalate the line's outcome.
    fn interpret(
        &mut self,
        host: &HostCommand,
        envelope: &ResponseEnvelope<'_>,
        transport: &mut dyn Transport,
    ) -> Outcome {
        let response = envelope.response;

        match envelope.command {
            Command::ClearBuffer | Command::Abort | Command::Reset => {
                self.session.waits.clear_all();
                self.session.waits.set(Wait::BOT_CANCEL);
            }

            Command::ToolQuery => self.tool_query(envelope),

            Command::IsReady => {
                tracing::debug!("is_ready: {}", response.is_ready);
                if response.is_ready {
                    self.session.waits.clear(Wait::EMPTY_QUEUE | Wait::BUTTON);
                    if self.session.flags.get_pos_when_ready {
                        let outcome = self.on_packet(host, &Packet::extended_position(), transport);
                        if !outcome.is_success() {
                            tracing::warn!("deferred position fetch failed: {}", outcome);
                        }
                        self.session.flags.get_pos_when_ready = false;
                    }
                }
            }

            Command::CaptureToFile => {
                if let Some(name) = host.arg.as_deref() {
                    self.session
                        .reply
                        .append_fmt(format_args!("\nWriting to file: {}", name));
                }
            }

            Command::EndCapture => {
                self.session.reply.append("\nDone saving file");
            }

            Command::PlaybackCapture => {
                // the bot may still report the previous build's cancel for a moment
                if response.sd.status == SD_FILE_NOT_FOUND {
                    self.session
                        .reply
                        .append("\nError:  Not SD printing file not found");
                } else {
                    self.session.reply.reset();
                    self.session.start_deadline =
                        self.clock.now() + self.session.config().start_grace_secs;
                    self.session.waits.set(Wait::START);
                }
            }

            Command::NextFilename => self.next_filename(host, envelope),

            Command::ExtendedPosition => self.extended_position(envelope),

            Command::MotherboardStatus => return self.motherboard_status(envelope),

            Command::BuildStatistics => self.build_statistics(host, envelope),

            Command::AdvancedVersion => self.advanced_version(host, envelope),

            Command::WaitForTool => {
                tracing::debug!("waiting for extruder {}", envelope.tool);
                let extruder = if envelope.tool == 0 {
                    Wait::EXTRUDER_A
                } else {
                    Wait::EXTRUDER_B
                };
                self.session.start_wait(Wait::EMPTY_QUEUE | extruder);
            }

            Command::WaitForPlatform => {
                tracing::debug!("waiting for platform");
                self.session.start_wait(Wait::EMPTY_QUEUE | Wait::PLATFORM);
            }

            Command::FindAxesMinimums | Command::FindAxesMaximums | Command::RecallHomePositions => {
                tracing::debug!("homing or recalling home, wait for queue then ask bot for position");
                self.session.start_wait(Wait::EMPTY_QUEUE);
                self.session.flags.get_pos_when_ready = true;
            }

            Command::Delay => {
                tracing::debug!("wait for delay");
                self.session.start_wait(Wait::EMPTY_QUEUE);
            }

            Command::DisplayMessage | Command::WaitForButton => {
                tracing::debug!("waiting for button");
                self.session.start_wait(Wait::BUTTON);
            }

            Command::Unrecognized(_) => {}
        }

        Outcome::Success
    }

    fn tool_query(&mut self, envelope: &ResponseEnvelope<'_>) {
        let response = envelope.response;
        let tool = envelope.tool;
        let extruder_wait = if tool != 0 {
            Wait::EXTRUDER_B
        } else {
            Wait::EXTRUDER_A
        };

        match envelope.query {
            ToolQuery::ExtruderTemperature => {
                if self.session.machine.read().is_multi_tool() {
                    self.session
                        .reply
                        .append_fmt(format_args!(" T{}:{}", tool, response.temperature));
                } else {
                    self.session
                        .reply
                        .append_fmt(format_args!(" T:{}", response.temperature));
                }
            }

            ToolQuery::ExtruderReady => {
                if response.is_ready {
                    self.session.waits.clear(extruder_wait);
                }
            }

            ToolQuery::PlatformTemperature => {
                self.session
                    .reply
                    .append_fmt(format_args!(" B:{}", response.temperature));
            }

            // a zero target while we wait means the heater reached it or was switched off
            ToolQuery::ExtruderTarget => {
                if self.target_abandoned(response.temperature) {
                    self.session.waits.clear(extruder_wait);
                }
                self.session
                    .reply
                    .append_fmt(format_args!(" /{}", response.temperature));
            }

            ToolQuery::PlatformTarget => {
                if self.target_abandoned(response.temperature) {
                    self.session.waits.clear(Wait::PLATFORM);
                }
                self.session
                    .reply
                    .append_fmt(format_args!(" /{}", response.temperature));
            }

            ToolQuery::PlatformReady => {
                if response.is_ready {
                    self.session.waits.clear(Wait::PLATFORM);
                }
            }

            ToolQuery::Version
            | ToolQuery::ExtruderStatus
            | ToolQuery::PidState
            | ToolQuery::Unrecognized(_) => {}
        }
    }

    fn target_abandoned(&self, target: u16) -> bool {
        self.session.waits.any() && !self.session.waits.is_set(Wait::EMPTY_QUEUE) && target == 0
    }

    fn next_filename(&mut self, host: &HostCommand, envelope: &ResponseEnvelope<'_>) {
        let sd = &envelope.response.sd;

        // a first-filename request doubles as the M21 "card present" probe
        if !self.session.flags.listing_files && host.is_m(21) {
            if sd.status == 0 {
                self.session.reply.append("\nSD card ok");
            } else {
                self.session.reply.append("\nSD init fail");
            }
            return;
        }

        if !self.session.flags.listing_files {
            self.session.reply.append("\nBegin file list\n");
            self.session.flags.listing_files = true;
            if let Err(e) = self.session.listing.reinitialize() {
                tracing::warn!("Failed to reset directory cache: {}", e);
            }
        }

        if sd.filename.is_empty() {
            self.session.reply.append("End file list");
            self.session.flags.listing_files = false;
        } else {
            self.session
                .reply
                .append_fmt(format_args!("{}\n", sd.filename));
            if let Err(e) = self.session.listing.add(&sd.filename) {
                tracing::warn!("Failed to cache filename {}: {}", sd.filename, e);
            }
        }
    }

    fn extended_position(&mut self, envelope: &ResponseEnvelope<'_>) {
        let steps = envelope.response.position;
        let mut machine = self.session.machine.write();
        let per_mm = machine.profile.steps_per_mm;

        let x = steps.x as f64 / per_mm.x;
        let y = steps.y as f64 / per_mm.y;
        let z = steps.z as f64 / per_mm.z;
        let a = steps.a as f64 / per_mm.a;
        let b = steps.b as f64 / per_mm.b;
        let e = if machine.current_extruder == 1 { b } else { a };

        self.session.reply.append_fmt(format_args!(
            " X:{:.2} Y:{:.2} Z:{:.2} E:{:.2}",
            x, y, z, e
        ));

        // keep what the bot says for axes we don't know, so a later G92
        // that omits them still has a sane value
        if self.session.flags.get_pos_when_ready {
            let known = machine.position_known;
            if !known.contains(AxisMask::X) {
                machine.position.x = x;
            }
            if !known.contains(AxisMask::Y) {
                machine.position.y = y;
            }
            if !known.contains(AxisMask::Z) {
                machine.position.z = z;
            }
            if !known.contains(AxisMask::A) {
                machine.position.a = a;
            }
            if !known.contains(AxisMask::B) {
                machine.position.b = b;
            }
        }
    }

    fn motherboard_status(&mut self, envelope: &ResponseEnvelope<'_>) -> Outcome {
        let flags = envelope.response.motherboard;
        if flags.is_empty() {
            self.session.waits.clear(Wait::BUTTON);
            return Outcome::Success;
        }

        if flags.contains(MotherboardFlags::BUILD_CANCELLING) {
            return DeviceCode::CancelBuild.into();
        }
        if flags.contains(MotherboardFlags::HEAT_SHUTDOWN) {
            self.session.reply.reset();
            self.session.reply.append_and_log(format_args!(
                "Error:  Heaters were shutdown after 30 minutes of inactivity"
            ));
            return DeviceCode::CancelBuild.into();
        }
        if flags.contains(MotherboardFlags::POWER_ERROR) {
            self.session.reply.reset();
            self.session
                .reply
                .append_and_log(format_args!("Error:  Error detected in system power"));
            return DeviceCode::CancelBuild.into();
        }
        Outcome::Success
    }

    fn build_statistics(&mut self, host: &HostCommand, envelope: &ResponseEnvelope<'_>) {
        let build = envelope.response.build;

        if self.session.waits.is_set(Wait::BOT_CANCEL) && !build.status.is_active() {
            tracing::debug!("bot no longer building, clearing bot cancel wait");
            self.session.waits.clear(Wait::BOT_CANCEL);
        }

        if self.session.waits.is_set(Wait::START) || host.is_m(27) {
            let now = self.clock.now();
            let deadline = self.session.start_deadline;
            if deadline != 0 && build.status != BuildStatus::Running && now < deadline {
                if deadline - now > self.session.config().clock_skew_secs {
                    // clock discontinuity, don't suppress status forever
                    self.session.start_deadline = 0;
                    self.session.waits.clear(Wait::START);
                }
                return;
            }

            let reply = &mut self.session.reply;
            match build.status {
                BuildStatus::None => {
                    reply.append("\nNot SD printing\n");
                }
                BuildStatus::Running => {
                    self.session.start_deadline = 0;
                    self.session.waits.clear(Wait::START);
                    reply.append_fmt(format_args!(
                        "\nSD printing byte on line {}/0",
                        build.line_number
                    ));
                }
                BuildStatus::Cancelled => {
                    reply.append("\nSD printing cancelled.\n");
                    reply.append("\nDone printing file\n");
                    self.session.waits.clear_all();
                    self.session.flags.get_pos_when_ready = false;
                }
                BuildStatus::FinishedNormally => {
                    reply.append("\nDone printing file\n");
                }
                BuildStatus::Paused => {
                    reply.append_fmt(format_args!(
                        "\nSD printing paused at line {}\n",
                        build.line_number
                    ));
                }
                BuildStatus::Cancelling => {
                    reply.append_fmt(format_args!(
                        "\nSD printing sleeping at line {}\n",
                        build.line_number
                    ));
                }
                BuildStatus::Unrecognized(_) => {}
            }
        } else {
            // routine poll: only track the LCD pause state
            match build.status {
                BuildStatus::None | BuildStatus::Running => {
                    if self.session.waits.is_set(Wait::UNPAUSE) {
                        self.session.waits.set(Wait::EMPTY_QUEUE);
                    }
                    self.session.waits.clear(Wait::UNPAUSE);
                }
                BuildStatus::Paused => {
                    self.session.waits.set(Wait::UNPAUSE);
                    self.session
                        .reply
                        .append("\n// echo: Waiting for unpause button on the LCD panel\n");
                }
                _ => self.session.waits.clear(Wait::UNPAUSE),
            }
        }
    }

    fn advanced_version(&mut self, host: &HostCommand, envelope: &ResponseEnvelope<'_>) {
        let firmware = envelope.response.firmware;
        let variant = firmware.variant;

        if host.is_m(115) {
            // PROTOCOL_VERSION is the RepRap dialect we emulate, not the x3g version
            let machine = self.session.machine.read();
            self.session.reply.append_fmt(format_args!(
                " PROTOCOL_VERSION:0.1 FIRMWARE_NAME:{} FIRMWARE_VERSION:{}.{} FIRMWARE_URL:{} MACHINE_TYPE:{} EXTRUDER_COUNT:{}\n",
                variant.name(),
                firmware.major(),
                firmware.minor(),
                variant.url(),
                machine.profile.machine_type,
                machine.profile.extruder_count
            ));
        } else {
            self.session.reply.append_fmt(format_args!(
                " {} v{}.{}",
                variant.name(),
                firmware.major(),
                firmware.minor()
            ));
        }
    }

    /// M23: normalize the selected name against the cached listing
    fn select_file(&mut self, host: &HostCommand) {
        let mut machine = self.session.machine.write();
        let requested = host
            .arg
            .clone()
            .or_else(|| machine.selected_filename.clone())
            .unwrap_or_default();

        let canonical = self
            .session
            .listing
            .find_case_insensitive(&requested)
            .and_then(|index| self.session.listing.get(index))
            .unwrap_or(requested.as_str())
            .to_string();

        // the real size can't be queried from the bot
        self.session.reply.append_fmt(format_args!(
            "\nFile opened:{} Size:{}\nFile selected:{}",
            canonical, 0, canonical
        ));
        machine.selected_filename = Some(canonical);
    }
}

impl<C: Clock> ResponseSink for ResponseTranslator<C> {
    fn on_packet(
        &mut self,
        host: &HostCommand,
        packet: &Packet,
        transport: &mut dyn Transport,
    ) -> Outcome {
        // "ok" means ready for another command, not that everything worked
        self.session.emit_pending_ok();

        let command = packet.command();
        if self.session.flags.cancel_pending && command.is_queueable() {
            tracing::debug!("discarding {} while cancel is pending", command);
            return Outcome::Success;
        }

        let response = match transport.exchange(packet) {
            Ok(response) => response,
            Err(outcome) => {
                tracing::debug!("exchange for {} returned {}", command, outcome);
                return outcome;
            }
        };

        if command.is_queueable() {
            self.session.waits.clear(Wait::BUFFER);
        }

        let envelope = ResponseEnvelope::new(packet, &response);
        self.interpret(host, &envelope, transport)
    }

    fn on_untranslated(&mut self, host: &HostCommand) -> Outcome {
        self.session.emit_pending_ok();
        if host.is_m(23) {
            self.select_file(host);
        }
        Outcome::Success
    }

    fn on_message(&mut self, text: &str) {
        self.session.emit_pending_ok();
        self.session.reply.ensure_line_start();
        self.session
            .reply
            .append_fmt(format_args!("// echo: {}", text));
    }

    fn on_control(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::ClearCancel => self.session.acknowledge_cancel(),
        }
    }
}
