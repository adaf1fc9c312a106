// Scripted collaborators shared by the integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use x3gbridge_communication::{
    Bridge, BuildStatus, DeviceResponse, FirmwareVariant, ForwardTranslator, HostCommand,
    ManualClock, MotherboardFlags, Outcome, Packet, ResponseSink, ResponseTranslator, Session,
    SessionConfig, Transport,
};
use x3gbridge_communication::firmware::x3g::StepPosition;
use x3gbridge_core::{thread_safe_rw, MachineProfile, MachineState};

/// A printer simulated at the reply level
#[derive(Debug, Default)]
pub struct SimBot {
    pub extruder_temp: [u16; 2],
    pub extruder_target: [u16; 2],
    pub extruder_ready: [bool; 2],
    pub platform_temp: u16,
    pub platform_target: u16,
    pub platform_ready: bool,
    pub queue_busy: bool,
    pub build: BuildStatus,
    pub build_line: u32,
    pub motherboard: MotherboardFlags,
    pub files: Vec<String>,
    pub file_cursor: usize,
    pub sd_missing: bool,
    pub position: StepPosition,
    /// Failures returned instead of the next replies
    pub failures: VecDeque<Outcome>,
    /// Command codes received, in order
    pub sent: Vec<u8>,
}

impl SimBot {
    pub fn new() -> Self {
        Self {
            extruder_ready: [true; 2],
            platform_ready: true,
            ..Self::default()
        }
    }

    fn tool_reply(&self, tool: usize, query: u8) -> DeviceResponse {
        let tool = tool.min(1);
        match query {
            2 => DeviceResponse::temperature(self.extruder_temp[tool]),
            22 => DeviceResponse::ready(self.extruder_ready[tool]),
            30 => DeviceResponse::temperature(self.platform_temp),
            32 => DeviceResponse::temperature(self.extruder_target[tool]),
            33 => DeviceResponse::temperature(self.platform_target),
            35 => DeviceResponse::ready(self.platform_ready),
            _ => DeviceResponse::default(),
        }
    }
}

impl Transport for SimBot {
    fn exchange(&mut self, packet: &Packet) -> Result<DeviceResponse, Outcome> {
        self.sent.push(packet.command_code());
        if let Some(failure) = self.failures.pop_front() {
            return Err(failure);
        }

        let bytes = packet.as_bytes();
        let response = match packet.command_code() {
            10 => self.tool_reply(packet.tool() as usize, bytes.get(2).copied().unwrap_or(0)),
            // a button prompt blocks the queue
            11 => DeviceResponse::ready(
                !self.queue_busy && !self.motherboard.contains(MotherboardFlags::WAIT_FOR_BUTTON),
            ),
            16 => {
                let status = if self.sd_missing { 7 } else { 0 };
                DeviceResponse::sd(status, "")
            }
            18 => {
                if packet.tool() == 1 {
                    self.file_cursor = 0;
                }
                let name = self.files.get(self.file_cursor).cloned().unwrap_or_default();
                self.file_cursor += 1;
                DeviceResponse::sd(0, name)
            }
            21 => DeviceResponse::position(self.position),
            23 => DeviceResponse::motherboard(self.motherboard),
            24 => DeviceResponse::build(self.build, self.build_line),
            27 => DeviceResponse::firmware(760, FirmwareVariant::Sailfish),
            _ => DeviceResponse::default(),
        };
        Ok(response)
    }
}

/// A tiny RepRap front end: enough of the grammar to drive the bridge
#[derive(Debug, Default)]
pub struct ScriptedForward {
    pub bot: SimBot,
    pub tools: u8,
    pub lines: Vec<String>,
}

impl ScriptedForward {
    pub fn new(tools: u8) -> Self {
        Self {
            bot: SimBot::new(),
            tools,
            lines: Vec::new(),
        }
    }

    fn send(
        &mut self,
        sink: &mut dyn ResponseSink,
        host: &HostCommand,
        packets: &[Vec<u8>],
    ) -> Outcome {
        for bytes in packets {
            let outcome = sink.on_packet(host, &Packet::new(bytes.clone()), &mut self.bot);
            if !outcome.is_success() {
                return outcome;
            }
        }
        Outcome::Success
    }
}

fn arg(line: &str) -> Option<String> {
    line.split_once(' ').map(|(_, rest)| rest.trim().to_string())
}

fn s_value(line: &str) -> u16 {
    line.split_whitespace()
        .find_map(|word| word.strip_prefix('S'))
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

impl ForwardTranslator for ScriptedForward {
    fn convert_line(&mut self, line: &str, sink: &mut dyn ResponseSink) -> Outcome {
        self.lines.push(line.to_string());
        let word = line.split_whitespace().next().unwrap_or("");

        match word {
            "M105" => {
                let host = HostCommand::m(105);
                let mut packets = Vec::new();
                for tool in 0..self.tools.max(1) {
                    packets.push(vec![10, tool, 2]);
                    packets.push(vec![10, tool, 32]);
                    packets.push(vec![10, tool, 22]);
                }
                packets.push(vec![10, 0, 30]);
                packets.push(vec![10, 0, 33]);
                packets.push(vec![10, 0, 35]);
                packets.push(vec![11]);
                packets.push(vec![23]);
                packets.push(vec![24]);
                self.send(sink, &host, &packets)
            }
            "M104" | "M109" => {
                let target = s_value(line);
                self.bot.extruder_target[0] = target;
                self.bot.extruder_ready[0] = self.bot.extruder_temp[0] >= target;
                let mut packets = vec![vec![136, 0, 3]];
                if word == "M109" {
                    packets.push(vec![135, 0]);
                }
                self.send(sink, &HostCommand::m(if word == "M109" { 109 } else { 104 }), &packets)
            }
            "M190" => {
                self.bot.platform_target = s_value(line);
                self.bot.platform_ready = self.bot.platform_temp >= self.bot.platform_target;
                self.send(sink, &HostCommand::m(190), &[vec![136, 0, 31], vec![141, 0]])
            }
            "M20" => {
                let host = HostCommand::m(20);
                let mut packets = vec![vec![18, 1]];
                for _ in 0..self.bot.files.len() {
                    packets.push(vec![18, 0]);
                }
                self.send(sink, &host, &packets)
            }
            "M21" => self.send(sink, &HostCommand::m(21), &[vec![18, 1]]),
            "M23" => {
                let mut host = HostCommand::m(23);
                host.arg = arg(line);
                sink.on_untranslated(&host)
            }
            "M24" => {
                let mut host = HostCommand::m(24);
                host.arg = arg(line);
                self.send(sink, &host, &[vec![16, 0]])
            }
            "M27" => self.send(sink, &HostCommand::m(27), &[vec![24]]),
            "M28" => {
                let mut host = HostCommand::m(28);
                host.arg = arg(line);
                self.send(sink, &host, &[vec![14]])
            }
            "M29" => self.send(sink, &HostCommand::m(29), &[vec![15]]),
            "M112" => self.send(sink, &HostCommand::m(112), &[vec![7]]),
            "M114" => self.send(sink, &HostCommand::m(114), &[vec![21]]),
            "M115" => self.send(sink, &HostCommand::m(115), &[vec![27]]),
            "M117" => {
                if let Some(text) = arg(line) {
                    sink.on_message(&text);
                }
                self.send(sink, &HostCommand::m(117), &[vec![149, 0]])
            }
            "G4" => self.send(sink, &HostCommand::default(), &[vec![133]]),
            "G28" => self.send(sink, &HostCommand::default(), &[vec![131, 7]]),
            "G1" | "G0" => self.send(sink, &HostCommand::default(), &[vec![155]]),
            _ => sink.on_untranslated(&HostCommand::default()),
        }
    }
}

pub fn bridge(tools: u8) -> (Bridge<ScriptedForward, ManualClock>, ManualClock) {
    let profile = MachineProfile {
        extruder_count: tools,
        ..MachineProfile::default()
    };
    let machine = thread_safe_rw(MachineState::new(profile));
    let session = Session::new(machine, SessionConfig::default()).expect("session");
    let clock = ManualClock::new(1_700_000_000);
    let translator = ResponseTranslator::new(session, clock.clone());
    (Bridge::new(ScriptedForward::new(tools), translator), clock)
}

/// Run one host line the way the daemon does and return the reply text
pub fn line(bridge: &mut Bridge<ScriptedForward, ManualClock>, text: &str) -> String {
    bridge.begin_line();
    bridge.write_line(text);
    bridge.end_line();
    bridge.reply().to_string()
}
