//! Line bridge between an upstream text endpoint and the translation pipeline
//!
//! Reads one RepRap line at a time from the host side (typically a virtual
//! serial port), runs it through the [`Bridge`] and writes the reply back.
//! Strictly one line in flight: the next read only happens after the reply
//! has been flushed.

use crate::translation::{Bridge, Clock, ForwardTranslator};
use std::io::{BufRead, Write};
use x3gbridge_core::Result;

/// Default longest accepted host line
pub const DEFAULT_LINE_LIMIT: usize = 1024;

/// Greeting written when the bridge starts
pub const GREETING: &str = "start\nok\n";

/// Configuration for the daemon loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Longest accepted host line, in characters
    pub line_limit: usize,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            line_limit: DEFAULT_LINE_LIMIT,
        }
    }
}

/// Blocking line loop over an upstream reader/writer pair
pub struct DaemonBridge<R, W> {
    upstream_in: R,
    upstream_out: W,
    config: DaemonConfig,
    line_number: u32,
}

impl<R: BufRead, W: Write> DaemonBridge<R, W> {
    /// Create a bridge over an upstream endpoint
    pub fn new(upstream_in: R, upstream_out: W, config: DaemonConfig) -> Self {
        Self {
            upstream_in,
            upstream_out,
            config,
            line_number: 0,
        }
    }

    /// Host lines read so far
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Give back the upstream endpoint
    pub fn into_inner(self) -> (R, W) {
        (self.upstream_in, self.upstream_out)
    }

    /// Serve lines until the upstream side closes
    pub fn run<F, C>(&mut self, bridge: &mut Bridge<F, C>) -> Result<()>
    where
        F: ForwardTranslator,
        C: Clock,
    {
        tracing::info!("Daemon bridge started");
        self.upstream_out.write_all(GREETING.as_bytes())?;
        self.upstream_out.flush()?;

        let mut line = String::new();
        loop {
            line.clear();
            if self.upstream_in.read_line(&mut line)? == 0 {
                tracing::info!("Upstream closed after {} lines", self.line_number);
                return Ok(());
            }
            self.line_number += 1;
            self.serve_line(bridge, &line)?;
        }
    }

    fn serve_line<F, C>(&mut self, bridge: &mut Bridge<F, C>, raw: &str) -> Result<()>
    where
        F: ForwardTranslator,
        C: Clock,
    {
        let mut text = raw.trim_end_matches(['\r', '\n']);

        if text.chars().count() > self.config.line_limit {
            let cut = text
                .char_indices()
                .nth(self.config.line_limit)
                .map(|(index, _)| index)
                .unwrap_or(text.len());
            text = &text[..cut];
            // an overlong comment is harmless
            if !text.contains(';') {
                tracing::warn!(
                    "Line {} exceeds {} characters, truncated",
                    self.line_number,
                    self.config.line_limit
                );
                writeln!(
                    self.upstream_out,
                    "(line {}) Buffer overflow: input exceeds {} character limit, remaining characters in line will be ignored",
                    self.line_number, self.config.line_limit
                )?;
            }
        }

        tracing::debug!("line {}: {}", self.line_number, text);
        bridge.begin_line();
        let outcome = bridge.write_line(text);
        bridge.end_line();
        tracing::debug!("line {} finished with {}", self.line_number, outcome);

        self.upstream_out.write_all(bridge.reply().as_bytes())?;
        self.upstream_out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firmware::x3g::Outcome;
    use crate::translation::{ManualClock, ResponseSink, ResponseTranslator, Session, SessionConfig};
    use std::io::Cursor;
    use x3gbridge_core::{thread_safe_rw, MachineProfile, MachineState};

    /// Records lines, emits nothing
    #[derive(Default)]
    struct Recorder {
        lines: Vec<String>,
    }

    impl ForwardTranslator for Recorder {
        fn convert_line(&mut self, line: &str, _sink: &mut dyn ResponseSink) -> Outcome {
            self.lines.push(line.to_string());
            Outcome::Success
        }
    }

    fn bridge() -> Bridge<Recorder, ManualClock> {
        let machine = thread_safe_rw(MachineState::new(MachineProfile::default()));
        let session = Session::new(machine, SessionConfig::default()).unwrap();
        Bridge::new(
            Recorder::default(),
            ResponseTranslator::new(session, ManualClock::new(0)),
        )
    }

    #[test]
    fn test_greeting_and_ok_per_line() {
        let mut bridge = bridge();
        let mut daemon = DaemonBridge::new(
            Cursor::new("G1 X1\r\nM82\n"),
            Vec::new(),
            DaemonConfig::default(),
        );

        daemon.run(&mut bridge).unwrap();

        assert_eq!(daemon.line_number(), 2);
        let (_, out) = daemon.into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), "start\nok\nok\nok\n");
        assert_eq!(bridge.forward().lines, vec!["G1 X1", "M82"]);
    }

    #[test]
    fn test_overlong_line_truncated() {
        let mut bridge = bridge();
        let mut daemon = DaemonBridge::new(
            Cursor::new("G1 X100\n"),
            Vec::new(),
            DaemonConfig { line_limit: 4 },
        );

        daemon.run(&mut bridge).unwrap();

        let (_, out) = daemon.into_inner();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains(
            "(line 1) Buffer overflow: input exceeds 4 character limit, remaining characters in line will be ignored\n"
        ));
        assert!(out.ends_with("ok\n"));
        assert_eq!(bridge.forward().lines, vec!["G1 X"]);
    }

    #[test]
    fn test_overlong_comment_is_quiet() {
        let mut bridge = bridge();
        let mut daemon = DaemonBridge::new(
            Cursor::new(";a long comment\n"),
            Vec::new(),
            DaemonConfig { line_limit: 5 },
        );

        daemon.run(&mut bridge).unwrap();

        let (_, out) = daemon.into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), "start\nok\nok\n");
    }
}
