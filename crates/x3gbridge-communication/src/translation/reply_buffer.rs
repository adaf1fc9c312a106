//! Bounded reply accumulator
//!
//! Collects the text reply to the current host line. Appends past the
//! capacity are truncated, never grown: the bound caps the size of any one
//! translated reply.

use std::fmt;

/// Default capacity in bytes
pub const DEFAULT_CAPACITY: usize = 1024;

/// Append-only text buffer with a hard capacity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyBuffer {
    text: String,
    capacity: usize,
}

impl ReplyBuffer {
    /// Create an empty buffer holding at most `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            capacity,
        }
    }

    /// Empty the buffer
    pub fn reset(&mut self) {
        self.text.clear();
    }

    /// Append as much of `s` as fits; returns the number of bytes written.
    ///
    /// Capacity and the returned count are in UTF-8 bytes, not characters;
    /// a character that would straddle the bound is dropped whole.
    pub fn append(&mut self, s: &str) -> usize {
        let remaining = self.capacity.saturating_sub(self.text.len());
        if remaining == 0 || s.is_empty() {
            return 0;
        }

        let mut end = s.len().min(remaining);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.text.push_str(&s[..end]);
        end
    }

    /// Format and append; returns the number of bytes written
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) -> usize {
        match args.as_str() {
            Some(s) => self.append(s),
            None => self.append(&args.to_string()),
        }
    }

    /// Append and mirror the full text to the log even if it gets truncated
    pub fn append_and_log(&mut self, args: fmt::Arguments<'_>) -> usize {
        let text = args.to_string();
        tracing::info!(target: "x3gbridge::reply", "{}", text.trim_end());
        self.append(&text)
    }

    /// Drop one trailing newline, if present
    pub fn trim_trailing_newline(&mut self) {
        if self.text.ends_with('\n') {
            self.text.pop();
        }
    }

    /// Append a newline unless the buffer is empty or already ends with one
    pub fn ensure_line_start(&mut self) -> usize {
        if !self.text.is_empty() && !self.ends_with_newline() {
            self.append("\n")
        } else {
            0
        }
    }

    /// Whether the last character is a newline
    pub fn ends_with_newline(&self) -> bool {
        self.text.ends_with('\n')
    }

    /// Current content
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Maximum size in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether no more bytes fit
    pub fn is_full(&self) -> bool {
        self.text.len() >= self.capacity
    }
}

impl Default for ReplyBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl fmt::Display for ReplyBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
