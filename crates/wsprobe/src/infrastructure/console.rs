//! Terminal transcript.
//!
//! Writes `>> <text>` for every outbound message and `<< <payload>` for every
//! inbound frame.  Each entry is written and flushed under one lock so lines
//! from the writer task and the reader never interleave mid-entry.

use std::io::{self, Write};
use std::sync::Mutex;

use tracing::debug;

use crate::application::transcript::{Transcript, INBOUND_MARKER, OUTBOUND_MARKER};

/// A [`Transcript`] over any byte writer, normally standard output.
pub struct ConsoleTranscript<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleTranscript<io::Stdout> {
    /// Transcript printing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleTranscript<W> {
    /// Wraps `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_entry(&self, parts: &[&[u8]]) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let result = parts
            .iter()
            .try_for_each(|part| out.write_all(part))
            .and_then(|()| out.write_all(b"\n"))
            .and_then(|()| out.flush());
        if let Err(e) = result {
            // A closed stdout (e.g. `wsprobe | head`) must not take the session down.
            debug!("failed to write transcript entry: {e}");
        }
    }
}

impl<W: Write + Send> Transcript for ConsoleTranscript<W> {
    fn outbound(&self, text: &str) {
        self.write_entry(&[OUTBOUND_MARKER.as_bytes(), b" ", text.as_bytes()]);
    }

    fn inbound(&self, rendered: &[u8]) {
        self.write_entry(&[INBOUND_MARKER.as_bytes(), b" ", rendered]);
    }

    fn notice(&self, text: &str) {
        // Start on a fresh line: the terminal usually just echoed `^C`.
        self.write_entry(&[b"\n", text.as_bytes()]);
    }
}
