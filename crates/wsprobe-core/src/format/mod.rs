//! Best-effort pretty-printing of inbound payloads.
//!
//! # Behaviour
//!
//! - If the payload parses as JSON, it is re-serialized through
//!   `serde_json`'s pretty printer: one member or element per line, two
//!   spaces per nesting level, `": "` after keys.  Empty objects and arrays
//!   stay on one line (`{}` / `[]`).
//! - Object keys keep their order and numbers keep their original spelling
//!   (`1.50E+10` stays `1.50E+10`).  Strings are re-escaped the way
//!   `serde_json` writes them, so `"\u0041"` prints as `"A"`.  A key that
//!   appears twice in one object is printed once, in its first position,
//!   with its last value.
//! - Anything else is returned unchanged: payloads that are not UTF-8, not
//!   JSON, or nested deeper than `serde_json`'s recursion limit of 128 levels.
//!
//! # Colour
//!
//! Colour is decided once, when the [`Formatter`] is constructed, and never
//! read from global state.  When enabled, tokens are wrapped in ANSI escape
//! sequences produced by `crossterm`: keys bold blue, strings green, numbers
//! yellow and `true`/`false`/`null` cyan.  Removing the escape sequences from a
//! colourized rendering yields exactly the plain rendering.

mod style;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use tracing::debug;

use style::StyledFormatter;

/// Indentation added per nesting level.
const INDENT: &[u8] = b"  ";

/// Renders raw frame payloads for display.
///
/// # Example
///
/// ```rust
/// use wsprobe_core::Formatter;
///
/// let out = Formatter::new(false).render(br#"{"a":1,"b":[2,3]}"#);
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "{\n  \"a\": 1,\n  \"b\": [\n    2,\n    3\n  ]\n}"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatter {
    colour: bool,
}

impl Formatter {
    /// Creates a formatter.  `colour` enables ANSI styling of tokens.
    pub fn new(colour: bool) -> Self {
        Self { colour }
    }

    /// Returns `true` if this formatter emits ANSI styling.
    pub fn colour_enabled(&self) -> bool {
        self.colour
    }

    /// Renders `payload` for display.
    ///
    /// Returns the indented (and optionally colourized) JSON rendering, or a
    /// copy of `payload` unchanged when it is not JSON.
    pub fn render(&self, payload: &[u8]) -> Vec<u8> {
        self.render_json(payload).unwrap_or_else(|| payload.to_vec())
    }

    fn render_json(&self, payload: &[u8]) -> Option<Vec<u8>> {
        let value: Value = match serde_json::from_slice(payload) {
            Ok(value) => value,
            Err(e) => {
                debug!("payload is not JSON ({e}); printing it unchanged");
                return None;
            }
        };

        let mut out = Vec::with_capacity(payload.len() * 2);
        let written = if self.colour {
            let formatter = StyledFormatter::with_indent(INDENT);
            let mut ser = Serializer::with_formatter(&mut out, formatter);
            value.serialize(&mut ser)
        } else {
            let formatter = PrettyFormatter::with_indent(INDENT);
            let mut ser = Serializer::with_formatter(&mut out, formatter);
            value.serialize(&mut ser)
        };

        match written {
            Ok(()) => Some(out),
            Err(e) => {
                debug!("could not re-serialize payload ({e}); printing it unchanged");
                None
            }
        }
    }
}

impl Default for Formatter {
    /// Colour on, matching the command-line default.
    fn default() -> Self {
        Self::new(true)
    }
}
