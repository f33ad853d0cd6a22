//! `serde_json` formatter that colours tokens as they are written.
//!
//! Layout is delegated to [`PrettyFormatter`]; this type only wraps each
//! scalar in a `crossterm` style.  Strings are buffered between
//! `begin_string` and `end_string` so the quotes and every escape end up
//! inside one styled span.

use std::io::{self, Write};

use crossterm::style::Stylize;
use serde_json::ser::{CharEscape, Formatter as JsonFormatter, PrettyFormatter};

/// What a scalar means in its position; selects the colour.
#[derive(Debug, Clone, Copy)]
enum Role {
    Key,
    String,
    Number,
    Literal,
}

pub(crate) struct StyledFormatter<'a> {
    inner: PrettyFormatter<'a>,
    in_key: bool,
    string: Vec<u8>,
}

impl<'a> StyledFormatter<'a> {
    pub(crate) fn with_indent(indent: &'a [u8]) -> Self {
        Self {
            inner: PrettyFormatter::with_indent(indent),
            in_key: false,
            string: Vec::new(),
        }
    }
}

fn write_styled<W>(writer: &mut W, raw: &[u8], role: Role) -> io::Result<()>
where
    W: ?Sized + Write,
{
    let text = String::from_utf8_lossy(raw);
    let text: &str = &text;
    match role {
        Role::Key => write!(writer, "{}", text.blue().bold()),
        Role::String => write!(writer, "{}", text.green()),
        Role::Number => write!(writer, "{}", text.yellow()),
        Role::Literal => write!(writer, "{}", text.cyan()),
    }
}

impl JsonFormatter for StyledFormatter<'_> {
    // ── Scalars ──────────────────────────────────────────────────────────────

    fn write_null<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        write_styled(writer, b"null", Role::Literal)
    }

    fn write_bool<W>(&mut self, writer: &mut W, value: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let text: &[u8] = if value { b"true" } else { b"false" };
        write_styled(writer, text, Role::Literal)
    }

    // With `arbitrary_precision` every `Value` number arrives here, spelled
    // exactly as it was in the payload.
    fn write_number_str<W>(&mut self, writer: &mut W, value: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        write_styled(writer, value.as_bytes(), Role::Number)
    }

    fn begin_string<W>(&mut self, _writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.string.clear();
        self.string.push(b'"');
        Ok(())
    }

    fn write_string_fragment<W>(&mut self, _writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.string.extend_from_slice(fragment.as_bytes());
        Ok(())
    }

    fn write_char_escape<W>(&mut self, _writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.write_char_escape(&mut self.string, char_escape)
    }

    fn end_string<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.string.push(b'"');
        let role = if self.in_key { Role::Key } else { Role::String };
        write_styled(writer, &self.string, role)
    }

    // ── Layout, delegated ────────────────────────────────────────────────────

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.in_key = true;
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.in_key = false;
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_object_value(writer)
    }
}
