use std::fmt::Write as _;
use std::io;

use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter, Serializer};

use crate::value::DocValue;

/// Indentation used for ground-truth files.
pub const CANONICAL_INDENT: usize = 2;

/// Error returned when a value cannot be encoded.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    /// Writing the output failed.
    #[error("I/O error while encoding: {0}")]
    Io(#[from] io::Error),
    /// The serializer rejected the value.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    /// Encoded bytes were not valid UTF-8.
    #[error("encoded output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Whitespace layout of the encoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Single line, `", "` between items and `": "` after keys.
    Compact,
    /// One item per line, nested by the given number of spaces.
    Indent(usize),
}

/// `serde_json` formatter reproducing the reference JSON encoder.
///
/// Strings are escaped to printable ASCII (`\uXXXX`, surrogate pairs above
/// the BMP) and floats use the reference `repr` layout. Container whitespace
/// follows [`Layout`].
///
/// Serializing through serde turns NaN and the infinities into `null`; use
/// [`write_document`] to emit them as `NaN`, `Infinity` and `-Infinity`.
#[derive(Debug, Clone)]
pub struct ReferenceFormatter {
    indent: Option<Vec<u8>>,
    current_indent: usize,
    has_value: bool,
}

impl ReferenceFormatter {
    /// Creates a formatter for the given layout.
    pub fn new(layout: Layout) -> Self {
        let indent = match layout {
            Layout::Compact => None,
            Layout::Indent(width) => Some(vec![b' '; width]),
        };
        Self {
            indent,
            current_indent: 0,
            has_value: false,
        }
    }

    fn write_newline_indent<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if let Some(indent) = &self.indent {
            writer.write_all(b"\n")?;
            for _ in 0..self.current_indent {
                writer.write_all(indent)?;
            }
        }
        Ok(())
    }

    fn write_item_separator<W>(&self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match (&self.indent, first) {
            (Some(_), true) => self.write_newline_indent(writer),
            (Some(_), false) => {
                writer.write_all(b",")?;
                self.write_newline_indent(writer)
            }
            (None, true) => Ok(()),
            (None, false) => writer.write_all(b", "),
        }
    }

    fn close_container<W>(&mut self, writer: &mut W, close: &[u8]) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.current_indent -= 1;
        if self.has_value {
            self.write_newline_indent(writer)?;
        }
        writer.write_all(close)
    }
}

impl Default for ReferenceFormatter {
    fn default() -> Self {
        Self::new(Layout::Indent(CANONICAL_INDENT))
    }
}

impl Formatter for ReferenceFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_f64(writer, f64::from(value))
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..idx].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units).iter() {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.current_indent += 1;
        self.has_value = false;
        writer.write_all(b"[")
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.close_container(writer, b"]")
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_item_separator(writer, first)
    }

    fn end_array_value<W>(&mut self, _writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.current_indent += 1;
        self.has_value = false;
        writer.write_all(b"{")
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.close_container(writer, b"}")
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_item_separator(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn end_object_value<W>(&mut self, _writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.has_value = true;
        Ok(())
    }
}

/// Formats a float the way the reference encoder does.
///
/// Shortest round-trip digits; fixed notation while the decimal exponent is
/// in `[-4, 16)` (always with a fractional part), scientific notation with a
/// signed, two-digit exponent otherwise. Non-finite values are spelled
/// `NaN`, `Infinity` and `-Infinity`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `-1.5e-5`.
    let sci = format!("{:e}", value);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return sci;
    };
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }
    if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() <= int_len {
                out.push_str(&digits);
                out.extend(std::iter::repeat('0').take(int_len - digits.len()));
                out.push_str(".0");
            } else {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            }
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take((-exponent - 1) as usize));
            out.push_str(&digits);
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        // Writing into a String cannot fail.
        let _ = write!(out, "e{}{:02}", sign, exponent.unsigned_abs());
    }
    out
}

/// Encodes any serializable value with the reference formatter.
pub fn to_reference_string<T>(value: &T, layout: Layout) -> Result<String, EncodeError>
where
    T: ?Sized + Serialize,
{
    let mut buf = Vec::with_capacity(128);
    let mut serializer = Serializer::with_formatter(&mut buf, ReferenceFormatter::new(layout));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf)?)
}

/// Encodes a document in the canonical ground-truth form.
///
/// Two-space indentation, source key order, ASCII-only strings, no trailing
/// newline. Equal documents always encode to identical text.
pub fn to_canonical_string(value: &DocValue) -> Result<String, EncodeError> {
    encode_document(value, Layout::Indent(CANONICAL_INDENT))
}

/// Encodes a document with the reference formatter in the given layout.
pub fn encode_document(value: &DocValue, layout: Layout) -> Result<String, EncodeError> {
    let mut buf = Vec::with_capacity(128);
    write_document(&mut buf, &mut ReferenceFormatter::new(layout), value)?;
    Ok(String::from_utf8(buf)?)
}

/// A container being written and whether its first item is still to come.
enum Frame<'a> {
    Sequence(std::slice::Iter<'a, DocValue>, bool),
    Mapping(indexmap::map::Iter<'a, String, DocValue>, bool),
}

enum Step<'a> {
    Element(&'a DocValue, bool),
    Entry(&'a str, &'a DocValue, bool),
    CloseSequence,
    CloseMapping,
    Done,
}

/// Writes `value` through `formatter`.
///
/// Every float reaches [`Formatter::write_f64`], non-finite ones included,
/// and integers beyond 64 bits are written from their source digits. The
/// tree is walked with an explicit stack.
///
/// # Errors
///
/// Returns any error raised by `writer`.
pub fn write_document<W, F>(
    writer: &mut W,
    formatter: &mut F,
    value: &DocValue,
) -> io::Result<()>
where
    W: ?Sized + io::Write,
    F: Formatter,
{
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut next = Some(value);
    loop {
        if let Some(node) = next.take() {
            let opened = match node {
                DocValue::Sequence(items) => {
                    formatter.begin_array(writer)?;
                    stack.push(Frame::Sequence(items.iter(), true));
                    true
                }
                DocValue::Mapping(map) => {
                    formatter.begin_object(writer)?;
                    stack.push(Frame::Mapping(map.iter(), true));
                    true
                }
                DocValue::Null => {
                    formatter.write_null(writer)?;
                    false
                }
                DocValue::Bool(b) => {
                    formatter.write_bool(writer, *b)?;
                    false
                }
                DocValue::Int(n) => {
                    formatter.write_i64(writer, *n)?;
                    false
                }
                DocValue::UInt(n) => {
                    formatter.write_u64(writer, *n)?;
                    false
                }
                DocValue::BigInt(digits) => {
                    formatter.write_number_str(writer, digits)?;
                    false
                }
                DocValue::Float(x) => {
                    formatter.write_f64(writer, *x)?;
                    false
                }
                DocValue::Text(text) => {
                    write_text(writer, formatter, text)?;
                    false
                }
            };
            if !opened && !end_value(writer, formatter, stack.last())? {
                return Ok(());
            }
        }

        let step = match stack.last_mut() {
            None => Step::Done,
            Some(Frame::Sequence(items, first)) => match items.next() {
                Some(item) => Step::Element(item, std::mem::replace(first, false)),
                None => Step::CloseSequence,
            },
            Some(Frame::Mapping(entries, first)) => match entries.next() {
                Some((key, item)) => Step::Entry(key, item, std::mem::replace(first, false)),
                None => Step::CloseMapping,
            },
        };
        match step {
            Step::Done => return Ok(()),
            Step::Element(item, first) => {
                formatter.begin_array_value(writer, first)?;
                next = Some(item);
            }
            Step::Entry(key, item, first) => {
                formatter.begin_object_key(writer, first)?;
                write_text(writer, formatter, key)?;
                formatter.end_object_key(writer)?;
                formatter.begin_object_value(writer)?;
                next = Some(item);
            }
            Step::CloseSequence | Step::CloseMapping => {
                if matches!(step, Step::CloseSequence) {
                    formatter.end_array(writer)?;
                } else {
                    formatter.end_object(writer)?;
                }
                stack.pop();
                if !end_value(writer, formatter, stack.last())? {
                    return Ok(());
                }
            }
        }
    }
}

/// Closes a finished value inside `parent`. Returns `false` at the root.
fn end_value<W, F>(
    writer: &mut W,
    formatter: &mut F,
    parent: Option<&Frame<'_>>,
) -> io::Result<bool>
where
    W: ?Sized + io::Write,
    F: Formatter,
{
    match parent {
        Some(Frame::Sequence(..)) => formatter.end_array_value(writer)?,
        Some(Frame::Mapping(..)) => formatter.end_object_value(writer)?,
        None => return Ok(false),
    }
    Ok(true)
}

fn write_text<W, F>(writer: &mut W, formatter: &mut F, text: &str) -> io::Result<()>
where
    W: ?Sized + io::Write,
    F: Formatter,
{
    formatter.begin_string(writer)?;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        let escape = match ch {
            '"' => CharEscape::Quote,
            '\\' => CharEscape::ReverseSolidus,
            '\u{8}' => CharEscape::Backspace,
            '\u{c}' => CharEscape::FormFeed,
            '\n' => CharEscape::LineFeed,
            '\r' => CharEscape::CarriageReturn,
            '\t' => CharEscape::Tab,
            c if c < ' ' => CharEscape::AsciiControl(c as u8),
            _ => continue,
        };
        if start < idx {
            formatter.write_string_fragment(writer, &text[start..idx])?;
        }
        formatter.write_char_escape(writer, escape)?;
        start = idx + 1;
    }
    if start < text.len() {
        formatter.write_string_fragment(writer, &text[start..])?;
    }
    formatter.end_string(writer)
}
