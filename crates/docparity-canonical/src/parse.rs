//! Document text parser.
//!
//! Accepts the JSON dialect written by the reference tooling: standard JSON
//! plus the bare literals `NaN`, `Infinity` and `-Infinity`. The literal text
//! of a number decides its kind, so `-0` is the integer zero and integers of
//! any length stay integers.

use crate::value::{DocValue, Mapping};

/// Deepest container nesting accepted by the parser.
pub const MAX_NESTING: usize = 1000;

/// What went wrong while parsing document text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The text ended inside a value.
    #[error("unexpected end of input")]
    UnexpectedEnd,
    /// No value starts at this position.
    #[error("expecting value")]
    ExpectedValue,
    /// An object member does not start with a string key.
    #[error("expecting property name enclosed in double quotes")]
    ExpectedKey,
    /// A key is not followed by `:`.
    #[error("expecting ':' delimiter")]
    ExpectedColon,
    /// A container item is followed by neither `,` nor the closing bracket.
    #[error("expecting ',' delimiter")]
    ExpectedComma,
    /// Malformed fraction or exponent.
    #[error("invalid number literal")]
    InvalidNumber,
    /// Unknown escape or malformed `\uXXXX`.
    #[error("invalid escape sequence")]
    InvalidEscape,
    /// A `\uXXXX` surrogate without its other half.
    #[error("unpaired surrogate escape")]
    LoneSurrogate,
    /// Raw control character inside a string.
    #[error("invalid control character in string")]
    ControlCharacter,
    /// Missing closing quote.
    #[error("unterminated string")]
    UnterminatedString,
    /// Containers nested deeper than [`MAX_NESTING`].
    #[error("nesting deeper than {MAX_NESTING} levels")]
    TooDeep,
    /// Non-whitespace text after the document.
    #[error("extra data")]
    TrailingData,
}

/// Error returned when document text cannot be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid document JSON: {kind} at line {line} column {column}")]
pub struct ParseError {
    kind: ParseErrorKind,
    line: usize,
    column: usize,
}

impl ParseError {
    /// The kind of failure.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// 1-based line of the failure.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column (in characters) of the failure.
    pub fn column(&self) -> usize {
        self.column
    }
}

pub(crate) fn parse_document(text: &str) -> Result<DocValue, ParseError> {
    let mut parser = Parser {
        text,
        bytes: text.as_bytes(),
        pos: 0,
    };
    let value = parser.parse_tree()?;
    parser.skip_whitespace();
    if parser.pos < parser.bytes.len() {
        return Err(parser.error(ParseErrorKind::TrailingData));
    }
    Ok(value)
}

/// A container whose closing bracket has not been reached yet.
enum Open {
    Sequence(Vec<DocValue>),
    /// Members so far and the key waiting for its value.
    Mapping(Mapping, String),
}

impl Open {
    fn push(&mut self, value: DocValue) {
        match self {
            Open::Sequence(items) => items.push(value),
            Open::Mapping(map, key) => {
                // A repeated key keeps its first slot and takes the new value.
                map.insert(std::mem::take(key), value);
            }
        }
    }

    fn closing(&self) -> u8 {
        match self {
            Open::Sequence(_) => b']',
            Open::Mapping(..) => b'}',
        }
    }

    fn finish(self) -> DocValue {
        match self {
            Open::Sequence(items) => DocValue::Sequence(items),
            Open::Mapping(map, _) => DocValue::Mapping(map),
        }
    }
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Parses one value. Containers are tracked on an explicit stack.
    fn parse_tree(&mut self) -> Result<DocValue, ParseError> {
        let mut stack: Vec<Open> = Vec::new();
        'value: loop {
            self.skip_whitespace();
            let mut value = match self.peek() {
                Some(b'[') => {
                    self.enter(stack.len())?;
                    self.skip_whitespace();
                    if self.eat(b']') {
                        DocValue::Sequence(Vec::new())
                    } else {
                        stack.push(Open::Sequence(Vec::new()));
                        continue 'value;
                    }
                }
                Some(b'{') => {
                    self.enter(stack.len())?;
                    self.skip_whitespace();
                    if self.eat(b'}') {
                        DocValue::Mapping(Mapping::new())
                    } else {
                        let key = self.parse_key()?;
                        stack.push(Open::Mapping(Mapping::new(), key));
                        continue 'value;
                    }
                }
                _ => self.parse_scalar()?,
            };

            loop {
                let Some(mut open) = stack.pop() else {
                    return Ok(value);
                };
                open.push(value);
                self.skip_whitespace();
                match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                        if let Open::Mapping(_, key) = &mut open {
                            self.skip_whitespace();
                            *key = self.parse_key()?;
                        }
                        stack.push(open);
                        continue 'value;
                    }
                    Some(byte) if byte == open.closing() => {
                        self.pos += 1;
                        value = open.finish();
                    }
                    Some(_) => return Err(self.error(ParseErrorKind::ExpectedComma)),
                    None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
                }
            }
        }
    }

    fn enter(&mut self, depth: usize) -> Result<(), ParseError> {
        if depth >= MAX_NESTING {
            return Err(self.error(ParseErrorKind::TooDeep));
        }
        self.pos += 1;
        Ok(())
    }

    fn parse_key(&mut self) -> Result<String, ParseError> {
        if self.peek() != Some(b'"') {
            return Err(self.error(ParseErrorKind::ExpectedKey));
        }
        let key = self.parse_string()?;
        self.skip_whitespace();
        if !self.eat(b':') {
            return Err(self.error(ParseErrorKind::ExpectedColon));
        }
        Ok(key)
    }

    fn parse_scalar(&mut self) -> Result<DocValue, ParseError> {
        let (literal, value) = match self.peek() {
            None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            Some(b'"') => return self.parse_string().map(DocValue::Text),
            Some(b'-' | b'0'..=b'9') => return self.parse_number(),
            Some(b'n') => ("null", DocValue::Null),
            Some(b't') => ("true", DocValue::Bool(true)),
            Some(b'f') => ("false", DocValue::Bool(false)),
            Some(b'N') => ("NaN", DocValue::Float(f64::NAN)),
            Some(b'I') => ("Infinity", DocValue::Float(f64::INFINITY)),
            Some(_) => return Err(self.error(ParseErrorKind::ExpectedValue)),
        };
        if !self.rest().starts_with(literal.as_bytes()) {
            return Err(self.error(ParseErrorKind::ExpectedValue));
        }
        self.pos += literal.len();
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<DocValue, ParseError> {
        let start = self.pos;
        if self.eat(b'-') && self.rest().starts_with(b"Infinity") {
            self.pos += "Infinity".len();
            return Ok(DocValue::Float(f64::NEG_INFINITY));
        }
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => {
                self.eat_digits();
            }
            _ => return Err(self.error_at(start, ParseErrorKind::ExpectedValue)),
        }

        let mut integral = true;
        if self.eat(b'.') {
            integral = false;
            if self.eat_digits() == 0 {
                return Err(self.error(ParseErrorKind::InvalidNumber));
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            integral = false;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.eat_digits() == 0 {
                return Err(self.error(ParseErrorKind::InvalidNumber));
            }
        }

        let token = &self.text[start..self.pos];
        if integral {
            return Ok(integer_value(token));
        }
        // Out-of-range literals read as infinities, small ones as zero.
        token
            .parse::<f64>()
            .map(DocValue::Float)
            .map_err(|_| self.error_at(start, ParseErrorKind::InvalidNumber))
    }

    /// Parses a string starting at its opening quote.
    fn parse_string(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let run = self.pos;
            while let Some(byte) = self.peek() {
                if byte == b'"' || byte == b'\\' || byte < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            // Runs stop only at ASCII bytes, so both ends are char boundaries.
            out.push_str(&self.text[run..self.pos]);
            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    out.push(self.parse_escape()?);
                }
                Some(_) => return Err(self.error(ParseErrorKind::ControlCharacter)),
                None => return Err(self.error_at(start, ParseErrorKind::UnterminatedString)),
            }
        }
    }

    /// Parses the escape after a backslash.
    fn parse_escape(&mut self) -> Result<char, ParseError> {
        let start = self.pos - 1;
        let Some(byte) = self.peek() else {
            return Err(self.error_at(start, ParseErrorKind::UnterminatedString));
        };
        self.pos += 1;
        let ch = match byte {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.parse_unicode_escape(start),
            _ => return Err(self.error_at(start, ParseErrorKind::InvalidEscape)),
        };
        Ok(ch)
    }

    fn parse_unicode_escape(&mut self, start: usize) -> Result<char, ParseError> {
        let unit = self.parse_hex4(start)?;
        let code = match unit {
            0xD800..=0xDBFF => {
                if !self.rest().starts_with(b"\\u") {
                    return Err(self.error_at(start, ParseErrorKind::LoneSurrogate));
                }
                self.pos += 2;
                let low = self.parse_hex4(start)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.error_at(start, ParseErrorKind::LoneSurrogate));
                }
                0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
            }
            _ => unit,
        };
        // Only a lone low surrogate is left without a scalar value.
        char::from_u32(code).ok_or_else(|| self.error_at(start, ParseErrorKind::LoneSurrogate))
    }

    fn parse_hex4(&mut self, start: usize) -> Result<u32, ParseError> {
        let digits = self
            .bytes
            .get(self.pos..self.pos + 4)
            .filter(|digits| digits.iter().all(u8::is_ascii_hexdigit))
            .ok_or_else(|| self.error_at(start, ParseErrorKind::InvalidEscape))?;
        let unit = digits
            .iter()
            .fold(0u32, |acc, &d| (acc << 4) | hex_value(d));
        self.pos += 4;
        Ok(unit)
    }

    fn eat_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn rest(&self) -> &'a [u8] {
        self.bytes.get(self.pos..).unwrap_or_default()
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, pos: usize, kind: ParseErrorKind) -> ParseError {
        let consumed = self.text.get(..pos).unwrap_or(self.text);
        let line_start = consumed.rfind('\n').map_or(0, |idx| idx + 1);
        ParseError {
            kind,
            line: consumed.matches('\n').count() + 1,
            column: consumed[line_start..].chars().count() + 1,
        }
    }
}

fn integer_value(token: &str) -> DocValue {
    if let Ok(n) = token.parse::<i64>() {
        return DocValue::Int(n);
    }
    if let Ok(n) = token.parse::<u64>() {
        return DocValue::UInt(n);
    }
    DocValue::BigInt(token.to_string())
}

fn hex_value(digit: u8) -> u32 {
    match digit {
        b'0'..=b'9' => u32::from(digit - b'0'),
        b'a'..=b'f' => u32::from(digit - b'a' + 10),
        _ => u32::from(digit - b'A' + 10),
    }
}
