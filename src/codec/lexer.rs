//! Parser for the JavaScript subset the documentation generator emits.
//!
//! Search data files are a handful of `var name = value;` statements whose
//! values are nested array and object literals of strings and integers.
//! This is a small recursive-descent reader over that grammar; anything
//! outside it (expressions, functions, regex literals) is a syntax error.

use std::fmt;

/// A literal value from a data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Array(Vec<Value>),
    /// Object members in source order.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Short name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

/// A top-level `var` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

/// What went wrong while reading the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    UnexpectedEof,
    Unexpected { found: char, expected: &'static str },
    UnterminatedString,
    UnterminatedComment,
    InvalidEscape(String),
    IntegerOverflow,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::Unexpected { found, expected } => {
                write!(f, "unexpected {:?}, expected {}", found, expected)
            }
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnterminatedComment => write!(f, "unterminated block comment"),
            Self::InvalidEscape(seq) => write!(f, "invalid escape sequence '\\{}'", seq),
            Self::IntegerOverflow => write!(f, "integer literal out of range"),
        }
    }
}

/// A syntax error with its 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    pub kind: SyntaxErrorKind,
    pub line: usize,
    pub column: usize,
}

/// Parses every `var` statement in `source`.
pub fn parse_bindings(source: &str) -> Result<Vec<Binding>, ParseError> {
    let mut reader = Reader::new(source);
    let mut bindings = vec![];
    loop {
        reader.skip_trivia()?;
        if reader.peek().is_none() {
            return Ok(bindings);
        }
        bindings.push(reader.binding()?);
    }
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        // Tolerate a UTF-8 byte order mark
        let pos = if src.starts_with('\u{feff}') { 3 } else { 0 };
        Self { src, pos }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error_at(&self, pos: usize, kind: SyntaxErrorKind) -> ParseError {
        let before = &self.src[..pos];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        ParseError { kind, line, column }
    }

    fn error(&self, kind: SyntaxErrorKind) -> ParseError {
        self.error_at(self.pos, kind)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(found) => self.error(SyntaxErrorKind::Unexpected { found, expected }),
            None => self.error(SyntaxErrorKind::UnexpectedEof),
        }
    }

    /// Skips whitespace and both comment forms.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            let rest = &self.src[self.pos..];
            if rest.starts_with("//") {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                let Some(end) = rest[2..].find("*/") else {
                    return Err(self.error(SyntaxErrorKind::UnterminatedComment));
                };
                self.pos += end + 4;
            } else if let Some(c) = self.peek()
                && c.is_whitespace()
            {
                self.pos += c.len_utf8();
            } else {
                return Ok(());
            }
        }
    }

    fn expect(&mut self, want: char, expected: &'static str) -> Result<(), ParseError> {
        self.skip_trivia()?;
        if self.peek() == Some(want) {
            self.pos += want.len_utf8();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn identifier(&mut self) -> Result<String, ParseError> {
        self.skip_trivia()?;
        let start = self.pos;
        while let Some(c) = self.peek() {
            let valid = c == '_' || c == '$' || c.is_alphabetic() || (self.pos > start && c.is_ascii_digit());
            if !valid {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == start {
            return Err(self.unexpected("identifier"));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    /// `var name = value;` (the `var` keyword and trailing `;` are optional).
    fn binding(&mut self) -> Result<Binding, ParseError> {
        let mut name = self.identifier()?;
        if matches!(name.as_str(), "var" | "let" | "const") {
            name = self.identifier()?;
        }
        self.expect('=', "'='")?;
        let value = self.value()?;
        self.skip_trivia()?;
        if self.peek() == Some(';') {
            self.pos += 1;
        }
        Ok(Binding { name, value })
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        self.skip_trivia()?;
        match self.peek() {
            Some('[') => self.array(),
            Some('{') => self.object(),
            Some(q @ ('\'' | '"')) => self.string(q).map(Value::Str),
            Some(c) if c == '-' || c.is_ascii_digit() => self.integer().map(Value::Int),
            _ => Err(self.unexpected("value")),
        }
    }

    fn array(&mut self) -> Result<Value, ParseError> {
        self.expect('[', "'['")?;
        let mut items = vec![];
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {}
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }
    }

    fn object(&mut self) -> Result<Value, ParseError> {
        self.expect('{', "'{'")?;
        let mut members = vec![];
        loop {
            self.skip_trivia()?;
            let key = match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    return Ok(Value::Object(members));
                }
                Some(q @ ('\'' | '"')) => self.string(q)?,
                Some(c) if c.is_ascii_digit() => self.integer()?.to_string(),
                _ => self.identifier()?,
            };
            self.expect(':', "':'")?;
            let value = self.value()?;
            members.push((key, value));
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {}
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }
    }

    fn integer(&mut self) -> Result<i64, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(self.unexpected("digit"));
        }
        self.src[start..self.pos]
            .parse()
            .map_err(|_| self.error_at(start, SyntaxErrorKind::IntegerOverflow))
    }

    fn string(&mut self, quote: char) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += quote.len_utf8();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error_at(start, SyntaxErrorKind::UnterminatedString));
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), ParseError> {
        let at = self.pos - 1;
        let Some(c) = self.bump() else {
            return Err(self.error_at(at, SyntaxErrorKind::UnterminatedString));
        };
        match c {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            // Line continuation
            '\n' => {}
            'x' => out.push(self.hex_escape(at, 2)?),
            'u' => out.push(self.unicode_escape(at)?),
            c => out.push(c),
        }
        Ok(())
    }

    fn hex_escape(&mut self, at: usize, digits: usize) -> Result<char, ParseError> {
        let unit = self.hex_unit(at, digits)?;
        char::from_u32(unit).ok_or_else(|| self.invalid_escape(at, ""))
    }

    /// `\uXXXX`, joining a UTF-16 surrogate pair written as two escapes.
    fn unicode_escape(&mut self, at: usize) -> Result<char, ParseError> {
        let unit = self.hex_unit(at, 4)?;
        let code = if (0xD800..0xDC00).contains(&unit) && self.src[self.pos..].starts_with("\\u") {
            let resume = self.pos;
            self.pos += 2;
            let low = self.hex_unit(at, 4)?;
            if (0xDC00..0xE000).contains(&low) {
                0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
            } else {
                self.pos = resume;
                unit
            }
        } else {
            unit
        };
        char::from_u32(code).ok_or_else(|| self.invalid_escape(at, ""))
    }

    /// Reads exactly `digits` hex digits. A sign is not a digit.
    fn hex_unit(&mut self, at: usize, digits: usize) -> Result<u32, ParseError> {
        let src = self.src;
        let hex = src.get(self.pos..self.pos + digits).unwrap_or("");
        if hex.len() != digits || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(self.invalid_escape(at, hex));
        }
        self.pos += digits;
        u32::from_str_radix(hex, 16).map_err(|_| self.invalid_escape(at, hex))
    }

    fn invalid_escape(&self, at: usize, pending: &str) -> ParseError {
        let seq = format!("{}{}", &self.src[at + 1..self.pos], pending);
        self.error_at(at, SyntaxErrorKind::InvalidEscape(seq))
    }
}
