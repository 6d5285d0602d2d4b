use super::{Array, Kind, Literal, Member, Object, Value};
use serde_json::value::RawValue;

const MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parses relaxed JSON: standard JSON plus `//` and `/* */` comments and an
/// optional trailing comma in objects and arrays.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut parser = Parser { src: text, pos: 0 };
    let value = parser.value(0)?;
    if parser.pos < text.len() {
        return Err(parser.error(format!(
            "unexpected {} after top-level value",
            parser.describe()
        )));
    }
    Ok(value)
}

pub fn parse_bytes(bytes: &[u8]) -> Result<Value, ParseError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse(text),
        Err(e) => {
            let (line, column) = position(bytes, e.valid_up_to());
            Err(ParseError {
                line,
                column,
                message: "invalid UTF-8".to_string(),
            })
        }
    }
}

// 1-based line and column (in characters) of a byte offset.
fn position(bytes: &[u8], offset: usize) -> (usize, usize) {
    let prefix = &bytes[..offset.min(bytes.len())];
    let line = prefix.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = prefix
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let column = prefix[line_start..]
        .iter()
        .filter(|&&b| b & 0xC0 != 0x80)
        .count()
        + 1;
    (line, column)
}

// Grammar check only: out-of-range numbers and lone surrogate escapes are
// valid JSON text even though they do not decode.
fn check_literal(raw: &str) -> Result<(), serde_json::Error> {
    serde_json::from_str::<Box<RawValue>>(raw).map(drop)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> ParseError {
        let (line, column) = position(self.src.as_bytes(), offset);
        ParseError {
            line,
            column,
            message: message.into(),
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.pos, message)
    }

    fn describe(&self) -> String {
        match self.src.get(self.pos..).and_then(|rest| rest.chars().next()) {
            Some(c) => format!("{c:?}"),
            None => "end of input".to_string(),
        }
    }

    /// Whitespace and comments, returned verbatim.
    fn extra(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\n' | b'\r') => self.pos += 1,
                Some(b'/') => match self.src.as_bytes().get(self.pos + 1) {
                    Some(b'/') => {
                        self.pos = match self.src[self.pos..].find('\n') {
                            Some(n) => self.pos + n,
                            None => self.src.len(),
                        };
                    }
                    Some(b'*') => match self.src[self.pos + 2..].find("*/") {
                        Some(n) => self.pos += n + 4,
                        None => return Err(self.error("unterminated block comment")),
                    },
                    _ => return Err(self.error("unexpected '/'")),
                },
                _ => break,
            }
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn value(&mut self, depth: usize) -> Result<Value, ParseError> {
        let before = self.extra()?;
        self.value_after(before, depth)
    }

    fn value_after(&mut self, before: String, depth: usize) -> Result<Value, ParseError> {
        if depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        let kind = match self.peek() {
            None => return Err(self.error("unexpected end of input")),
            Some(b'{') => Kind::Object(self.object(depth)?),
            Some(b'[') => Kind::Array(self.array(depth)?),
            Some(b'"') => Kind::Literal(self.string()?),
            Some(b'-' | b'0'..=b'9') => Kind::Literal(self.number()?),
            Some(b't' | b'f' | b'n') => Kind::Literal(self.keyword()?),
            Some(_) => return Err(self.error(format!("unexpected {}", self.describe()))),
        };
        let after = self.extra()?;
        Ok(Value {
            before,
            kind,
            after,
        })
    }

    fn object(&mut self, depth: usize) -> Result<Object, ParseError> {
        let open = self.pos;
        self.pos += 1;
        let mut members = Vec::new();
        loop {
            let lead = self.extra()?;
            if self.peek() == Some(b'}') {
                self.pos += 1;
                // Reaching `}` here means either `{}` or a comma right before it.
                let trailing_comma = !members.is_empty();
                return Ok(Object {
                    members,
                    trailing_comma,
                    close: lead,
                });
            }
            if self.peek() != Some(b'"') {
                return Err(self.error(format!(
                    "expected object key, found {}",
                    self.describe()
                )));
            }
            let name = Value {
                before: lead,
                kind: Kind::Literal(self.string()?),
                after: self.extra()?,
            };
            if self.peek() != Some(b':') {
                return Err(self.error(format!(
                    "expected ':' after object key, found {}",
                    self.describe()
                )));
            }
            self.pos += 1;
            let value = self.value(depth + 1)?;
            members.push(Member { name, value });
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Object {
                        members,
                        trailing_comma: false,
                        close: String::new(),
                    });
                }
                None => return Err(self.error_at(open, "unterminated object")),
                Some(_) => {
                    return Err(self.error(format!(
                        "expected ',' or '}}' in object, found {}",
                        self.describe()
                    )))
                }
            }
        }
    }

    fn array(&mut self, depth: usize) -> Result<Array, ParseError> {
        let open = self.pos;
        self.pos += 1;
        let mut elements = Vec::new();
        loop {
            let lead = self.extra()?;
            if self.peek() == Some(b']') {
                self.pos += 1;
                let trailing_comma = !elements.is_empty();
                return Ok(Array {
                    elements,
                    trailing_comma,
                    close: lead,
                });
            }
            if self.peek() == Some(b',') {
                return Err(self.error("unexpected ',' in array"));
            }
            elements.push(self.value_after(lead, depth + 1)?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Array {
                        elements,
                        trailing_comma: false,
                        close: String::new(),
                    });
                }
                None => return Err(self.error_at(open, "unterminated array")),
                Some(_) => {
                    return Err(self.error(format!(
                        "expected ',' or ']' in array, found {}",
                        self.describe()
                    )))
                }
            }
        }
    }

    fn string(&mut self) -> Result<Literal, ParseError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                None => {
                    self.pos = self.src.len();
                    return Err(self.error_at(start, "unterminated string"));
                }
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => self.pos += 2,
                Some(b) if b < 0x20 => {
                    return Err(self.error("control character in string literal"))
                }
                Some(_) => self.pos += 1,
            }
        }
        let raw = &self.src[start..self.pos];
        check_literal(raw)
            .map_err(|e| self.error_at(start, format!("invalid string literal: {e}")))?;
        Ok(Literal::from_raw(raw.to_string()))
    }

    fn number(&mut self) -> Result<Literal, ParseError> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
        ) {
            self.pos += 1;
        }
        let raw = &self.src[start..self.pos];
        if check_literal(raw).is_err() {
            return Err(self.error_at(start, format!("invalid number {raw:?}")));
        }
        Ok(Literal::from_raw(raw.to_string()))
    }

    fn keyword(&mut self) -> Result<Literal, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        let raw = &self.src[start..self.pos];
        match raw {
            "true" | "false" | "null" => Ok(Literal::from_raw(raw.to_string())),
            _ => Err(self.error_at(start, format!("invalid literal {raw:?}"))),
        }
    }
}
