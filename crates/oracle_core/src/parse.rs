//! Parser for the canonical text form produced by [`render`](crate::render).
//!
//! Braced composites come back as [`Value::Map`]; the record kind is not part
//! of the text form. [`Value::with_kinds`] puts it back.

use crate::value::Value;
use std::collections::BTreeMap;

/// Parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Input ended inside a value
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// Character not valid at this point
    #[error("unexpected '{found}' at offset {offset}")]
    UnexpectedChar {
        /// Byte offset
        offset: usize,
        /// Offending character
        found: char,
    },

    /// Integer literal out of range
    #[error("invalid integer at offset {offset}")]
    InvalidInteger {
        /// Byte offset
        offset: usize,
    },

    /// Bad escape sequence inside a string
    #[error("invalid escape at offset {offset}")]
    InvalidEscape {
        /// Byte offset
        offset: usize,
    },

    /// Same key twice in one composite
    #[error("duplicate key '{key}'")]
    DuplicateKey {
        /// The repeated key
        key: String,
    },

    /// Input continues after a complete value
    #[error("trailing input at offset {offset}")]
    TrailingInput {
        /// Byte offset
        offset: usize,
    },
}

impl Value {
    /// Parse a complete rendered value
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a single well-formed value
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut parser = Parser { input, pos: 0 };
        let value = parser.value()?;
        parser.skip_ws();
        if parser.pos < input.len() {
            return Err(ParseError::TrailingInput { offset: parser.pos });
        }
        Ok(value)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char) -> Result<(), ParseError> {
        self.skip_ws();
        let offset = self.pos;
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(found) => Err(ParseError::UnexpectedChar { offset, found }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        self.skip_ws();
        let offset = self.pos;
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd),
            Some('{') => self.composite(),
            Some('[') => self.list(),
            Some('"') => self.string().map(Value::str),
            Some(c) if c == '-' || c.is_ascii_digit() => self.integer(),
            Some(c) if c.is_ascii_alphabetic() => match self.ident().as_str() {
                "true" => Ok(Value::bool(true)),
                "false" => Ok(Value::bool(false)),
                _ => Err(ParseError::UnexpectedChar { offset, found: c }),
            },
            Some(found) => Err(ParseError::UnexpectedChar { offset, found }),
        }
    }

    fn composite(&mut self) -> Result<Value, ParseError> {
        self.expect('{')?;
        let mut map = BTreeMap::new();
        self.skip_ws();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Value::Map(map));
        }
        loop {
            self.skip_ws();
            let key = match self.peek() {
                Some('"') => self.string()?,
                Some(c) if c.is_ascii_alphabetic() || c == '_' => self.ident(),
                Some(found) => {
                    return Err(ParseError::UnexpectedChar {
                        offset: self.pos,
                        found,
                    });
                }
                None => return Err(ParseError::UnexpectedEnd),
            };
            self.expect('=')?;
            let item = self.value()?;
            if map.insert(key.clone(), item).is_some() {
                return Err(ParseError::DuplicateKey { key });
            }
            self.skip_ws();
            let offset = self.pos;
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Map(map)),
                Some(found) => return Err(ParseError::UnexpectedChar { offset, found }),
                None => return Err(ParseError::UnexpectedEnd),
            }
        }
    }

    fn list(&mut self) -> Result<Value, ParseError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(Value::List(items));
        }
        loop {
            items.push(self.value()?);
            self.skip_ws();
            let offset = self.pos;
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(Value::List(items)),
                Some(found) => return Err(ParseError::UnexpectedChar { offset, found }),
                None => return Err(ParseError::UnexpectedEnd),
            }
        }
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        self.input[start..self.pos].to_string()
    }

    fn integer(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        self.input[start..self.pos]
            .parse::<i64>()
            .map(Value::int)
            .map_err(|_| ParseError::InvalidInteger { offset: start })
    }

    fn string(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            let offset = self.pos;
            match self.bump().ok_or(ParseError::UnexpectedEnd)? {
                '"' => return Ok(out),
                '\\' => match self.bump().ok_or(ParseError::UnexpectedEnd)? {
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'u' => out.push(self.unicode_escape(offset)?),
                    _ => return Err(ParseError::InvalidEscape { offset }),
                },
                c => out.push(c),
            }
        }
    }

    /// Body of `\u{XXXX}` after the `u`
    fn unicode_escape(&mut self, offset: usize) -> Result<char, ParseError> {
        if self.bump() != Some('{') {
            return Err(ParseError::InvalidEscape { offset });
        }
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
            self.bump();
        }
        let digits = &self.input[start..self.pos];
        if self.bump() != Some('}') {
            return Err(ParseError::InvalidEscape { offset });
        }
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(ParseError::InvalidEscape { offset })
    }
}
