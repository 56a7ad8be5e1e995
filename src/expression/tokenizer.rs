//! Lexical analysis for template expressions
//!
//! The [`Scanner`] owns a cursor into a single expression span and produces
//! one token at a time. All positions it reports are absolute: the span's
//! `offset` inside the outer template string is added to the local cursor, so
//! an expression embedded at column 40 reports its errors at column 40+.
//!
//! Character classes:
//!
//! - whitespace (space, tab, CR, LF) is skipped before every token
//! - identifiers are ASCII letters, digits, `_` and `-`; they may start with a
//!   digit, but a hyphen must be followed by another identifier character
//! - string literals are single-quoted, with `''` standing for one quote
//! - operators are `||`, `&&`, `.`, `(` and `)`

use super::errors::ParseError;

/// Operator and punctuation tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Or,
    And,
    Dot,
    LeftParen,
    RightParen,
}

impl Operator {
    const ALL: [Operator; 5] = [
        Operator::Or,
        Operator::And,
        Operator::Dot,
        Operator::LeftParen,
        Operator::RightParen,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Or => "||",
            Operator::And => "&&",
            Operator::Dot => ".",
            Operator::LeftParen => "(",
            Operator::RightParen => ")",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Identifier(String),
    StringLiteral(String),
    Operator(Operator),
}

/// A token and the absolute byte offset it starts at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Cursor over one expression span
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    offset: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str, offset: usize) -> Self {
        Self {
            src,
            pos: 0,
            offset,
        }
    }

    /// Local cursor position
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Skip whitespace; returns whether input remains
    pub fn skip_whitespace(&mut self) -> bool {
        let bytes = self.src.as_bytes();
        while bytes.get(self.pos).copied().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        !self.is_at_end()
    }

    /// Operator starting at the cursor, without consuming it
    pub fn peek_operator(&self) -> Option<Operator> {
        let rest = &self.src[self.pos..];
        Operator::ALL
            .into_iter()
            .find(|op| rest.starts_with(op.symbol()))
    }

    pub fn consume_operator(&mut self, op: Operator) -> Token {
        let position = self.offset + self.pos;
        self.pos += op.symbol().len();
        Token {
            kind: TokenKind::Operator(op),
            position,
        }
    }

    /// Scan an identifier at the cursor, if there is one
    pub fn identifier(&mut self) -> Result<Option<Token>, ParseError> {
        let bytes = self.src.as_bytes();
        let start = self.pos;

        while let Some(&b) = bytes.get(self.pos) {
            if !is_identifier_byte(b) {
                break;
            }
            if b == b'-' && !bytes.get(self.pos + 1).copied().is_some_and(is_identifier_byte) {
                return Err(self.unexpected("-", self.pos));
            }
            self.pos += 1;
        }

        if self.pos == start {
            return Ok(None);
        }

        Ok(Some(Token {
            kind: TokenKind::Identifier(self.src[start..self.pos].to_string()),
            position: self.offset + start,
        }))
    }

    /// Scan a single-quoted string literal at the cursor, if there is one
    pub fn string_literal(&mut self) -> Result<Option<Token>, ParseError> {
        let bytes = self.src.as_bytes();
        if bytes.get(self.pos) != Some(&b'\'') {
            return Ok(None);
        }

        let start = self.pos;
        self.pos += 1;

        while let Some(&b) = bytes.get(self.pos) {
            if b == b'\'' {
                self.pos += 1;
                if bytes.get(self.pos) != Some(&b'\'') {
                    let raw = &self.src[start + 1..self.pos - 1];
                    return Ok(Some(Token {
                        kind: TokenKind::StringLiteral(raw.replace("''", "'")),
                        position: self.offset + start,
                    }));
                }
            }
            self.pos += 1;
        }

        Err(self.unexpected(&self.src[start..], start))
    }

    /// Produce the next token, or `None` once the span is exhausted
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        if !self.skip_whitespace() {
            return Ok(None);
        }
        if let Some(token) = self.string_literal()? {
            return Ok(Some(token));
        }
        if let Some(token) = self.identifier()? {
            return Ok(Some(token));
        }
        match self.peek_operator() {
            Some(op) => Ok(Some(self.consume_operator(op))),
            None => Err(self.unexpected_here()),
        }
    }

    /// Text of the span from a local position to its end
    pub fn rest_from(&self, local: usize) -> &'a str {
        &self.src[local..]
    }

    pub fn unexpected(&self, token: &str, local: usize) -> ParseError {
        ParseError::unexpected_token(token, self.offset + local)
    }

    /// Error naming the character under the cursor
    pub fn unexpected_here(&self) -> ParseError {
        let token = self.src[self.pos..]
            .chars()
            .next()
            .map(String::from)
            .unwrap_or_default();
        self.unexpected(&token, self.pos)
    }
}
