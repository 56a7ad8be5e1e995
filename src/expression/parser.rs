//! Precedence-climbing parser for template expressions
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! Or     := And ('||' And)*
//! And    := Access ('&&' Access)*
//! Access := Atom ('.' Atom)*
//! Atom   := '(' Or ')' | StringLiteral | Identifier
//! ```
//!
//! A single loop in [`Parser::next`] tries every operator at the cursor and
//! accepts it only if the caller's minimum precedence allows; the right-hand
//! side is then parsed with that operator's own precedence as the new minimum.
//! All three binary operators are therefore right-associative: `a.b.c` parses
//! as `a.(b.c)` and `a || b || c` as `a || (b || c)`. Evaluation order of
//! short-circuits and the order errors are attributed in both follow from this.
//!
//! Every parenthesis and every right-hand side nests one level deeper. Past
//! [`MAX_DEPTH`] levels the parser reports the operator that would open the
//! next level, which keeps the tree shallow enough to evaluate and drop
//! recursively.

use super::ast::Node;
use super::errors::ParseError;
use super::tokenizer::{Operator, Scanner, Token, TokenKind};

/// Deepest nesting of parentheses and operator right-hand sides
pub const MAX_DEPTH: usize = 256;

/// Binding strength, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Or,
    And,
    MemberAccess,
    Parentheses,
}

/// Parse a complete span; the whole input must be consumed
pub fn parse_node(src: &str, offset: usize) -> Result<Node, ParseError> {
    Parser::new(src, offset)
        .next(Precedence::Or, true)?
        .ok_or(ParseError::ExpressionExpected { position: offset })
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, offset: usize) -> Self {
        Self {
            scanner: Scanner::new(src, offset),
            depth: 0,
        }
    }

    /// Run `parse` one nesting level deeper; `token` at `start` is blamed past the limit
    fn nested<T>(
        &mut self,
        token: &str,
        start: usize,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.scanner.unexpected(token, start));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse an expression whose operators bind at least as tight as `min`
    fn next(&mut self, min: Precedence, check_end: bool) -> Result<Option<Node>, ParseError> {
        self.scanner.skip_whitespace();
        let mut node = self.atom()?;

        while self.scanner.skip_whitespace() {
            if !self.operator(min, &mut node)? {
                break;
            }
        }

        if (check_end || node.is_none()) && !self.scanner.is_at_end() {
            return Err(self.scanner.unexpected_here());
        }

        Ok(node)
    }

    /// Identifier or string literal at the cursor; an operator is left unconsumed
    fn atom(&mut self) -> Result<Option<Node>, ParseError> {
        let checkpoint = self.scanner.clone();
        match self.scanner.next_token()? {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => Ok(Some(Node::Identifier(name))),
            Some(Token {
                kind: TokenKind::StringLiteral(value),
                ..
            }) => Ok(Some(Node::StringLiteral(value))),
            _ => {
                self.scanner = checkpoint;
                Ok(None)
            }
        }
    }

    /// Try each operator at the cursor, tightest last; returns whether one applied
    fn operator(&mut self, min: Precedence, left: &mut Option<Node>) -> Result<bool, ParseError> {
        Ok(self.binary(Operator::Or, min, left)?
            || self.binary(Operator::And, min, left)?
            || self.binary(Operator::Dot, min, left)?
            || self.group(left)?)
    }

    fn binary(
        &mut self,
        op: Operator,
        min: Precedence,
        left: &mut Option<Node>,
    ) -> Result<bool, ParseError> {
        let precedence = match op {
            Operator::Or => Precedence::Or,
            Operator::And => Precedence::And,
            _ => Precedence::MemberAccess,
        };
        if self.scanner.peek_operator() != Some(op) || min > precedence {
            return Ok(false);
        }

        let start = self.scanner.position();
        let Some(lhs) = left.take() else {
            return Err(self.scanner.unexpected(op.symbol(), start));
        };
        self.scanner.consume_operator(op);

        let rhs = self
            .nested(op.symbol(), start, |parser| parser.next(precedence, false))?
            .ok_or_else(|| self.scanner.unexpected(op.symbol(), start))?;

        *left = Some(match op {
            Operator::Or => Node::or(lhs, rhs),
            Operator::And => Node::and(lhs, rhs),
            _ => Node::member(lhs, rhs),
        });
        Ok(true)
    }

    fn group(&mut self, left: &mut Option<Node>) -> Result<bool, ParseError> {
        if self.scanner.peek_operator() != Some(Operator::LeftParen) {
            return Ok(false);
        }

        let start = self.scanner.position();
        if left.is_some() {
            return Err(self.scanner.unexpected(Operator::LeftParen.symbol(), start));
        }
        self.scanner.consume_operator(Operator::LeftParen);

        let symbol = Operator::LeftParen.symbol();
        let inner = self.nested(symbol, start, |parser| parser.next(Precedence::Or, false))?;
        self.scanner.skip_whitespace();

        match inner {
            Some(inner) if self.scanner.peek_operator() == Some(Operator::RightParen) => {
                self.scanner.consume_operator(Operator::RightParen);
                *left = Some(Node::group(inner));
                Ok(true)
            }
            _ => Err(self
                .scanner
                .unexpected(self.scanner.rest_from(start), start)),
        }
    }
}
