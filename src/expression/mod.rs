//! Expression engine for `${{ ... }}` template spans
//!
//! Supports a deliberately small grammar:
//! - Identifiers (`foo`, `foo-bar`, `1337foo`) resolved against a JSON context
//! - Dotted member access (`secrets.API_KEY`)
//! - Single-quoted string literals with `''` escaping (`'it''s'`)
//! - Logical operators `||` and `&&` with loose truthiness
//! - Parentheses for grouping
//!
//! An [`Expression`] is parsed once and can be evaluated any number of times
//! against different contexts; it is immutable and `Send + Sync`.

pub mod ast;
pub mod errors;
pub mod evaluator;
pub mod parser;
pub mod tokenizer;
pub mod variables;

use serde_json::Value;
use tracing::trace;

pub use ast::Node;
pub use errors::{EvalError, ExpressionError, ParseError};
pub use evaluator::{EvalResult, EvalValue};

/// A parsed expression and the source text it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    root: Node,
    source: String,
}

impl Expression {
    /// Parse a standalone expression
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        ExpressionParser::new().parse(source)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The text the expression was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate and keep the resolved value and path, without the final checks
    pub fn resolve<'a>(&'a self, context: &'a Value) -> Result<EvalResult<'a>, EvalError> {
        evaluator::evaluate(&self.root, EvalValue::Json(context), &[])
    }

    /// Evaluate to the string form of a primitive value
    ///
    /// Fails with [`EvalError::NotResolved`] when the result is `null` or
    /// absent, and [`EvalError::NotSerializable`] when it is an object or array.
    pub fn eval(&self, context: &Value) -> Result<String, EvalError> {
        let result = self.resolve(context)?;
        trace!(expression = %self.source, path = ?result.path, "Resolved expression");

        if result.value.is_nullish() {
            return Err(EvalError::NotResolved {
                expression: self.source.clone(),
            });
        }

        result
            .value
            .to_primitive_string()
            .ok_or_else(|| EvalError::NotSerializable {
                expression: self.source.clone(),
            })
    }

    /// Unique variable names read under `prefix`, in first-seen order
    pub fn variables<S: AsRef<str>>(&self, prefix: &[S]) -> Vec<String> {
        dedup(variables::collect_variables(&self.root, prefix))
    }
}

pub(crate) fn dedup(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Expression parser
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionParser;

impl ExpressionParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, source: &str) -> Result<Expression, ParseError> {
        self.parse_span(source, 0, source.len())
    }

    /// Parse `source[start..end]`, reporting positions relative to `source`
    pub fn parse_span(
        &self,
        source: &str,
        start: usize,
        end: usize,
    ) -> Result<Expression, ParseError> {
        let span = source
            .get(start..end)
            .ok_or(ParseError::InvalidSpan { start, end })?;

        let root = parser::parse_node(span, start)?;
        Ok(Expression {
            root,
            source: span.to_string(),
        })
    }
}
