//! Template splitting and substitution
//!
//! A template is arbitrary text with zero or more `${{ ... }}` spans. Each
//! span body is parsed with its absolute offset so diagnostics point into the
//! outer string. Parsing a template never fails: malformed spans are kept
//! as [`Segment::Invalid`] so that every problem in a document can be reported
//! in one pass. An unterminated `${{` is plain text.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, trace};

use crate::expression::{dedup, Expression, ExpressionError, ExpressionParser, ParseError};

// `${{`, anything but `}`, `}}`
static EXPRESSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\{[^}]*\}\}").expect("Invalid regex pattern"));

const OPEN_LEN: usize = 3;
const CLOSE_LEN: usize = 2;

/// Template segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim
    Literal(String),
    /// A span that parsed successfully
    Expression {
        raw: String,
        offset: usize,
        expression: Expression,
    },
    /// A span whose body failed to parse
    Invalid {
        raw: String,
        offset: usize,
        error: ParseError,
    },
}

/// Failure of one expression span
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct SpanError {
    /// The full span text, delimiters included
    pub raw: String,
    /// Absolute offset of the span in the template
    pub offset: usize,
    pub error: ExpressionError,
}

/// Every span failure found in a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_errors(.errors))]
pub struct TemplateError {
    pub errors: Vec<SpanError>,
}

fn join_errors(errors: &[SpanError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A template split into literal and expression segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Split `source` into segments, parsing each span
    pub fn parse(source: &str) -> Self {
        let parser = ExpressionParser::new();
        let mut segments = Vec::new();
        let mut last_end = 0;

        for span in EXPRESSION_PATTERN.find_iter(source) {
            if span.start() > last_end {
                segments.push(Segment::Literal(
                    source[last_end..span.start()].to_string(),
                ));
            }

            let raw = span.as_str().to_string();
            let offset = span.start();
            match parser.parse_span(source, offset + OPEN_LEN, span.end() - CLOSE_LEN) {
                Ok(expression) => segments.push(Segment::Expression {
                    raw,
                    offset,
                    expression,
                }),
                Err(error) => {
                    debug!(span = %raw, %error, "Malformed expression span");
                    segments.push(Segment::Invalid { raw, offset, error });
                }
            }

            last_end = span.end();
        }

        if last_end < source.len() {
            segments.push(Segment::Literal(source[last_end..].to_string()));
        }

        trace!(segments = segments.len(), "Parsed template");
        Self {
            source: source.to_string(),
            segments,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether any span was found, valid or not
    pub fn has_expressions(&self) -> bool {
        self.segments
            .iter()
            .any(|s| !matches!(s, Segment::Literal(_)))
    }

    /// Successfully parsed expressions, in source order
    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Expression { expression, .. } => Some(expression),
            _ => None,
        })
    }

    /// Errors of all malformed spans
    pub fn parse_errors(&self) -> Vec<SpanError> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Invalid { raw, offset, error } => Some(SpanError {
                    raw: raw.clone(),
                    offset: *offset,
                    error: error.clone().into(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Render, substituting `fallback(error)` for every span that fails
    ///
    /// Returns the output together with all span errors, in source order.
    pub fn render_with<F>(&self, context: &Value, mut fallback: F) -> (String, Vec<SpanError>)
    where
        F: FnMut(&SpanError) -> String,
    {
        let mut output = String::with_capacity(self.source.len());
        let mut errors = Vec::new();

        for segment in &self.segments {
            let failure = match segment {
                Segment::Literal(text) => {
                    output.push_str(text);
                    continue;
                }
                Segment::Expression {
                    raw,
                    offset,
                    expression,
                } => match expression.eval(context) {
                    Ok(value) => {
                        output.push_str(&value);
                        continue;
                    }
                    Err(error) => SpanError {
                        raw: raw.clone(),
                        offset: *offset,
                        error: error.into(),
                    },
                },
                Segment::Invalid { raw, offset, error } => SpanError {
                    raw: raw.clone(),
                    offset: *offset,
                    error: error.clone().into(),
                },
            };

            output.push_str(&fallback(&failure));
            errors.push(failure);
        }

        (output, errors)
    }

    /// Render, failing with every span error if any span fails
    pub fn render(&self, context: &Value) -> Result<String, TemplateError> {
        let (output, errors) = self.render_lossy(context);
        if errors.is_empty() {
            Ok(output)
        } else {
            Err(TemplateError { errors })
        }
    }

    /// Render, keeping the raw text of failing spans
    pub fn render_lossy(&self, context: &Value) -> (String, Vec<SpanError>) {
        self.render_with(context, |failure| failure.raw.clone())
    }

    /// Unique variable names read under `prefix` across all spans
    pub fn variables<S: AsRef<str>>(&self, prefix: &[S]) -> Result<Vec<String>, TemplateError> {
        let errors = self.parse_errors();
        if !errors.is_empty() {
            return Err(TemplateError { errors });
        }

        Ok(dedup(
            self.expressions()
                .flat_map(|expression| expression.variables(prefix))
                .collect(),
        ))
    }
}

/// Parse and render `input` in one step
pub fn substitute(input: &str, context: &Value) -> Result<String, TemplateError> {
    Template::parse(input).render(context)
}
