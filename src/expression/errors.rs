//! Error types for expression parsing and evaluation
//!
//! Two disjoint families: [`ParseError`] is raised while building the AST,
//! [`EvalError`] while walking it against a context. Both are local to a
//! single expression span.

use thiserror::Error;

/// Syntax-level failure, always carrying an absolute byte offset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unexpected token '{token}' [{position}]")]
    UnexpectedToken { token: String, position: usize },

    #[error("Expression expected [{position}]")]
    ExpressionExpected { position: usize },

    #[error("Span {start}..{end} does not lie on character boundaries of the input [{start}]")]
    InvalidSpan { start: usize, end: usize },
}

impl ParseError {
    pub fn unexpected_token(token: impl Into<String>, position: usize) -> Self {
        Self::UnexpectedToken {
            token: token.into(),
            position,
        }
    }

    /// Absolute offset of the failure in the outer string
    pub fn position(&self) -> usize {
        match self {
            Self::UnexpectedToken { position, .. } | Self::ExpressionExpected { position } => {
                *position
            }
            Self::InvalidSpan { start, .. } => *start,
        }
    }
}

/// Semantic failure raised while evaluating against a context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("\"{}\" is not defined{}", .path.join("."), reading(.child))]
    UndefinedVariable {
        path: Vec<String>,
        child: Option<String>,
    },

    #[error("\"{expression}\" was not resolved to any value")]
    NotResolved { expression: String },

    #[error("\"{expression}\" is not serializable")]
    NotSerializable { expression: String },
}

impl EvalError {
    /// A root identifier missing from the context
    pub fn undefined(name: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            path: vec![name.into()],
            child: None,
        }
    }

    /// A child read from a parent path that resolved to null or nothing
    pub fn undefined_child(path: &[String], child: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            path: path.to_vec(),
            child: Some(child.into()),
        }
    }
}

fn reading(child: &Option<String>) -> String {
    child
        .as_ref()
        .map(|c| format!(" (reading '{}')", c))
        .unwrap_or_default()
}

/// Either family, for callers that parse and evaluate in one go
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl ExpressionError {
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}
