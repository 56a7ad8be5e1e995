//! Tree-walking evaluator for template expressions
//!
//! Evaluation is a pure function of `(node, context)`: nothing is cached or
//! mutated, and every call allocates its own [`EvalResult`]. Values are
//! borrowed from either the context or the AST, so no JSON is cloned while
//! walking.

use serde_json::Value;

use super::ast::Node;
use super::errors::EvalError;

/// A value produced during evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvalValue<'a> {
    /// The key was absent at a non-root position
    Undefined,
    /// A value found in the context
    Json(&'a Value),
    /// A string literal from the expression itself
    Literal(&'a str),
}

impl<'a> EvalValue<'a> {
    /// `undefined` or `null`
    pub fn is_nullish(&self) -> bool {
        matches!(self, EvalValue::Undefined | EvalValue::Json(Value::Null))
    }

    /// Loose truthiness: `undefined`, `null`, `''`, `0` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            EvalValue::Undefined => false,
            EvalValue::Literal(s) => !s.is_empty(),
            EvalValue::Json(value) => match value {
                Value::Null => false,
                Value::Bool(b) => *b,
                Value::String(s) => !s.is_empty(),
                Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
                Value::Array(_) | Value::Object(_) => true,
            },
        }
    }

    /// Own property lookup; only objects have own properties
    fn own_property(&self, name: &str) -> Option<&'a Value> {
        match self {
            EvalValue::Json(Value::Object(map)) => map.get(name),
            _ => None,
        }
    }

    /// Serialize a primitive the way the host prints it; `None` for objects and arrays
    pub fn to_primitive_string(&self) -> Option<String> {
        match self {
            EvalValue::Literal(s) => Some((*s).to_string()),
            EvalValue::Json(Value::String(s)) => Some(s.clone()),
            EvalValue::Json(Value::Bool(b)) => Some(b.to_string()),
            EvalValue::Json(Value::Number(n)) => Some(number_to_string(n)),
            _ => None,
        }
    }
}

fn number_to_string(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.abs() >= 1e21 || f.abs() < 1e-6 => exponent_string(f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Shortest round-trip digits in `1.5e+21` / `1.5e-7` form
fn exponent_string(f: f64) -> String {
    let formatted = format!("{:e}", f);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

/// A value and the dotted path that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct EvalResult<'a> {
    pub value: EvalValue<'a>,
    pub path: Vec<String>,
}

/// Evaluate `node` against `context`, with `path` naming where `context` came from
pub fn evaluate<'a>(
    node: &'a Node,
    context: EvalValue<'a>,
    path: &[String],
) -> Result<EvalResult<'a>, EvalError> {
    match node {
        Node::Identifier(name) => evaluate_identifier(name, context, path),
        Node::StringLiteral(value) => Ok(EvalResult {
            value: EvalValue::Literal(value),
            path: Vec::new(),
        }),
        Node::MemberAccess(left, right) => {
            let base = evaluate(left, context, path)?;
            evaluate(right, base.value, &base.path)
        }
        Node::Or(left, right) => {
            let left = evaluate(left, context, path)?;
            if left.value.is_truthy() {
                Ok(left)
            } else {
                evaluate(right, context, path)
            }
        }
        Node::And(left, right) => {
            let left = evaluate(left, context, path)?;
            if left.value.is_truthy() {
                evaluate(right, context, path)
            } else {
                Ok(left)
            }
        }
        Node::Parentheses(inner) => evaluate(inner, context, path),
    }
}

fn evaluate_identifier<'a>(
    name: &str,
    context: EvalValue<'a>,
    path: &[String],
) -> Result<EvalResult<'a>, EvalError> {
    if context.is_nullish() {
        return Err(EvalError::undefined_child(path, name));
    }

    let mut child_path = path.to_vec();
    child_path.push(name.to_string());

    match context.own_property(name) {
        Some(value) => Ok(EvalResult {
            value: EvalValue::Json(value),
            path: child_path,
        }),
        None if path.is_empty() => Err(EvalError::undefined(name)),
        None => Ok(EvalResult {
            value: EvalValue::Undefined,
            path: child_path,
        }),
    }
}
