//! Abstract Syntax Tree types for template expressions
//!
//! These types are data-only and separate from parsing and evaluation logic.
//! A tree is immutable once the parser hands it out.

/// Parsed expression node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    // Logical operators
    Or(Box<Node>, Box<Node>),
    And(Box<Node>, Box<Node>),

    // `left.right`; the value of `left` is the context `right` is resolved in
    MemberAccess(Box<Node>, Box<Node>),

    // Leaves
    Identifier(String),
    StringLiteral(String),

    // Grouping, transparent at evaluation time
    Parentheses(Box<Node>),
}

impl Node {
    pub fn or(left: Node, right: Node) -> Self {
        Node::Or(Box::new(left), Box::new(right))
    }

    pub fn and(left: Node, right: Node) -> Self {
        Node::And(Box::new(left), Box::new(right))
    }

    pub fn member(left: Node, right: Node) -> Self {
        Node::MemberAccess(Box::new(left), Box::new(right))
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Node::Identifier(name.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Node::StringLiteral(value.into())
    }

    pub fn group(inner: Node) -> Self {
        Node::Parentheses(Box::new(inner))
    }
}
