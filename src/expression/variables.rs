//! Static variable discovery over the AST
//!
//! Walks an expression without any context to answer "which names does this
//! read?". With an empty prefix the root names are reported; with a prefix
//! such as `["secrets"]` only the names read directly under `secrets.` are.

use super::ast::Node;

/// Names referenced by `node` under `prefix`, in source order, possibly repeated
pub fn collect_variables<S: AsRef<str>>(node: &Node, prefix: &[S]) -> Vec<String> {
    let mut out = Vec::new();
    collect(node, prefix, &mut out);
    out
}

fn collect<S: AsRef<str>>(node: &Node, prefix: &[S], out: &mut Vec<String>) {
    match node {
        Node::Or(left, right) | Node::And(left, right) => {
            collect(left, prefix, out);
            collect(right, prefix, out);
        }
        Node::Identifier(name) => {
            if prefix.is_empty() {
                out.push(name.clone());
            }
        }
        Node::MemberAccess(left, right) => {
            let roots = collect_variables(left, &prefix[..0]);
            match prefix.split_first() {
                None => out.extend(roots),
                Some((head, rest)) => {
                    if roots.iter().any(|root| root == head.as_ref()) {
                        collect(right, rest, out);
                    }
                }
            }
        }
        Node::StringLiteral(_) => {}
        Node::Parentheses(inner) => collect(inner, prefix, out),
    }
}
