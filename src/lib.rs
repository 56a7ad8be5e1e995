//! # manifest-expr
//!
//! Evaluation of `${{ ... }}` expressions embedded in strings, as used in the
//! env sections of deployment manifests.
//!
//! ## Usage
//!
//! ```
//! use manifest_expr::template::substitute;
//! use serde_json::json;
//!
//! let context = json!({"secrets": {"DB_PASS": "hunter2"}});
//! let url = substitute("postgres://app:${{ secrets.DB_PASS }}@db", &context).unwrap();
//! assert_eq!(url, "postgres://app:hunter2@db");
//! ```
//!
//! ## Modules
//!
//! - `expression` - Lexer, parser, evaluator and variable extraction for a single expression
//! - `template` - Splitting text into literal and expression segments, substitution
//! - `manifest` - Resolution of manifest env sections against a context
//! - `config` - Resolver configuration loaded from TOML
//! - `cli` - Command line front-end
//! - `app` - Logging and error reporting for the binary
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod expression;
pub mod manifest;
pub mod template;

pub use error::{Error, Result};
pub use expression::{EvalError, Expression, ExpressionError, ParseError};
pub use manifest::{EnvResolver, ManifestError};
pub use template::{substitute, Template, TemplateError};
