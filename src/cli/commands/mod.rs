//! Command implementation modules
//!
//! Each command is implemented in the module for the input it works on.

pub mod manifest;
pub mod template;

// Re-export command execution functions
pub use manifest::{run_resolve_command, run_secrets_command, ResolveParams};
pub use template::{run_render_command, run_vars_command};
