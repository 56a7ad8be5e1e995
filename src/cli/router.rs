//! Command routing and execution
//!
//! This module handles routing CLI commands to their respective implementations.

use crate::cli::args::Commands;
use crate::cli::commands::*;
use anyhow::Result;

/// Execute a CLI command based on the parsed arguments
pub fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Render {
            template,
            context,
            lossy,
        } => run_render_command(&template, context.as_deref(), lossy),
        Commands::Vars { template, prefix } => run_vars_command(&template, prefix.as_deref()),
        Commands::Resolve {
            manifest,
            context,
            config,
            preserve,
        } => run_resolve_command(ResolveParams {
            manifest,
            context,
            config,
            preserve,
        }),
        Commands::Secrets {
            manifest,
            prefix,
            config,
        } => run_secrets_command(&manifest, &prefix, config.as_deref()),
    }
}
