//! CLI argument structures
//!
//! This module defines the command-line interface of manifest-expr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Evaluate `${{ ... }}` expressions in templates and deployment manifests
#[derive(Parser)]
#[command(name = "manifest-expr")]
#[command(about = "manifest-expr - Evaluate ${{ }} expressions in templates and manifests", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Substitute the expressions of a template string
    #[command(name = "render")]
    Render {
        /// Template text, e.g. "postgres://${{ secrets.DB_USER }}@host"
        template: String,

        /// YAML or JSON file providing the evaluation context
        #[arg(short = 'c', long, value_name = "FILE")]
        context: Option<PathBuf>,

        /// Keep failing spans as written instead of failing
        #[arg(long)]
        lossy: bool,
    },

    /// List the variables a template reads
    #[command(name = "vars")]
    Vars {
        /// Template text
        template: String,

        /// Only report names read under this dotted prefix, e.g. "secrets"
        #[arg(short = 'p', long, value_name = "PREFIX")]
        prefix: Option<String>,
    },

    /// Resolve the env sections of a manifest and print it as YAML
    #[command(name = "resolve")]
    Resolve {
        /// Manifest file (YAML or JSON)
        manifest: PathBuf,

        /// YAML or JSON file providing the evaluation context
        #[arg(short = 'c', long, value_name = "FILE")]
        context: Option<PathBuf>,

        /// Resolver configuration (TOML)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Keep the raw text of values that fail to resolve
        #[arg(long)]
        preserve: bool,
    },

    /// List the secrets referenced by a manifest's env sections
    #[command(name = "secrets")]
    Secrets {
        /// Manifest file (YAML or JSON)
        manifest: PathBuf,

        /// Dotted prefix the variables are read under
        #[arg(short = 'p', long, default_value = "secrets")]
        prefix: String,

        /// Resolver configuration (TOML)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}
