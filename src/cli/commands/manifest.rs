//! Manifest commands
//!
//! `resolve` and `secrets` work on the env sections of a manifest file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::input::{load_config, load_context, load_document, split_prefix};
use crate::config::InvalidValuePolicy;
use crate::manifest::EnvResolver;

/// Parameters for the resolve command
#[derive(Debug, Clone)]
pub struct ResolveParams {
    pub manifest: PathBuf,
    pub context: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub preserve: bool,
}

/// Resolve the manifest's env sections and print the document as YAML
pub fn run_resolve_command(params: ResolveParams) -> Result<()> {
    let document = load_document(&params.manifest)?;
    let context = load_context(params.context.as_deref())?;
    let mut config = load_config(params.config.as_deref())?;
    if params.preserve {
        config = config.with_policy(InvalidValuePolicy::Preserve);
    }

    let resolver = EnvResolver::new(config);
    let resolved = resolver.resolve(&document, &context)?;
    info!(
        manifest = %params.manifest.display(),
        entries = resolver.entries(&document).len(),
        policy = ?resolver.config().on_invalid,
        "Resolved manifest env"
    );

    let yaml = serde_yaml::to_string(&resolved).context("Failed to serialize manifest")?;
    print!("{}", yaml);
    Ok(())
}

/// Print the variables referenced under `prefix` by the manifest's env values
pub fn run_secrets_command(manifest: &Path, prefix: &str, config: Option<&Path>) -> Result<()> {
    let document = load_document(manifest)?;
    let resolver = EnvResolver::new(load_config(config)?);
    let prefix = split_prefix(Some(prefix));

    for name in resolver.variables(&document, prefix.as_slice())? {
        println!("{}", name);
    }
    Ok(())
}
