//! Input file loading
//!
//! Manifests and contexts are read as YAML, which also accepts JSON, into a
//! `serde_json::Value` so the library sees one document model.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::config::ResolverConfig;
use crate::error::Error;

/// Read a YAML or JSON document
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = parse_document(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), "Loaded document");
    Ok(document)
}

/// Read the evaluation context; no file means an empty context
pub fn load_context(path: Option<&Path>) -> Result<Value> {
    match path {
        Some(path) => load_document(path),
        None => Ok(Value::Object(Default::default())),
    }
}

/// Read the resolver config; no file means defaults
pub fn load_config(path: Option<&Path>) -> Result<ResolverConfig> {
    match path {
        Some(path) => ResolverConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ResolverConfig::default()),
    }
}

/// Parse YAML/JSON text; an empty document is an empty object
pub fn parse_document(content: &str) -> Result<Value> {
    if content.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let document: Value = serde_yaml::from_str(content).map_err(Error::from)?;
    Ok(document)
}

/// Split a dotted prefix into path segments
pub fn split_prefix(prefix: Option<&str>) -> Vec<String> {
    prefix
        .map(|p| p.split('.').filter(|s| !s.is_empty()).map(String::from).collect())
        .unwrap_or_default()
}
