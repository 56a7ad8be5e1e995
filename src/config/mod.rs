//! Resolver configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! env_paths = ["deploy.env", "deploy.processor.env"]
//! on_invalid = "preserve"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// Env sections of a deployment manifest, as dotted paths
pub const DEFAULT_ENV_PATHS: [&str; 5] = [
    "deploy.env",
    "deploy.init.env",
    "deploy.api.env",
    "deploy.addons.hasura.env",
    "deploy.processor.env",
];

/// What to do with an env value whose expressions fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidValuePolicy {
    /// Collect every failure and reject the document
    #[default]
    Fail,
    /// Keep the raw text of failing values and log each failure
    Preserve,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Dotted paths of the env maps to resolve; arrays along a path fan out
    pub env_paths: Vec<String>,
    pub on_invalid: InvalidValuePolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            env_paths: DEFAULT_ENV_PATHS.iter().map(|p| p.to_string()).collect(),
            on_invalid: InvalidValuePolicy::default(),
        }
    }
}

impl ResolverConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), env_paths = config.env_paths.len(), "Loaded resolver config");
        Ok(config)
    }

    pub fn with_policy(mut self, on_invalid: InvalidValuePolicy) -> Self {
        self.on_invalid = on_invalid;
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(path) = self
            .env_paths
            .iter()
            .find(|p| p.split('.').any(str::is_empty))
        {
            return Err(Error::Config(format!("Invalid env path '{}'", path)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.env_paths.len(), 5);
        assert_eq!(config.on_invalid, InvalidValuePolicy::Fail);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(
            ResolverConfig::from_toml_str("").unwrap(),
            ResolverConfig::default()
        );
    }

    #[test]
    fn test_parse_toml() {
        let config = ResolverConfig::from_toml_str(
            r#"
env_paths = ["deploy.env"]
on_invalid = "preserve"
"#,
        )
        .unwrap();
        assert_eq!(config.env_paths, vec!["deploy.env"]);
        assert_eq!(config.on_invalid, InvalidValuePolicy::Preserve);
    }

    #[test]
    fn test_reject_unknown_field() {
        assert!(ResolverConfig::from_toml_str("strict = true").is_err());
    }

    #[test]
    fn test_reject_empty_path_segment() {
        let err = ResolverConfig::from_toml_str(r#"env_paths = ["deploy..env"]"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid env path 'deploy..env'"
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolver.toml");
        std::fs::write(&path, "on_invalid = \"fail\"\n").unwrap();
        let config = ResolverConfig::load(&path).unwrap();
        assert_eq!(config.on_invalid, InvalidValuePolicy::Fail);
    }
}
