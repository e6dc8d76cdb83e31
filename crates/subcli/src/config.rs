use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Registry settings that can live in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Unknown flags are errors. When false they are skipped.
    pub strict: bool,

    /// Prefix for derived environment keys (`<PREFIX>_<FLAG>`). Empty means
    /// only flags with an explicit key read the environment.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub env_prefix: String,

    /// Namespace for usage topics: command `foo` renders topic `<scope>/foo`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scope: String,

    /// Enables the built-in `version` command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: true,
            env_prefix: String::new(),
            scope: String::new(),
            version: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse config")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict() {
        let config = Config::default();
        assert!(config.strict);
        assert!(config.version.is_none());
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = Config::from_json(r#"{ "envPrefix": "app", "version": "1.2.3" }"#).unwrap();
        assert!(config.strict);
        assert_eq!(config.env_prefix, "app");
        assert_eq!(config.scope, "");
        assert_eq!(config.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn lenient_and_scope() {
        let config = Config::from_json(r#"{ "strict": false, "scope": "cli" }"#).unwrap();
        assert!(!config.strict);
        assert_eq!(config.scope, "cli");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Config::from_json("{ strict: ").is_err());
    }

    #[test]
    fn serializes_only_non_empty_fields() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert_eq!(json, r#"{"strict":true}"#);
    }
}
