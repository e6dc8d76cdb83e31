//! Environment sources for flag fallbacks.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// Read-only view of environment variables.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The variables of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for Vec<(String, String)> {
    fn var(&self, key: &str) -> Option<String> {
        self.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

/// Process environment backed by a `.env` file.
///
/// Variables already set in the process win over the file, the same way
/// `dotenvy` never overrides an existing variable.
#[derive(Debug, Clone, Default)]
pub struct DotenvEnv {
    vars: HashMap<String, String>,
}

impl DotenvEnv {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) =
                item.with_context(|| format!("failed to parse {}", path.display()))?;
            vars.insert(key, value);
        }
        tracing::debug!(path = %path.display(), count = vars.len(), "loaded env file");
        Ok(Self { vars })
    }

    /// Value from the file only, ignoring the process.
    pub fn file_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

impl EnvSource for DotenvEnv {
    fn var(&self, key: &str) -> Option<String> {
        ProcessEnv.var(key).or_else(|| self.vars.get(key).cloned())
    }
}
