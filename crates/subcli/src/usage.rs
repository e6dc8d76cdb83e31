//! Usage topic lookup.
//!
//! The registry asks a [`Renderer`] for the bytes of a help topic and writes
//! them out unchanged. How the text is produced (templates, markdown, plain
//! files) is up to the renderer.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

const INDEX_PAGE: &str = "README.md";

/// Produces usage text for a topic.
///
/// Return [`Error::UsageNotFound`] for unknown topics; the registry turns it
/// into an "Unknown help topic" message. Any other error is propagated.
pub trait Renderer {
    fn render(&self, topic: &str) -> Result<Vec<u8>>;
}

/// Topics held in memory.
#[derive(Debug, Clone, Default)]
pub struct TopicMap {
    topics: HashMap<String, Vec<u8>>,
}

impl TopicMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic(mut self, name: impl Into<String>, text: impl Into<Vec<u8>>) -> Self {
        self.topics.insert(name.into(), text.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for TopicMap
where
    K: Into<String>,
    V: Into<Vec<u8>>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            topics: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Renderer for TopicMap {
    fn render(&self, topic: &str) -> Result<Vec<u8>> {
        self.topics
            .get(topic)
            .cloned()
            .ok_or_else(|| Error::UsageNotFound(topic.to_string()))
    }
}

/// Topics stored as files under a directory.
///
/// - `""` reads `README.md`
/// - a topic naming a directory reads `<topic>/README.md`
/// - anything else reads `<topic>.md`
#[derive(Debug, Clone)]
pub struct UsageDir {
    root: PathBuf,
}

impl UsageDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, topic: &str) -> Option<PathBuf> {
        let rel = Path::new(topic);
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        let base = self.root.join(rel);
        if topic.is_empty() || base.is_dir() {
            return Some(base.join(INDEX_PAGE));
        }
        let mut file = base.into_os_string();
        file.push(".md");
        Some(PathBuf::from(file))
    }
}

impl Renderer for UsageDir {
    fn render(&self, topic: &str) -> Result<Vec<u8>> {
        let Some(path) = self.resolve(topic) else {
            return Err(Error::UsageNotFound(topic.to_string()));
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(Error::UsageNotFound(topic.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
