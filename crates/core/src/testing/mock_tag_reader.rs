//! Mock tag reader for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::metadata::{TagMap, TagReader};

/// Tag reader returning pre-configured tags.
///
/// Tags are matched by path suffix, so tests can key them by file name.
/// Unknown files have no tags.
#[derive(Debug, Default)]
pub struct MockTagReader {
    tags: Arc<RwLock<Vec<(PathBuf, TagMap)>>>,
    reads: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockTagReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tags returned for every path ending with `suffix`.
    pub async fn set_tags(&self, suffix: impl Into<PathBuf>, tags: &[(&str, &str)]) {
        let map = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.tags.write().await.push((suffix.into(), map));
    }

    /// Paths that were read, in order.
    pub async fn reads(&self) -> Vec<PathBuf> {
        self.reads.read().await.clone()
    }
}

#[async_trait]
impl TagReader for MockTagReader {
    async fn read_tags(&self, path: &Path) -> TagMap {
        self.reads.write().await.push(path.to_path_buf());
        self.tags
            .read()
            .await
            .iter()
            .rev()
            .find(|(suffix, _)| path.ends_with(suffix))
            .map(|(_, tags)| tags.clone())
            .unwrap_or_default()
    }
}
