//! Tag extraction from source files.
//!
//! Reading tags never fails the run: anything that goes wrong yields an
//! empty [`TagMap`] and the filename falls back to the source stem.

mod ffprobe;

pub use ffprobe::FfprobeTagReader;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;

/// Lowercased tag key to trimmed, non-empty value.
pub type TagMap = BTreeMap<String, String>;

/// Reads the embedded tags of an audio file.
#[async_trait]
pub trait TagReader: Send + Sync {
    /// Tags of `path`; empty when the file has none or cannot be read.
    async fn read_tags(&self, path: &Path) -> TagMap;
}
