//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the converter and tag reader
//! traits, so batch runs can be tested without ffmpeg installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use audiobatch_core::testing::{MockConverter, MockTagReader};
//!
//! let converter = Arc::new(MockConverter::new());
//! let tags = Arc::new(MockTagReader::new());
//!
//! // Configure mock responses
//! tags.set_tags("01.flac", &[("artist", "A"), ("title", "B")]).await;
//! converter.fail_on("02.flac").await;
//!
//! let runner = BatchRunner::new(converter.clone(), tags.clone());
//! ```

mod mock_converter;
mod mock_tag_reader;

pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_tag_reader::MockTagReader;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    /// Create an (empty) file at `root/relative`, with parent directories.
    pub fn touch(root: &Path, relative: &str) -> std::io::Result<()> {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, b"fake audio")
    }

    /// Create every file in `relatives` under `root`.
    pub fn tree(root: &Path, relatives: &[&str]) -> std::io::Result<()> {
        for relative in relatives {
            touch(root, relative)?;
        }
        Ok(())
    }
}
