//! Types for the batch module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::config::ConfigError;

/// How the runner interprets its input paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Walk each input as a directory tree.
    #[default]
    Directories,
    /// Treat each input as a single file; outputs land flat in the output root.
    Files,
}

/// Fatal errors raised before any file is converted.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("No input paths given")]
    NoInputs,

    #[error("Input not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create output root {path}: {source}")]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input discovery task failed: {0}")]
    Discovery(#[from] tokio::task::JoinError),
}

/// Stops a run between files.
///
/// Conversions already in flight finish; everything after them is counted
/// as skipped.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the runner can be reused.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}
