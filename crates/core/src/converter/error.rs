//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting a single file.
///
/// Every per-file variant carries the source path so callers can report
/// the failure without keeping the job around.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed { path: PathBuf },

    /// Conversion process failed.
    #[error("Conversion of {path} failed: {reason}")]
    ConversionFailed {
        path: PathBuf,
        reason: String,
        stderr: Option<String>,
    },

    /// Conversion timed out.
    #[error("Conversion of {path} timed out after {timeout_secs} seconds")]
    Timeout { path: PathBuf, timeout_secs: u64 },

    /// The encoder finished but the destination file does not exist.
    #[error("Conversion of {path} produced no output at {output}")]
    OutputMissing { path: PathBuf, output: PathBuf },

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a new conversion failed error with stderr output.
    pub fn conversion_failed(
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
        stderr: Option<String>,
    ) -> Self {
        Self::ConversionFailed {
            path: path.into(),
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(path: impl Into<PathBuf>, timeout_secs: u64) -> Self {
        Self::Timeout {
            path: path.into(),
            timeout_secs,
        }
    }

    /// Human-readable cause, including the encoder's stderr when captured.
    pub fn detail(&self) -> String {
        match self {
            Self::ConversionFailed {
                stderr: Some(stderr),
                ..
            } if !stderr.trim().is_empty() => format!("{} ({})", self, stderr.trim()),
            _ => self.to_string(),
        }
    }
}
