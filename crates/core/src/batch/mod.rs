//! Batch conversion of file trees.
//!
//! [`BatchRunner`] is the entry point: it walks the inputs, mirrors the
//! directory tree under a fresh output root, converts every file accepted
//! by the input filter and writes a `summary.txt` next to the outputs.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use audiobatch_core::batch::{BatchRunner, InputMode};
//! use audiobatch_core::converter::FfmpegConverter;
//! use audiobatch_core::metadata::FfprobeTagReader;
//!
//! let runner = BatchRunner::new(
//!     Arc::new(FfmpegConverter::new(config.encoder.clone())),
//!     Arc::new(FfprobeTagReader::from_config(&config.encoder)),
//! );
//!
//! let summary = runner
//!     .run(&[PathBuf::from("/music/album")], &config.conversion, InputMode::Directories)
//!     .await?;
//! println!("{} converted, {} errors", summary.converted, summary.errors);
//! ```

mod runner;
mod summary;
mod types;
pub mod walker;

pub use runner::BatchRunner;
pub use summary::{RunSummary, SUMMARY_FILE_NAME};
pub use types::{CancelHandle, InputMode, RunError};
pub use walker::{discover, DiscoveredFile, WalkEntry};
