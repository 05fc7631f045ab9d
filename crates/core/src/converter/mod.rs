//! Converter module for transcoding audio files.
//!
//! This module provides the `Converter` trait, the FFmpeg implementation and
//! the static encoder profile table.
//!
//! # Features
//!
//! - WAV and AIFF output at `normal`, `high` or `copy` quality
//! - Source metadata carried over, with an ID3v2 chunk
//! - Cover art embedding for AIFF output
//! - Bounded wall-clock time per conversion
//! - Output verification after the encoder exits
//!
//! # Example
//!
//! ```ignore
//! use audiobatch_core::converter::{
//!     resolve_profile, ConversionJob, Converter, FfmpegConverter, OutputFormat, OutputQuality,
//! };
//!
//! let converter = FfmpegConverter::with_defaults();
//!
//! // Validate ffmpeg is available
//! converter.validate().await?;
//!
//! let job = ConversionJob {
//!     source_path: PathBuf::from("/music/album/01 - intro.flac"),
//!     dest_dir: PathBuf::from("/music/album_converted-1700000000"),
//!     file_stem: "Artist - Intro".to_string(),
//!     extension: OutputFormat::Wav.extension().to_string(),
//!     profile: resolve_profile(OutputFormat::Wav, OutputQuality::High),
//!     cover_art_path: None,
//! };
//!
//! let result = converter.convert(job).await?;
//! println!("Converted in {} ms", result.duration_ms);
//! ```

mod config;
mod error;
mod ffmpeg;
mod profile;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use profile::{resolve_profile, resolve_profile_named};
pub use traits::Converter;
pub use types::{
    ConversionJob, ConversionResult, EncoderProfile, OutputFormat, OutputQuality, ProfileValue,
};
