//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::ConfigError;

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// RIFF WAVE
    Wav,
    /// Audio Interchange File Format
    Aiff,
}

impl OutputFormat {
    /// All supported containers.
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Wav, OutputFormat::Aiff];

    /// Returns the file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Aiff => "aiff",
        }
    }

    /// Whether ffmpeg can embed an attached picture in this container.
    pub fn supports_cover_art(&self) -> bool {
        matches!(self, Self::Aiff)
    }

    /// Whether the muxer can write an ID3v2 tag chunk.
    pub fn supports_id3v2(&self) -> bool {
        matches!(self, Self::Aiff)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wav" => Ok(Self::Wav),
            "aiff" => Ok(Self::Aiff),
            other => Err(ConfigError::ValidationError(format!(
                "unsupported output format '{}' (expected wav or aiff)",
                other
            ))),
        }
    }
}

/// Named quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputQuality {
    /// 16-bit, 44.1 kHz
    Normal,
    /// 24-bit, 48 kHz
    High,
    /// Pass the source stream through untouched
    Copy,
}

impl OutputQuality {
    /// All supported tiers.
    pub const ALL: [OutputQuality; 3] = [
        OutputQuality::Normal,
        OutputQuality::High,
        OutputQuality::Copy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
            Self::Copy => "copy",
        }
    }
}

impl fmt::Display for OutputQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputQuality {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "copy" => Ok(Self::Copy),
            other => Err(ConfigError::ValidationError(format!(
                "unsupported output quality '{}' (expected normal, high or copy)",
                other
            ))),
        }
    }
}

/// A single encoder parameter: either a concrete value or "keep the source's".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileValue<T> {
    /// Do not re-encode this attribute.
    Copy,
    /// Force this value.
    Set(T),
}

impl<T> ProfileValue<T> {
    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy)
    }

    /// Returns the forced value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Copy => None,
            Self::Set(v) => Some(v),
        }
    }
}

/// Resolved encoder parameters for one (container, tier) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderProfile {
    pub format: OutputFormat,
    pub quality: OutputQuality,
    /// ffmpeg audio codec name.
    pub codec: ProfileValue<String>,
    /// Sample rate in Hz.
    pub sample_rate_hz: ProfileValue<u32>,
    /// Bit rate in kbps. Absent for PCM codecs.
    pub bitrate_kbps: Option<ProfileValue<u32>>,
    /// Additional output arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// A conversion job for a single source file.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Source file path.
    pub source_path: PathBuf,
    /// Directory the output lands in.
    pub dest_dir: PathBuf,
    /// Output filename without extension, already sanitized.
    pub file_stem: String,
    /// Output extension without the leading dot.
    pub extension: String,
    /// Encoder parameters.
    pub profile: EncoderProfile,
    /// Cover art to embed.
    pub cover_art_path: Option<PathBuf>,
}

impl ConversionJob {
    /// Absolute destination path `dest_dir/file_stem.extension`.
    pub fn output_path(&self) -> PathBuf {
        self.dest_dir
            .join(format!("{}.{}", self.file_stem, self.extension))
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Source file path.
    pub source_path: PathBuf,
    /// Output file path.
    pub output_path: PathBuf,
    /// Output file size in bytes.
    pub output_size_bytes: u64,
    /// Conversion duration in milliseconds.
    pub duration_ms: u64,
}
