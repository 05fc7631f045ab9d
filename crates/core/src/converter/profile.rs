//! Encoder profile table.
//!
//! Every `(OutputFormat, OutputQuality)` pair maps to exactly one profile.
//! The match is exhaustive, so adding a container or tier without a
//! profile is a compile error rather than a runtime lookup miss.

use super::types::{EncoderProfile, OutputFormat, OutputQuality, ProfileValue};
use crate::config::ConfigError;

/// Resolves the encoder parameters for a container and quality tier.
pub fn resolve_profile(format: OutputFormat, quality: OutputQuality) -> EncoderProfile {
    match (format, quality) {
        (OutputFormat::Wav, OutputQuality::Normal) => {
            pcm(format, quality, "pcm_s16le", 44_100, &[])
        }
        // 24-bit/48k files cross the 4 GiB RIFF limit much sooner
        (OutputFormat::Wav, OutputQuality::High) => {
            pcm(format, quality, "pcm_s24le", 48_000, &["-rf64", "auto"])
        }
        (OutputFormat::Aiff, OutputQuality::Normal) => {
            pcm(format, quality, "pcm_s16be", 44_100, &[])
        }
        (OutputFormat::Aiff, OutputQuality::High) => {
            pcm(format, quality, "pcm_s24be", 48_000, &[])
        }
        (_, OutputQuality::Copy) => EncoderProfile {
            format,
            quality,
            codec: ProfileValue::Copy,
            sample_rate_hz: ProfileValue::Copy,
            bitrate_kbps: Some(ProfileValue::Copy),
            extra_args: Vec::new(),
        },
    }
}

fn pcm(
    format: OutputFormat,
    quality: OutputQuality,
    codec: &str,
    sample_rate_hz: u32,
    extra_args: &[&str],
) -> EncoderProfile {
    EncoderProfile {
        format,
        quality,
        codec: ProfileValue::Set(codec.to_string()),
        sample_rate_hz: ProfileValue::Set(sample_rate_hz),
        // PCM has no bit rate knob
        bitrate_kbps: None,
        extra_args: extra_args.iter().map(|a| a.to_string()).collect(),
    }
}

/// Resolves a profile from string keys, as they appear in user input.
///
/// Fails with [`ConfigError::ValidationError`] for any pair outside the table.
pub fn resolve_profile_named(format: &str, quality: &str) -> Result<EncoderProfile, ConfigError> {
    let format: OutputFormat = format.parse()?;
    let quality: OutputQuality = quality.parse()?;
    Ok(resolve_profile(format, quality))
}
