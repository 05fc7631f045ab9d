//! FFmpeg-based converter implementation.

use async_trait::async_trait;
use std::ffi::OsString;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionResult};

fn push_all(args: &mut Vec<OsString>, values: &[&str]) {
    args.extend(values.iter().map(OsString::from));
}

/// FFmpeg-based converter implementation.
pub struct FfmpegConverter {
    config: ConverterConfig,
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    /// Builds the ffmpeg argument list for one job.
    ///
    /// Paths are passed through as `OsString` so names that are not valid
    /// UTF-8 reach ffmpeg untouched.
    fn build_args(&self, job: &ConversionJob) -> Vec<OsString> {
        let profile = &job.profile;
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-y", "-loglevel"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(self.config.ffmpeg_log_level.clone().into());
        args.push("-i".into());
        args.push(job.source_path.clone().into());

        // Cover art only where the muxer can carry an attached picture
        let cover_art = job
            .cover_art_path
            .as_deref()
            .filter(|_| profile.format.supports_cover_art());

        if let Some(cover_path) = cover_art {
            args.push("-i".into());
            args.push(cover_path.into());
            push_all(
                &mut args,
                &["-map", "0:a", "-map", "1:v", "-c:v", "copy", "-disposition:v:0", "attached_pic"],
            );
        } else {
            push_all(&mut args, &["-map", "0:a"]);
        }

        // Carry every source tag over
        push_all(&mut args, &["-map_metadata", "0"]);

        // `copy` leaves the attribute to ffmpeg, which picks the container's
        // default PCM codec and keeps the source rate
        if let Some(codec) = profile.codec.value() {
            args.push("-c:a".into());
            args.push(codec.into());
        }

        if let Some(rate) = profile.sample_rate_hz.value() {
            args.push("-ar".into());
            args.push(rate.to_string().into());
        }

        if let Some(bitrate) = profile.bitrate_kbps.as_ref().and_then(|b| b.value()) {
            args.push("-b:a".into());
            args.push(format!("{}k", bitrate).into());
        }

        args.extend(profile.extra_args.iter().map(OsString::from));

        // Only the AIFF muxer has an ID3v2 chunk; WAV keeps its INFO tags
        if self.config.write_id3v2 && profile.format.supports_id3v2() {
            push_all(&mut args, &["-write_id3v2", "1", "-id3v2_version", "4"]);
        }

        args.extend(self.config.extra_ffmpeg_args.iter().map(OsString::from));

        args.push(job.output_path().into());

        args
    }

    /// Runs one conversion, bounded by the configured timeout.
    async fn run_conversion(&self, job: &ConversionJob) -> Result<ConversionResult, ConverterError> {
        let start = Instant::now();
        let output_path = job.output_path();

        if tokio::fs::metadata(&job.source_path).await.is_err() {
            return Err(ConverterError::InputNotFound {
                path: job.source_path.clone(),
            });
        }

        tokio::fs::create_dir_all(&job.dest_dir)
            .await
            .map_err(|_| ConverterError::OutputDirectoryFailed {
                path: job.dest_dir.clone(),
            })?;

        let args = self.build_args(job);
        debug!(
            source = %job.source_path.display(),
            output = %output_path.display(),
            "Running ffmpeg {}",
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    ConverterError::Io(e)
                }
            })?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("ffmpeg stderr was not captured"))?;

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            // Drain as bytes; a non-UTF-8 line must not stop the read and fill the pipe
            let mut raw = Vec::new();
            stderr.read_to_end(&mut raw).await?;
            let error_output = String::from_utf8_lossy(&raw).into_owned();

            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        })
        .await;

        match result {
            Ok(Ok((status, error_output))) => {
                if !status.success() {
                    return Err(ConverterError::conversion_failed(
                        &job.source_path,
                        format!("FFmpeg exited with code: {:?}", status.code()),
                        if error_output.is_empty() {
                            None
                        } else {
                            Some(error_output)
                        },
                    ));
                }
                if !error_output.trim().is_empty() {
                    warn!(
                        source = %job.source_path.display(),
                        "FFmpeg reported errors but exited successfully: {}",
                        error_output.trim()
                    );
                }
            }
            Ok(Err(e)) => return Err(ConverterError::Io(e)),
            Err(_) => {
                // Kill the process on timeout
                let _ = child.kill().await;
                return Err(ConverterError::timeout(
                    &job.source_path,
                    self.config.timeout_secs,
                ));
            }
        }

        // Some encoders exit zero without writing anything
        let output_meta = tokio::fs::metadata(&output_path).await.map_err(|_| {
            ConverterError::OutputMissing {
                path: job.source_path.clone(),
                output: output_path.clone(),
            }
        })?;

        Ok(ConversionResult {
            source_path: job.source_path.clone(),
            output_path,
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        self.run_conversion(&job).await
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    ConverterError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(ConverterError::conversion_failed(
                &self.config.ffmpeg_path,
                "ffmpeg -version failed",
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            ));
        }

        Ok(())
    }
}
