//! Command-line arguments and how they override the loaded configuration.

use clap::Parser;
use std::path::{Path, PathBuf};

use audiobatch_core::{Config, InputMode, OutputFormat, OutputQuality};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "audiobatch.toml";

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "AUDIOBATCH_CONFIG";

#[derive(Debug, Parser)]
#[command(name = "audiobatch")]
#[command(about = "Batch-convert FLAC/M4A files to WAV or AIFF with ffmpeg", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directories to convert (or files, with --files)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Treat inputs as individual files
    #[arg(long)]
    pub files: bool,

    /// Output format (wav, aiff)
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Output quality (normal, high, copy)
    #[arg(long)]
    pub quality: Option<OutputQuality>,

    /// Write every output flat into the output root
    #[arg(long)]
    pub no_mirror: bool,

    /// Delete each source after it converted successfully
    #[arg(long)]
    pub remove_source: bool,

    /// Keep source file names instead of building them from tags
    #[arg(long)]
    pub no_rename: bool,

    /// Separator between artist and title
    #[arg(long)]
    pub separator: Option<String>,

    /// Filename template, e.g. "$TRACK $ARTIST - $TITLE"
    #[arg(long)]
    pub template: Option<String>,

    /// Number of parallel conversions
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Per-file encoder timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Write Prometheus metrics to this file after the run
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn input_mode(&self) -> InputMode {
        if self.files {
            InputMode::Files
        } else {
            InputMode::Directories
        }
    }

    /// Config file to load: `--config`, then `$AUDIOBATCH_CONFIG`, then
    /// `audiobatch.toml` in `cwd` if it exists.
    pub fn config_path(&self, env_path: Option<PathBuf>, cwd: &Path) -> Option<PathBuf> {
        if let Some(path) = &self.config {
            return Some(path.clone());
        }
        if let Some(path) = env_path {
            return Some(path);
        }
        let default = cwd.join(DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        let settings = &mut config.conversion;

        if let Some(format) = self.format {
            settings.output_format = format;
        }
        if let Some(quality) = self.quality {
            settings.output_quality = quality;
        }
        if self.no_mirror {
            settings.mirror_structure = false;
        }
        if self.remove_source {
            settings.remove_source_after_conversion = true;
        }
        if self.no_rename {
            settings.naming.rename_from_metadata = false;
        }
        if let Some(separator) = &self.separator {
            settings.naming.title_separator = separator.clone();
        }
        if let Some(template) = &self.template {
            settings.naming.template = Some(template.clone());
        }

        if let Some(jobs) = self.jobs {
            config.encoder.max_parallel_conversions = jobs;
        }
        if let Some(timeout) = self.timeout {
            config.encoder.timeout_secs = timeout;
        }
    }
}
