//! Batch runner implementation.
//!
//! Drives one conversion run end to end:
//! - Pre-flight: inputs exist, settings validate, output root is created
//! - Discovery: walk inputs, mirror the tree, plan one job per accepted file
//! - Conversion: bounded pool, results consumed in discovery order
//! - Finalize: write `summary.txt` into the output root

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::config::{validate_settings, Settings};
use crate::converter::{
    resolve_profile, ConversionJob, ConversionResult, Converter, ConverterError, EncoderProfile,
};
use crate::metadata::{TagMap, TagReader};
use crate::metrics;
use crate::naming::{resolve_stem, NamingRules};

use super::summary::RunSummary;
use super::types::{CancelHandle, InputMode, RunError};
use super::walker::{self, WalkEntry};

/// A planned unit of work, in discovery order.
#[derive(Debug)]
enum Step {
    Log(String),
    Ignore { name: String },
    Convert { name: String, job: ConversionJob },
}

/// What happened to a step.
#[derive(Debug)]
enum Outcome {
    Log(String),
    Ignored {
        name: String,
    },
    Cancelled {
        name: String,
    },
    Converted {
        name: String,
        job: ConversionJob,
        result: ConversionResult,
        removal_error: Option<String>,
    },
    Failed {
        name: String,
        job: ConversionJob,
        error: ConverterError,
    },
}

/// Runs conversion batches.
///
/// Holds no per-run state besides the cancel flag, which is cleared when a
/// run starts, so one runner can serve several runs.
pub struct BatchRunner<C, T>
where
    C: Converter,
    T: TagReader,
{
    converter: Arc<C>,
    tag_reader: Arc<T>,
    max_parallel: usize,
    cancel: CancelHandle,
}

impl<C, T> BatchRunner<C, T>
where
    C: Converter,
    T: TagReader,
{
    /// Create a sequential runner.
    pub fn new(converter: Arc<C>, tag_reader: Arc<T>) -> Self {
        Self {
            converter,
            tag_reader,
            max_parallel: 1,
            cancel: CancelHandle::new(),
        }
    }

    /// Allow up to `max` conversions in flight. `0` is treated as `1`.
    pub fn with_max_parallel(mut self, max: usize) -> Self {
        self.max_parallel = max.max(1);
        self
    }

    /// Handle that stops the run between files.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Convert every accepted file under `inputs`.
    ///
    /// Only pre-flight problems are errors; per-file failures are counted
    /// in the returned summary.
    pub async fn run(
        &self,
        inputs: &[PathBuf],
        settings: &Settings,
        mode: InputMode,
    ) -> Result<RunSummary, RunError> {
        if inputs.is_empty() {
            return Err(RunError::NoInputs);
        }
        self.cancel.reset();

        let mut resolved_inputs = Vec::with_capacity(inputs.len());
        for input in inputs {
            let resolved = tokio::fs::canonicalize(input)
                .await
                .map_err(|_| RunError::InputNotFound {
                    path: input.clone(),
                })?;
            resolved_inputs.push(resolved);
        }

        validate_settings(settings)?;
        let rules = NamingRules::new(&settings.naming)?;
        let profile = resolve_profile(settings.output_format, settings.output_quality);

        let started_at = Utc::now();
        let output_root = create_output_root(
            &resolved_inputs[0],
            settings.converted_dir_name.trim(),
            started_at.timestamp(),
        )
        .await?;

        info!(
            output_root = %output_root.display(),
            inputs = resolved_inputs.len(),
            format = %settings.output_format,
            quality = %settings.output_quality,
            "Starting conversion run"
        );

        let mut summary = RunSummary::new(output_root.clone(), started_at);

        let mirror = settings.mirror_structure && mode == InputMode::Directories;
        let entries = {
            let inputs = resolved_inputs.clone();
            let root = output_root.clone();
            tokio::task::spawn_blocking(move || walker::discover(&inputs, mode, &root, mirror))
                .await?
        };
        let steps = self.plan(entries, settings, &rules, &profile).await;

        let discovered = steps
            .iter()
            .filter(|s| !matches!(s, Step::Log(_)))
            .count();
        metrics::FILES_DISCOVERED.inc_by(discovered as u64);
        debug!(files = discovered, "Discovery finished");

        let remove_source = settings.remove_source_after_conversion;
        let mut outcomes = stream::iter(steps)
            .map(|step| self.execute(step, remove_source))
            .buffered(self.max_parallel);

        while let Some(outcome) = outcomes.next().await {
            record(&mut summary, outcome);
        }

        summary.completed_at = Some(Utc::now());
        match summary.write(&output_root).await {
            Ok(path) => summary.report_path = Some(path),
            Err(e) => {
                error!(
                    output_root = %output_root.display(),
                    error = %e,
                    "Failed to write run summary"
                );
            }
        }

        let outcome = if summary.cancelled {
            "cancelled"
        } else {
            "completed"
        };
        metrics::RUNS_TOTAL.with_label_values(&[outcome]).inc();

        info!(
            total = summary.total,
            converted = summary.converted,
            skipped = summary.skipped,
            errors = summary.errors,
            cancelled = summary.cancelled,
            "Conversion run finished"
        );

        Ok(summary)
    }

    /// Classify discovered entries and resolve every output name.
    ///
    /// Runs sequentially so name de-duplication follows discovery order.
    async fn plan(
        &self,
        entries: Vec<WalkEntry>,
        settings: &Settings,
        rules: &NamingRules,
        profile: &EncoderProfile,
    ) -> Vec<Step> {
        let extension = settings.output_format.extension();
        let embed_cover = settings.embed_cover_art && settings.output_format.supports_cover_art();

        let mut steps = Vec::with_capacity(entries.len());
        let mut claimed = HashSet::new();
        let mut covers: HashMap<PathBuf, Option<PathBuf>> = HashMap::new();

        for entry in entries {
            let file = match entry {
                WalkEntry::File(file) => file,
                other => {
                    if let Some(line) = other.log_line() {
                        steps.push(Step::Log(line));
                    }
                    continue;
                }
            };

            let name = file.name();
            if !settings.input_filter.accepts(&name) {
                steps.push(Step::Ignore { name });
                continue;
            }

            let tags = if rules.uses_metadata() && !self.cancel.is_cancelled() {
                self.tag_reader.read_tags(&file.source).await
            } else {
                TagMap::new()
            };

            let stem = resolve_stem(&file.source, rules, &tags);
            let file_stem = claim_stem(&mut claimed, &file.dest_dir, &stem, extension);

            let cover_art_path = if embed_cover {
                let dir = file.source.parent().unwrap_or(Path::new("")).to_path_buf();
                match covers.get(&dir) {
                    Some(found) => found.clone(),
                    None => {
                        let found = find_cover_art(&dir, &settings.cover_art_names).await;
                        covers.insert(dir, found.clone());
                        found
                    }
                }
            } else {
                None
            };

            steps.push(Step::Convert {
                name,
                job: ConversionJob {
                    source_path: file.source,
                    dest_dir: file.dest_dir,
                    file_stem,
                    extension: extension.to_string(),
                    profile: profile.clone(),
                    cover_art_path,
                },
            });
        }

        steps
    }

    async fn execute(&self, step: Step, remove_source: bool) -> Outcome {
        let (name, job) = match step {
            Step::Log(line) => return Outcome::Log(line),
            Step::Ignore { name } => return Outcome::Ignored { name },
            Step::Convert { name, job } => (name, job),
        };

        if self.cancel.is_cancelled() {
            return Outcome::Cancelled { name };
        }

        debug!(
            source = %job.source_path.display(),
            output = %job.output_path().display(),
            converter = self.converter.name(),
            "Converting"
        );

        match self.converter.convert(job.clone()).await {
            Ok(result) => {
                let removal_error = if remove_source {
                    tokio::fs::remove_file(&job.source_path)
                        .await
                        .err()
                        .map(|e| e.to_string())
                } else {
                    None
                };
                Outcome::Converted {
                    name,
                    job,
                    result,
                    removal_error,
                }
            }
            Err(error) => Outcome::Failed { name, job, error },
        }
    }
}

/// Fold one outcome into the summary. The only place counts change.
fn record(summary: &mut RunSummary, outcome: Outcome) {
    match outcome {
        Outcome::Log(line) => summary.log(line),
        Outcome::Ignored { name } => {
            debug!(file = %name, "Ignoring file");
            summary.log(format!("\t INFO: ignoring file {}", name));
            summary.record_skipped();
            metrics::FILES_PROCESSED
                .with_label_values(&["skipped"])
                .inc();
        }
        Outcome::Cancelled { name } => {
            summary.log(format!("\t INFO: run cancelled, not converting {}", name));
            summary.record_skipped();
            summary.cancelled = true;
            metrics::FILES_PROCESSED
                .with_label_values(&["skipped"])
                .inc();
        }
        Outcome::Converted {
            name,
            job,
            result,
            removal_error,
        } => {
            summary.log(format!("\t* {}", name));
            summary.log(format!("\t\t-> {}.{}", job.file_stem, job.extension));
            summary.record_converted();
            metrics::FILES_PROCESSED
                .with_label_values(&["converted"])
                .inc();
            metrics::CONVERSION_DURATION
                .with_label_values(&[job.profile.format.extension(), job.profile.quality.as_str()])
                .observe(result.duration_ms as f64 / 1000.0);

            if let Some(e) = removal_error {
                warn!(source = %job.source_path.display(), error = %e, "Failed to remove source");
                summary.log(format!("\t WARNING: could not remove source {}: {}", name, e));
            }
        }
        Outcome::Failed { name, job, error } => {
            error!(
                source = %job.source_path.display(),
                error = %error.detail(),
                "Conversion failed"
            );
            summary.log(format!("\t* {}", name));
            summary.log(format!("\t\t-> {}.{}", job.file_stem, job.extension));
            summary.log(format!(
                "ERROR: Error while saving file {}: {}",
                job.file_stem, error
            ));
            summary.record_error();
            metrics::FILES_PROCESSED.with_label_values(&["failed"]).inc();
        }
    }
}

/// Create `<parent>/<input name>_<dir_name>-<timestamp>` next to `first_input`.
///
/// The timestamp is bumped until a name that does not exist yet is found,
/// so two runs never share a root.
async fn create_output_root(
    first_input: &Path,
    dir_name: &str,
    timestamp: i64,
) -> Result<PathBuf, RunError> {
    let parent = first_input.parent().unwrap_or(first_input);
    let is_file = tokio::fs::metadata(first_input)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    let base = if is_file {
        first_input.file_stem()
    } else {
        first_input.file_name()
    }
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| "root".to_string());

    let mut timestamp = timestamp;
    loop {
        let candidate = parent.join(format!("{}_{}-{}", base, dir_name, timestamp));
        match tokio::fs::create_dir(&candidate).await {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => timestamp += 1,
            Err(source) => {
                return Err(RunError::OutputRoot {
                    path: candidate,
                    source,
                })
            }
        }
    }
}

/// Reserve `dest_dir/stem.ext`, appending ` (2)`, ` (3)`, ... on collision.
fn claim_stem(claimed: &mut HashSet<String>, dest_dir: &Path, stem: &str, ext: &str) -> String {
    let mut candidate = stem.to_string();
    let mut n = 2;
    loop {
        let key = dest_dir
            .join(format!("{}.{}", candidate, ext))
            .to_string_lossy()
            .to_lowercase();
        if claimed.insert(key) {
            return candidate;
        }
        candidate = format!("{} ({})", stem, n);
        n += 1;
    }
}

async fn find_cover_art(dir: &Path, names: &[String]) -> Option<PathBuf> {
    for name in names {
        let candidate = dir.join(name);
        if let Ok(meta) = tokio::fs::metadata(&candidate).await {
            if meta.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}
