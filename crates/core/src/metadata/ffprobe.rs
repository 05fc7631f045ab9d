use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{TagMap, TagReader};
use crate::converter::ConverterConfig;

/// Vorbis comment names that ffprobe does not always normalize.
const KEY_ALIASES: [(&str, &str); 2] = [("tracknumber", "track"), ("year", "date")];

/// Tag reader backed by `ffprobe -show_format -show_streams`.
#[derive(Debug, Clone)]
pub struct FfprobeTagReader {
    ffprobe_path: PathBuf,
    timeout: Duration,
}

impl FfprobeTagReader {
    pub fn new(ffprobe_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(
            config.ffprobe_path.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn probe(&self, path: &Path) -> Result<String, String> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| format!("ffprobe timed out after {:?}", self.timeout))?
            .map_err(|e| format!("failed to run {}: {}", self.ffprobe_path.display(), e))?;

        if !output.status.success() {
            return Err(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Parses ffprobe JSON output into a tag map.
    ///
    /// Format-level tags take precedence over stream-level ones.
    fn parse_probe_output(output: &str) -> Result<TagMap, serde_json::Error> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            #[serde(default)]
            format: Option<ProbeSection>,
            #[serde(default)]
            streams: Vec<ProbeSection>,
        }

        #[derive(Deserialize)]
        struct ProbeSection {
            #[serde(default)]
            tags: HashMap<String, String>,
        }

        let probe: ProbeOutput = serde_json::from_str(output)?;

        let mut tags = TagMap::new();
        let stream_tags = probe.streams.iter().flat_map(|s| s.tags.iter());
        let format_tags = probe.format.iter().flat_map(|f| f.tags.iter());

        // Later inserts win
        for (key, value) in stream_tags.chain(format_tags) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            tags.insert(key.trim().to_lowercase(), value.to_string());
        }

        for (alias, key) in KEY_ALIASES {
            if let Some(value) = tags.remove(alias) {
                tags.entry(key.to_string()).or_insert(value);
            }
        }

        Ok(tags)
    }
}

#[async_trait]
impl TagReader for FfprobeTagReader {
    async fn read_tags(&self, path: &Path) -> TagMap {
        let output = match self.probe(path).await {
            Ok(output) => output,
            Err(reason) => {
                warn!(path = %path.display(), reason = %reason, "Could not read tags");
                return TagMap::new();
            }
        };

        match Self::parse_probe_output(&output) {
            Ok(tags) => {
                debug!(path = %path.display(), count = tags.len(), "Read tags");
                tags
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unparseable ffprobe output");
                TagMap::new()
            }
        }
    }
}
