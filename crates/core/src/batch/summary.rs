//! Run summary and the `summary.txt` report.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Name of the report written into every output root.
pub const SUMMARY_FILE_NAME: &str = "summary.txt";

const HEADER: &str = "---------------SUMMARY----------------";
const FOOTER: &str = "-------------SUMMARY END--------------";

/// Outcome of one run.
///
/// Every discovered file bumps `total` and exactly one of `converted`,
/// `skipped` or `errors`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub errors: usize,
    pub output_root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Where `summary.txt` was written; `None` if writing it failed.
    pub report_path: Option<PathBuf>,
    pub cancelled: bool,
    pub log: Vec<String>,
}

impl RunSummary {
    pub fn new(output_root: PathBuf, started_at: DateTime<Utc>) -> Self {
        Self {
            total: 0,
            converted: 0,
            skipped: 0,
            errors: 0,
            output_root,
            started_at,
            completed_at: None,
            report_path: None,
            cancelled: false,
            log: Vec::new(),
        }
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn record_converted(&mut self) {
        self.total += 1;
        self.converted += 1;
    }

    pub fn record_skipped(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    pub fn record_error(&mut self) {
        self.total += 1;
        self.errors += 1;
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Text of `summary.txt`.
    pub fn render(&self) -> String {
        let completed = self
            .completed_at
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut out = String::new();
        out.push_str(HEADER);
        out.push('\n');
        out.push_str(&format!(
            "total: {}, converted: {}, skipped: {}, errors: {}\n",
            self.total, self.converted, self.skipped, self.errors
        ));
        if self.cancelled {
            out.push_str(" CANCELLED\n");
        }
        out.push_str(&format!(" DATE: {}\n", completed));
        out.push_str(FOOTER);
        out.push_str("\n\n");
        for line in &self.log {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Write the rendered report to `dir/summary.txt`.
    pub async fn write(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(SUMMARY_FILE_NAME);
        tokio::fs::write(&path, self.render()).await?;
        Ok(path)
    }
}
