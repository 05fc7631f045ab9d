//! Mock converter for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::batch::CancelHandle;
use crate::converter::{ConversionJob, ConversionResult, Converter, ConverterError};

/// A recorded conversion job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The job that was submitted.
    pub job: ConversionJob,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversion jobs for assertions
/// - Fail selected sources, or the next call
/// - Write a small output file so the result looks real
/// - Make sources vanish during conversion
/// - Cancel a run after a number of conversions
///
/// # Example
///
/// ```rust,ignore
/// use audiobatch_core::testing::MockConverter;
///
/// let converter = MockConverter::new();
/// converter.fail_on("disc1/02.flac").await;
///
/// let summary = runner.run(&inputs, &settings, InputMode::Directories).await?;
///
/// let conversions = converter.recorded_conversions().await;
/// assert_eq!(conversions.iter().filter(|c| !c.success).count(), 1);
/// ```
#[derive(Debug)]
pub struct MockConverter {
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// Sources that always fail, matched as path suffixes.
    failing_sources: Arc<RwLock<Vec<PathBuf>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// Simulated conversion duration in milliseconds.
    conversion_duration_ms: Arc<RwLock<u64>>,
    /// Delete the source after writing the output.
    consume_sources: Arc<RwLock<bool>>,
    /// Cancel this handle once this many conversions were recorded.
    cancel_after: Arc<RwLock<Option<(usize, CancelHandle)>>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            failing_sources: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            conversion_duration_ms: Arc::new(RwLock::new(0)),
            consume_sources: Arc::new(RwLock::new(false)),
            cancel_after: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions performed.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Make every source whose path ends with `suffix` fail.
    pub async fn fail_on(&self, suffix: impl Into<PathBuf>) {
        self.failing_sources.write().await.push(suffix.into());
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated conversion duration.
    pub async fn set_conversion_duration(&self, duration: Duration) {
        *self.conversion_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Delete each source once its output is written, so a later removal
    /// of the source fails.
    pub async fn set_consume_sources(&self, consume: bool) {
        *self.consume_sources.write().await = consume;
    }

    /// Cancel `handle` once `count` conversions have been recorded.
    pub async fn cancel_after(&self, count: usize, handle: CancelHandle) {
        *self.cancel_after.write().await = Some((count, handle));
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<ConverterError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, job: ConversionJob, success: bool) {
        let count = {
            let mut conversions = self.conversions.write().await;
            conversions.push(RecordedConversion { job, success });
            conversions.len()
        };

        if let Some((after, handle)) = self.cancel_after.read().await.as_ref() {
            if count >= *after {
                handle.cancel();
            }
        }
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        let duration_ms = *self.conversion_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        let injected = match self.take_error().await {
            Some(err) => Some(err),
            None => {
                let failing = self.failing_sources.read().await;
                failing
                    .iter()
                    .any(|suffix| job.source_path.ends_with(suffix))
                    .then(|| {
                        ConverterError::conversion_failed(
                            &job.source_path,
                            "ffmpeg exited with exit status: 1",
                            Some("Invalid data found when processing input".to_string()),
                        )
                    })
            }
        };

        if let Some(err) = injected {
            self.record(job, false).await;
            return Err(err);
        }

        let output_path = job.output_path();
        tokio::fs::create_dir_all(&job.dest_dir).await?;
        let data = format!("converted from {}", job.source_path.display());
        tokio::fs::write(&output_path, &data).await?;

        if *self.consume_sources.read().await {
            tokio::fs::remove_file(&job.source_path).await?;
        }

        let result = ConversionResult {
            source_path: job.source_path.clone(),
            output_path,
            output_size_bytes: data.len() as u64,
            duration_ms,
        };
        self.record(job, true).await;

        Ok(result)
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}
