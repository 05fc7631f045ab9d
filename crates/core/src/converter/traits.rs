//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::error::ConverterError;
use super::types::{ConversionJob, ConversionResult};

/// An encoder that can convert one audio file.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Converts the job's source file into `job.output_path()`.
    ///
    /// Overwrites an existing destination. Succeeds only if the destination
    /// exists afterwards.
    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError>;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{resolve_profile, OutputFormat, OutputQuality};
    use std::path::PathBuf;

    struct EchoConverter;

    #[async_trait]
    impl Converter for EchoConverter {
        fn name(&self) -> &str {
            "echo"
        }

        async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
            Ok(ConversionResult {
                output_path: job.output_path(),
                source_path: job.source_path,
                output_size_bytes: 0,
                duration_ms: 0,
            })
        }

        async fn validate(&self) -> Result<(), ConverterError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_converter_is_object_safe() {
        let converter: Box<dyn Converter> = Box::new(EchoConverter);
        let job = ConversionJob {
            source_path: PathBuf::from("/in/a.flac"),
            dest_dir: PathBuf::from("/out"),
            file_stem: "a".to_string(),
            extension: "aiff".to_string(),
            profile: resolve_profile(OutputFormat::Aiff, OutputQuality::High),
            cover_art_path: None,
        };
        let result = converter.convert(job).await.unwrap();
        assert_eq!(converter.name(), "echo");
        assert_eq!(result.output_path, PathBuf::from("/out/a.aiff"));
        assert!(converter.validate().await.is_ok());
    }
}
