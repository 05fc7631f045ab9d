pub mod batch;
pub mod config;
pub mod converter;
pub mod filter;
pub mod metadata;
pub mod metrics;
pub mod naming;
pub mod testing;

pub use batch::{BatchRunner, CancelHandle, InputMode, RunError, RunSummary};
pub use config::{
    config_warnings, load_config, load_config_from_env, load_config_from_str, validate_config,
    validate_settings, Config, ConfigError, NamingConfig, RegexReplacement, Settings,
};
pub use converter::{
    resolve_profile, resolve_profile_named, ConversionJob, ConversionResult, Converter,
    ConverterConfig, ConverterError, EncoderProfile, FfmpegConverter, OutputFormat,
    OutputQuality, ProfileValue,
};
pub use filter::InputFilter;
pub use metadata::{FfprobeTagReader, TagMap, TagReader};
pub use naming::{resolve_stem, sanitize, FilenameTemplate, NamingRules};
