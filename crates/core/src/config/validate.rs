use super::{
    types::{Config, Settings},
    ConfigError,
};
use crate::converter::OutputQuality;
use crate::naming::NamingRules;

/// Validate configuration
/// Currently validates:
/// - Conversion settings (see [`validate_settings`])
/// - Encoder timeout and parallelism are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_settings(&config.conversion)?;

    if config.encoder.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "encoder.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.encoder.max_parallel_conversions == 0 {
        return Err(ConfigError::ValidationError(
            "encoder.max_parallel_conversions cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate the per-run settings.
///
/// Runs before any file-system work: input filter is non-empty, the output
/// directory name is a single path component, and the naming template and
/// regex compile. Format and quality are closed enums, so every pair has a
/// profile once deserialization succeeded.
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.input_filter.is_empty() {
        return Err(ConfigError::ValidationError(
            "conversion.input_filter cannot be empty".to_string(),
        ));
    }

    let dir_name = settings.converted_dir_name.trim();
    if dir_name.is_empty()
        || dir_name == "."
        || dir_name == ".."
        || dir_name.contains(['/', '\\'])
    {
        return Err(ConfigError::ValidationError(format!(
            "conversion.converted_dir_name '{}' must be a plain directory name",
            settings.converted_dir_name
        )));
    }

    NamingRules::new(&settings.naming)?;

    Ok(())
}

/// Settings that are valid but probably not what the user meant.
pub fn config_warnings(config: &Config) -> Vec<String> {
    let settings = &config.conversion;
    let mut warnings = Vec::new();

    if settings.output_quality == OutputQuality::Copy {
        warnings.push(format!(
            "output_quality = copy: no encoder parameter is forced; \
             {} output uses the container's default PCM codec at the source rate",
            settings.output_format
        ));
    }

    if settings.embed_cover_art && !settings.output_format.supports_cover_art() {
        warnings.push(format!(
            "embed_cover_art has no effect for {} output",
            settings.output_format
        ));
    }

    if settings.embed_cover_art && settings.cover_art_names.is_empty() {
        warnings.push("embed_cover_art is set but cover_art_names is empty".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NamingConfig, RegexReplacement};
    use crate::converter::{ConverterConfig, OutputFormat};
    use crate::filter::InputFilter;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
        assert!(config_warnings(&Config::default()).is_empty());
    }

    #[test]
    fn test_validate_empty_filter_fails() {
        let config = Config {
            conversion: Settings {
                input_filter: InputFilter::new(Vec::<String>::new()),
                ..Default::default()
            },
            encoder: ConverterConfig::default(),
        };
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_dir_name() {
        for bad in ["", "  ", "..", "a/b", "a\\b"] {
            let settings = Settings {
                converted_dir_name: bad.to_string(),
                ..Default::default()
            };
            assert!(validate_settings(&settings).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_validate_bad_regex_fails() {
        let settings = Settings {
            naming: NamingConfig {
                regex_replacement: Some(RegexReplacement {
                    pattern: "([unclosed".to_string(),
                    replacement: String::new(),
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_unknown_placeholder_fails() {
        let settings = Settings {
            naming: NamingConfig {
                template: Some("$ARTIST - $COMPOSER".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_validate_encoder_limits() {
        let mut config = Config::default();
        config.encoder.timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.encoder.max_parallel_conversions = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_warnings() {
        let mut config = Config::default();
        config.conversion.output_quality = OutputQuality::Copy;
        config.conversion.embed_cover_art = true;
        config.conversion.output_format = OutputFormat::Wav;

        let warnings = config_warnings(&config);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("copy"));
        assert!(warnings[1].contains("wav"));

        config.conversion.output_format = OutputFormat::Aiff;
        assert_eq!(config_warnings(&config).len(), 1);
    }
}
