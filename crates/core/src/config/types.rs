use serde::{Deserialize, Serialize};

use crate::converter::{ConverterConfig, OutputFormat, OutputQuality};
use crate::filter::InputFilter;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub conversion: Settings,
    #[serde(default)]
    pub encoder: ConverterConfig,
}

/// Per-run conversion settings.
///
/// Built once by the caller and handed to the batch runner by reference;
/// nothing in the pipeline mutates it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Accepted input extensions, without the leading dot.
    #[serde(default = "default_input_filter")]
    pub input_filter: InputFilter,
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,
    #[serde(default = "default_output_quality")]
    pub output_quality: OutputQuality,
    /// Replicate the input directory hierarchy under the output root.
    #[serde(default = "default_true")]
    pub mirror_structure: bool,
    #[serde(default)]
    pub remove_source_after_conversion: bool,
    /// Used in the output root name `<input>_<converted_dir_name>-<timestamp>`.
    #[serde(default = "default_converted_dir_name")]
    pub converted_dir_name: String,
    /// Embed a cover image found next to the source (AIFF only).
    #[serde(default)]
    pub embed_cover_art: bool,
    #[serde(default = "default_cover_art_names")]
    pub cover_art_names: Vec<String>,
    #[serde(default)]
    pub naming: NamingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_filter: default_input_filter(),
            output_format: default_output_format(),
            output_quality: default_output_quality(),
            mirror_structure: true,
            remove_source_after_conversion: false,
            converted_dir_name: default_converted_dir_name(),
            embed_cover_art: false,
            cover_art_names: default_cover_art_names(),
            naming: NamingConfig::default(),
        }
    }
}

fn default_input_filter() -> InputFilter {
    InputFilter::new(["flac", "m4a"])
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Wav
}

fn default_output_quality() -> OutputQuality {
    OutputQuality::Normal
}

fn default_true() -> bool {
    true
}

fn default_converted_dir_name() -> String {
    "converted".to_string()
}

fn default_cover_art_names() -> Vec<String> {
    ["cover.jpg", "folder.jpg", "front.jpg", "cover.png"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Output filename rewriting
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamingConfig {
    /// Build the output name from the source's tags when they are complete.
    #[serde(default = "default_true")]
    pub rename_from_metadata: bool,
    /// Goes between artist and title in the default template.
    #[serde(default = "default_title_separator")]
    pub title_separator: String,
    /// Explicit template, e.g. `"$TRACK $ARTIST - $TITLE"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Applied to every resolved name before sanitization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_replacement: Option<RegexReplacement>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            rename_from_metadata: true,
            title_separator: default_title_separator(),
            template: None,
            regex_replacement: None,
        }
    }
}

impl NamingConfig {
    /// The template in effect: the explicit one, or `$ARTIST <sep> $TITLE`.
    pub fn effective_template(&self) -> String {
        match &self.template {
            Some(template) => template.clone(),
            None => format!("$ARTIST {} $TITLE", self.title_separator),
        }
    }
}

fn default_title_separator() -> String {
    "-".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegexReplacement {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}
