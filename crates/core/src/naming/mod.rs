//! Output filename synthesis.
//!
//! Turns a source path plus its tags into the stem of the output file:
//! template rendering, fallback to the source stem, optional regex rewrite
//! and reserved-character sanitization.

mod sanitize;
mod template;

pub use sanitize::{sanitize, RESERVED_CHARS};
pub use template::{FilenameTemplate, Placeholder};

use regex_lite::Regex;
use std::path::Path;

use crate::config::{ConfigError, NamingConfig};
use crate::metadata::TagMap;

/// Stem used when every other source of a name comes out empty.
pub const FALLBACK_STEM: &str = "untitled";

/// Compiled naming settings, built once per run.
#[derive(Debug, Clone)]
pub struct NamingRules {
    rename_from_metadata: bool,
    template: FilenameTemplate,
    replacement: Option<(Regex, String)>,
}

impl NamingRules {
    pub fn new(config: &NamingConfig) -> Result<Self, ConfigError> {
        let template = FilenameTemplate::new(&config.effective_template())?;

        let replacement = match &config.regex_replacement {
            Some(rule) => {
                let regex = Regex::new(&rule.pattern).map_err(|e| {
                    ConfigError::ValidationError(format!(
                        "invalid naming.regex_replacement pattern '{}': {}",
                        rule.pattern, e
                    ))
                })?;
                Some((regex, rule.replacement.clone()))
            }
            None => None,
        };

        Ok(Self {
            rename_from_metadata: config.rename_from_metadata,
            template,
            replacement,
        })
    }

    /// Whether tags need to be read at all.
    ///
    /// A template made only of literal text renders without them.
    pub fn uses_metadata(&self) -> bool {
        self.rename_from_metadata && self.template.placeholders().next().is_some()
    }
}

/// Resolve the output stem for `source`.
///
/// The rendered template wins when renaming is on and every placeholder has
/// a value; otherwise the source's own stem is used. The regex rewrite is
/// then applied (ignored if it would leave nothing), and the result is
/// sanitized. Never returns an empty string.
pub fn resolve_stem(source: &Path, rules: &NamingRules, tags: &TagMap) -> String {
    let rendered = if rules.rename_from_metadata {
        rules.template.render(tags)
    } else {
        None
    };

    let stem = rendered.unwrap_or_else(|| {
        source
            .file_stem()
            .map(|s| s.to_string_lossy().trim().to_string())
            .unwrap_or_default()
    });

    let stem = match &rules.replacement {
        Some((regex, replacement)) => {
            let replaced = regex
                .replace_all(&stem, replacement.as_str())
                .trim()
                .to_string();
            if replaced.is_empty() {
                stem
            } else {
                replaced
            }
        }
        None => stem,
    };

    let stem = sanitize(&stem);
    if stem.trim().is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}
