//! Input-extension filter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of accepted input extensions.
///
/// Extensions are stored lowercased, trimmed and without a leading dot, so
/// `".FLAC"`, `"flac"` and `" Flac "` all describe the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct InputFilter {
    extensions: BTreeSet<String>,
}

impl InputFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| normalize(ext.as_ref()))
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    /// Whether a file with this name should be converted.
    ///
    /// The extension is whatever follows the last `.`; names without one,
    /// and names containing a newline, are rejected.
    pub fn accepts(&self, file_name: &str) -> bool {
        if file_name.contains('\n') {
            return false;
        }
        match file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => {
                self.extensions.contains(&ext.to_ascii_lowercase())
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

fn normalize(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

impl From<Vec<String>> for InputFilter {
    fn from(extensions: Vec<String>) -> Self {
        Self::new(extensions)
    }
}

impl From<InputFilter> for Vec<String> {
    fn from(filter: InputFilter) -> Self {
        filter.extensions.into_iter().collect()
    }
}
