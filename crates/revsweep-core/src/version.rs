//! Version ordinal extraction from file names.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// Default pattern: underscore, `v`, exactly three digits (`_v007`).
pub const DEFAULT_VERSION_PATTERN: &str = "_v[0-9][0-9][0-9]";

/// A compiled version pattern.
///
/// When the expression has a capturing group, group 1 holds the ordinal
/// text; otherwise the whole match does. Lowercase `v` and `_` are
/// stripped before parsing; any other character makes the ordinal absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionPattern {
    regex: Regex,
}

impl VersionPattern {
    /// Compile a version pattern.
    pub fn new(pattern: &str) -> Result<Self, SweepError> {
        let regex = Regex::new(pattern).map_err(|source| SweepError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// The source text of the pattern.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Extract the ordinal from a file stem.
    ///
    /// Returns `None` unless the pattern matches exactly once and the
    /// captured text is purely numeric once `v` and `_` are stripped, so
    /// `1-2` or `V3` yield `None`.
    pub fn extract(&self, stem: &str) -> Option<u64> {
        let mut matches = self.regex.captures_iter(stem);
        let only = matches.next()?;
        if matches.next().is_some() {
            return None;
        }

        let text = only.get(1).or_else(|| only.get(0))?.as_str();
        parse_ordinal(text)
    }
}

impl Default for VersionPattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_VERSION_PATTERN).expect("default pattern compiles"),
        }
    }
}

impl fmt::Display for VersionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for VersionPattern {
    type Error = SweepError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<VersionPattern> for String {
    fn from(value: VersionPattern) -> Self {
        value.as_str().to_string()
    }
}

fn parse_ordinal(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .filter(|c| !matches!(c, 'v' | '_'))
        .collect();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Split a file name into stem and suffix.
///
/// The suffix starts at the last `.` and includes it. Leading dots of
/// dot-files never start a suffix, so `.bashrc` has none.
pub fn split_extension(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(idx) => name.split_at(leading + idx),
        None => (name, ""),
    }
}

/// Normalize a user-supplied extension to its dotted form (`blend` -> `.blend`).
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}
