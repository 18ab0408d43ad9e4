//! Sweep configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SweepError;
use crate::version::VersionPattern;

/// Container format used when compressing an archive folder.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
    #[default]
    Zip,
    TarGz,
    TarXz,
    TarBz2,
}

impl ArchiveFormat {
    /// File extension of the container, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
            Self::TarXz => "tar.xz",
            Self::TarBz2 => "tar.bz2",
        }
    }
}

/// How the size of a legacy directory is measured.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LegacySizing {
    /// Only files directly inside the directory are counted.
    #[default]
    Shallow,
    /// Every file in the subtree is counted.
    Recursive,
}

/// Configuration for one sweep run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SweepConfig {
    /// Root directory to clean.
    pub root: PathBuf,

    /// Tracked suffixes, dotted (`.blend`).
    #[builder(default = "default_extensions()")]
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Pattern used to pull the ordinal out of a file stem.
    #[builder(default)]
    #[serde(default)]
    pub version_pattern: VersionPattern,

    /// Versions kept per (directory, extension) group.
    #[builder(default = "DEFAULT_KEEP")]
    #[serde(default = "default_keep")]
    pub keep: usize,

    /// Treat directories with a legacy name as wholly old.
    #[builder(default = "false")]
    #[serde(default)]
    pub legacy: bool,

    /// Substrings marking a directory name as legacy.
    #[builder(default = "default_legacy_patterns()")]
    #[serde(default = "default_legacy_patterns")]
    pub legacy_patterns: Vec<String>,

    /// Legacy directory sizing.
    #[builder(default)]
    #[serde(default)]
    pub legacy_sizing: LegacySizing,

    /// Move old items here instead of deleting them.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub archive_root: Option<PathBuf>,

    /// Compress the archive folder once everything is moved.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Container format for compression.
    #[builder(default)]
    #[serde(default)]
    pub archive_format: ArchiveFormat,

    /// Send deleted items to the system trash.
    #[builder(default = "false")]
    #[serde(default)]
    pub use_trash: bool,

    /// Report only; never touch the filesystem.
    #[builder(default = "false")]
    #[serde(default)]
    pub dry_run: bool,

    /// Follow symbolic links while walking.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,
}

/// Default number of versions kept.
pub const DEFAULT_KEEP: usize = 5;

/// Default tracked extensions.
pub fn default_extensions() -> Vec<String> {
    [".blend", ".blend1", ".blend2", ".blend3"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Default legacy name substrings.
pub fn default_legacy_patterns() -> Vec<String> {
    vec!["_old".to_string()]
}

fn default_keep() -> usize {
    DEFAULT_KEEP
}

fn default_true() -> bool {
    true
}

impl SweepConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }

        if let Some(ref extensions) = self.extensions {
            if extensions.is_empty() {
                return Err("At least one extension is required".to_string());
            }
            if let Some(bad) = extensions.iter().find(|e| !e.starts_with('.') || e.len() < 2) {
                return Err(format!("Extension `{bad}` must be a dotted suffix like `.blend`"));
            }
            if let Some((i, dup)) = extensions
                .iter()
                .enumerate()
                .find(|&(i, e)| extensions[..i].contains(e))
            {
                return Err(format!("Extension `{dup}` is listed twice (position {})", i + 1));
            }
        }

        if self.legacy.unwrap_or(false) {
            let patterns = self
                .legacy_patterns
                .clone()
                .unwrap_or_else(default_legacy_patterns);
            if patterns.is_empty() || patterns.iter().any(|p| p.is_empty()) {
                return Err("Legacy patterns must be non-empty".to_string());
            }
        }
        Ok(())
    }
}

impl From<SweepConfigBuilderError> for SweepError {
    fn from(err: SweepConfigBuilderError) -> Self {
        SweepError::config(err.to_string())
    }
}

impl SweepConfig {
    /// Create a new sweep config builder.
    pub fn builder() -> SweepConfigBuilder {
        SweepConfigBuilder::default()
    }

    /// Create a config with defaults for the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: default_extensions(),
            version_pattern: VersionPattern::default(),
            keep: DEFAULT_KEEP,
            legacy: false,
            legacy_patterns: default_legacy_patterns(),
            legacy_sizing: LegacySizing::default(),
            archive_root: None,
            compress: true,
            archive_format: ArchiveFormat::default(),
            use_trash: false,
            dry_run: false,
            follow_symlinks: false,
        }
    }

    /// Legacy patterns in effect; empty when legacy mode is off.
    pub fn active_legacy_patterns(&self) -> &[String] {
        if self.legacy {
            &self.legacy_patterns
        } else {
            &[]
        }
    }

    /// Container format to produce, if the archive should be compressed.
    pub fn compression(&self) -> Option<ArchiveFormat> {
        match self.archive_root {
            Some(_) if self.compress => Some(self.archive_format),
            _ => None,
        }
    }
}
