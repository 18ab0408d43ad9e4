//! TOML profiles supplying defaults for the command line.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ArchiveFormat, LegacySizing};
use crate::error::SweepError;

/// A saved set of sweep options. Every field is optional; unset fields fall
/// back to the built-in defaults, and command-line flags override both.
///
/// ```toml
/// versions = 3
/// extensions = ["blend", "blend1"]
/// archive = "/mnt/archive"
/// format = "tar-gz"
/// legacy = true
/// legacy_patterns = ["_old", "_bak"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepProfile {
    pub versions: Option<usize>,
    pub extensions: Option<Vec<String>>,
    pub pattern: Option<String>,
    pub archive: Option<PathBuf>,
    pub compress: Option<bool>,
    pub format: Option<ArchiveFormat>,
    pub legacy: Option<bool>,
    pub legacy_patterns: Option<Vec<String>>,
    pub legacy_sizing: Option<LegacySizing>,
    pub trash: Option<bool>,
    pub follow_symlinks: Option<bool>,
}

impl SweepProfile {
    /// Parse a profile from TOML text.
    pub fn parse(text: &str) -> Result<Self, SweepError> {
        toml::from_str(text).map_err(|e| SweepError::config(format!("bad profile: {e}")))
    }

    /// Load a profile from disk.
    pub fn load(path: &Path) -> Result<Self, SweepError> {
        let text = fs::read_to_string(path).map_err(|e| SweepError::io(path, e))?;
        Self::parse(&text).map_err(|e| match e {
            SweepError::InvalidConfig { message } => {
                SweepError::config(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }
}
