//! Archive destinations for old items.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use revsweep_core::{ArchiveFormat, SweepError};

use crate::operation::Relocation;

/// Prefix of every archive folder name.
pub const ARCHIVE_PREFIX: &str = "archivedfiles_";

/// Timestamp format of archive folder names.
pub const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// A timestamped archive folder under an archive root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveTarget {
    /// Directory that receives archive folders and containers.
    pub root: PathBuf,
    /// `YYYYMMDDHHMMSS` stamp.
    pub stamp: String,
}

impl ArchiveTarget {
    /// Create a target with an explicit stamp.
    pub fn new(root: impl Into<PathBuf>, stamp: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            stamp: stamp.into(),
        }
    }

    /// Create a target stamped with the local time.
    pub fn now(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Local::now().format(STAMP_FORMAT).to_string())
    }

    /// Folder name, `archivedfiles_<stamp>`.
    pub fn name(&self) -> String {
        format!("{ARCHIVE_PREFIX}{}", self.stamp)
    }

    /// Uncompressed archive folder.
    pub fn folder(&self) -> PathBuf {
        self.root.join(self.name())
    }

    /// Compressed container path for a format.
    pub fn container(&self, format: ArchiveFormat) -> PathBuf {
        self.root
            .join(format!("{}.{}", self.name(), format.extension()))
    }
}

/// Computes deletion or archive destinations relative to the scan root.
#[derive(Debug, Clone)]
pub struct RelocationPlanner {
    scan_root: PathBuf,
    archive: Option<ArchiveTarget>,
}

impl RelocationPlanner {
    /// Create a planner. Without an archive target every item is deleted.
    pub fn new(scan_root: impl Into<PathBuf>, archive: Option<ArchiveTarget>) -> Self {
        Self {
            scan_root: scan_root.into(),
            archive,
        }
    }

    pub fn scan_root(&self) -> &Path {
        &self.scan_root
    }

    pub fn archive(&self) -> Option<&ArchiveTarget> {
        self.archive.as_ref()
    }

    /// Decide where `item` goes.
    ///
    /// The archive destination keeps every path segment below the scan
    /// root, so restoring the folder recreates the original layout. An item
    /// outside the scan root is a broken precondition and fails.
    pub fn plan_destination(&self, item: &Path) -> Result<Relocation, SweepError> {
        let relative = item
            .strip_prefix(&self.scan_root)
            .ok()
            .filter(|rel| !rel.as_os_str().is_empty())
            .ok_or_else(|| SweepError::OutsideRoot {
                path: item.to_path_buf(),
                root: self.scan_root.clone(),
            })?;

        Ok(match &self.archive {
            None => Relocation::Delete,
            Some(target) => Relocation::Archive {
                destination: target.folder().join(relative),
            },
        })
    }
}
