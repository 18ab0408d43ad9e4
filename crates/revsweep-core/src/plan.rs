//! Buckets, selections and the cleanup plan.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;

/// A directory and the tracked files it directly contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryBucket {
    /// Directory path.
    pub path: PathBuf,
    /// Tracked files in listing order.
    pub files: Vec<PathBuf>,
}

impl DirectoryBucket {
    /// Create an empty bucket for a directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            files: Vec::new(),
        }
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the bucket holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A versioned file that falls outside the retention quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldFile {
    pub path: PathBuf,
    /// Size in bytes at selection time.
    pub size: u64,
    /// Extracted version ordinal.
    pub ordinal: u64,
}

/// A legacy directory removed as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldDirectory {
    pub path: PathBuf,
    /// Size in bytes, measured per the configured legacy sizing.
    pub size: u64,
    /// Files counted towards `size`.
    pub file_count: u64,
}

/// A (directory, extension) group left alone because some of its files
/// carry no usable version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedGroup {
    pub directory: PathBuf,
    pub extension: String,
    /// Files whose ordinal could not be extracted.
    pub unversioned: Vec<PathBuf>,
}

/// Everything a run decided to remove.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupPlan {
    /// Scan root the plan was computed under.
    pub root: PathBuf,
    /// Old versioned files in selection order.
    pub files: Vec<OldFile>,
    /// Old legacy directories in discovery order.
    pub directories: Vec<OldDirectory>,
    /// Groups skipped for ambiguous versions.
    pub skipped: Vec<SkippedGroup>,
    /// Non-fatal scan warnings.
    pub warnings: Vec<ScanWarning>,
}

impl CleanupPlan {
    /// Create an empty plan for a root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// The scan root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether there is nothing to remove.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    /// Number of old files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of old legacy directories.
    pub fn dir_count(&self) -> usize {
        self.directories.len()
    }

    /// Bytes held by old files.
    pub fn file_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Bytes held by legacy directories.
    pub fn dir_bytes(&self) -> u64 {
        self.directories.iter().map(|d| d.size).sum()
    }

    /// Bytes freed if the plan is applied.
    pub fn total_bytes(&self) -> u64 {
        self.file_bytes() + self.dir_bytes()
    }
}
