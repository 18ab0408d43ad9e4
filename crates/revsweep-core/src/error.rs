//! Error and warning types shared across the sweep pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a sweep could not be planned or applied.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("access denied to {path}")]
    PermissionDenied { path: PathBuf },

    /// The path vanished or never existed.
    #[error("no such file or directory: {path}")]
    NotFound { path: PathBuf },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rejected options or profile.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The version pattern is not a valid regular expression.
    #[error("invalid version pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },

    /// An item selected for relocation does not live under the scan root.
    #[error("{path} is not inside the scan root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("could not move {from} to {to}: {message}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },

    #[error("could not trash {path}: {message}")]
    Trash { path: PathBuf, message: String },

    /// Writing the compressed container failed; the archive folder is kept.
    #[error("could not write archive {path}: {message}")]
    Archive { path: PathBuf, message: String },
}

impl SweepError {
    /// Attach a path to an I/O error. Permission and not-found failures get
    /// their own variants.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether the error stems from user input rather than the filesystem.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::InvalidPattern { .. } | Self::NotADirectory { .. }
        )
    }
}

/// What went wrong with a skipped entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    PermissionDenied,
    /// Listing or stat failure other than permissions.
    ReadError,
}

/// An entry the walk could not read. The walk carries on past it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub message: String,
    pub kind: WarningKind,
}

impl ScanWarning {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Warning for an unreadable entry.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let kind = match error.kind() {
            std::io::ErrorKind::PermissionDenied => WarningKind::PermissionDenied,
            _ => WarningKind::ReadError,
        };
        Self::new(path, format!("unreadable: {error}"), kind)
    }
}
