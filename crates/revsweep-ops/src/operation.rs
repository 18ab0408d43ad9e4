//! Relocation and outcome types.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use revsweep_core::SweepError;

/// Where an old item goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relocation {
    /// Remove the item.
    Delete,
    /// Move the item into the archive tree.
    Archive { destination: PathBuf },
}

impl Relocation {
    /// Create the destination's parent directories. Existing directories
    /// are fine; deletions need nothing.
    pub fn prepare(&self) -> Result<(), SweepError> {
        if let Self::Archive { destination } = self {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent).map_err(|e| SweepError::io(parent, e))?;
            }
        }
        Ok(())
    }

    /// Archive destination, if any.
    pub fn destination(&self) -> Option<&PathBuf> {
        match self {
            Self::Delete => None,
            Self::Archive { destination } => Some(destination),
        }
    }
}

/// What the executor does with an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Delete,
    Trash,
    Archive { destination: PathBuf },
}

impl Action {
    /// Past-tense verb for summaries.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Delete => "Deleted",
            Self::Trash => "Trashed",
            Self::Archive { .. } => "Archived",
        }
    }
}

/// Whether an item is a single file or a whole directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    File,
    Directory,
}

/// Record of one applied (or, in a dry run, projected) action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub path: PathBuf,
    pub kind: ItemKind,
    /// Bytes measured when the plan was built.
    pub size: u64,
    #[serde(flatten)]
    pub action: Action,
}

impl std::fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.action {
            Action::Archive { destination } => write!(
                f,
                "{} {} -> {}",
                self.action.verb(),
                self.path.display(),
                destination.display()
            ),
            action => write!(f, "{} {}", action.verb(), self.path.display()),
        }
    }
}
