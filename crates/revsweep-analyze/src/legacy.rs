//! Legacy directory collection.

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};
use tracing::{debug, warn};

use revsweep_core::{LegacySizing, OldDirectory, SweepError};

/// Legacy directories with their measured sizes.
#[derive(Debug, Clone, Default)]
pub struct LegacyCollection {
    pub directories: Vec<OldDirectory>,
    pub bytes: u64,
}

/// Marks legacy directories old as a whole and measures them.
#[derive(Debug, Clone, Default)]
pub struct LegacyCollector {
    sizing: LegacySizing,
}

impl LegacyCollector {
    /// Create a collector with the given sizing mode.
    pub fn new(sizing: LegacySizing) -> Self {
        Self { sizing }
    }

    /// Collect every directory, in the order given.
    pub fn collect(&self, dirs: &[PathBuf]) -> Result<LegacyCollection, SweepError> {
        let mut collection = LegacyCollection::default();

        for dir in dirs {
            let (size, file_count) = self.measure(dir)?;
            debug!(path = %dir.display(), size, file_count, sizing = %self.sizing, "legacy directory");

            collection.bytes += size;
            collection.directories.push(OldDirectory {
                path: dir.clone(),
                size,
                file_count,
            });
        }

        Ok(collection)
    }

    /// Size and file count of a directory.
    pub fn measure(&self, dir: &Path) -> Result<(u64, u64), SweepError> {
        match self.sizing {
            LegacySizing::Shallow => shallow_size(dir),
            LegacySizing::Recursive => Ok(recursive_size(dir)),
        }
    }
}

/// Files directly inside `dir`; subdirectories are not entered.
fn shallow_size(dir: &Path) -> Result<(u64, u64), SweepError> {
    let mut size = 0u64;
    let mut count = 0u64;

    let entries = fs::read_dir(dir).map_err(|e| SweepError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| SweepError::io(dir, e))?;
        let metadata = entry.metadata().map_err(|e| SweepError::io(entry.path(), e))?;
        if metadata.is_file() {
            size += metadata.len();
            count += 1;
        }
    }

    Ok((size, count))
}

/// Every file below `dir`. Unreadable entries are logged and skipped.
fn recursive_size(dir: &Path) -> (u64, u64) {
    let mut size = 0u64;
    let mut count = 0u64;

    let walker = WalkDir::new(dir)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(metadata) => {
                size += metadata.len();
                count += 1;
            }
            Err(err) => warn!(path = %entry.path().display(), "{err}"),
        }
    }

    (size, count)
}
