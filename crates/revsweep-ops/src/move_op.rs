//! Blocking move and remove primitives.

use std::fs;
use std::path::Path;

use revsweep_core::SweepError;

/// Move a single item (file or directory) to `dest`.
///
/// The parent of `dest` must exist and `dest` must carry the source's
/// file name.
pub fn move_item(source: &Path, dest: &Path) -> Result<(), SweepError> {
    // Try rename first (fast path for same filesystem)
    let rename_err = match fs::rename(source, dest) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    let move_err = |message: String| SweepError::Move {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        message,
    };

    if !source.exists() {
        return Err(move_err(rename_err.to_string()));
    }

    // Fall back to copy + delete for cross-filesystem moves
    let is_dir = fs::symlink_metadata(source)
        .map(|m| m.is_dir())
        .unwrap_or(false);
    let result = if is_dir {
        let parent = dest
            .parent()
            .ok_or_else(|| move_err("destination has no parent".to_string()))?;
        fs_extra::dir::move_dir(source, parent, &fs_extra::dir::CopyOptions::new()).map(|_| ())
    } else {
        fs_extra::file::move_file(source, dest, &fs_extra::file::CopyOptions::new()).map(|_| ())
    };

    result.map_err(|e| move_err(format!("{rename_err}; fallback copy failed: {e}")))
}

/// Remove a file or a whole directory, or hand it to the system trash.
pub fn remove_item(path: &Path, use_trash: bool) -> Result<(), SweepError> {
    if use_trash {
        return trash::delete(path).map_err(|e| SweepError::Trash {
            path: path.to_path_buf(),
            message: e.to_string(),
        });
    }

    let metadata = fs::symlink_metadata(path).map_err(|e| SweepError::io(path, e))?;
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| SweepError::io(path, e))
}
