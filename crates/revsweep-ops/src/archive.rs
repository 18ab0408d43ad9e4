//! Compression of archive folders into a single container.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};
use thiserror::Error;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use revsweep_core::{ArchiveFormat, SweepError};

use crate::planner::ArchiveTarget;

#[derive(Debug, Error)]
enum WriteError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error("walk failed: {0}")]
    Walk(#[from] jwalk::Error),
    #[error("cannot archive {}: not a file, directory or symlink", .0.display())]
    Unsupported(PathBuf),
}

/// Compress the target's folder into `<folder>.<ext>` next to it, then
/// remove the folder.
///
/// The folder is only removed once the container is complete.
pub fn compress_archive(target: &ArchiveTarget, format: ArchiveFormat) -> Result<PathBuf, SweepError> {
    let container = write_archive(target, format)?;
    remove_archive_folder(target)?;
    Ok(container)
}

/// Write the target's folder into `<folder>.<ext>` next to it. The folder
/// is left in place.
///
/// A partially written container is removed on failure; an existing
/// container is never overwritten. Entries that are neither files,
/// directories nor symlinks fail the write.
pub fn write_archive(target: &ArchiveTarget, format: ArchiveFormat) -> Result<PathBuf, SweepError> {
    let folder = target.folder();
    let container = target.container(format);

    let file = File::create_new(&container).map_err(|e| SweepError::Archive {
        path: container.clone(),
        message: e.to_string(),
    })?;

    info!(container = %container.display(), format = %format, "compressing archive");
    if let Err(err) = write_container(file, &folder, format) {
        if let Err(cleanup) = fs::remove_file(&container) {
            warn!(path = %container.display(), "could not remove partial archive: {cleanup}");
        }
        return Err(SweepError::Archive {
            path: container,
            message: err.to_string(),
        });
    }
    Ok(container)
}

/// Remove the target's folder once its container is written.
pub fn remove_archive_folder(target: &ArchiveTarget) -> Result<(), SweepError> {
    let folder = target.folder();
    fs::remove_dir_all(&folder).map_err(|e| SweepError::io(&folder, e))
}

fn write_container(file: File, source: &Path, format: ArchiveFormat) -> Result<(), WriteError> {
    let file = match format {
        ArchiveFormat::Zip => write_zip(file, source)?,
        ArchiveFormat::TarGz => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            append_tree(encoder, source)?.finish()?
        }
        ArchiveFormat::TarXz => append_tree(xz2::write::XzEncoder::new(file, 6), source)?.finish()?,
        ArchiveFormat::TarBz2 => {
            let encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
            append_tree(encoder, source)?.finish()?
        }
    };
    file.sync_all()?;
    Ok(())
}

/// Tar `source` with entries relative to it.
fn append_tree<W: Write>(writer: W, source: &Path) -> io::Result<W> {
    let mut builder = tar::Builder::new(writer);
    builder.follow_symlinks(false);
    builder.append_dir_all(".", source)?;
    builder.into_inner()
}

fn write_zip(file: File, source: &Path) -> Result<File, WriteError> {
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    let walker = WalkDir::new(source)
        .parallelism(Parallelism::Serial)
        .sort(true)
        .skip_hidden(false);

    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path();
        let name = zip_name(path.strip_prefix(source).unwrap_or(&path));
        let file_type = entry.file_type();

        if file_type.is_dir() {
            zip.add_directory(name, options)?;
        } else if file_type.is_file() {
            zip.start_file(name, options)?;
            let mut input = File::open(&path)?;
            io::copy(&mut input, &mut zip)?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(&path)?;
            zip.add_symlink(name, link.to_string_lossy().into_owned(), options)?;
        } else {
            return Err(WriteError::Unsupported(path));
        }
    }

    Ok(zip.finish()?)
}

/// Zip entry names always use `/`.
fn zip_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn staged_target(temp: &TempDir) -> ArchiveTarget {
        let target = ArchiveTarget::new(temp.path(), "20240101010101");
        let folder = target.folder();
        fs::create_dir_all(folder.join("shots/e1")).unwrap();
        fs::create_dir_all(folder.join("shots/e1_old/nested")).unwrap();
        fs::write(folder.join("shots/e1/scene_v001.blend"), "v1").unwrap();
        fs::write(folder.join("shots/e1_old/nested/a.blend"), "old").unwrap();
        target
    }

    #[test]
    fn test_zip_container_keeps_layout() {
        let temp = TempDir::new().unwrap();
        let target = staged_target(&temp);

        let container = compress_archive(&target, ArchiveFormat::Zip).unwrap();
        assert_eq!(
            container,
            temp.path().join("archivedfiles_20240101010101.zip")
        );
        assert!(!target.folder().exists());

        let mut archive = zip::ZipArchive::new(File::open(&container).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name("shots/e1/scene_v001.blend")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "v1");
        assert!(archive.by_name("shots/e1_old/nested/a.blend").is_ok());
    }

    #[test]
    fn test_tar_gz_container_keeps_layout() {
        let temp = TempDir::new().unwrap();
        let target = staged_target(&temp);

        let container = compress_archive(&target, ArchiveFormat::TarGz).unwrap();
        assert!(container.to_string_lossy().ends_with(".tar.gz"));
        assert!(!target.folder().exists());

        let decoder = flate2::read::GzDecoder::new(File::open(&container).unwrap());
        let mut archive = tar::Archive::new(decoder);
        let names: Vec<PathBuf> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().into_owned())
            .collect();
        assert!(names
            .iter()
            .any(|p| p.ends_with("shots/e1/scene_v001.blend")));
    }

    #[test]
    fn test_missing_folder_keeps_nothing_behind() {
        let temp = TempDir::new().unwrap();
        let target = ArchiveTarget::new(temp.path(), "20240101010101");

        let err = compress_archive(&target, ArchiveFormat::TarBz2).unwrap_err();
        assert!(matches!(err, SweepError::Archive { .. }));
        assert!(!target.container(ArchiveFormat::TarBz2).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_keeps_symlinks() {
        let temp = TempDir::new().unwrap();
        let target = staged_target(&temp);
        std::os::unix::fs::symlink(
            "nested/a.blend",
            target.folder().join("shots/e1_old/latest.blend"),
        )
        .unwrap();

        let container = compress_archive(&target, ArchiveFormat::Zip).unwrap();
        assert!(!target.folder().exists());

        let mut archive = zip::ZipArchive::new(File::open(&container).unwrap()).unwrap();
        let mut link = archive.by_name("shots/e1_old/latest.blend").unwrap();
        let mode = link.unix_mode().unwrap();
        assert_eq!(mode & 0o170000, 0o120000);
        let mut destination = String::new();
        link.read_to_string(&mut destination).unwrap();
        assert_eq!(destination, "nested/a.blend");
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_refuses_special_files() {
        let temp = TempDir::new().unwrap();
        let target = staged_target(&temp);
        let socket = target.folder().join("shots/e1_old/render.sock");
        let _listener = std::os::unix::net::UnixListener::bind(&socket).unwrap();

        let err = compress_archive(&target, ArchiveFormat::Zip).unwrap_err();
        assert!(matches!(err, SweepError::Archive { .. }));
        assert!(err.to_string().contains("render.sock"));
        assert!(!target.container(ArchiveFormat::Zip).exists());
        assert!(target.folder().join("shots/e1/scene_v001.blend").is_file());
    }

    #[test]
    fn test_write_archive_leaves_folder() {
        let temp = TempDir::new().unwrap();
        let target = staged_target(&temp);

        let container = write_archive(&target, ArchiveFormat::TarXz).unwrap();
        assert!(container.is_file());
        assert!(target.folder().join("shots/e1/scene_v001.blend").is_file());

        remove_archive_folder(&target).unwrap();
        assert!(!target.folder().exists());
    }

    #[test]
    fn test_existing_container_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let target = staged_target(&temp);
        let container = target.container(ArchiveFormat::Zip);
        fs::write(&container, "earlier run").unwrap();

        let err = compress_archive(&target, ArchiveFormat::Zip).unwrap_err();
        assert!(matches!(err, SweepError::Archive { .. }));
        assert_eq!(fs::read_to_string(&container).unwrap(), "earlier run");
        assert!(target.folder().join("shots/e1/scene_v001.blend").is_file());
    }
}
