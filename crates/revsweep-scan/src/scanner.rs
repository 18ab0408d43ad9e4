//! JWalk-based single-pass tree scanner.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use jwalk::{Parallelism, WalkDir};
use tracing::{debug, info, warn};

use revsweep_core::{
    split_extension, DirectoryBucket, ScanWarning, SweepConfig, SweepError, WarningKind,
};

/// Counters collected during a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// Directories visited below the root.
    pub dirs_visited: u64,
    /// Regular files visited.
    pub files_visited: u64,
    /// Files with a tracked extension.
    pub tracked_files: u64,
    /// Wall time of the walk.
    pub duration: Duration,
}

/// Output of one walk.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Canonical scan root.
    pub root: PathBuf,
    /// Directories holding tracked files, in discovery order.
    pub buckets: Vec<DirectoryBucket>,
    /// Legacy directories, in discovery order.
    pub legacy_dirs: Vec<PathBuf>,
    /// Non-fatal problems met during the walk.
    pub warnings: Vec<ScanWarning>,
    pub stats: ScanStats,
}

/// Serial directory walker built on jwalk.
#[derive(Debug, Clone, Default)]
pub struct TreeScanner {
    follow_symlinks: bool,
}

impl TreeScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner honouring the config's walk options.
    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new().follow_symlinks(config.follow_symlinks)
    }

    /// Follow symbolic links while walking.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Scan with the extensions and legacy patterns of a config.
    pub fn scan_config(&self, config: &SweepConfig) -> Result<ScanResult, SweepError> {
        self.scan(
            &config.root,
            &config.extensions,
            config.active_legacy_patterns(),
        )
    }

    /// Walk `root` once, collecting buckets and legacy directories.
    pub fn scan(
        &self,
        root: &Path,
        extensions: &[String],
        legacy_patterns: &[String],
    ) -> Result<ScanResult, SweepError> {
        let start = Instant::now();
        let root_path = root.canonicalize().map_err(|e| SweepError::io(root, e))?;

        if !root_path.is_dir() {
            return Err(SweepError::NotADirectory { path: root_path });
        }

        // Legacy directories are reported but never read.
        let prune_patterns = legacy_patterns.to_vec();
        let walker = WalkDir::new(&root_path)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(self.follow_symlinks)
            .min_depth(0)
            .process_read_dir(move |depth, _path, _state, children| {
                // `None` is the listing that holds the root itself.
                if depth.is_none() {
                    return;
                }
                for entry in children.iter_mut().flatten() {
                    if entry.file_type().is_dir()
                        && is_legacy(&entry.file_name().to_string_lossy(), &prune_patterns)
                    {
                        entry.read_children_path = None;
                    }
                }
            });

        let mut buckets: IndexMap<PathBuf, DirectoryBucket> = IndexMap::new();
        let mut legacy_dirs = Vec::new();
        let mut warnings = Vec::new();
        let mut stats = ScanStats::default();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    warn!(path = %path.display(), "{err}");
                    let warning = match err.io_error() {
                        Some(io) => ScanWarning::read_error(path, io),
                        None => ScanWarning::new(path, err.to_string(), WarningKind::ReadError),
                    };
                    warnings.push(warning);
                    continue;
                }
            };

            let file_type = entry.file_type();
            let path = entry.path();

            if file_type.is_dir() {
                if entry.depth() == 0 {
                    continue;
                }
                stats.dirs_visited += 1;

                if is_legacy(&entry.file_name().to_string_lossy(), legacy_patterns) {
                    debug!(path = %path.display(), "legacy directory");
                    legacy_dirs.push(path);
                }
            } else if file_type.is_file() {
                stats.files_visited += 1;

                let file_name = entry.file_name().to_string_lossy();
                let (_, suffix) = split_extension(&file_name);
                if !extensions.iter().any(|ext| ext == suffix) {
                    continue;
                }
                stats.tracked_files += 1;

                let Some(parent) = path.parent().map(Path::to_path_buf) else {
                    continue;
                };
                buckets
                    .entry(parent)
                    .or_insert_with_key(|dir| {
                        debug!(path = %dir.display(), "tracked files found");
                        DirectoryBucket::new(dir.clone())
                    })
                    .files
                    .push(path);
            }
        }

        stats.duration = start.elapsed();
        info!(
            root = %root_path.display(),
            buckets = buckets.len(),
            legacy = legacy_dirs.len(),
            files = stats.files_visited,
            "scan finished"
        );

        Ok(ScanResult {
            root: root_path,
            buckets: buckets.into_values().collect(),
            legacy_dirs,
            warnings,
            stats,
        })
    }
}

/// Check if a directory name contains any legacy pattern.
fn is_legacy(name: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| name.contains(pattern.as_str()))
}
