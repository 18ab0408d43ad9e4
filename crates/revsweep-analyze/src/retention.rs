//! Per-directory version retention.
//!
//! Each bucket is split by tracked extension. Within a group, files are
//! ranked newest first by version ordinal and everything past the quota is
//! selected. A group holding any file without a usable ordinal is left
//! alone entirely.

use std::fs;
use std::path::PathBuf;

use derive_builder::Builder;
use tracing::{debug, warn};

use revsweep_core::{
    default_extensions, split_extension, DirectoryBucket, OldFile, SkippedGroup, SweepConfig,
    SweepError, VersionPattern, DEFAULT_KEEP,
};

/// Configuration for retention selection.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct RetentionConfig {
    /// Newest versions kept per group.
    #[builder(default = "DEFAULT_KEEP")]
    pub keep: usize,

    /// Tracked extensions, each ranked independently.
    #[builder(default = "default_extensions()")]
    pub extensions: Vec<String>,

    /// Pattern used to extract ordinals.
    #[builder(default)]
    pub version_pattern: VersionPattern,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            keep: DEFAULT_KEEP,
            extensions: default_extensions(),
            version_pattern: VersionPattern::default(),
        }
    }
}

impl RetentionConfig {
    /// Create a new config builder.
    pub fn builder() -> RetentionConfigBuilder {
        RetentionConfigBuilder::default()
    }

    /// Take the retention settings of a sweep config.
    pub fn from_sweep(config: &SweepConfig) -> Self {
        Self {
            keep: config.keep,
            extensions: config.extensions.clone(),
            version_pattern: config.version_pattern.clone(),
        }
    }
}

/// A file considered for ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub ordinal: Option<u64>,
}

/// A candidate with a known ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedFile {
    pub path: PathBuf,
    pub ordinal: u64,
}

/// Outcome of ranking one (directory, extension) group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ranking {
    /// Newest first; equal ordinals keep listing order.
    Ordered(Vec<RankedFile>),
    /// At least one candidate has no ordinal.
    Unorderable { unversioned: Vec<PathBuf> },
}

/// Rank candidates newest first, refusing to order groups with missing
/// ordinals.
pub fn rank(candidates: Vec<Candidate>) -> Ranking {
    let unversioned: Vec<PathBuf> = candidates
        .iter()
        .filter(|c| c.ordinal.is_none())
        .map(|c| c.path.clone())
        .collect();
    if !unversioned.is_empty() {
        return Ranking::Unorderable { unversioned };
    }

    let mut ranked: Vec<RankedFile> = candidates
        .into_iter()
        .filter_map(|c| {
            c.ordinal.map(|ordinal| RankedFile {
                path: c.path,
                ordinal,
            })
        })
        .collect();

    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.ordinal.cmp(&a.ordinal));
    Ranking::Ordered(ranked)
}

/// Files selected from one bucket.
#[derive(Debug, Clone, Default)]
pub struct BucketSelection {
    /// Old files, group by group, oldest-ranked last within a group.
    pub old: Vec<OldFile>,
    /// Bytes held by `old`.
    pub bytes: u64,
    /// Groups left alone for missing ordinals.
    pub skipped: Vec<SkippedGroup>,
}

/// Selects versions beyond the retention quota.
pub struct RetentionSelector {
    config: RetentionConfig,
}

impl RetentionSelector {
    /// Create a selector with default config.
    pub fn new() -> Self {
        Self {
            config: RetentionConfig::default(),
        }
    }

    /// Create a selector with custom config.
    pub fn with_config(config: RetentionConfig) -> Self {
        Self { config }
    }

    /// The config in use.
    pub fn config(&self) -> &RetentionConfig {
        &self.config
    }

    /// Candidates in `bucket` whose suffix equals `extension`, in listing order.
    pub fn candidates(&self, bucket: &DirectoryBucket, extension: &str) -> Vec<Candidate> {
        bucket
            .files
            .iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy();
                let (stem, suffix) = split_extension(&name);
                (suffix == extension).then(|| Candidate {
                    path: path.clone(),
                    ordinal: self.config.version_pattern.extract(stem),
                })
            })
            .collect()
    }

    /// Select the old files of one bucket.
    ///
    /// Sizes are read now, so the plan reflects the tree at scan time.
    pub fn select(&self, bucket: &DirectoryBucket) -> Result<BucketSelection, SweepError> {
        let mut selection = BucketSelection::default();

        for (i, extension) in self.config.extensions.iter().enumerate() {
            // a repeated extension would select the same files twice
            if self.config.extensions[..i].contains(extension) {
                continue;
            }
            let candidates = self.candidates(bucket, extension);
            if candidates.is_empty() {
                continue;
            }

            match rank(candidates) {
                Ranking::Unorderable { unversioned } => {
                    warn!(
                        dir = %bucket.path.display(),
                        extension = %extension,
                        unversioned = unversioned.len(),
                        "unable to find file version, skipping group"
                    );
                    selection.skipped.push(SkippedGroup {
                        directory: bucket.path.clone(),
                        extension: extension.clone(),
                        unversioned,
                    });
                }
                Ranking::Ordered(ranked) => {
                    for file in ranked.into_iter().skip(self.config.keep) {
                        let size = fs::metadata(&file.path)
                            .map_err(|e| SweepError::io(&file.path, e))?
                            .len();
                        debug!(path = %file.path.display(), ordinal = file.ordinal, size, "old version");

                        selection.bytes += size;
                        selection.old.push(OldFile {
                            path: file.path,
                            size,
                            ordinal: file.ordinal,
                        });
                    }
                }
            }
        }

        Ok(selection)
    }
}

impl Default for RetentionSelector {
    fn default() -> Self {
        Self::new()
    }
}
