//! Retention decisions for revsweep.
//!
//! This crate decides what is old:
//!
//! - **Retention selection** - rank the tracked files of each directory by
//!   version ordinal and select everything past the retention quota
//! - **Legacy collection** - mark whole legacy directories old and measure
//!   them
//!
//! # Retention Selection
//!
//! Ranking is conservative. A (directory, extension) group is only ordered
//! when every file in it yields an ordinal; otherwise the group is skipped
//! and reported.
//!
//! ```rust,ignore
//! use revsweep_analyze::{RetentionConfig, RetentionSelector};
//! use revsweep_scan::{SweepConfig, TreeScanner};
//!
//! let config = SweepConfig::new("/path/to/project");
//! let scan = TreeScanner::new().scan_config(&config).unwrap();
//!
//! let selector = RetentionSelector::with_config(RetentionConfig::from_sweep(&config));
//! for bucket in &scan.buckets {
//!     let selection = selector.select(bucket).unwrap();
//!     println!("{}: {} old files", bucket.path.display(), selection.old.len());
//! }
//! ```

mod legacy;
mod retention;

pub use legacy::{LegacyCollection, LegacyCollector};
pub use retention::{
    rank, BucketSelection, Candidate, RankedFile, Ranking, RetentionConfig,
    RetentionConfigBuilder, RetentionSelector,
};

// Re-export core types
pub use revsweep_core::{DirectoryBucket, LegacySizing, OldDirectory, OldFile, SkippedGroup};
