//! Core types and configuration for revsweep.
//!
//! This crate provides the data structures shared by every stage of a
//! sweep: the run configuration, version extraction, directory buckets and
//! the cleanup plan.

mod config;
mod error;
mod plan;
mod profile;
mod version;

pub use config::{
    default_extensions, default_legacy_patterns, ArchiveFormat, LegacySizing, SweepConfig,
    SweepConfigBuilder, SweepConfigBuilderError, DEFAULT_KEEP,
};
pub use error::{ScanWarning, SweepError, WarningKind};
pub use plan::{CleanupPlan, DirectoryBucket, OldDirectory, OldFile, SkippedGroup};
pub use profile::SweepProfile;
pub use version::{normalize_extension, split_extension, VersionPattern, DEFAULT_VERSION_PATTERN};
