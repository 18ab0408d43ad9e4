//! Tree scanning for revsweep.
//!
//! `revsweep-scan` walks a directory tree exactly once and reports:
//!
//! - **Buckets**: directories that directly contain tracked files
//! - **Legacy directories**: subdirectories whose name contains a legacy
//!   pattern; these are not descended into
//!
//! # Example
//!
//! ```rust,no_run
//! use revsweep_scan::{SweepConfig, TreeScanner};
//!
//! let config = SweepConfig::new("/path/to/project");
//! let result = TreeScanner::from_config(&config).scan_config(&config).unwrap();
//!
//! for bucket in &result.buckets {
//!     println!("{}: {} tracked files", bucket.path.display(), bucket.len());
//! }
//! ```

mod scanner;

pub use scanner::{ScanResult, ScanStats, TreeScanner};

// Re-export core types for convenience
pub use revsweep_core::{DirectoryBucket, ScanWarning, SweepConfig, SweepError, WarningKind};
