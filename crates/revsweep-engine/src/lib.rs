//! Sweep orchestration for revsweep.
//!
//! [`Sweeper`] runs the whole pipeline for one [`SweepConfig`]:
//!
//! 1. walk the tree once ([`revsweep_scan`])
//! 2. select old versions per bucket and collect legacy directories
//!    ([`revsweep_analyze`])
//! 3. ask for confirmation
//! 4. delete, trash or archive the old items ([`revsweep_ops`])
//!
//! ```rust,no_run
//! use revsweep_engine::{SweepConfig, SweepOutcome, Sweeper};
//!
//! let config = SweepConfig::builder()
//!     .root("/projects/film")
//!     .keep(3usize)
//!     .dry_run(true)
//!     .build()
//!     .unwrap();
//!
//! let report = Sweeper::new(config).run().unwrap();
//! if let SweepOutcome::Completed(done) = &report.outcome {
//!     println!("{} bytes would be freed", done.bytes_freed);
//! }
//! ```

mod sweeper;

pub use sweeper::{EngineError, SweepOutcome, SweepReport, Sweeper};

// Re-export the types a caller needs to drive a sweep
pub use revsweep_core::{
    ArchiveFormat, CleanupPlan, LegacySizing, SweepConfig, SweepError, SweepProfile,
    VersionPattern,
};
pub use revsweep_ops::{ArchiveOutput, ExecuteError, ExecutionReport, ItemOutcome};
