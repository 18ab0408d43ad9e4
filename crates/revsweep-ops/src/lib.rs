//! File operations for revsweep.
//!
//! This crate applies a [`CleanupPlan`](revsweep_core::CleanupPlan):
//! old items are deleted, sent to the trash, or moved into a timestamped
//! archive folder that mirrors the scanned tree. The archive folder can
//! then be compressed into a single container.
//!
//! Execution is sequential and stops at the first failure; the error
//! carries the partial report of what was already applied.

mod archive;
mod executor;
mod move_op;
mod operation;
mod planner;

pub use archive::{compress_archive, remove_archive_folder, write_archive};
pub use executor::{ArchiveOutput, ExecuteError, ExecutionReport, Executor};
pub use move_op::{move_item, remove_item};
pub use operation::{Action, ItemKind, ItemOutcome, Relocation};
pub use planner::{ArchiveTarget, RelocationPlanner, ARCHIVE_PREFIX, STAMP_FORMAT};
