//! Plan executor with unified result handling.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use revsweep_core::{ArchiveFormat, CleanupPlan, SweepConfig, SweepError};

use crate::archive::{remove_archive_folder, write_archive};
use crate::move_op::{move_item, remove_item};
use crate::operation::{Action, ItemKind, ItemOutcome, Relocation};
use crate::planner::{ArchiveTarget, RelocationPlanner};

/// Archive produced by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveOutput {
    /// Folder the items were moved into.
    pub folder: PathBuf,
    /// Compressed container, when compression ran (or would run).
    pub container: Option<PathBuf>,
}

/// What an execution did, or would do in a dry run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Nothing was touched.
    pub dry_run: bool,
    /// Per-item actions, in execution order.
    pub items: Vec<ItemOutcome>,
    pub files_removed: usize,
    pub dirs_removed: usize,
    /// Bytes freed, as measured when the plan was built.
    pub bytes_freed: u64,
    pub archive: Option<ArchiveOutput>,
}

impl ExecutionReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: ItemOutcome) {
        match outcome.kind {
            ItemKind::File => self.files_removed += 1,
            ItemKind::Directory => self.dirs_removed += 1,
        }
        self.bytes_freed += outcome.size;
        self.items.push(outcome);
    }

    /// Items handled so far.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// Execution stopped at the first failure. `completed` lists what had
/// already been applied.
#[derive(Debug, Error)]
#[error("{source} ({} item(s) already applied)", .completed.item_count())]
pub struct ExecuteError {
    pub completed: ExecutionReport,
    #[source]
    pub source: SweepError,
}

/// Applies a cleanup plan.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    /// Archive target; `None` means delete.
    pub archive: Option<ArchiveTarget>,
    /// Container format when compressing the archive.
    pub compression: Option<ArchiveFormat>,
    /// Send deletions to the system trash.
    pub use_trash: bool,
    /// Only report.
    pub dry_run: bool,
}

impl Executor {
    /// Create an executor that deletes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor matching a sweep config. `stamp` names the archive
    /// folder when the config archives.
    pub fn from_config(config: &SweepConfig, stamp: impl Into<String>) -> Self {
        Self {
            archive: config
                .archive_root
                .as_ref()
                .map(|root| ArchiveTarget::new(root, stamp)),
            compression: config.compression(),
            use_trash: config.use_trash,
            dry_run: config.dry_run,
        }
    }

    /// Archive into `target` instead of deleting.
    pub fn with_archive(mut self, target: ArchiveTarget) -> Self {
        self.archive = Some(target);
        self
    }

    /// Compress the archive folder afterwards.
    pub fn with_compression(mut self, format: ArchiveFormat) -> Self {
        self.compression = Some(format);
        self
    }

    /// Use the system trash for deletions.
    pub fn with_trash(mut self, use_trash: bool) -> Self {
        self.use_trash = use_trash;
        self
    }

    /// Report without touching the filesystem.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Apply the plan: old files first, then legacy directories, then
    /// compression. Stops at the first failure.
    pub fn execute(&self, plan: &CleanupPlan) -> Result<ExecutionReport, ExecuteError> {
        let planner = RelocationPlanner::new(plan.root(), self.archive.clone());
        let mut report = ExecutionReport::new(self.dry_run);

        let items = plan
            .files
            .iter()
            .map(|f| (&f.path, ItemKind::File, f.size))
            .chain(
                plan.directories
                    .iter()
                    .map(|d| (&d.path, ItemKind::Directory, d.size)),
            );

        for (path, kind, size) in items {
            match self.apply(&planner, path, kind) {
                Ok(action) => report.record(ItemOutcome {
                    path: path.clone(),
                    kind,
                    size,
                    action,
                }),
                Err(source) => {
                    return Err(ExecuteError {
                        completed: report,
                        source,
                    });
                }
            }
        }

        if let Some(target) = &self.archive {
            if let Err(source) = self.finish_archive(target, &mut report) {
                return Err(ExecuteError {
                    completed: report,
                    source,
                });
            }
        }

        info!(
            dry_run = self.dry_run,
            files = report.files_removed,
            dirs = report.dirs_removed,
            bytes = report.bytes_freed,
            "execution finished"
        );
        Ok(report)
    }

    fn apply(
        &self,
        planner: &RelocationPlanner,
        path: &Path,
        kind: ItemKind,
    ) -> Result<Action, SweepError> {
        let relocation = planner.plan_destination(path)?;
        let action = match &relocation {
            Relocation::Delete if self.use_trash => Action::Trash,
            Relocation::Delete => Action::Delete,
            Relocation::Archive { destination } => Action::Archive {
                destination: destination.clone(),
            },
        };

        if self.dry_run {
            return Ok(action);
        }

        match &action {
            Action::Delete => remove_item(path, false)?,
            Action::Trash => remove_item(path, true)?,
            Action::Archive { destination } => {
                relocation.prepare()?;
                move_item(path, destination)?;
            }
        }
        debug!(path = %path.display(), ?kind, action = action.verb(), "applied");

        Ok(action)
    }

    fn finish_archive(
        &self,
        target: &ArchiveTarget,
        report: &mut ExecutionReport,
    ) -> Result<(), SweepError> {
        if report.items.is_empty() {
            return Ok(());
        }

        let folder = target.folder();
        if self.dry_run {
            report.archive = Some(ArchiveOutput {
                folder,
                container: self.compression.map(|format| target.container(format)),
            });
            return Ok(());
        }

        report.archive = Some(ArchiveOutput {
            folder,
            container: None,
        });
        if let Some(format) = self.compression {
            let container = write_archive(target, format)?;
            if let Some(archive) = report.archive.as_mut() {
                archive.container = Some(container);
            }
            remove_archive_folder(target)?;
        }
        Ok(())
    }
}
