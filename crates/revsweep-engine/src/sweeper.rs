//! The sweep pipeline.

use std::time::Instant;

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use revsweep_analyze::{LegacyCollector, RetentionConfig, RetentionSelector};
use revsweep_core::{CleanupPlan, SweepConfig, SweepError};
use revsweep_ops::{ExecuteError, ExecutionReport, Executor, STAMP_FORMAT};
use revsweep_scan::TreeScanner;

/// Errors from a sweep run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Planning failed; nothing was touched.
    #[error(transparent)]
    Sweep(#[from] SweepError),

    /// Execution stopped part-way.
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

impl EngineError {
    /// Whether the error stems from user input rather than the filesystem.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Self::Sweep(err) => err.is_invalid_input(),
            Self::Execute(_) => false,
        }
    }

    /// Items applied before an execution failure.
    pub fn completed(&self) -> Option<&ExecutionReport> {
        match self {
            Self::Sweep(_) => None,
            Self::Execute(err) => Some(&err.completed),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "execution", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// The plan was empty; the filesystem was not touched.
    NothingToDo,
    /// Confirmation was refused.
    Declined,
    /// The plan was executed (or simulated, in a dry run).
    Completed(ExecutionReport),
}

/// Plan and outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub plan: CleanupPlan,
    pub outcome: SweepOutcome,
}

impl SweepReport {
    /// The execution report, when the plan ran.
    pub fn execution(&self) -> Option<&ExecutionReport> {
        match &self.outcome {
            SweepOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// Runs scan, selection and execution for one config.
#[derive(Debug, Clone)]
pub struct Sweeper {
    config: SweepConfig,
    stamp: Option<String>,
}

impl Sweeper {
    /// Create a sweeper. The archive folder is stamped with the local time
    /// at execution unless [`with_archive_stamp`](Self::with_archive_stamp)
    /// fixes it.
    pub fn new(config: SweepConfig) -> Self {
        Self {
            config,
            stamp: None,
        }
    }

    /// Use a fixed `YYYYMMDDHHMMSS` stamp for the archive folder.
    pub fn with_archive_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.stamp = Some(stamp.into());
        self
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Scan the tree and decide what is old. Read-only.
    pub fn plan(&self) -> Result<CleanupPlan, SweepError> {
        let start = Instant::now();
        let scan = TreeScanner::from_config(&self.config).scan_config(&self.config)?;

        let mut plan = CleanupPlan::new(&scan.root);
        plan.warnings = scan.warnings;

        let selector = RetentionSelector::with_config(RetentionConfig::from_sweep(&self.config));
        for bucket in &scan.buckets {
            let selection = selector.select(bucket)?;
            debug!(
                dir = %bucket.path.display(),
                old = selection.old.len(),
                skipped = selection.skipped.len(),
                "bucket analysed"
            );
            plan.files.extend(selection.old);
            plan.skipped.extend(selection.skipped);
        }

        if self.config.legacy {
            let legacy = LegacyCollector::new(self.config.legacy_sizing).collect(&scan.legacy_dirs)?;
            plan.directories = legacy.directories;
        }

        info!(
            root = %plan.root.display(),
            files = plan.file_count(),
            dirs = plan.dir_count(),
            bytes = plan.total_bytes(),
            skipped = plan.skipped.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "plan ready"
        );
        Ok(plan)
    }

    /// Apply a plan with this sweeper's settings.
    pub fn execute(&self, plan: &CleanupPlan) -> Result<ExecutionReport, ExecuteError> {
        let stamp = self
            .stamp
            .clone()
            .unwrap_or_else(|| Local::now().format(STAMP_FORMAT).to_string());
        Executor::from_config(&self.config, stamp).execute(plan)
    }

    /// Plan, confirm and execute.
    ///
    /// An empty plan returns [`SweepOutcome::NothingToDo`] without calling
    /// `confirm`. Dry runs never ask.
    pub fn run_with<F>(&self, confirm: F) -> Result<SweepReport, EngineError>
    where
        F: FnOnce(&CleanupPlan) -> bool,
    {
        let plan = self.plan()?;

        if plan.is_empty() {
            info!("nothing to clean");
            return Ok(SweepReport {
                plan,
                outcome: SweepOutcome::NothingToDo,
            });
        }

        if !self.config.dry_run && !confirm(&plan) {
            info!("sweep declined");
            return Ok(SweepReport {
                plan,
                outcome: SweepOutcome::Declined,
            });
        }

        let execution = self.execute(&plan)?;
        Ok(SweepReport {
            plan,
            outcome: SweepOutcome::Completed(execution),
        })
    }

    /// Plan and execute without asking.
    pub fn run(&self) -> Result<SweepReport, EngineError> {
        self.run_with(|_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("shots/e1");
        fs::create_dir_all(&dir).unwrap();
        for v in 1..=3 {
            fs::write(dir.join(format!("scene_v00{v}.blend")), "x").unwrap();
        }
        temp
    }

    fn config(root: &std::path::Path, keep: usize) -> SweepConfig {
        SweepConfig::builder().root(root).keep(keep).build().unwrap()
    }

    #[test]
    fn test_empty_plan_skips_confirmation() {
        let temp = tree();
        let sweeper = Sweeper::new(config(temp.path(), 5));

        let report = sweeper
            .run_with(|_| panic!("confirmation must not be asked"))
            .unwrap();
        assert!(matches!(report.outcome, SweepOutcome::NothingToDo));
    }

    #[test]
    fn test_declined_leaves_tree() {
        let temp = tree();
        let sweeper = Sweeper::new(config(temp.path(), 1));

        let report = sweeper.run_with(|plan| {
            assert_eq!(plan.file_count(), 2);
            false
        });
        assert!(matches!(report.unwrap().outcome, SweepOutcome::Declined));
        assert!(temp.path().join("shots/e1/scene_v001.blend").exists());
    }

    #[test]
    fn test_run_deletes_old_versions() {
        let temp = tree();
        let report = Sweeper::new(config(temp.path(), 1)).run().unwrap();

        let execution = report.execution().unwrap();
        assert_eq!(execution.files_removed, 2);
        assert!(!temp.path().join("shots/e1/scene_v001.blend").exists());
        assert!(temp.path().join("shots/e1/scene_v003.blend").exists());
    }

    #[test]
    fn test_file_root_is_invalid_input() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.blend");
        fs::write(&file, "x").unwrap();

        let err = Sweeper::new(config(&file, 1)).run().unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.completed().is_none());
    }

    #[test]
    fn test_outcome_json_shape() {
        let value = serde_json::to_value(SweepOutcome::NothingToDo).unwrap();
        assert_eq!(value["status"], "nothing_to_do");
    }
}
