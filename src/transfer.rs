//! Transfer executor.
//!
//! Two phases per batch:
//! 1. pre-check every plan (source present, destination vacant, no two plans
//!    sharing a destination) before anything is touched;
//! 2. execute sequentially, re-checking each plan right before it mutates,
//!    creating artist/album directories on demand.
//!
//! Execution is fail-fast: the first error stops the batch. Files already moved
//! stay where they are unless `rollback_on_failure` is set.

use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::errors::TransporterError;
use crate::fs_ops::{io_error_with_help, move_file, MoveMethod};
use crate::notify::{emit, Notifier, TransferEvent};
use crate::plan::TransferPlan;
use crate::shutdown;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Validate and log, but create and move nothing.
    pub dry_run: bool,
    /// On a failed batch, move already-transferred files back.
    pub rollback_on_failure: bool,
    /// Keep timestamps and permissions when a move has to copy.
    pub preserve_metadata: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedFile {
    pub from: PathBuf,
    pub to: PathBuf,
    /// `None` in dry-run mode.
    pub method: Option<MoveMethod>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub moved: Vec<MovedFile>,
    /// Plans whose file was already at its destination.
    pub skipped: Vec<PathBuf>,
    pub created_directories: Vec<PathBuf>,
}

pub struct TransferExecutor<'a> {
    notifier: &'a dyn Notifier,
    options: ExecutorOptions,
    cancelled: fn() -> bool,
}

fn path_occupied(p: &Path) -> bool {
    // symlink_metadata so a dangling link also counts as occupied.
    fs::symlink_metadata(p).is_ok()
}

fn source_present(p: &Path) -> bool {
    fs::metadata(p).map(|m| m.is_file()).unwrap_or(false)
}

impl<'a> TransferExecutor<'a> {
    pub fn new(notifier: &'a dyn Notifier, options: ExecutorOptions) -> Self {
        Self {
            notifier,
            options,
            cancelled: shutdown::is_requested,
        }
    }

    /// Replace the shutdown check consulted between plans.
    pub fn with_cancel_check(mut self, cancelled: fn() -> bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    /// Validate and execute `plans` in order.
    pub fn execute(&self, plans: &[TransferPlan]) -> Result<TransferReport> {
        let skip = self.precheck(plans)?;
        let mut report = TransferReport::default();
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();

        for (plan, skip) in plans.iter().zip(skip) {
            if skip {
                emit(
                    self.notifier,
                    TransferEvent::Skipped {
                        path: plan.previous_path().to_path_buf(),
                    },
                );
                report.skipped.push(plan.previous_path().to_path_buf());
                continue;
            }

            if let Err(e) = self.execute_one(plan, &mut report, &mut seen_dirs) {
                error!(
                    src = %plan.previous_path().display(),
                    dest = %plan.destination_path().display(),
                    error = %e,
                    "Transfer failed; stopping batch"
                );
                if self.options.rollback_on_failure && !self.options.dry_run {
                    self.rollback(&report);
                }
                return Err(e);
            }
        }

        info!(
            moved = report.moved.len(),
            skipped = report.skipped.len(),
            dry_run = self.options.dry_run,
            "Transfer batch complete"
        );
        Ok(report)
    }

    /// Phase 1. Returns a skip flag per plan (true = already in place).
    fn precheck(&self, plans: &[TransferPlan]) -> Result<Vec<bool>> {
        let mut claimed: HashSet<&Path> = HashSet::new();
        let mut skip = Vec::with_capacity(plans.len());

        for plan in plans {
            let src = plan.previous_path();
            let dest = plan.destination_path();

            if !source_present(src) {
                return Err(self.reject(src, TransporterError::SourceMissing(src.to_path_buf())));
            }
            if plan.is_noop() {
                claimed.insert(dest);
                skip.push(true);
                continue;
            }
            if path_occupied(dest) {
                return Err(self.reject(src, TransporterError::DestinationCollision(dest.to_path_buf())));
            }
            if !claimed.insert(dest) {
                return Err(self.reject(src, TransporterError::DestinationCollision(dest.to_path_buf())));
            }
            skip.push(false);
        }

        debug!(plans = plans.len(), "Batch pre-check passed");
        Ok(skip)
    }

    fn reject(&self, src: &Path, err: TransporterError) -> anyhow::Error {
        debug!(src = %src.display(), code = err.code(), "Rejecting move");
        emit(
            self.notifier,
            TransferEvent::Rejected {
                path: src.to_path_buf(),
                reason: err.to_string(),
            },
        );
        err.into()
    }

    /// Phase 2 for a single plan.
    fn execute_one(
        &self,
        plan: &TransferPlan,
        report: &mut TransferReport,
        seen_dirs: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        if (self.cancelled)() {
            warn!("Shutdown requested; stopping before next file");
            return Err(TransporterError::Interrupted.into());
        }

        let src = plan.previous_path();
        let dest = plan.destination_path();

        if !self.options.dry_run {
            if !source_present(src) {
                return Err(self.reject(src, TransporterError::SourceMissing(src.to_path_buf())));
            }
            if path_occupied(dest) {
                return Err(self.reject(src, TransporterError::DestinationCollision(dest.to_path_buf())));
            }
        }

        self.ensure_directory(plan.artist_directory(), report, seen_dirs)?;
        self.ensure_directory(plan.album_directory(), report, seen_dirs)?;

        if self.options.dry_run {
            info!(src = %src.display(), dest = %dest.display(), "dry-run: would move file");
            report.moved.push(MovedFile {
                from: src.to_path_buf(),
                to: dest.to_path_buf(),
                method: None,
            });
            return Ok(());
        }

        let method = move_file(src, dest, self.options.preserve_metadata)?;
        debug!(src = %src.display(), method = ?method, "Move method");
        emit(
            self.notifier,
            TransferEvent::Moved {
                from: src.to_path_buf(),
                to: dest.to_path_buf(),
            },
        );
        report.moved.push(MovedFile {
            from: src.to_path_buf(),
            to: dest.to_path_buf(),
            method: Some(method),
        });
        Ok(())
    }

    fn ensure_directory(
        &self,
        dir: &Path,
        report: &mut TransferReport,
        seen_dirs: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        if !seen_dirs.insert(dir.to_path_buf()) || dir.is_dir() {
            return Ok(());
        }

        if self.options.dry_run {
            info!(path = %dir.display(), "dry-run: would create directory");
        } else {
            fs::create_dir_all(dir).map_err(io_error_with_help("create directory", dir))?;
            emit(
                self.notifier,
                TransferEvent::DirectoryCreated {
                    path: dir.to_path_buf(),
                },
            );
        }
        report.created_directories.push(dir.to_path_buf());
        Ok(())
    }

    /// Best-effort undo of a partially executed batch, newest move first.
    /// Problems are logged; the caller still returns the original failure.
    fn rollback(&self, report: &TransferReport) {
        warn!(count = report.moved.len(), "Rolling back moved files");
        for moved in report.moved.iter().rev() {
            if path_occupied(&moved.from) {
                error!(path = %moved.from.display(), "Rollback target is occupied; leaving file at destination");
                continue;
            }
            match move_file(&moved.to, &moved.from, self.options.preserve_metadata) {
                Ok(_) => info!(src = %moved.to.display(), dest = %moved.from.display(), "Rolled back"),
                Err(e) => error!(
                    src = %moved.to.display(),
                    dest = %moved.from.display(),
                    error = %e,
                    "Rollback failed"
                ),
            }
        }
        // Only empty directories go; remove_dir refuses anything else.
        for dir in report.created_directories.iter().rev() {
            if fs::remove_dir(dir).is_ok() {
                debug!(path = %dir.display(), "Removed directory created by failed batch");
            }
        }
    }
}
