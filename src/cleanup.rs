//! Removal of the source directory after a successful transfer.
//! The directory is only deleted when none of its immediate files is a
//! recognized audio file; leftovers such as cover art or .nfo files go with it.

use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::AudioExtensions;
use crate::fs_ops::io_error_with_help;
use crate::notify::{emit, Notifier, TransferEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Nothing to do; the directory was already gone.
    Missing,
    /// Directory deleted (or would have been, in dry-run mode).
    Removed,
    /// Audio files are still present; nothing was deleted.
    Aborted { remaining: Vec<PathBuf> },
}

pub struct DirectoryCleanup<'a> {
    extensions: &'a AudioExtensions,
    notifier: &'a dyn Notifier,
    dry_run: bool,
    assumed_moved: HashSet<PathBuf>,
}

impl<'a> DirectoryCleanup<'a> {
    pub fn new(extensions: &'a AudioExtensions, notifier: &'a dyn Notifier, dry_run: bool) -> Self {
        Self {
            extensions,
            notifier,
            dry_run,
            assumed_moved: HashSet::new(),
        }
    }

    /// Treat `paths` as already gone when looking for leftover audio. A dry
    /// run passes the files it would have moved.
    pub fn assume_moved(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.assumed_moved.extend(paths);
        self
    }

    pub fn run(&self, directory: &Path) -> Result<CleanupOutcome> {
        if !directory.exists() {
            info!(dir = %directory.display(), "Source directory already gone");
            return Ok(CleanupOutcome::Missing);
        }

        let remaining = self.remaining_audio(directory)?;
        if !remaining.is_empty() {
            emit(
                self.notifier,
                TransferEvent::CleanupAborted {
                    dir: directory.to_path_buf(),
                    remaining: remaining.clone(),
                },
            );
            return Ok(CleanupOutcome::Aborted { remaining });
        }

        let leftovers = count_files(directory);
        if self.dry_run {
            info!(dir = %directory.display(), leftovers, "dry-run: would remove source directory");
            return Ok(CleanupOutcome::Removed);
        }

        debug!(dir = %directory.display(), leftovers, "Removing source directory and non-audio leftovers");
        fs::remove_dir_all(directory).map_err(io_error_with_help("remove directory", directory))?;
        emit(
            self.notifier,
            TransferEvent::CleanedUp {
                dir: directory.to_path_buf(),
            },
        );
        Ok(CleanupOutcome::Removed)
    }

    /// Immediate regular files whose extension is recognized, sorted.
    fn remaining_audio(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let entries = fs::read_dir(directory).map_err(io_error_with_help("read directory", directory))?;
        for entry in entries {
            let entry = entry.map_err(io_error_with_help("read directory entry", directory))?;
            let path = entry.path();
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false)
                && self.extensions.matches(&path)
                && !self.assumed_moved.contains(&path)
            {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }
}

/// Regular files anywhere below `dir` (cover art, cue sheets, nested scans).
fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}
