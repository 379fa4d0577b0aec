//! End-to-end run for one album folder:
//! Discovered -> MetadataLoaded -> PlansBuilt -> Transferred -> CleanedUp,
//! with any failure ending in Aborted.

use anyhow::Result;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::cleanup::{CleanupOutcome, DirectoryCleanup};
use crate::config::Config;
use crate::errors::TransporterError;
use crate::fs_ops::io_error_with_help;
use crate::naming::PathBuilder;
use crate::notify::Notifier;
use crate::plan::{build_plans, TransferPlan};
use crate::shutdown;
use crate::tags::TagReader;
use crate::track::TrackRecord;
use crate::transfer::{ExecutorOptions, TransferExecutor, TransferReport};
use crate::utils::ensure_source_within;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Discovered,
    MetadataLoaded,
    PlansBuilt,
    Transferred,
    CleanedUp,
    Aborted(String),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Discovered => f.write_str("discovered"),
            Stage::MetadataLoaded => f.write_str("metadata-loaded"),
            Stage::PlansBuilt => f.write_str("plans-built"),
            Stage::Transferred => f.write_str("transferred"),
            Stage::CleanedUp => f.write_str("cleaned-up"),
            Stage::Aborted(reason) => write!(f, "aborted ({reason})"),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub source: PathBuf,
    pub stage: Stage,
    pub report: TransferReport,
    pub cleanup: CleanupOutcome,
}

pub struct Orchestrator<'a> {
    config: &'a Config,
    builder: PathBuilder,
    tag_reader: &'a dyn TagReader,
    notifier: &'a dyn Notifier,
    cancelled: fn() -> bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a Config, tag_reader: &'a dyn TagReader, notifier: &'a dyn Notifier) -> Self {
        Self {
            config,
            builder: PathBuilder::new(&config.music_path),
            tag_reader,
            notifier,
            cancelled: shutdown::is_requested,
        }
    }

    /// Replace the shutdown check handed to the executor.
    pub fn with_cancel_check(mut self, cancelled: fn() -> bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    fn enter(&self, stage: &Stage, source: &Path) {
        debug!(stage = %stage, source = %source.display(), "Stage reached");
    }

    fn abort(&self, reason: &str, source: &Path, err: anyhow::Error) -> anyhow::Error {
        let stage = Stage::Aborted(reason.to_string());
        error!(stage = %stage, source = %source.display(), error = %err, "Run aborted");
        err
    }

    /// Process `source_dir` end to end.
    pub fn run(&self, source: &Path) -> Result<RunSummary> {
        info!(source = %source.display(), dry_run = self.config.dry_run, "Processing download");

        let source_dir = self
            .confine(source)
            .map_err(|e| self.abort("unsafe source", source, e))?;
        let source_dir = source_dir.as_path();

        let files = self
            .discover(source_dir)
            .map_err(|e| self.abort("discovery failed", source_dir, e))?;
        self.enter(&Stage::Discovered, source_dir);

        let tracks = self
            .load_tracks(&files)
            .map_err(|e| self.abort("metadata read failed", source_dir, e))?;
        self.enter(&Stage::MetadataLoaded, source_dir);

        let plans = self.plan(tracks);
        self.enter(&Stage::PlansBuilt, source_dir);

        let options = ExecutorOptions {
            dry_run: self.config.dry_run,
            rollback_on_failure: self.config.rollback_on_failure,
            preserve_metadata: self.config.preserve_metadata,
        };
        let report = TransferExecutor::new(self.notifier, options)
            .with_cancel_check(self.cancelled)
            .execute(&plans)
            .map_err(|e| self.abort("transfer failed", source_dir, e))?;
        self.enter(&Stage::Transferred, source_dir);

        let mut cleanup = DirectoryCleanup::new(&self.config.audio_extensions, self.notifier, self.config.dry_run);
        if self.config.dry_run {
            // Nothing moved, so the planned sources are still on disk.
            cleanup = cleanup.assume_moved(report.moved.iter().map(|m| m.from.clone()));
        }
        let cleanup = cleanup
            .run(source_dir)
            .map_err(|e| self.abort("cleanup failed", source_dir, e))?;
        let stage = match &cleanup {
            CleanupOutcome::Aborted { .. } => Stage::Aborted("audio files remain in source".into()),
            _ => Stage::CleanedUp,
        };
        self.enter(&stage, source_dir);

        Ok(RunSummary {
            source: source_dir.to_path_buf(),
            stage,
            report,
            cleanup,
        })
    }

    /// The canonical source directory, which must exist and lie strictly
    /// inside the downloads root.
    fn confine(&self, source: &Path) -> Result<PathBuf> {
        if !source.is_dir() {
            return Err(TransporterError::SourceDirMissing(source.to_path_buf()).into());
        }
        ensure_source_within(&self.config.downloads_path, &self.config.music_path, source)
    }

    /// Immediate regular files of `source_dir` with a recognized extension, sorted by path.
    pub fn discover(&self, source_dir: &Path) -> Result<Vec<PathBuf>> {
        if !source_dir.is_dir() {
            return Err(TransporterError::SourceDirMissing(source_dir.to_path_buf()).into());
        }

        let mut audio = Vec::new();
        let mut others = 0usize;
        for entry in fs::read_dir(source_dir).map_err(io_error_with_help("read source directory", source_dir))? {
            let entry = entry.map_err(io_error_with_help("read source directory", source_dir))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let path = entry.path();
            if self.config.audio_extensions.matches(&path) {
                audio.push(path);
            } else {
                others += 1;
            }
        }

        if audio.is_empty() {
            return Err(TransporterError::NoAudioFiles(source_dir.to_path_buf()).into());
        }
        audio.sort();
        debug!(audio = audio.len(), ignored = others, "Discovered files");
        Ok(audio)
    }

    /// Read tags for every file; the first failure aborts. Result is ordered by
    /// (disc, track, file name).
    pub fn load_tracks(&self, files: &[PathBuf]) -> Result<Vec<TrackRecord>> {
        let mut tracks = Vec::with_capacity(files.len());
        for path in files {
            let tags = self.tag_reader.read_tags(path)?;
            tracks.push(TrackRecord::new(path, tags)?);
        }
        tracks.sort_by(|a, b| {
            (a.disc_number(), a.track_number(), a.file_name()).cmp(&(
                b.disc_number(),
                b.track_number(),
                b.file_name(),
            ))
        });
        Ok(tracks)
    }

    pub fn plan(&self, tracks: Vec<TrackRecord>) -> Vec<TransferPlan> {
        let plans = build_plans(tracks, &self.builder);
        for p in &plans {
            debug!(src = %p.previous_path().display(), dest = %p.destination_path().display(), "Planned");
        }
        plans
    }
}
