//! Core library for `tune_transporter`.
//!
//! Takes an album folder that slskd finished downloading, reads each track's
//! tags and files the tracks into `<music>/<artist>/<album>/<NN - title>.<ext>`,
//! then removes the emptied download folder.
//!
//! Layout:
//! - `track`, `naming`, `plan`: the data model and pure path computation
//! - `transfer`, `cleanup`, `fs_ops`: everything that mutates the filesystem
//! - `tags`, `event`, `source`, `stdin`, `notify`: replaceable edges
//! - `orchestrator`: one end-to-end run
//! - `config`, `cli`, `output`, `platform`, `shutdown`: application plumbing

pub mod cleanup;
pub mod cli;
pub mod config;
pub mod errors;
pub mod event;
pub mod fs_ops;
pub mod naming;
pub mod notify;
pub mod orchestrator;
pub mod output;
pub mod plan;
pub mod platform;
pub mod shutdown;
pub mod source;
pub mod stdin;
pub mod tags;
pub mod track;
pub mod transfer;
mod utils;

pub use cleanup::{CleanupOutcome, DirectoryCleanup};
pub use config::{
    default_config_path, default_log_path, path_has_symlink_ancestor, AudioExtensions, Config,
    ConfigLayer, LogLevel,
};
pub use errors::TransporterError;
pub use event::{parse_event, SlskdEvent};
pub use naming::PathBuilder;
pub use notify::{Notifier, TracingNotifier, TransferEvent};
pub use orchestrator::{Orchestrator, RunSummary, Stage};
pub use plan::{build_plans, TransferPlan};
pub use source::{Resolution, SourceResolver};
pub use tags::{LoftyTagReader, TagReader};
pub use track::{TrackRecord, TrackTags};
pub use transfer::{ExecutorOptions, MovedFile, TransferExecutor, TransferReport};
