//! Typed error definitions for tune_transporter.
//! Provides a small set of well-known failure modes for better logs and tests.
//! Functions return `anyhow::Result`; callers downcast to `TransporterError`
//! when they need the kind (exit handling, structured log fields).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransporterError {
    #[error("Required configuration value not set: {0}")]
    ConfigMissing(&'static str),

    #[error("No audio file extensions configured")]
    NoAudioExtensions,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Event input was empty")]
    EventEmpty,

    #[error("Could not parse event: {0}")]
    EventParse(String),

    #[error("Source directory not found: {0}")]
    SourceDirMissing(PathBuf),

    #[error("No audio files found in directory: {0}")]
    NoAudioFiles(PathBuf),

    #[error("Refusing to process {path}: {reason}")]
    UnsafeSource { path: PathBuf, reason: String },

    #[error("Unable to read metadata from {path}: {reason}")]
    MetadataRead { path: PathBuf, reason: String },

    #[error("Source file does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("A file already exists at destination: {0}")]
    DestinationCollision(PathBuf),

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl TransporterError {
    /// Stable numeric code for structured logs.
    pub fn code(&self) -> u16 {
        match self {
            TransporterError::ConfigMissing(_) => 10,
            TransporterError::NoAudioExtensions => 11,
            TransporterError::InvalidConfig(_) => 12,
            TransporterError::EventEmpty => 20,
            TransporterError::EventParse(_) => 21,
            TransporterError::SourceDirMissing(_) => 30,
            TransporterError::NoAudioFiles(_) => 31,
            TransporterError::MetadataRead { .. } => 32,
            TransporterError::UnsafeSource { .. } => 33,
            TransporterError::SourceMissing(_) => 40,
            TransporterError::DestinationCollision(_) => 41,
            TransporterError::Interrupted => 130,
        }
    }

    /// Short machine-friendly kind label.
    pub fn kind(&self) -> &'static str {
        match self {
            TransporterError::ConfigMissing(_) => "config_missing",
            TransporterError::NoAudioExtensions => "no_audio_extensions",
            TransporterError::InvalidConfig(_) => "invalid_config",
            TransporterError::EventEmpty => "event_empty",
            TransporterError::EventParse(_) => "event_parse",
            TransporterError::SourceDirMissing(_) => "source_dir_missing",
            TransporterError::NoAudioFiles(_) => "no_audio_files",
            TransporterError::MetadataRead { .. } => "metadata_read",
            TransporterError::UnsafeSource { .. } => "unsafe_source",
            TransporterError::SourceMissing(_) => "source_missing",
            TransporterError::DestinationCollision(_) => "destination_collision",
            TransporterError::Interrupted => "interrupted",
        }
    }
}
