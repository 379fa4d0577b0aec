//! Core configuration types.
//! - Config holds the resolved runtime settings.
//! - ConfigLayer is one partially-filled source (XML, environment, CLI) before resolution.
//! - LogLevel represents verbosity with simple parsing helpers.
//! - AudioExtensions is the normalised set of file extensions treated as audio.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::{DEFAULT_STDIN_SENTINEL, DEFAULT_STDIN_TIMEOUT};
use crate::errors::TransporterError;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Recognised audio extensions, stored lowercase with a leading dot (".flac").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioExtensions(Vec<String>);

impl AudioExtensions {
    /// Parse a whitespace- or comma-separated list such as ".flac .mp3, m4a".
    pub fn parse_list(s: &str) -> Self {
        s.split(|c: char| c.is_whitespace() || c == ',').collect()
    }

    fn normalize(raw: &str) -> Option<String> {
        let trimmed = raw.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            None
        } else {
            Some(format!(".{}", trimmed.to_ascii_lowercase()))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True when the path's extension is one of ours (case-insensitive).
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let dotted = format!(".{}", e.to_ascii_lowercase());
                self.0.iter().any(|known| *known == dotted)
            })
            .unwrap_or(false)
    }
}

impl<S: AsRef<str>> FromIterator<S> for AudioExtensions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut out: Vec<String> = Vec::new();
        for raw in iter {
            if let Some(ext) = Self::normalize(raw.as_ref()) {
                if !out.contains(&ext) {
                    out.push(ext);
                }
            }
        }
        AudioExtensions(out)
    }
}

impl fmt::Display for AudioExtensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Runtime configuration used by the transporter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root under which slskd places completed download directories
    pub downloads_path: PathBuf,
    /// Root of the artist/album music library
    pub music_path: PathBuf,
    /// Extensions treated as audio for discovery and cleanup
    pub audio_extensions: AudioExtensions,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// If true, validate and log but do not modify the filesystem
    pub dry_run: bool,
    /// If true, preserve permissions and timestamps on cross-device copies
    pub preserve_metadata: bool,
    /// If true, move already-transferred files back when a batch fails mid-way
    pub rollback_on_failure: bool,
    /// Upper bound on waiting for an event on stdin
    pub stdin_timeout: Duration,
    /// Line that terminates event input on stdin
    pub stdin_sentinel: String,
}

impl Config {
    /// Construct a Config with explicit roots and extensions; other fields use defaults.
    pub fn new(
        downloads_path: impl Into<PathBuf>,
        music_path: impl Into<PathBuf>,
        audio_extensions: AudioExtensions,
    ) -> Self {
        Self {
            downloads_path: downloads_path.into(),
            music_path: music_path.into(),
            audio_extensions,
            log_level: LogLevel::default(),
            log_file: None,
            dry_run: false,
            preserve_metadata: false,
            rollback_on_failure: false,
            stdin_timeout: DEFAULT_STDIN_TIMEOUT,
            stdin_sentinel: DEFAULT_STDIN_SENTINEL.to_string(),
        }
    }
}

/// One partially-specified configuration source.
/// Layers are stacked with `overlay`; later (higher precedence) values win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigLayer {
    pub downloads_path: Option<PathBuf>,
    pub music_path: Option<PathBuf>,
    pub audio_extensions: Option<AudioExtensions>,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<PathBuf>,
    pub dry_run: Option<bool>,
    pub preserve_metadata: Option<bool>,
    pub rollback_on_failure: Option<bool>,
    pub stdin_timeout: Option<Duration>,
    pub stdin_sentinel: Option<String>,
}

impl ConfigLayer {
    /// Stack `higher` on top of `self`.
    pub fn overlay(self, higher: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            downloads_path: higher.downloads_path.or(self.downloads_path),
            music_path: higher.music_path.or(self.music_path),
            audio_extensions: higher.audio_extensions.or(self.audio_extensions),
            log_level: higher.log_level.or(self.log_level),
            log_file: higher.log_file.or(self.log_file),
            dry_run: higher.dry_run.or(self.dry_run),
            preserve_metadata: higher.preserve_metadata.or(self.preserve_metadata),
            rollback_on_failure: higher.rollback_on_failure.or(self.rollback_on_failure),
            stdin_timeout: higher.stdin_timeout.or(self.stdin_timeout),
            stdin_sentinel: higher.stdin_sentinel.or(self.stdin_sentinel),
        }
    }

    /// Turn the merged layer into a Config. Paths and extensions have no defaults.
    pub fn resolve(self) -> Result<Config, TransporterError> {
        let downloads_path = self
            .downloads_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(TransporterError::ConfigMissing("downloads_path"))?;
        let music_path = self
            .music_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(TransporterError::ConfigMissing("music_path"))?;
        let audio_extensions = self.audio_extensions.unwrap_or_default();
        if audio_extensions.is_empty() {
            return Err(TransporterError::NoAudioExtensions);
        }

        let mut cfg = Config::new(downloads_path, music_path, audio_extensions);
        if let Some(level) = self.log_level {
            cfg.log_level = level;
        }
        cfg.log_file = self.log_file;
        cfg.dry_run = self.dry_run.unwrap_or(false);
        cfg.preserve_metadata = self.preserve_metadata.unwrap_or(false);
        cfg.rollback_on_failure = self.rollback_on_failure.unwrap_or(false);
        if let Some(t) = self.stdin_timeout {
            cfg.stdin_timeout = t;
        }
        if let Some(s) = self.stdin_sentinel {
            cfg.stdin_sentinel = s;
        }
        Ok(cfg)
    }
}
