//! CLI definition and parsing.
//!
//! Notes:
//! - `--source` takes precedence over the positional SOURCE_DIR.
//! - `--debug` is a shorthand for `--log-level debug`.
//! - With no source, event or stdin flag the event falls back to
//!   `SLSKD_SCRIPT_DATA`, then to the interactive menu.

use clap::{Parser, ValueHint};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{AudioExtensions, ConfigLayer, LogLevel};
use crate::source::SourceResolver;

/// Files a finished slskd download into `<music>/<artist>/<album>/` using the tracks' tags.
/// CLI flags override environment variables, which override config.xml.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "File completed slskd downloads into an artist/album music library")]
pub struct Args {
    /// Album directory to process.
    #[arg(value_name = "SOURCE_DIR", value_hint = ValueHint::DirPath)]
    pub source_pos: Option<PathBuf>,

    #[arg(
        long = "source",
        short = 's',
        value_name = "PATH",
        value_hint = ValueHint::DirPath,
        help = "Album directory to process (overrides positional)"
    )]
    pub source: Option<PathBuf>,

    #[arg(
        long,
        value_name = "JSON",
        conflicts_with_all = ["event_stdin", "source", "source_pos"],
        help = "slskd DownloadDirectoryComplete event payload"
    )]
    pub event: Option<String>,

    #[arg(
        long,
        conflicts_with_all = ["source", "source_pos"],
        help = "Read the event payload from stdin (ends at the sentinel line or EOF)"
    )]
    pub event_stdin: bool,

    #[arg(long, value_hint = ValueHint::DirPath, help = "Override the downloads root")]
    pub downloads_path: Option<PathBuf>,

    #[arg(long, value_hint = ValueHint::DirPath, help = "Override the music library root")]
    pub music_path: Option<PathBuf>,

    #[arg(
        long,
        value_name = "LIST",
        help = "Audio extensions, space or comma separated (e.g. \".flac .mp3\")"
    )]
    pub extensions: Option<String>,

    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    #[arg(long, help = "Print the config file location and exit")]
    pub print_config: bool,

    #[arg(long, help = "Show what would be done, but do not modify files/directories")]
    pub dry_run: bool,

    #[arg(long, help = "Move already-transferred files back if the batch fails")]
    pub rollback: bool,

    #[arg(long, help = "Preserve permissions and timestamps when a move has to copy")]
    pub preserve_metadata: bool,

    #[arg(long, value_name = "SECS", help = "How long --event-stdin waits for input")]
    pub stdin_timeout: Option<u64>,

    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

impl Args {
    /// Effective source path: `--source` if provided, else positional SOURCE_DIR.
    pub fn resolved_source(&self) -> Option<PathBuf> {
        self.source
            .as_deref()
            .or(self.source_pos.as_deref())
            .map(sanitize_path)
    }

    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// The CLI's contribution to the config stack. Unset flags stay `None`.
    pub fn to_layer(&self) -> ConfigLayer {
        let flag = |b: bool| b.then_some(true);
        ConfigLayer {
            downloads_path: self.downloads_path.as_deref().map(sanitize_path),
            music_path: self.music_path.as_deref().map(sanitize_path),
            audio_extensions: self.extensions.as_deref().map(AudioExtensions::parse_list),
            log_level: self.effective_log_level(),
            log_file: None,
            dry_run: flag(self.dry_run),
            preserve_metadata: flag(self.preserve_metadata),
            rollback_on_failure: flag(self.rollback),
            stdin_timeout: self.stdin_timeout.map(Duration::from_secs),
            stdin_sentinel: None,
        }
    }

    /// Pick the front end. `stdin_timeout`/`sentinel` come from the resolved config.
    pub fn resolver(&self, stdin_timeout: Duration, sentinel: &str) -> SourceResolver {
        if let Some(path) = self.resolved_source() {
            return SourceResolver::Explicit(path);
        }
        if let Some(json) = &self.event {
            return SourceResolver::Event(json.clone());
        }
        if self.event_stdin {
            return SourceResolver::EventStdin {
                timeout: stdin_timeout,
                sentinel: sentinel.to_string(),
            };
        }
        SourceResolver::from_env_or_interactive()
    }
}

/// Strip surrounding quotes (left behind by some shells and slskd script
/// configs) and a single trailing separator.
fn sanitize_path(p: &Path) -> PathBuf {
    let raw = p.to_string_lossy();
    let trimmed = raw.trim();
    let mut inner = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(trimmed)
        .to_string();

    if inner.len() > 1 && (inner.ends_with('/') || inner.ends_with('\\')) {
        inner.pop();
    }
    PathBuf::from(inner)
}

pub fn parse() -> Args {
    Args::parse()
}
