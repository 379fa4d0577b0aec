//! Source directory resolution.
//!
//! The album folder to process comes from one of four front ends: an explicit
//! path, an inline slskd event, an event read from stdin, or an interactive
//! pick from the downloads root.

use anyhow::Result;
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::event::parse_event;
use crate::fs_ops::io_error_with_help;
use crate::stdin::read_stdin_with_timeout;

/// Environment variable slskd sets for script integrations.
pub const SLSKD_SCRIPT_DATA_ENV: &str = "SLSKD_SCRIPT_DATA";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceResolver {
    Explicit(PathBuf),
    Event(String),
    EventStdin { timeout: Duration, sentinel: String },
    Interactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Selected(PathBuf),
    /// The user backed out of the interactive menu.
    Cancelled,
}

impl SourceResolver {
    /// Interactive mode unless `SLSKD_SCRIPT_DATA` carries an event.
    pub fn from_env_or_interactive() -> Self {
        match env::var(SLSKD_SCRIPT_DATA_ENV) {
            Ok(data) if !data.trim().is_empty() => {
                debug!("Using event from {}", SLSKD_SCRIPT_DATA_ENV);
                SourceResolver::Event(data)
            }
            _ => SourceResolver::Interactive,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            SourceResolver::Explicit(_) => "explicit path",
            SourceResolver::Event(_) => "event",
            SourceResolver::EventStdin { .. } => "event on stdin",
            SourceResolver::Interactive => "interactive",
        }
    }

    /// Resolve against the process's stdin/stdout.
    pub fn resolve(&self, downloads_root: &Path) -> Result<Resolution> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.resolve_with(downloads_root, stdin.lock(), stdout.lock())
    }

    /// Resolve using the given terminal streams (only the interactive mode uses them).
    pub fn resolve_with<R: BufRead, W: Write>(
        &self,
        downloads_root: &Path,
        input: R,
        output: W,
    ) -> Result<Resolution> {
        let res = match self {
            SourceResolver::Explicit(path) => {
                Resolution::Selected(resolve_explicit(downloads_root, path))
            }
            SourceResolver::Event(json) => {
                Resolution::Selected(parse_event(json)?.source_directory(downloads_root)?)
            }
            SourceResolver::EventStdin { timeout, sentinel } => {
                let json = read_stdin_with_timeout(*timeout, sentinel)?;
                Resolution::Selected(parse_event(&json)?.source_directory(downloads_root)?)
            }
            SourceResolver::Interactive => select_interactively(downloads_root, input, output)?,
        };
        if let Resolution::Selected(p) = &res {
            info!(source = %p.display(), via = self.describe(), "Resolved source directory");
        }
        Ok(res)
    }
}

/// Absolute paths are used as given. A relative path is taken from the current
/// directory when it exists there, otherwise from the downloads root.
fn resolve_explicit(downloads_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }
    downloads_root.join(path)
}

/// Immediate subdirectories of `root`, sorted by name.
pub fn list_download_directories(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).map_err(io_error_with_help("read downloads directory", root))? {
        let entry = entry.map_err(io_error_with_help("read downloads directory", root))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            dirs.push(entry.path());
        }
    }
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(dirs)
}

/// Print a numbered menu of download folders and read a choice.
/// An empty line (or end of input) cancels; anything that is not a listed
/// index re-prompts.
pub fn select_interactively<R: BufRead, W: Write>(
    downloads_root: &Path,
    mut input: R,
    mut output: W,
) -> Result<Resolution> {
    let dirs = list_download_directories(downloads_root)?;
    if dirs.is_empty() {
        writeln!(output, "No directories found in {}", downloads_root.display())?;
        return Ok(Resolution::Cancelled);
    }

    for (i, d) in dirs.iter().enumerate() {
        let name = d.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        writeln!(output, "({i}) {name}")?;
    }
    writeln!(output, "\nChoose a directory or ENTER to exit:")?;
    output.flush()?;

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output, "Exiting...")?;
            return Ok(Resolution::Cancelled);
        }
        let choice = line.trim();
        if choice.is_empty() {
            writeln!(output, "Exiting...")?;
            return Ok(Resolution::Cancelled);
        }
        match choice.parse::<usize>().ok().and_then(|i| dirs.get(i)) {
            Some(dir) => return Ok(Resolution::Selected(dir.clone())),
            None => {
                writeln!(output, "Invalid input. Please enter a number or ENTER to exit.")?;
                output.flush()?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn downloads() -> tempfile::TempDir {
        let td = tempdir().unwrap();
        for d in ["b_album", "a_album", "c_album"] {
            fs::create_dir(td.path().join(d)).unwrap();
        }
        fs::write(td.path().join("stray.flac"), b"x").unwrap();
        td
    }

    #[test]
    fn menu_lists_sorted_directories_only() {
        let td = downloads();
        let mut out = Vec::new();
        let res = select_interactively(td.path(), Cursor::new("1\n"), &mut out).unwrap();
        assert_eq!(res, Resolution::Selected(td.path().join("b_album")));
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("(0) a_album\n(1) b_album\n(2) c_album\n"));
        assert!(!text.contains("stray"));
    }

    #[test]
    fn empty_line_cancels() {
        let td = downloads();
        let mut out = Vec::new();
        let res = select_interactively(td.path(), Cursor::new("\n"), &mut out).unwrap();
        assert_eq!(res, Resolution::Cancelled);
    }

    #[test]
    fn invalid_input_reprompts() {
        let td = downloads();
        let mut out = Vec::new();
        let res = select_interactively(td.path(), Cursor::new("x\n9\n2\n"), &mut out).unwrap();
        assert_eq!(res, Resolution::Selected(td.path().join("c_album")));
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Invalid input").count(), 2);
    }

    #[test]
    fn eof_cancels() {
        let td = downloads();
        let res = select_interactively(td.path(), Cursor::new(""), Vec::new()).unwrap();
        assert_eq!(res, Resolution::Cancelled);
    }

    #[test]
    fn event_resolves_under_downloads_root() {
        let json = r#"{"type":"DownloadDirectoryComplete","version":0,
            "localDirectoryName":"/remote/path/My Album","remoteDirectoryName":"x",
            "username":"u","id":"00000000-0000-0000-0000-000000000001",
            "timestamp":"2024-01-01T00:00:00Z"}"#;
        let res = SourceResolver::Event(json.into())
            .resolve_with(Path::new("/dl"), Cursor::new(""), Vec::new())
            .unwrap();
        assert_eq!(res, Resolution::Selected(PathBuf::from("/dl/My Album")));
    }

    #[test]
    fn relative_explicit_path_falls_back_to_downloads_root() {
        let res = SourceResolver::Explicit(PathBuf::from("surely-not-in-cwd-album"))
            .resolve_with(Path::new("/dl"), Cursor::new(""), Vec::new())
            .unwrap();
        assert_eq!(res, Resolution::Selected(PathBuf::from("/dl/surely-not-in-cwd-album")));
    }

    #[test]
    #[serial]
    fn script_data_env_selects_event_mode() {
        unsafe { env::set_var(SLSKD_SCRIPT_DATA_ENV, "{}") };
        let r = SourceResolver::from_env_or_interactive();
        unsafe { env::remove_var(SLSKD_SCRIPT_DATA_ENV) };
        assert_eq!(r, SourceResolver::Event("{}".into()));
        assert_eq!(SourceResolver::from_env_or_interactive(), SourceResolver::Interactive);
    }
}
