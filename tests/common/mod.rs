#![allow(dead_code)]

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tune_transporter::{Notifier, TagReader, TrackTags, TransferEvent, TransporterError};

/// Tags keyed by file name; unknown files fail like an unreadable tag block.
#[derive(Default)]
pub struct MapTagReader {
    tags: HashMap<String, TrackTags>,
}

impl MapTagReader {
    pub fn with(mut self, file: &str, tags: TrackTags) -> Self {
        self.tags.insert(file.to_string(), tags);
        self
    }
}

impl TagReader for MapTagReader {
    fn read_tags(&self, path: &Path) -> Result<TrackTags> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.tags.get(&name).cloned().ok_or_else(|| {
            TransporterError::MetadataRead {
                path: path.to_path_buf(),
                reason: "no tag block".into(),
            }
            .into()
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    events: RefCell<Vec<TransferEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<TransferEvent> {
        self.events.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &TransferEvent) -> Result<()> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

pub fn never_cancelled() -> bool {
    false
}

pub fn track(title: &str, artist: &str, album: &str, track_number: u32) -> TrackTags {
    TrackTags {
        title: title.into(),
        artist: artist.into(),
        album: album.into(),
        track_number,
        disc_number: 1,
        disc_count: 1,
    }
}

/// Create `dir` with the given files (contents = file name).
pub fn make_album(dir: &Path, files: &[&str]) -> Vec<PathBuf> {
    fs::create_dir_all(dir).unwrap();
    files
        .iter()
        .map(|f| {
            let p = dir.join(f);
            fs::write(&p, f.as_bytes()).unwrap();
            p
        })
        .collect()
}

pub fn error_kind(err: &anyhow::Error) -> Option<&'static str> {
    err.downcast_ref::<TransporterError>().map(|e| e.kind())
}
