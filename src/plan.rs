//! Transfer plans: one proposed move per track.

use std::path::{Path, PathBuf};

use crate::naming::PathBuilder;
use crate::track::TrackRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    track: TrackRecord,
    previous_path: PathBuf,
    destination_path: PathBuf,
}

impl TransferPlan {
    /// Snapshot the track's current path, rename the record to its canonical
    /// file name and compute where it lands under the builder's root.
    pub fn new(mut track: TrackRecord, builder: &PathBuilder) -> Self {
        let previous_path = track.full_path();
        let destination_path = builder.destination_path(&track);
        track.set_file_name(builder.file_name(&track));
        Self {
            track,
            previous_path,
            destination_path,
        }
    }

    pub fn track(&self) -> &TrackRecord {
        &self.track
    }

    pub fn previous_path(&self) -> &Path {
        &self.previous_path
    }

    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    /// Directory the destination file lives in (`<root>/<artist>/<album>`).
    pub fn album_directory(&self) -> &Path {
        self.destination_path
            .parent()
            .unwrap_or(self.destination_path.as_path())
    }

    /// `<root>/<artist>`.
    pub fn artist_directory(&self) -> &Path {
        let album = self.album_directory();
        album.parent().unwrap_or(album)
    }

    pub fn is_noop(&self) -> bool {
        self.previous_path == self.destination_path
    }
}

/// Build one plan per track, preserving order. Touches no files.
pub fn build_plans(tracks: Vec<TrackRecord>, builder: &PathBuilder) -> Vec<TransferPlan> {
    tracks
        .into_iter()
        .map(|t| TransferPlan::new(t, builder))
        .collect()
}
