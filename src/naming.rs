//! Canonical library naming.
//! Maps a TrackRecord to `<root>/<artist>/<album>/<NN - title>.<ext>`.
//! Everything here is pure string/path work; nothing touches the filesystem.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::track::TrackRecord;

/// Character substituted for the platform separator inside a single path segment.
pub const SEPARATOR_REPLACEMENT: char = '+';

/// Make `s` safe to use as one path segment by replacing the platform
/// separator with `+`. No other characters are touched.
pub fn sanitize_segment(s: &str) -> String {
    s.replace(MAIN_SEPARATOR, &SEPARATOR_REPLACEMENT.to_string())
}

/// Destination file name for `track`.
/// Multi-disc sets prefix the (unpadded) disc number: disc 1, track 7 -> "107 - Song.flac".
pub fn format_file_name(track: &TrackRecord) -> String {
    let name = if track.disc_count() > 1 {
        format!(
            "{}{:02} - {}{}",
            track.disc_number(),
            track.track_number(),
            track.title(),
            track.extension()
        )
    } else {
        format!(
            "{:02} - {}{}",
            track.track_number(),
            track.title(),
            track.extension()
        )
    };
    sanitize_segment(&name)
}

pub fn artist_directory(root: &Path, artist: &str) -> PathBuf {
    root.join(sanitize_segment(artist))
}

pub fn album_directory(root: &Path, artist: &str, album: &str) -> PathBuf {
    artist_directory(root, artist).join(sanitize_segment(album))
}

pub fn destination_path(root: &Path, track: &TrackRecord) -> PathBuf {
    album_directory(root, track.artist(), track.album()).join(format_file_name(track))
}

/// The naming functions bound to one library root.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    library_root: PathBuf,
}

impl PathBuilder {
    pub fn new(library_root: impl Into<PathBuf>) -> Self {
        Self {
            library_root: library_root.into(),
        }
    }

    pub fn library_root(&self) -> &Path {
        &self.library_root
    }

    pub fn artist_directory(&self, artist: &str) -> PathBuf {
        artist_directory(&self.library_root, artist)
    }

    pub fn album_directory(&self, artist: &str, album: &str) -> PathBuf {
        album_directory(&self.library_root, artist, album)
    }

    pub fn file_name(&self, track: &TrackRecord) -> String {
        format_file_name(track)
    }

    pub fn destination_path(&self, track: &TrackRecord) -> PathBuf {
        destination_path(&self.library_root, track)
    }
}
