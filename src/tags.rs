//! Embedded tag reading.
//!
//! `TagReader` is the seam between the orchestrator and the audio container
//! formats; `LoftyTagReader` is the real implementation, tests substitute an
//! in-memory reader.
//!
//! Field rules:
//! - artist is the album artist, falling back to the track artist
//! - track number, artist and album are required
//! - a missing title becomes an empty string
//! - missing disc number / disc count become 0

use anyhow::Result;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use std::path::Path;

use crate::errors::TransporterError;
use crate::track::TrackTags;

pub trait TagReader {
    /// Read the tags of the audio file at `path`.
    /// Failures are reported as `TransporterError::MetadataRead`.
    fn read_tags(&self, path: &Path) -> Result<TrackTags>;
}

/// Reads tags with lofty (ID3v2, Vorbis comments, MP4 atoms, RIFF INFO, ...).
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagReader;

fn read_error(path: &Path, reason: impl Into<String>) -> anyhow::Error {
    TransporterError::MetadataRead {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl TagReader for LoftyTagReader {
    fn read_tags(&self, path: &Path) -> Result<TrackTags> {
        let tagged_file = Probe::open(path)
            .map_err(|e| read_error(path, format!("open failed: {e}")))?
            .read()
            .map_err(|e| read_error(path, format!("probe failed: {e}")))?;

        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .ok_or_else(|| read_error(path, "file has no tags"))?;

        tags_from_lofty(path, tag)
    }
}

fn tags_from_lofty(path: &Path, tag: &Tag) -> Result<TrackTags> {
    let track_number = tag
        .track()
        .filter(|n| *n > 0)
        .ok_or_else(|| read_error(path, "missing track number"))?;

    let artist = non_empty(tag.get_string(&ItemKey::AlbumArtist))
        .or_else(|| non_empty(tag.artist().as_deref()))
        .ok_or_else(|| read_error(path, "missing artist"))?;

    let album = non_empty(tag.album().as_deref()).ok_or_else(|| read_error(path, "missing album"))?;

    Ok(TrackTags {
        title: tag.title().map(|t| t.to_string()).unwrap_or_default(),
        artist,
        album,
        track_number,
        disc_number: tag.disk().unwrap_or(0),
        disc_count: tag.disk_total().unwrap_or(0),
    })
}
