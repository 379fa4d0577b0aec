//! Track data model.
//! A TrackRecord is the tag metadata of one audio file plus where it lives now.
//! Only `file_name` changes after construction (it becomes the canonical name
//! during plan building); the tag fields are read-only.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::TransporterError;
use crate::fs_ops::io_error_with_help;
use crate::utils::dotted_extension;

/// Tag fields as produced by a `TagReader`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub track_number: u32,
    pub disc_number: u32,
    pub disc_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    source_directory: PathBuf,
    file_name: String,
    extension: String,
    tags: TrackTags,
}

impl TrackRecord {
    /// Build a record for the file at `path`, which must be an existing regular file.
    pub fn new(path: &Path, tags: TrackTags) -> Result<Self> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TransporterError::SourceMissing(path.to_path_buf()).into());
            }
            Err(e) => return Err(io_error_with_help("stat", path)(e)),
        };
        if !meta.is_file() {
            return Err(TransporterError::SourceMissing(path.to_path_buf()).into());
        }

        let source_directory = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow::anyhow!("Could not determine directory for file: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("File has no name: {}", path.display()))?;
        let extension = dotted_extension(&file_name);

        Ok(Self {
            source_directory,
            file_name,
            extension,
            tags,
        })
    }

    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// `source_directory` joined with the current `file_name`.
    pub fn full_path(&self) -> PathBuf {
        self.source_directory.join(&self.file_name)
    }

    /// Extension of the file as discovered, including the dot ("" if none).
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn tags(&self) -> &TrackTags {
        &self.tags
    }

    pub fn title(&self) -> &str {
        &self.tags.title
    }

    pub fn artist(&self) -> &str {
        &self.tags.artist
    }

    pub fn album(&self) -> &str {
        &self.tags.album
    }

    pub fn track_number(&self) -> u32 {
        self.tags.track_number
    }

    pub fn disc_number(&self) -> u32 {
        self.tags.disc_number
    }

    pub fn disc_count(&self) -> u32 {
        self.tags.disc_count
    }

    pub(crate) fn set_file_name(&mut self, name: String) {
        self.file_name = name;
    }
}
