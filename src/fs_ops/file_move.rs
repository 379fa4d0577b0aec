//! Single-file move.
//! Tries a same-volume rename; on a cross-device error falls back to
//! copy-to-temp + rename + delete source. Any other rename error is returned.

use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::atomic::try_atomic_move;
use super::copy::safe_copy_and_rename;
use super::helpers::io_error_with_help;
use super::util::is_cross_device;

/// How a successful move was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMethod {
    Renamed,
    Copied,
}

/// Move `src` to `dest`. The destination directory must already exist and
/// `dest` must be vacant. On error the file is still at `src`.
pub fn move_file(src: &Path, dest: &Path, preserve_metadata: bool) -> Result<MoveMethod> {
    match try_atomic_move(src, dest) {
        Ok(()) => {
            debug!(src = %src.display(), dest = %dest.display(), "Renamed file");
            Ok(MoveMethod::Renamed)
        }
        Err(e) if is_cross_device(&e) => {
            warn!(
                src = %src.display(),
                dest = %dest.display(),
                "Cross-filesystem move; copying instead of renaming"
            );
            let bytes = safe_copy_and_rename(src, dest, preserve_metadata)?;
            if let Err(rm) = fs::remove_file(src) {
                // Undo the copy so the file exists in exactly one place.
                let _ = fs::remove_file(dest);
                return Err(io_error_with_help("remove original file", src)(rm));
            }
            debug!(src = %src.display(), dest = %dest.display(), bytes, "Copied file");
            Ok(MoveMethod::Copied)
        }
        Err(e) => Err(io_error_with_help("rename", src)(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn same_volume_move_renames() {
        let td = tempdir().unwrap();
        let src = td.path().join("in.flac");
        let dest_dir = td.path().join("Artist").join("Album");
        fs::create_dir_all(&dest_dir).unwrap();
        let dest = dest_dir.join("01 - Song.flac");
        fs::write(&src, b"data").unwrap();

        assert_eq!(move_file(&src, &dest, false).unwrap(), MoveMethod::Renamed);
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"data");
    }

    #[test]
    fn missing_destination_dir_leaves_source() {
        let td = tempdir().unwrap();
        let src = td.path().join("in.flac");
        fs::write(&src, b"data").unwrap();
        let err = move_file(&src, &td.path().join("nope").join("x.flac"), false).unwrap_err();
        assert!(err.to_string().contains("rename"));
        assert!(src.exists());
    }
}
