//! Cross-device move body: copy into a hidden temp sibling of the destination,
//! then rename it into place. The temp file is removed on any failure, so the
//! destination either appears complete or not at all.

use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;

use super::atomic::try_atomic_move;
use super::helpers::io_error_with_help;
use super::meta::maybe_preserve_metadata;
use super::{io_copy, util};

/// Copy `src` to `dest` via a temp file in the destination directory.
/// `src` is left in place; the caller removes it once this succeeds.
pub(super) fn safe_copy_and_rename(src: &Path, dest: &Path, preserve: bool) -> Result<u64> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| anyhow!("destination has no parent: {}", dest.display()))?;

    let tmp_path = util::unique_temp_path(dest_dir);

    let bytes = match io_copy::copy_streaming(src, &tmp_path) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_error_with_help("copy to temporary file", &tmp_path)(e));
        }
    };

    if let Err(e) = maybe_preserve_metadata(src, &tmp_path, preserve) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    // Last vacancy check before the rename, which would replace a file on Unix.
    if dest.exists() {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error_with_help("rename temporary file into", dest)(
            std::io::Error::from(std::io::ErrorKind::AlreadyExists),
        ));
    }

    if let Err(e) = try_atomic_move(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error_with_help("rename temporary file into", dest)(e));
    }

    Ok(bytes)
}
