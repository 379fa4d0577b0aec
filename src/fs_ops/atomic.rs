//! Same-volume rename.
//! On Unix the destination directory is fsynced afterwards (best-effort) so the
//! new entry survives a crash.

use std::fs;
use std::io;
use std::path::Path;

/// Rename `src` to `dst`. Returns the raw io::Error so callers can detect
/// cross-device failures and fall back to copying.
pub(super) fn try_atomic_move(src: &Path, dst: &Path) -> io::Result<()> {
    fs::rename(src, dst)?;

    #[cfg(unix)]
    if let Some(parent) = dst.parent() {
        // A failed fsync must not turn a completed rename into an error.
        let _ = super::util::fsync_dir(parent);
    }

    Ok(())
}
