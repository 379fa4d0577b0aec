//! Metadata preservation for copied files: timestamps (filetime) and, on Unix,
//! permission bits. Individual failures are ignored; a missing source is not.

use anyhow::Result;
use filetime::{set_file_times, FileTime};
use std::fs;
use std::path::Path;

use super::helpers::io_error_with_help;

pub(super) fn maybe_preserve_metadata(src: &Path, dest: &Path, preserve: bool) -> Result<()> {
    if !preserve {
        return Ok(());
    }

    let meta = fs::metadata(src).map_err(io_error_with_help("stat source", src))?;

    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    let _ = set_file_times(dest, atime, mtime);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = meta.permissions().mode() & 0o777;
        let _ = fs::set_permissions(dest, fs::Permissions::from_mode(mode));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copies_mtime_when_requested() {
        let td = tempdir().unwrap();
        let src = td.path().join("src.mp3");
        let dst = td.path().join("dst.mp3");
        fs::write(&src, b"a").unwrap();
        fs::write(&dst, b"a").unwrap();
        let old = FileTime::from_unix_time(1_000_000_000, 0);
        set_file_times(&src, old, old).unwrap();

        maybe_preserve_metadata(&src, &dst, true).unwrap();
        let got = FileTime::from_last_modification_time(&fs::metadata(&dst).unwrap());
        assert_eq!(got, old);
    }

    #[test]
    fn noop_when_disabled() {
        let td = tempdir().unwrap();
        // Source need not exist when preservation is off.
        maybe_preserve_metadata(&td.path().join("gone"), &td.path().join("x"), false).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn copies_permission_bits() {
        use std::os::unix::fs::PermissionsExt;
        let td = tempdir().unwrap();
        let src = td.path().join("src");
        let dst = td.path().join("dst");
        fs::write(&src, b"a").unwrap();
        fs::write(&dst, b"a").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o640)).unwrap();
        maybe_preserve_metadata(&src, &dst, true).unwrap();
        assert_eq!(fs::metadata(&dst).unwrap().permissions().mode() & 0o777, 0o640);
    }
}
