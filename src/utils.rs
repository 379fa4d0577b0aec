use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::TransporterError;

/// Quick writable probe: create and remove a small file in `dir`.
/// Uses create_new to avoid clobbering existing files.
pub(crate) fn is_writable_probe(dir: &Path) -> std::io::Result<()> {
    let probe = dir.join(format!(".tune_transporter_probe_{}.tmp", std::process::id()));
    fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&probe)?;
    let _ = fs::remove_file(&probe);
    Ok(())
}

/// Canonical form of `source`, which must be a directory strictly below
/// `downloads_root` and must neither be nor contain `music_root`.
/// Cleanup deletes the source recursively, so the downloads root itself (or
/// anything outside it) is never accepted.
pub(crate) fn ensure_source_within(
    downloads_root: &Path,
    music_root: &Path,
    source: &Path,
) -> Result<PathBuf> {
    let refuse = |reason: String| -> anyhow::Error {
        TransporterError::UnsafeSource {
            path: source.to_path_buf(),
            reason,
        }
        .into()
    };

    let source_real = dunce::canonicalize(source).map_err(|e| refuse(format!("cannot resolve path: {e}")))?;
    let downloads_real = dunce::canonicalize(downloads_root).unwrap_or_else(|_| downloads_root.to_path_buf());
    let music_real = dunce::canonicalize(music_root).unwrap_or_else(|_| music_root.to_path_buf());

    if source_real == downloads_real {
        return Err(refuse("it is the downloads root itself".into()));
    }
    if !source_real.starts_with(&downloads_real) {
        return Err(refuse(format!(
            "it is not inside the downloads root '{}'",
            downloads_real.display()
        )));
    }
    if music_real.starts_with(&source_real) {
        return Err(refuse(format!(
            "it is or contains the music library '{}'",
            music_real.display()
        )));
    }
    Ok(source_real)
}

/// Extension of `name` including the leading dot, or "" when there is none.
/// "song.flac" -> ".flac", "README" -> "", ".hidden" -> "".
pub(crate) fn dotted_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writable_probe_leaves_no_file() {
        let td = tempdir().unwrap();
        is_writable_probe(td.path()).unwrap();
        assert_eq!(fs::read_dir(td.path()).unwrap().count(), 0);
    }

    #[test]
    fn source_must_be_strictly_inside_downloads() {
        let td = tempdir().unwrap();
        let root = dunce::canonicalize(td.path()).unwrap();
        let downloads = root.join("downloads");
        let music = root.join("music");
        fs::create_dir_all(downloads.join("Album")).unwrap();
        fs::create_dir_all(&music).unwrap();

        assert_eq!(
            ensure_source_within(&downloads, &music, &downloads.join("Album")).unwrap(),
            downloads.join("Album")
        );
        for bad in [
            downloads.clone(),
            downloads.join("Album").join(".."),
            root.clone(),
            music.clone(),
        ] {
            let err = ensure_source_within(&downloads, &music, &bad).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<TransporterError>(),
                    Some(TransporterError::UnsafeSource { .. })
                ),
                "{} should be refused",
                bad.display()
            );
        }
    }

    #[test]
    fn source_containing_music_is_refused() {
        let td = tempdir().unwrap();
        let root = dunce::canonicalize(td.path()).unwrap();
        let downloads = root.join("downloads");
        let music = downloads.join("Album").join("library");
        fs::create_dir_all(&music).unwrap();
        let err = ensure_source_within(&downloads, &music, &downloads.join("Album")).unwrap_err();
        assert!(err.to_string().contains("music library"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_downloads_is_refused() {
        let td = tempdir().unwrap();
        let root = dunce::canonicalize(td.path()).unwrap();
        let downloads = root.join("downloads");
        let outside = root.join("elsewhere");
        fs::create_dir_all(&downloads).unwrap();
        fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, downloads.join("link")).unwrap();
        assert!(ensure_source_within(&downloads, &root.join("music"), &downloads.join("link")).is_err());
    }

    #[test]
    fn dotted_extension_cases() {
        assert_eq!(dotted_extension("01 - a.flac"), ".flac");
        assert_eq!(dotted_extension("archive.tar.gz"), ".gz");
        assert_eq!(dotted_extension("README"), "");
        assert_eq!(dotted_extension(".hidden"), "");
    }
}
