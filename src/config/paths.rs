//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log paths and detects symlinked ancestors for safety.

use anyhow::{anyhow, Result};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::CONFIG_ENV;

/// Config file path.
/// - `$TUNE_TRANSPORTER_CONFIG` wins; a directory means `<dir>/config.xml`,
///   a relative path is resolved against the current directory.
/// - Otherwise the platform config dir (`<config_dir>/tune_transporter/config.xml`).
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(raw) = env::var_os(CONFIG_ENV) {
        let mut p = PathBuf::from(raw);
        if p.as_os_str().is_empty() {
            return Err(anyhow!("{CONFIG_ENV} is set but empty"));
        }
        if p.is_relative() {
            p = env::current_dir()?.join(p);
        }
        if p.is_dir() {
            p.push("config.xml");
        }
        return Ok(p);
    }

    if let Some(mut base) = config_dir() {
        base.push("tune_transporter");
        base.push("config.xml");
        Ok(base)
    } else {
        env::var("HOME")
            .map(|h| {
                PathBuf::from(h)
                    .join(".config")
                    .join("tune_transporter")
                    .join("config.xml")
            })
            .map_err(|_| anyhow!("cannot determine a config directory (no config dir and HOME unset)"))
    }
}

/// OS-appropriate default log file path (data dir).
pub fn default_log_path() -> Result<PathBuf> {
    if let Some(mut base) = data_dir() {
        base.push("tune_transporter");
        // ensure dir exists (best-effort)
        let _ = fs::create_dir_all(&base);
        base.push("tune_transporter.log");
        Ok(base)
    } else {
        env::var("HOME")
            .map(|h| {
                PathBuf::from(h)
                    .join(".local")
                    .join("share")
                    .join("tune_transporter")
                    .join("tune_transporter.log")
            })
            .map_err(|_| anyhow!("cannot determine a data directory (no data dir and HOME unset)"))
    }
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn env_directory_resolves_to_config_xml() {
        let td = tempdir().unwrap();
        unsafe { env::set_var(CONFIG_ENV, td.path()) };
        let p = default_config_path().unwrap();
        unsafe { env::remove_var(CONFIG_ENV) };
        assert_eq!(p, td.path().join("config.xml"));
    }

    #[test]
    #[serial]
    fn env_file_is_used_verbatim() {
        let td = tempdir().unwrap();
        let file = td.path().join("custom.xml");
        unsafe { env::set_var(CONFIG_ENV, &file) };
        let p = default_config_path().unwrap();
        unsafe { env::remove_var(CONFIG_ENV) };
        assert_eq!(p, file);
    }

    #[cfg(unix)]
    #[test]
    fn detects_symlinked_ancestor() {
        let td = tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir_all(&real).unwrap();
        let link = td.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(path_has_symlink_ancestor(&link.join("x.log")).unwrap());
    }
}
