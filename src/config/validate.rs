//! Config validation logic.
//! Verifies directory existence, readability/writability and that the two roots are disjoint.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use crate::errors::TransporterError;
use crate::utils::is_writable_probe;

use super::types::Config;

impl Config {
    /// Validate existence, readability/writability and canonical paths.
    pub fn validate(&self) -> Result<()> {
        let dl = &self.downloads_path;
        let music = &self.music_path;

        if self.audio_extensions.is_empty() {
            return Err(TransporterError::NoAudioExtensions.into());
        }

        // 1) Downloads root: must exist, be a directory, and be readable.
        ensure_dir_exists_and_is_dir(dl, "downloads_path")?;
        ensure_readable(dl, "downloads_path")?;

        // 2) Music root: must be a directory; create if missing (unless dry-run); ensure writable.
        if self.dry_run && !music.exists() {
            info!("dry-run: music_path {} would be created", music.display());
        } else {
            ensure_dir_is_or_create(music, "music_path")?;
            if !self.dry_run {
                ensure_writable(music, "music_path")?;
            }
        }

        // 3) Resolve symlinks and ensure the roots are disjoint (neither contains the other).
        let dl_real = dunce::canonicalize(dl).unwrap_or_else(|_| dl.clone());
        let music_real = dunce::canonicalize(music).unwrap_or_else(|_| music.clone());

        if dl_real == music_real {
            bail!(TransporterError::InvalidConfig(format!(
                "downloads_path and music_path resolve to the same path: '{}'",
                dl_real.display()
            )));
        }
        if dl_real.starts_with(&music_real) {
            bail!(TransporterError::InvalidConfig(format!(
                "downloads_path '{}' must not be inside music_path '{}'",
                dl_real.display(),
                music_real.display()
            )));
        }
        if music_real.starts_with(&dl_real) {
            bail!(TransporterError::InvalidConfig(format!(
                "music_path '{}' must not be inside downloads_path '{}'",
                music_real.display(),
                dl_real.display()
            )));
        }

        info!(
            "Config validated: downloads='{}' music='{}' extensions='{}' log_file='{}'",
            dl.display(),
            music.display(),
            self.audio_extensions,
            self.log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".into())
        );
        Ok(())
    }
}

/// Validate, then replace both roots with their canonical forms so later
/// path comparisons (plan no-op detection) see the same spelling.
pub fn validate_and_normalize(cfg: &mut Config) -> Result<()> {
    cfg.validate()?;
    cfg.downloads_path = dunce::canonicalize(&cfg.downloads_path)
        .with_context(|| format!("canonicalize downloads_path '{}'", cfg.downloads_path.display()))?;
    if cfg.music_path.exists() {
        cfg.music_path = dunce::canonicalize(&cfg.music_path)
            .with_context(|| format!("canonicalize music_path '{}'", cfg.music_path.display()))?;
    }
    Ok(())
}

/// Ensure path exists and is a directory; emit clear errors with path context.
fn ensure_dir_exists_and_is_dir(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        error!("{name} does not exist: {}", path.display());
        bail!(TransporterError::InvalidConfig(format!(
            "{name} does not exist: {}",
            path.display()
        )));
    }
    if !path.is_dir() {
        error!("{name} is not a directory: {}", path.display());
        bail!(TransporterError::InvalidConfig(format!(
            "{name} is not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Ensure directory is readable by attempting to open its entries.
fn ensure_readable(path: &Path, name: &str) -> Result<()> {
    fs::read_dir(path).with_context(|| {
        format!("Cannot read {name} directory '{}'; check permissions", path.display())
    })?;
    debug!("{name} readable: {}", path.display());
    Ok(())
}

/// Ensure directory exists (create if missing). If exists, it must be a directory.
fn ensure_dir_is_or_create(path: &Path, name: &str) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            error!("{name} exists but isn't a directory: {}", path.display());
            bail!(TransporterError::InvalidConfig(format!(
                "{name} exists but isn't a directory: {}",
                path.display()
            )));
        }
    } else {
        fs::create_dir_all(path).with_context(|| {
            format!("Failed to create {name} directory '{}'", path.display())
        })?;
        info!("Created {name} directory: {}", path.display());
    }
    Ok(())
}

/// Ensure directory is writable using a non-destructive probe file.
fn ensure_writable(path: &Path, name: &str) -> Result<()> {
    is_writable_probe(path).with_context(|| {
        format!("Cannot write to {name} '{}'; check permissions", path.display())
    })?;
    debug!("{name} writable: {}", path.display());
    Ok(())
}
