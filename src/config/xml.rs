//! XML configuration support.
//! - Loads settings from config.xml (quick_xml) into a ConfigLayer.
//! - Creates a secure template if the default file is missing (unless TUNE_TRANSPORTER_CONFIG is set).
//!
//! Notes:
//! - This module only reads/writes the config file; directory validation happens elsewhere.
//! - Unknown XML fields are rejected so typos surface instead of being ignored.

use anyhow::{anyhow, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{AudioExtensions, ConfigLayer, LogLevel};
use super::{CONFIG_ENV, DEFAULT_STDIN_SENTINEL, DEFAULT_STDIN_TIMEOUT, TEMPLATE_AUDIO_EXTENSIONS};

use crate::errors::TransporterError;
use crate::platform::{set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "downloads_path")]
    downloads_path: Option<String>,
    #[serde(rename = "music_path")]
    music_path: Option<String>,
    #[serde(rename = "audio_extensions")]
    audio_extensions: Option<String>,
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
    #[serde(rename = "preserve_metadata")]
    preserve_metadata: Option<bool>,
    #[serde(rename = "rollback_on_failure")]
    rollback_on_failure: Option<bool>,
    #[serde(rename = "stdin_timeout_seconds", default, deserialize_with = "de_u64_trimmed_opt")]
    stdin_timeout_seconds: Option<u64>,
    #[serde(rename = "stdin_sentinel")]
    stdin_sentinel: Option<String>,
}

// Custom deserializer that trims surrounding whitespace for optional u64
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| s.trim().parse::<u64>().ok()))
}

fn non_empty_path(s: Option<&str>) -> Option<PathBuf> {
    s.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(PathBuf::from)
}

// Map XmlConfig -> ConfigLayer
fn xml_to_layer(parsed: XmlConfig) -> ConfigLayer {
    ConfigLayer {
        downloads_path: non_empty_path(parsed.downloads_path.as_deref()),
        music_path: non_empty_path(parsed.music_path.as_deref()),
        audio_extensions: parsed
            .audio_extensions
            .as_deref()
            .map(AudioExtensions::parse_list),
        log_level: parsed
            .log_level
            .as_deref()
            .and_then(|s| s.trim().parse::<LogLevel>().ok()),
        log_file: non_empty_path(parsed.log_file.as_deref()),
        dry_run: None,
        preserve_metadata: parsed.preserve_metadata,
        rollback_on_failure: parsed.rollback_on_failure,
        stdin_timeout: parsed.stdin_timeout_seconds.map(Duration::from_secs),
        stdin_sentinel: parsed.stdin_sentinel.map(|s| s.trim().to_string()),
    }
}

/// Load a ConfigLayer from a specific XML file path.
pub fn load_layer_from_xml_path(path: &Path) -> Result<ConfigLayer> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents).map_err(|e| {
        TransporterError::InvalidConfig(format!("parse config xml '{}': {}", path.display(), e))
    })?;
    Ok(xml_to_layer(parsed))
}

/// Outcome of looking for the config file at startup.
#[derive(Debug)]
pub enum LoadResult {
    /// File found and parsed.
    Loaded { path: PathBuf, layer: ConfigLayer },
    /// Default file was missing; a template was written there.
    CreatedTemplate(PathBuf),
    /// No file (explicit path missing, or template creation refused).
    Missing(PathBuf),
}

/// Locate and load the config file; write a template at the default location if absent.
pub fn load_or_init() -> Result<LoadResult> {
    let explicit = env::var_os(CONFIG_ENV).is_some();
    let path = default_config_path()?;

    if path.exists() {
        let layer = load_layer_from_xml_path(&path)?;
        return Ok(LoadResult::Loaded { path, layer });
    }

    if explicit {
        return Ok(LoadResult::Missing(path));
    }

    match create_template_config(&path) {
        Ok(()) => Ok(LoadResult::CreatedTemplate(path)),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Could not create template config");
            Ok(LoadResult::Missing(path))
        }
    }
}

/// Create default template config file and parent directory (best-effort permissions).
/// Uses secure creation to avoid following attacker-controlled symlinks on Unix.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        return Err(anyhow!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        let _ = set_dir_mode_0700(parent);
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/tune_transporter.log".into());

    let content = format!(
        "<!--\n  tune_transporter configuration (XML)\n\n  Required:\n    downloads_path         -> directory where slskd puts completed download folders\n    music_path             -> library root; files land in <music_path>/<artist>/<album>/\n    audio_extensions       -> space separated list of extensions treated as audio\n\n  Optional:\n    log_level              -> quiet | normal | info | debug\n    log_file               -> path to log file (stdout/stderr still used)\n    preserve_metadata      -> keep permissions + timestamps when a move has to copy\n    rollback_on_failure    -> move files back if a batch fails part-way\n    stdin_timeout_seconds  -> how long --event-stdin waits for input\n    stdin_sentinel         -> line that ends --event-stdin input\n\n  CLI flags and TUNE_TRANSPORTER_* environment variables override these values.\n-->\n<config>\n  <downloads_path></downloads_path>\n  <music_path></music_path>\n  <audio_extensions>{}</audio_extensions>\n  <log_level>normal</log_level>\n  <log_file>{}</log_file>\n  <preserve_metadata>false</preserve_metadata>\n  <rollback_on_failure>false</rollback_on_failure>\n  <stdin_timeout_seconds>{}</stdin_timeout_seconds>\n  <stdin_sentinel>{}</stdin_sentinel>\n</config>\n",
        TEMPLATE_AUDIO_EXTENSIONS,
        suggested_log,
        DEFAULT_STDIN_TIMEOUT.as_secs(),
        DEFAULT_STDIN_SENTINEL
    );

    // Atomic, secure write (O_NOFOLLOW + create_new on Unix), then tighten perms.
    write_config_secure_new_0600(path, content.as_bytes())?;
    let _ = set_file_mode_0600(path);

    info!("Created template config at {}", path.display());
    Ok(())
}
