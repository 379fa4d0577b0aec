//! Environment overrides for the library roots.

use std::env;
use std::path::PathBuf;

use super::types::ConfigLayer;
use super::{DOWNLOADS_PATH_ENV, MUSIC_PATH_ENV};

fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Build a layer from `TUNE_TRANSPORTER_*` variables. Unset or empty variables are ignored.
pub fn layer_from_env() -> ConfigLayer {
    ConfigLayer {
        downloads_path: env_path(DOWNLOADS_PATH_ENV),
        music_path: env_path(MUSIC_PATH_ENV),
        ..Default::default()
    }
}
