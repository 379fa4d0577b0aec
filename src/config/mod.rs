//! Config module.
//! Provides configuration types, default paths, XML loading, environment overrides and validation.

pub mod env;
pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use env::layer_from_env;
pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{AudioExtensions, Config, ConfigLayer, LogLevel};
pub use validate::validate_and_normalize;
pub use xml::{create_template_config, load_layer_from_xml_path, load_or_init, LoadResult};

/// Environment variable naming an explicit config file (or directory holding config.xml).
pub const CONFIG_ENV: &str = "TUNE_TRANSPORTER_CONFIG";
/// Environment overrides for the two library roots.
pub const DOWNLOADS_PATH_ENV: &str = "TUNE_TRANSPORTER_DOWNLOADS_PATH";
pub const MUSIC_PATH_ENV: &str = "TUNE_TRANSPORTER_MUSIC_PATH";

/// Extensions written into a freshly created template config.
pub const TEMPLATE_AUDIO_EXTENSIONS: &str = ".flac .wav .mp3 .m4a";
pub const DEFAULT_STDIN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
pub const DEFAULT_STDIN_SENTINEL: &str = "END";
