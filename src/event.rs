//! slskd `DownloadDirectoryComplete` event payload.
//!
//! slskd hands scripts a JSON document describing the finished download. Only
//! the final segment of `localDirectoryName` matters here: it names the folder
//! under the downloads root that holds the album.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::TransporterError;

/// Event type slskd uses when a whole directory finished downloading.
pub const DOWNLOAD_DIRECTORY_COMPLETE: &str = "DownloadDirectoryComplete";

/// Field names are lower-cased before deserializing, so `localDirectoryName`,
/// `LocalDirectoryName` and `localdirectoryname` are all accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlskdEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: i64,
    #[serde(rename = "localdirectoryname")]
    pub local_directory_name: String,
    #[serde(rename = "remotedirectoryname")]
    pub remote_directory_name: String,
    pub username: String,
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl SlskdEvent {
    /// Last path segment of `local_directory_name`, with either `/` or `\` as
    /// separator. Trailing separators are ignored. `.`, `..` and segments
    /// containing NUL are not directory names.
    pub fn directory_name(&self) -> Option<&str> {
        self.local_directory_name
            .trim_end_matches(['/', '\\'])
            .rsplit(['/', '\\'])
            .next()
            .filter(|s| !s.is_empty() && *s != "." && *s != ".." && !s.contains('\0'))
    }

    /// `<downloads_root>/<directory_name>`.
    pub fn source_directory(&self, downloads_root: &Path) -> Result<PathBuf> {
        let name = self.directory_name().ok_or_else(|| {
            TransporterError::EventParse(format!(
                "localDirectoryName has no usable directory segment: {:?}",
                self.local_directory_name
            ))
        })?;
        Ok(downloads_root.join(name))
    }
}

fn lowercase_keys(obj: Map<String, Value>) -> Map<String, Value> {
    obj.into_iter().map(|(k, v)| (k.to_ascii_lowercase(), v)).collect()
}

/// Parse an event payload. Empty (or whitespace-only) input is `EventEmpty`;
/// anything else that fails to deserialize is `EventParse`.
pub fn parse_event(json: &str) -> Result<SlskdEvent> {
    if json.trim().is_empty() {
        return Err(TransporterError::EventEmpty.into());
    }

    let value: Value =
        serde_json::from_str(json).map_err(|e| TransporterError::EventParse(e.to_string()))?;
    let obj = match value {
        Value::Object(obj) => lowercase_keys(obj),
        other => {
            return Err(TransporterError::EventParse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))
            .into());
        }
    };

    let event: SlskdEvent = serde_json::from_value(Value::Object(obj))
        .map_err(|e| TransporterError::EventParse(e.to_string()))?;

    if event.kind != DOWNLOAD_DIRECTORY_COMPLETE {
        warn!(kind = %event.kind, "Unexpected event type; processing anyway");
    }
    debug!(id = %event.id, user = %event.username, dir = %event.local_directory_name, "Parsed event");
    Ok(event)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
