use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One normalized telemetry observation from the rover.
///
/// `id` is assigned by the ingestion side, not supplied by the remote;
/// `timestamp` is epoch milliseconds. `image` holds the opaque encoded
/// camera frame when one was present; everything else the frame carried
/// lives in `data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: u64,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Snapshot {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
