use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::models::Snapshot;
use crate::normalize::normalize_record;
use crate::storage::BlobStore;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("session log is malformed: `snapshots` missing or not an array")]
    MalformedLog,
    #[error("failed to fetch session log: {0}")]
    Fetch(String),
    #[error("failed to decode session log: {0}")]
    Decode(String),
}

/// Outcome of a single load. `snapshots` is empty on any failure, so
/// callers that only render the sequence behave the same either way;
/// callers that care can tell "genuinely empty" from "failed" via `error`.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub snapshots: Vec<Snapshot>,
    pub error: Option<LoadError>,
}

impl LoadReport {
    fn failed(error: LoadError) -> Self {
        Self {
            snapshots: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Reads persisted session log artifacts back into snapshot sequences.
pub struct LogLoader {
    store: Arc<dyn BlobStore>,
}

impl LogLoader {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Single-shot load of one artifact. Never raises: fetch and decode
    /// failures are logged and reported through the returned [`LoadReport`].
    pub async fn load(&self, identifier: &str) -> LoadReport {
        let bytes = match self.store.read(identifier) {
            Ok(bytes) => bytes,
            Err(err) => {
                log_error!("failed to fetch session log {identifier}: {err:#}");
                return LoadReport::failed(LoadError::Fetch(err.to_string()));
            }
        };

        let decoded: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => {
                log_error!("failed to decode session log {identifier}: {err}");
                return LoadReport::failed(LoadError::Decode(err.to_string()));
            }
        };

        // No partial recovery at this level: the whole load is rejected
        // when the structure is wrong.
        let raw_snapshots = match decoded.get("snapshots") {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                log_error!("session log {identifier} lacks a `snapshots` array");
                return LoadReport::failed(LoadError::MalformedLog);
            }
        };

        let snapshots: Vec<Snapshot> = raw_snapshots
            .into_iter()
            .enumerate()
            .map(|(ordinal, raw)| normalize_record(raw, ordinal))
            .collect();

        log_info!("loaded {} snapshots from {identifier}", snapshots.len());

        LoadReport {
            snapshots,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsBlobStore;
    use serde_json::json;

    fn loader_over(dir: &tempfile::TempDir) -> (LogLoader, Arc<FsBlobStore>) {
        let store = Arc::new(FsBlobStore::new(dir.path().to_path_buf()).unwrap());
        (LogLoader::new(store.clone()), store)
    }

    #[tokio::test]
    async fn non_array_snapshots_field_is_a_malformed_log() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, store) = loader_over(&dir);
        store
            .persist("bad.json", br#"{"snapshots":"not-an-array"}"#)
            .unwrap();

        let report = loader.load("bad.json").await;
        assert!(report.snapshots.is_empty());
        assert!(matches!(report.error, Some(LoadError::MalformedLog)));
    }

    #[tokio::test]
    async fn missing_artifact_resolves_empty_with_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, _store) = loader_over(&dir);

        let report = loader.load("nowhere.json").await;
        assert!(report.snapshots.is_empty());
        assert!(matches!(report.error, Some(LoadError::Fetch(_))));
    }

    #[tokio::test]
    async fn record_missing_id_gets_its_position() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, store) = loader_over(&dir);
        let artifact = json!({
            "startTime": 1700000000000i64,
            "snapshots": [{ "timestamp": 1700000000001i64, "data": { "distance": 12 } }]
        });
        store
            .persist("run.json", artifact.to_string().as_bytes())
            .unwrap();

        let report = loader.load("run.json").await;
        assert!(!report.is_failed());
        assert_eq!(report.snapshots.len(), 1);
        assert_eq!(report.snapshots[0].id, 0);
        assert_eq!(report.snapshots[0].timestamp, 1700000000001);
    }
}
