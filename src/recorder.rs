use anyhow::{Context, Result};
use chrono::DateTime;

use crate::models::{SessionLog, Snapshot};
use crate::storage::BlobStore;

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Wraps the currently-open session log. Appends are never reordered or
/// dropped; `persist` serializes the whole log to a named artifact.
#[derive(Debug)]
pub struct SessionRecorder {
    log: SessionLog,
}

impl SessionRecorder {
    pub fn new(start_time: i64) -> Self {
        Self {
            log: SessionLog::new(start_time),
        }
    }

    /// Discard the previous epoch's log and begin a fresh one.
    pub fn restart(&mut self, start_time: i64) {
        self.log = SessionLog::new(start_time);
    }

    pub fn append(&mut self, snapshot: Snapshot) {
        self.log.append(snapshot);
    }

    pub fn has_data(&self) -> bool {
        !self.log.is_empty()
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// `run_<dd>_<mm>_<yyyy>_<hhmmss>.json`, derived from the log's start time.
    pub fn artifact_name(&self) -> String {
        let started = DateTime::from_timestamp_millis(self.log.start_time)
            .unwrap_or(DateTime::<chrono::Utc>::MIN_UTC);
        started.format("run_%d_%m_%Y_%H%M%S.json").to_string()
    }

    /// Serialize the current log and hand it to the blob store. Same log,
    /// same bytes; each call may still produce a new named artifact.
    pub fn persist(&self, store: &dyn BlobStore) -> Result<String> {
        let name = self.artifact_name();
        let bytes = serde_json::to_vec(&self.log).context("failed to serialize session log")?;
        store.persist(&name, &bytes)?;
        log_info!(
            "persisted session log {} ({} snapshots)",
            name,
            self.log.len()
        );
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsBlobStore;
    use serde_json::{json, Map};

    fn snapshot(id: u64) -> Snapshot {
        let mut data = Map::new();
        data.insert("distance".into(), json!(id * 10));
        Snapshot {
            id,
            timestamp: 1700000000000 + id as i64,
            image: Some(format!("frame-{id}")),
            data,
        }
    }

    #[test]
    fn artifact_name_follows_run_convention() {
        // 2023-11-14 22:13:20 UTC
        let recorder = SessionRecorder::new(1700000000000);
        assert_eq!(recorder.artifact_name(), "run_14_11_2023_221320.json");
    }

    #[test]
    fn append_preserves_order_and_has_data_gates_on_content() {
        let mut recorder = SessionRecorder::new(0);
        assert!(!recorder.has_data());

        for id in 0..4 {
            recorder.append(snapshot(id));
        }
        assert!(recorder.has_data());
        let ids: Vec<u64> = recorder.log().snapshots.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn persist_is_idempotent_in_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().to_path_buf()).unwrap();

        let mut recorder = SessionRecorder::new(1700000000000);
        recorder.append(snapshot(0));

        let first = recorder.persist(&store).unwrap();
        let second = recorder.persist(&store).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.read(&first).unwrap(), store.read(&second).unwrap());
    }
}
