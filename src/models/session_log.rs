use serde::{Deserialize, Serialize};

use super::Snapshot;

/// The full ordered record of every snapshot seen during one connection
/// epoch. Append-only while the epoch is open; becomes immutable and
/// eligible for persistence when the connection closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLog {
    pub start_time: i64,
    pub snapshots: Vec<Snapshot>,
}

impl SessionLog {
    pub fn new(start_time: i64) -> Self {
        Self {
            start_time,
            snapshots: Vec::new(),
        }
    }

    pub fn append(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_start_time() {
        let log = SessionLog::new(1700000000000);
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.get("startTime").is_some());
        assert!(json.get("snapshots").unwrap().is_array());
    }
}
