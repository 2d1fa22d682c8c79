use std::collections::VecDeque;

use crate::models::Snapshot;

/// Default capacity of the live view: the most recent ten snapshots.
pub const LIVE_HISTORY_CAPACITY: usize = 10;

/// Fixed-capacity most-recent-N queue of snapshots feeding the rendering
/// layer. Oldest entries are discarded first; push is O(1) amortized.
#[derive(Debug)]
pub struct LiveHistoryBuffer {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl LiveHistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(LIVE_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Non-destructive copy of the current contents in arrival order.
    pub fn read(&self) -> Vec<Snapshot> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LiveHistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn snapshot(id: u64) -> Snapshot {
        Snapshot {
            id,
            timestamp: id as i64,
            image: None,
            data: Map::new(),
        }
    }

    #[test]
    fn never_holds_more_than_capacity() {
        let mut buffer = LiveHistoryBuffer::new();
        for id in 0..25 {
            buffer.push(snapshot(id));
        }
        assert_eq!(buffer.len(), LIVE_HISTORY_CAPACITY);

        let ids: Vec<u64> = buffer.read().iter().map(|s| s.id).collect();
        assert_eq!(ids, (15..25).collect::<Vec<u64>>());
    }

    #[test]
    fn read_preserves_arrival_order_below_capacity() {
        let mut buffer = LiveHistoryBuffer::new();
        for id in 0..3 {
            buffer.push(snapshot(id));
        }
        let ids: Vec<u64> = buffer.read().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(buffer.latest().map(|s| s.id), Some(2));
    }
}
