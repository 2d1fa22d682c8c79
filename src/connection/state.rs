use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Connection status, owned exclusively by the [`ConnectionManager`];
/// read-only to every other component.
///
/// [`ConnectionManager`]: super::ConnectionManager
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Errored,
    #[serde(rename_all = "camelCase")]
    ReconnectScheduled { attempt: u32, delay_ms: u64 },
    ReconnectExhausted,
}

/// Internal manager state: the public status plus the attempt counter,
/// the debounce anchor, and the stop latch.
#[derive(Debug, Clone)]
pub struct LinkState {
    pub status: ConnectionState,
    /// Connect attempts since the last successful open.
    pub attempts: u32,
    /// Start of the most recent connect attempt; drives the debounce guard.
    pub last_attempt_at: Option<Instant>,
    /// Current session epoch, set on successful open.
    pub epoch_id: Option<String>,
    /// Set by `stop()`; suppresses reconnects until the next `start()`.
    pub stopped: bool,
}

impl LinkState {
    pub fn new() -> Self {
        Self {
            status: ConnectionState::Disconnected,
            attempts: 0,
            last_attempt_at: None,
            epoch_id: None,
            stopped: true,
        }
    }

    pub fn record_attempt(&mut self, now: Instant) {
        self.attempts += 1;
        self.last_attempt_at = Some(now);
        self.status = ConnectionState::Connecting;
    }

    pub fn record_open(&mut self, epoch_id: String) {
        self.attempts = 0;
        self.epoch_id = Some(epoch_id);
        self.status = ConnectionState::Connected;
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}
