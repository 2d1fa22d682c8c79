use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default maximum retries for the bounded reconnect profile.
pub const MAX_RECONNECT_RETRIES: u32 = 3;

/// The two reconnect policies observed in the field: retry forever, or
/// give up after a fixed number of consecutive failures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ReconnectProfile {
    #[serde(rename_all = "camelCase")]
    Bounded { max_retries: u32 },
    Unbounded,
}

impl Default for ReconnectProfile {
    fn default() -> Self {
        ReconnectProfile::Bounded {
            max_retries: MAX_RECONNECT_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkConfig {
    pub profile: ReconnectProfile,
    /// Connect attempts starting sooner than this after the previous
    /// attempt's start are suppressed.
    pub connect_debounce_ms: u64,
    pub reconnect_delay_min_ms: u64,
    pub reconnect_delay_max_ms: u64,
    pub history_capacity: usize,
    pub playback_delay_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            profile: ReconnectProfile::default(),
            connect_debounce_ms: 500,
            reconnect_delay_min_ms: 500,
            reconnect_delay_max_ms: 1000,
            history_capacity: crate::history::LIVE_HISTORY_CAPACITY,
            playback_delay_ms: 1000,
        }
    }
}

impl LinkConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.connect_debounce_ms)
    }

    /// Uniform draw in the configured reconnect window.
    pub fn reconnect_delay(&self) -> Duration {
        let min = self.reconnect_delay_min_ms;
        let max = self.reconnect_delay_max_ms.max(min);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    pub fn playback_delay(&self) -> Duration {
        Duration::from_millis(self.playback_delay_ms)
    }
}

/// File-backed store for the link configuration.
pub struct ConfigStore {
    path: PathBuf,
    data: RwLock<LinkConfig>,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            LinkConfig::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> LinkConfig {
        self.data.read().unwrap().clone()
    }

    pub fn update(&self, config: LinkConfig) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        *guard = config;
        self.persist(&guard)
    }

    fn persist(&self, data: &LinkConfig) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write config to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconnect_delay_stays_inside_window() {
        let config = LinkConfig::default();
        for _ in 0..50 {
            let delay = config.reconnect_delay();
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1000));
        }
    }

    #[test]
    fn store_round_trips_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("link.json");

        let store = ConfigStore::new(path.clone()).unwrap();
        let mut config = store.get();
        config.profile = ReconnectProfile::Unbounded;
        store.update(config.clone()).unwrap();

        let reloaded = ConfigStore::new(path).unwrap();
        assert_eq!(reloaded.get(), config);
    }
}
