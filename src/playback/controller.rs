use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{config::LinkConfig, models::Snapshot};

use super::state::{PlaybackMode, PlaybackState, PlaybackStatus};

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Drives a timed cursor over a finite snapshot sequence, supplied either
/// by the live history (mode `Live`) or by a loaded session log (mode
/// `Playback`).
#[derive(Clone)]
pub struct PlaybackEngine {
    state: Arc<Mutex<PlaybackState>>,
    sequence: Arc<Mutex<Vec<Snapshot>>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    cursor_tx: watch::Sender<PlaybackState>,
}

impl PlaybackEngine {
    pub fn new(mode: PlaybackMode, config: &LinkConfig) -> Self {
        let initial = PlaybackState::new(mode);
        let (cursor_tx, _) = watch::channel(initial);

        Self {
            state: Arc::new(Mutex::new(initial)),
            sequence: Arc::new(Mutex::new(Vec::new())),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: config.playback_delay(),
            cursor_tx,
        }
    }

    pub async fn state(&self) -> PlaybackState {
        *self.state.lock().await
    }

    /// Cursor updates for the rendering layer.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.cursor_tx.subscribe()
    }

    /// The element under the cursor; None when the sequence is empty.
    pub async fn current(&self) -> Option<Snapshot> {
        let index = self.state.lock().await.index;
        self.sequence.lock().await.get(index).cloned()
    }

    /// Swap the backing sequence. Always lands paused at index 0;
    /// continuing to play against a stale sequence is not permitted.
    pub async fn set_sequence(&self, snapshots: Vec<Snapshot>) {
        self.cancel_ticker().await;
        {
            let mut state = self.state.lock().await;
            let mut sequence = self.sequence.lock().await;
            *sequence = snapshots;
            state.reset();
            if state.mode == PlaybackMode::Live {
                state.follow(sequence.len());
            }
        }
        self.publish().await;
    }

    /// Append one snapshot in live mode; the cursor tracks the tail.
    pub async fn push_live(&self, snapshot: Snapshot) {
        {
            let mut state = self.state.lock().await;
            let mut sequence = self.sequence.lock().await;
            sequence.push(snapshot);
            if state.mode == PlaybackMode::Live {
                state.follow(sequence.len());
            }
        }
        self.publish().await;
    }

    /// Play/pause. Inert in live mode, which exposes no manual control.
    pub async fn toggle(&self) {
        let playing = {
            let mut state = self.state.lock().await;
            if state.mode == PlaybackMode::Live {
                log_info!("toggle ignored in live mode");
                return;
            }
            let len = self.sequence.lock().await.len();
            state.toggle(len);
            state.is_playing()
        };
        self.publish().await;

        if playing {
            self.spawn_ticker().await;
        } else {
            self.cancel_ticker().await;
        }
    }

    pub async fn reset(&self) {
        self.cancel_ticker().await;
        self.state.lock().await.reset();
        self.publish().await;
    }

    pub async fn seek_to_end(&self) {
        self.cancel_ticker().await;
        {
            let mut state = self.state.lock().await;
            let len = self.sequence.lock().await.len();
            state.seek_to_end(len);
        }
        self.publish().await;
    }

    async fn spawn_ticker(&self) {
        let mut guard = self.ticker.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let sequence = self.sequence.clone();
        let cursor_tx = self.cursor_tx.clone();
        let tick_interval = self.tick_interval;

        *guard = Some(tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the interval's first tick completes immediately; the cursor
            // moves one full period after play begins
            interval.tick().await;
            loop {
                interval.tick().await;

                let len = sequence.lock().await.len();
                let (snapshot, halted) = {
                    let mut guard = state.lock().await;
                    if guard.status != PlaybackStatus::Playing {
                        break;
                    }
                    let halted = guard.advance(len);
                    (*guard, halted)
                };
                cursor_tx.send_replace(snapshot);

                if halted {
                    break;
                }
            }
        }));
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    async fn publish(&self) {
        let state = *self.state.lock().await;
        self.cursor_tx.send_replace(state);
    }
}
