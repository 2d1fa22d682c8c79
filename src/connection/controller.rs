use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    config::{LinkConfig, ReconnectProfile},
    history::LiveHistoryBuffer,
    models::Snapshot,
    normalize::normalize_record,
    recorder::SessionRecorder,
    storage::BlobStore,
};

use super::{
    channel::Connector,
    loop_worker::channel_loop,
    state::{ConnectionState, LinkState},
};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

/// Owns one logical connection epoch to the remote rover: channel
/// lifecycle, bounded-retry reconnect policy, snapshot ingestion into the
/// live history buffer and the session recorder.
#[derive(Clone)]
pub struct ConnectionManager {
    state: Arc<Mutex<LinkState>>,
    config: LinkConfig,
    connector: Arc<dyn Connector>,
    store: Arc<dyn BlobStore>,
    history: Arc<Mutex<LiveHistoryBuffer>>,
    recorder: Arc<Mutex<SessionRecorder>>,
    reader: Arc<Mutex<Option<JoinHandle<()>>>>,
    reconnect_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    channel_shutdown: Arc<Mutex<Option<CancellationToken>>>,
    status_tx: watch::Sender<ConnectionState>,
    snapshot_tx: broadcast::Sender<Snapshot>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>, store: Arc<dyn BlobStore>, config: LinkConfig) -> Self {
        let (status_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (snapshot_tx, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(LinkState::new())),
            history: Arc::new(Mutex::new(LiveHistoryBuffer::with_capacity(
                config.history_capacity,
            ))),
            recorder: Arc::new(Mutex::new(SessionRecorder::new(
                Utc::now().timestamp_millis(),
            ))),
            config,
            connector,
            store,
            reader: Arc::new(Mutex::new(None)),
            reconnect_timer: Arc::new(Mutex::new(None)),
            channel_shutdown: Arc::new(Mutex::new(None)),
            status_tx,
            snapshot_tx,
        }
    }

    /// Begin connecting. Clears an earlier stop or exhaustion latch; the
    /// debounce guard still applies to rapid successive calls.
    pub async fn start(&self) {
        {
            let mut state = self.state.lock().await;
            state.stopped = false;
            if state.status == ConnectionState::ReconnectExhausted {
                state.attempts = 0;
                state.status = ConnectionState::Disconnected;
            }
        }
        self.connect_attempt().await;
    }

    /// Tear down: cancel any pending reconnect timer, close the channel,
    /// stop the event loop. If an open epoch captured snapshots, its log
    /// is persisted before returning.
    pub async fn stop(&self) -> Result<()> {
        let was_connected = {
            let mut state = self.state.lock().await;
            let was_connected = state.status == ConnectionState::Connected;
            state.stopped = true;
            state.status = ConnectionState::Disconnected;
            was_connected
        };

        self.cancel_reconnect_timer().await;
        self.close_channel().await;
        if let Some(handle) = self.reader.lock().await.take() {
            handle.abort();
        }
        self.publish_status().await;

        if was_connected {
            let recorder = self.recorder.lock().await;
            if recorder.has_data() {
                recorder.persist(self.store.as_ref())?;
            }
        }
        Ok(())
    }

    pub async fn status(&self) -> ConnectionState {
        self.state.lock().await.status.clone()
    }

    /// Id of the current session epoch, set on each successful open.
    pub async fn current_epoch(&self) -> Option<String> {
        self.state.lock().await.epoch_id.clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionState> {
        self.status_tx.subscribe()
    }

    pub fn subscribe_snapshots(&self) -> broadcast::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Non-destructive read of the live history buffer, in arrival order.
    pub async fn history(&self) -> Vec<Snapshot> {
        self.history.lock().await.read()
    }

    /// Whether the current epoch's log has anything worth persisting.
    pub async fn has_session_data(&self) -> bool {
        self.recorder.lock().await.has_data()
    }

    /// On-demand persist of the current session log.
    pub async fn persist_now(&self) -> Result<String> {
        let recorder = self.recorder.lock().await;
        recorder.persist(self.store.as_ref())
    }

    // Boxed rather than `async fn`: the reconnect timer task awaits this
    // future, which re-enters the channel loop, so the opaque future type
    // would be self-referential and rustc cannot prove it `Send`.
    fn connect_attempt(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
        {
            let mut state = self.state.lock().await;
            if state.stopped {
                return;
            }
            let now = Instant::now();
            if let Some(last) = state.last_attempt_at {
                if now.duration_since(last) < self.config.debounce_window() {
                    log_info!("connect attempt suppressed by debounce guard");
                    return;
                }
            }
            state.record_attempt(now);
            log_info!("connect attempt {}", state.attempts);
        }
        self.publish_status().await;

        // Only one channel may be live per manager; tear down any
        // previous one before dialing again.
        self.close_channel().await;

        let handle = self.connector.connect();
        *self.channel_shutdown.lock().await = Some(handle.shutdown_token());

        let mut reader_guard = self.reader.lock().await;
        if let Some(old) = reader_guard.take() {
            old.abort();
        }
        *reader_guard = Some(tokio::spawn(channel_loop(self.clone(), handle.events)));
        })
    }

    pub(crate) async fn handle_open(&self) {
        let epoch_id = Uuid::new_v4().to_string();
        {
            let mut state = self.state.lock().await;
            if state.stopped {
                return;
            }
            state.record_open(epoch_id.clone());
        }
        self.recorder
            .lock()
            .await
            .restart(Utc::now().timestamp_millis());
        log_info!("channel open, session epoch {epoch_id}");
        self.publish_status().await;
    }

    pub(crate) async fn handle_frame(&self, frame: &str) {
        {
            let state = self.state.lock().await;
            if state.status != ConnectionState::Connected {
                log_warn!("dropping frame received outside an open epoch");
                return;
            }
        }

        let mut raw: Value = match serde_json::from_str(frame) {
            Ok(value) => value,
            Err(err) => {
                log_warn!("dropping malformed frame: {err}");
                return;
            }
        };

        let ordinal = self.recorder.lock().await.log().len();

        // The ingestion side assigns ids and wall-clock timestamps; the
        // remote does not have to supply either.
        if let Value::Object(map) = &mut raw {
            map.entry("id").or_insert_with(|| Value::from(ordinal as u64));
            map.entry("timestamp")
                .or_insert_with(|| Value::from(Utc::now().timestamp_millis()));
        }

        let snapshot = normalize_record(raw, ordinal);
        self.history.lock().await.push(snapshot.clone());
        self.recorder.lock().await.append(snapshot.clone());
        let _ = self.snapshot_tx.send(snapshot);
    }

    /// Channel closed or errored: persist a non-empty epoch, then apply
    /// the reconnect policy.
    pub(crate) async fn handle_drop(&self, reason: Option<String>) {
        if let Some(token) = self.channel_shutdown.lock().await.take() {
            token.cancel();
        }

        let was_connected = {
            let mut state = self.state.lock().await;
            let was_connected = state.status == ConnectionState::Connected;
            if let Some(reason) = &reason {
                log_warn!("channel error: {reason}");
                state.status = ConnectionState::Errored;
            }
            was_connected
        };
        if reason.is_some() {
            self.publish_status().await;
        }

        if was_connected {
            let recorder = self.recorder.lock().await;
            if recorder.has_data() {
                match recorder.persist(self.store.as_ref()) {
                    Ok(name) => log_info!("session log saved as {name}"),
                    Err(err) => log_error!("failed to persist session log: {err:#}"),
                }
            }
        }

        let delay = {
            let mut state = self.state.lock().await;
            if state.stopped {
                state.status = ConnectionState::Disconnected;
                None
            } else {
                match self.config.profile {
                    ReconnectProfile::Bounded { max_retries } if state.attempts > max_retries => {
                        log_warn!(
                            "giving up after {} consecutive failed attempts",
                            state.attempts
                        );
                        state.status = ConnectionState::ReconnectExhausted;
                        None
                    }
                    _ => {
                        let delay = self.config.reconnect_delay();
                        state.status = ConnectionState::ReconnectScheduled {
                            attempt: state.attempts + 1,
                            delay_ms: delay.as_millis() as u64,
                        };
                        Some(delay)
                    }
                }
            }
        };
        self.publish_status().await;

        if let Some(delay) = delay {
            self.arm_reconnect(delay).await;
        }
    }

    async fn arm_reconnect(&self, delay: std::time::Duration) {
        let mut guard = self.reconnect_timer.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let link = self.clone();
        *guard = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            link.connect_attempt().await;
        }));
    }

    async fn cancel_reconnect_timer(&self) {
        if let Some(handle) = self.reconnect_timer.lock().await.take() {
            handle.abort();
        }
    }

    async fn close_channel(&self) {
        if let Some(token) = self.channel_shutdown.lock().await.take() {
            token.cancel();
        }
    }

    async fn publish_status(&self) {
        let status = self.state.lock().await.status.clone();
        self.status_tx.send_replace(status);
    }
}
