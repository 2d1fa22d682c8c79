//! Session core for a rover telemetry client.
//!
//! Maintains a live telemetry stream from a single remote rover process,
//! buffers recent readings for display, records every snapshot of the
//! current connection epoch, and can replay a previously persisted
//! session log. Rendering, the wire transport, and file-picker mechanics
//! are external collaborators: rendering subscribes to the watch/broadcast
//! channels, transports implement [`Connector`], and artifact storage
//! implements [`BlobStore`].

mod config;
mod connection;
mod history;
mod loader;
mod models;
mod normalize;
mod playback;
mod recorder;
mod storage;
mod utils;

pub use config::{ConfigStore, LinkConfig, ReconnectProfile, MAX_RECONNECT_RETRIES};
pub use connection::{
    channel_pair, ChannelEvent, ChannelHandle, ConnectionManager, ConnectionState, Connector,
};
pub use history::{LiveHistoryBuffer, LIVE_HISTORY_CAPACITY};
pub use loader::{LoadError, LoadReport, LogLoader};
pub use models::{SessionLog, Snapshot};
pub use normalize::normalize_record;
pub use playback::{PlaybackEngine, PlaybackMode, PlaybackState, PlaybackStatus};
pub use recorder::SessionRecorder;
pub use storage::{BlobStore, FsBlobStore};

/// Initialize logging for binaries and examples (reads RUST_LOG).
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
