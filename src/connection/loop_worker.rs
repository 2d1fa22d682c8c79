use tokio::sync::mpsc;

use super::channel::ChannelEvent;
use super::controller::ConnectionManager;

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Consume one channel's event stream until it closes or errors. Each
/// event handler runs to completion before the next event is taken, so
/// ingestion needs no internal locking beyond the manager's own state.
pub(crate) async fn channel_loop(link: ConnectionManager, mut events: mpsc::Receiver<ChannelEvent>) {
    loop {
        match events.recv().await {
            Some(ChannelEvent::Open) => link.handle_open().await,
            Some(ChannelEvent::Message(frame)) => link.handle_frame(&frame).await,
            Some(ChannelEvent::Error(reason)) => {
                link.handle_drop(Some(reason)).await;
                break;
            }
            // a dropped sender counts as a close
            Some(ChannelEvent::Closed) | None => {
                link.handle_drop(None).await;
                break;
            }
        }
    }
    log_info!("channel loop finished");
}
