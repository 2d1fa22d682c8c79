use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Lifecycle and traffic events reported by one connect attempt.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// The channel opened successfully.
    Open,
    /// One inbound UTF-8 JSON text frame.
    Message(String),
    /// The channel failed; a close follows implicitly.
    Error(String),
    /// The channel closed.
    Closed,
}

/// Handle to one live channel: the inbound event stream plus a shutdown
/// token the owner cancels to close the channel.
pub struct ChannelHandle {
    pub events: mpsc::Receiver<ChannelEvent>,
    shutdown: CancellationToken,
}

impl ChannelHandle {
    pub fn new(events: mpsc::Receiver<ChannelEvent>, shutdown: CancellationToken) -> Self {
        Self { events, shutdown }
    }

    /// Token the transport side watches to tear the channel down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

/// Build the plumbing for one channel: the sender a transport task
/// feeds, the shutdown token it watches, and the manager-facing handle.
pub fn channel_pair(
    capacity: usize,
) -> (mpsc::Sender<ChannelEvent>, CancellationToken, ChannelHandle) {
    let (tx, rx) = mpsc::channel(capacity);
    let token = CancellationToken::new();
    let handle = ChannelHandle::new(rx, token.clone());
    (tx, token, handle)
}

/// Abstract duplex message channel to the remote rover at a fixed
/// address. Implementations spawn their own transport task, feed events
/// into the returned handle, and close when its shutdown token fires.
///
/// An attempt's outcome arrives in-band: `Open` on success, `Error` or
/// `Closed` on failure. `connect` itself never blocks on the network.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self) -> ChannelHandle;
}
