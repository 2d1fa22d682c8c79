mod channel;
mod controller;
mod loop_worker;
mod state;

pub use channel::{channel_pair, ChannelEvent, ChannelHandle, Connector};
pub use controller::ConnectionManager;
pub use state::ConnectionState;
