mod session_log;
mod snapshot;

pub use session_log::SessionLog;
pub use snapshot::Snapshot;
