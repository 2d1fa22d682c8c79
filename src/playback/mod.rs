mod controller;
mod state;

pub use controller::PlaybackEngine;
pub use state::{PlaybackMode, PlaybackState, PlaybackStatus};
