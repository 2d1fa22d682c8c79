use serde::{Deserialize, Serialize};

/// How the engine is being fed: `Live` tracks the newest snapshot with no
/// manual control; `Playback` traverses a fixed, previously captured
/// sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackMode {
    Live,
    Playback,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    Paused,
    Playing,
}

/// Cursor over a backing sequence of length L. Invariant:
/// `0 <= index < max(L, 1)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub mode: PlaybackMode,
    pub status: PlaybackStatus,
    pub index: usize,
}

impl PlaybackState {
    pub fn new(mode: PlaybackMode) -> Self {
        Self {
            mode,
            status: PlaybackStatus::Paused,
            index: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Flip between playing and paused. Toggling while paused at the last
    /// element (or over an empty sequence) restarts from the beginning.
    pub fn toggle(&mut self, len: usize) {
        match self.status {
            PlaybackStatus::Paused => {
                if len == 0 || self.index >= len.saturating_sub(1) {
                    self.index = 0;
                }
                self.status = PlaybackStatus::Playing;
            }
            PlaybackStatus::Playing => {
                self.status = PlaybackStatus::Paused;
            }
        }
    }

    /// One timer tick. Returns true when playback halted at the last
    /// element; the cursor clamps there rather than looping.
    pub fn advance(&mut self, len: usize) -> bool {
        if len == 0 {
            self.index = 0;
            self.status = PlaybackStatus::Paused;
            return true;
        }
        self.index += 1;
        if self.index >= len - 1 {
            self.index = len - 1;
            self.status = PlaybackStatus::Paused;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.status = PlaybackStatus::Paused;
    }

    pub fn seek_to_end(&mut self, len: usize) {
        self.index = len.saturating_sub(1);
        self.status = PlaybackStatus::Paused;
    }

    /// Keep the cursor on the newest element as the backing sequence grows.
    pub fn follow(&mut self, len: usize) {
        self.index = len.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_ticks_over_five_elements_halt_at_the_last() {
        let mut state = PlaybackState::new(PlaybackMode::Playback);
        state.toggle(5);
        assert!(state.is_playing());

        assert!(!state.advance(5));
        assert!(!state.advance(5));
        assert!(!state.advance(5));
        assert!(state.advance(5));
        assert_eq!(state.index, 4);
        assert_eq!(state.status, PlaybackStatus::Paused);
    }

    #[test]
    fn toggle_at_the_end_restarts_from_zero() {
        let mut state = PlaybackState::new(PlaybackMode::Playback);
        state.index = 4;
        state.toggle(5);
        assert_eq!(state.index, 0);
        assert!(state.is_playing());
    }

    #[test]
    fn empty_sequence_never_leaves_index_zero() {
        let mut state = PlaybackState::new(PlaybackMode::Playback);
        state.toggle(0);
        assert!(state.is_playing());
        assert!(state.advance(0));
        assert_eq!(state.index, 0);
        assert_eq!(state.status, PlaybackStatus::Paused);
    }

    #[test]
    fn single_element_halt_is_immediate() {
        let mut state = PlaybackState::new(PlaybackMode::Playback);
        state.toggle(1);
        assert!(state.advance(1));
        assert_eq!(state.index, 0);
    }
}
