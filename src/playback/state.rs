use tracing::{debug, info};

use crate::pipeline::{FullscreenMode, View};
use crate::playback::keys::KeyEvent;

/// Direction of a relative seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDirection {
    Rewind,
    FastForward,
}

/// What the controller must do after an event was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Seek(SeekDirection),
}

/// Outcome of one key while paused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    Resume,
    Quit,
    /// The key is dropped and the wait repeats
    Ignored,
}

/// Mutable session state, owned by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub paused: bool,
    pub fullscreen: bool,
    pub ended: bool,
    /// Kept while fullscreen is toggled off so toggling back restores it
    pub fullscreen_mode: FullscreenMode,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        if self.fullscreen {
            View::Fullscreen(self.fullscreen_mode)
        } else {
            View::Comparison
        }
    }

    /// Apply an event polled during playback
    pub fn apply(&mut self, event: KeyEvent) -> Action {
        match event {
            KeyEvent::PauseToggle => {
                info!("Toggling pause/play");
                self.paused = !self.paused;
            }
            KeyEvent::Quit => {
                info!("Ending video");
                self.ended = true;
            }
            KeyEvent::FullscreenToggle => {
                info!("Toggling fullscreen");
                self.fullscreen = !self.fullscreen;
            }
            KeyEvent::FullscreenSelect(mode) => {
                info!("Setting fullscreen mode to {}", mode.name());
                self.fullscreen = true;
                self.fullscreen_mode = mode;
            }
            KeyEvent::Rewind => return Action::Seek(SeekDirection::Rewind),
            KeyEvent::FastForward => return Action::Seek(SeekDirection::FastForward),
            KeyEvent::Unbound(key) => {
                debug!("Invalid key pressed: {:?}", key);
            }
        }
        Action::None
    }

    /// Apply an event received while paused; only pause/play and quit count
    pub fn apply_while_paused(&mut self, event: KeyEvent) -> PauseOutcome {
        match event {
            KeyEvent::PauseToggle => {
                info!("Resuming playback");
                self.paused = false;
                PauseOutcome::Resume
            }
            KeyEvent::Quit => {
                info!("Ending video");
                self.ended = true;
                PauseOutcome::Quit
            }
            other => {
                debug!("Ignoring {:?} while paused", other);
                PauseOutcome::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SessionState::new();
        assert!(!state.paused);
        assert!(!state.fullscreen);
        assert!(!state.ended);
        assert_eq!(state.fullscreen_mode, FullscreenMode::Original);
        assert_eq!(state.view(), View::Comparison);
    }

    #[test]
    fn test_even_pause_toggles_restore_state() {
        let mut state = SessionState::new();
        for count in [2, 4, 6] {
            for _ in 0..count {
                state.apply(KeyEvent::PauseToggle);
            }
            assert!(!state.paused, "after {} toggles", count);
        }
        state.apply(KeyEvent::PauseToggle);
        assert!(state.paused);
    }

    #[test]
    fn test_fullscreen_select_sets_mode_and_fullscreen() {
        for already_fullscreen in [false, true] {
            let mut state = SessionState { fullscreen: already_fullscreen, ..SessionState::new() };
            let action = state.apply(KeyEvent::FullscreenSelect(FullscreenMode::Grayscale));

            assert_eq!(action, Action::None);
            assert!(state.fullscreen);
            assert_eq!(state.fullscreen_mode, FullscreenMode::Grayscale);
            assert_eq!(state.view(), View::Fullscreen(FullscreenMode::Grayscale));
        }
    }

    #[test]
    fn test_fullscreen_toggle_keeps_mode() {
        let mut state = SessionState::new();
        state.apply(KeyEvent::FullscreenSelect(FullscreenMode::Blur));
        state.apply(KeyEvent::FullscreenToggle);
        assert!(!state.fullscreen);
        assert_eq!(state.view(), View::Comparison);

        state.apply(KeyEvent::FullscreenToggle);
        assert_eq!(state.view(), View::Fullscreen(FullscreenMode::Blur));
    }

    #[test]
    fn test_quit_is_terminal() {
        let mut state = SessionState::new();
        state.apply(KeyEvent::Quit);
        state.apply(KeyEvent::PauseToggle);
        state.apply(KeyEvent::Quit);
        assert!(state.ended);
    }

    #[test]
    fn test_seek_keys_leave_state_untouched() {
        let mut state = SessionState::new();
        let before = state;
        assert_eq!(state.apply(KeyEvent::Rewind), Action::Seek(SeekDirection::Rewind));
        assert_eq!(state.apply(KeyEvent::FastForward), Action::Seek(SeekDirection::FastForward));
        assert_eq!(state, before);
    }

    #[test]
    fn test_unbound_key_is_noop() {
        let mut state = SessionState::new();
        let before = state;
        assert_eq!(state.apply(KeyEvent::Unbound('x')), Action::None);
        assert_eq!(state, before);
    }

    #[test]
    fn test_paused_ignores_everything_but_pause_and_quit() {
        let ignored = [
            KeyEvent::FullscreenToggle,
            KeyEvent::FullscreenSelect(FullscreenMode::EdgeDetect),
            KeyEvent::Rewind,
            KeyEvent::FastForward,
            KeyEvent::Unbound('z'),
        ];

        let mut state = SessionState { paused: true, ..SessionState::new() };
        let before = state;
        for event in ignored {
            assert_eq!(state.apply_while_paused(event), PauseOutcome::Ignored);
            assert_eq!(state, before);
        }

        assert_eq!(state.apply_while_paused(KeyEvent::PauseToggle), PauseOutcome::Resume);
        assert!(!state.paused);
    }

    #[test]
    fn test_quit_while_paused() {
        let mut state = SessionState { paused: true, ..SessionState::new() };
        assert_eq!(state.apply_while_paused(KeyEvent::Quit), PauseOutcome::Quit);
        assert!(state.ended);
    }
}
