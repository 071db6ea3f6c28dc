//! # Key Input
//!
//! Sources of [`KeyEvent`]s for the playback controller.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{debug, warn};

use crate::error::DisplayError;
use crate::playback::keys::KeyEvent;

/// Where key events come from
pub trait InputSource {
    /// Wait at most `timeout` for a key; `None` when nothing was pressed
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, DisplayError>;

    /// Block until a key arrives
    fn wait_key(&mut self) -> Result<KeyEvent, DisplayError>;
}

/// Reads single key presses from the terminal in raw mode
///
/// Raw mode is enabled for the lifetime of the value and restored on drop.
pub struct TerminalInput {
    raw_mode: bool,
}

impl TerminalInput {
    pub fn new() -> Result<Self, DisplayError> {
        enable_raw_mode().map_err(|e| DisplayError::InitFailed { reason: e.to_string() })?;
        Ok(Self { raw_mode: true })
    }

    fn read_event(&mut self) -> Result<Option<KeyEvent>, DisplayError> {
        let event = event::read().map_err(|e| DisplayError::InputFailed { reason: e.to_string() })?;
        Ok(map_event(event))
    }
}

/// Translate a terminal event into a key event
///
/// Releases, repeats and non-key events map to `None`. Ctrl+C quits because
/// raw mode swallows the interrupt signal.
fn map_event(event: Event) -> Option<KeyEvent> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyEvent::Quit),
        KeyCode::Char(c) => Some(KeyEvent::from_char(c)),
        other => {
            debug!("Invalid key pressed: {:?}", other);
            None
        }
    }
}

impl InputSource for TerminalInput {
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, DisplayError> {
        let ready = event::poll(timeout).map_err(|e| DisplayError::InputFailed { reason: e.to_string() })?;
        if !ready {
            return Ok(None);
        }
        self.read_event()
    }

    fn wait_key(&mut self) -> Result<KeyEvent, DisplayError> {
        loop {
            if let Some(key) = self.read_event()? {
                return Ok(key);
            }
        }
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        if self.raw_mode {
            if let Err(e) = disable_raw_mode() {
                warn!("Failed to restore terminal mode: {}", e);
            }
            self.raw_mode = false;
        }
    }
}
