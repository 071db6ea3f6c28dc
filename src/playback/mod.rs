//! # Playback Module
//!
//! Key bindings, session state, frame bookkeeping and the controller loop
//! that ties a source, the pipeline and a display together.

pub mod controller;
pub mod keys;
pub mod position;
pub mod state;

pub use controller::{PlaybackController, PlaybackExit, PlaybackSummary};
pub use keys::KeyEvent;
pub use position::PlaybackPosition;
pub use state::{Action, PauseOutcome, SeekDirection, SessionState};
