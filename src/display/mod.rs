//! # Display Module
//!
//! Surfaces that composed frames are presented on.

mod png;
mod terminal;

use crate::error::DisplayError;
use crate::video::types::Frame;

pub use png::PngSink;
pub use terminal::TerminalDisplay;

/// A surface that shows one frame at a time
pub trait DisplaySink {
    /// Make `frame` visible on the surface named `label`
    fn present(&mut self, frame: &Frame, label: &str) -> Result<(), DisplayError>;

    /// Tear the surface down; called once on every exit path
    fn teardown(&mut self) {}
}
