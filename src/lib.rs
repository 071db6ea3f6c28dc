//! # Video Analysis
//!
//! Interactive video player that shows every frame next to its grayscale,
//! blurred and edge-detected versions.
//!
//! Frames come from a [`FrameSource`](video::FrameSource) (ffmpeg for video
//! files, the `image` crate for stills and image directories), go through the
//! [`FramePipeline`](pipeline::FramePipeline) and are shown on a
//! [`DisplaySink`](display::DisplaySink). Single key presses pause, seek and
//! switch between the comparison grid and a fullscreen mode.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use video_analysis::{
//!     config::Config,
//!     display::TerminalDisplay,
//!     input::TerminalInput,
//!     pipeline::FramePipeline,
//!     playback::PlaybackController,
//!     video::open_source,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let source = open_source("clip.mp4", config.playback.sequence_fps)?;
//!
//! let controller = PlaybackController::new(
//!     source,
//!     Box::new(TerminalDisplay::new()?),
//!     Box::new(TerminalInput::new()?),
//!     FramePipeline::new(config.pipeline.clone()),
//!     config.playback.clone(),
//! );
//! let summary = controller.run()?;
//! println!("{} frames shown", summary.frames_displayed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`video`] - Frame type and frame sources
//! - [`pipeline`] - Grayscale, blur, edge detection and grid layout
//! - [`playback`] - Key bindings, session state and the controller loop
//! - [`display`] - Terminal and PNG output
//! - [`input`] - Key input
//! - [`config`] - Configuration management

pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod playback;
pub mod video;

pub use crate::{
    config::Config,
    error::{PlayerError, Result},
    pipeline::{FramePipeline, FullscreenMode, View},
    playback::{PlaybackController, PlaybackExit, PlaybackSummary},
    video::{Frame, FrameSource},
};
