//! # Video Source Module
//!
//! Frame type and the decode/seek sources the player reads from.

pub mod types;
pub mod source;

mod ffmpeg;
mod images;

pub use types::Frame;
pub use source::{open_source, FrameSource, MemorySource, SourceInfo};
pub use ffmpeg::FfmpegSource;
pub use images::ImageSequenceSource;
