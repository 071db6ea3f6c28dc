use std::path::Path;

use tracing::{info, warn};

use crate::error::{Result, SourceError};
use crate::video::ffmpeg::FfmpegSource;
use crate::video::images::ImageSequenceSource;
use crate::video::types::Frame;

/// Stream properties reported by a source when it is opened
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: u64,
}

/// A decoded, seekable stream of frames
///
/// `position` is the index of the next frame `read_frame` will yield.
pub trait FrameSource {
    fn info(&self) -> &SourceInfo;

    /// Read the next frame, or `Ok(None)` once the stream is exhausted
    fn read_frame(&mut self) -> std::result::Result<Option<Frame>, SourceError>;

    /// Reposition to an absolute frame index and return the position landed on
    ///
    /// Callers clamp the index to `0..=frame_count` beforehand.
    fn seek(&mut self, index: u64) -> std::result::Result<u64, SourceError>;

    fn position(&self) -> u64;

    /// Release the decode handle; further reads report end of stream
    fn close(&mut self);

    fn frame_rate(&self) -> f64 {
        self.info().fps
    }

    fn frame_count(&self) -> u64 {
        self.info().frame_count
    }
}

/// Open a source for `path`, picking the backend from what the path points at
///
/// Directories and still images are read with the `image` crate; everything
/// else is handed to ffmpeg.
pub fn open_source<P: AsRef<Path>>(path: P, sequence_fps: f64) -> Result<Box<dyn FrameSource>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SourceError::OpenFailed { path: path.display().to_string() }.into());
    }

    let source: Box<dyn FrameSource> = if path.is_dir() || ImageSequenceSource::is_image_file(path) {
        Box::new(ImageSequenceSource::open(path, sequence_fps)?)
    } else {
        if !FfmpegSource::check_ffmpeg_available() {
            warn!("ffmpeg was not found on PATH; video files cannot be decoded");
        }
        Box::new(FfmpegSource::open(path)?)
    };

    let info = source.info();
    info!(
        "Video opened successfully: {}x{} @ {:.2} fps, {} frames",
        info.width, info.height, info.fps, info.frame_count
    );
    Ok(source)
}

/// In-memory source over pre-decoded frames
pub struct MemorySource {
    frames: Vec<Frame>,
    info: SourceInfo,
    position: u64,
    closed: bool,
}

impl MemorySource {
    pub fn new(frames: Vec<Frame>, fps: f64) -> Self {
        let (width, height) = frames.first().map(Frame::dimensions).unwrap_or((0, 0));
        let info = SourceInfo {
            width,
            height,
            fps,
            frame_count: frames.len() as u64,
        };
        Self { frames, info, position: 0, closed: false }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameSource for MemorySource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn read_frame(&mut self) -> std::result::Result<Option<Frame>, SourceError> {
        if self.closed {
            return Ok(None);
        }
        let frame = self.frames.get(self.position as usize).cloned();
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }

    fn seek(&mut self, index: u64) -> std::result::Result<u64, SourceError> {
        self.position = index.min(self.info.frame_count);
        Ok(self.position)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_reads_in_order_then_ends() {
        let frames = (0..3).map(|i| Frame::new_filled(2, 2, [i, 0, 0])).collect();
        let mut source = MemorySource::new(frames, 30.0);

        assert_eq!(source.frame_count(), 3);
        for i in 0..3 {
            let frame = source.read_frame().unwrap().unwrap();
            assert_eq!(frame.get_pixel(0, 0)[0], i);
        }
        assert!(source.read_frame().unwrap().is_none());
        assert_eq!(source.position(), 3);
    }

    #[test]
    fn test_memory_source_close_ends_stream() {
        let frames = vec![Frame::new_black(1, 1); 3];
        let mut source = MemorySource::new(frames, 30.0);

        assert!(!source.is_closed());
        source.close();
        assert!(source.is_closed());
        assert!(source.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_memory_source_seek_clamps() {
        let frames = vec![Frame::new_black(1, 1); 5];
        let mut source = MemorySource::new(frames, 25.0);

        assert_eq!(source.seek(2).unwrap(), 2);
        assert_eq!(source.seek(99).unwrap(), 5);
        assert!(source.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_open_missing_path_is_open_failure() {
        let err = open_source("definitely/not/here.mp4", 30.0).err().unwrap();
        assert!(err.is_startup_failure());
    }
}
