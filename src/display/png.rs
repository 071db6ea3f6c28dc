use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::display::DisplaySink;
use crate::error::DisplayError;
use crate::video::types::Frame;

/// Sink writing every presented frame to a numbered PNG instead of the screen
///
/// Key input still comes from the terminal, so a terminal must be attached.
pub struct PngSink {
    output_dir: PathBuf,
    frames_written: usize,
}

impl PngSink {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self, DisplayError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        create_dir_all(&output_dir).map_err(|e| DisplayError::InitFailed {
            reason: format!("cannot create {}: {}", output_dir.display(), e),
        })?;

        info!("Writing frames to {:?}", output_dir);
        Ok(Self { output_dir, frames_written: 0 })
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    fn frame_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("frame_{:06}.png", index))
    }
}

impl DisplaySink for PngSink {
    fn present(&mut self, frame: &Frame, label: &str) -> Result<(), DisplayError> {
        let path = self.frame_path(self.frames_written);
        debug!("Saving {} frame to: {:?}", label, path);

        frame.save_png(&path).map_err(|e| DisplayError::PresentFailed {
            reason: format!("Failed to save frame: {}", e),
        })?;
        self.frames_written += 1;
        Ok(())
    }

    fn teardown(&mut self) {
        info!("Saved {} frames as images", self.frames_written);
    }
}
