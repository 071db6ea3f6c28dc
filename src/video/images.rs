use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::video::source::{FrameSource, SourceInfo};
use crate::video::types::Frame;

/// Plays a still image, or a directory of images sorted by file name, as a
/// video at a fixed frame rate
///
/// Frames are decoded lazily; every image must match the first one's size.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    info: SourceInfo,
    position: u64,
    closed: bool,
}

impl ImageSequenceSource {
    pub fn open<P: AsRef<Path>>(path: P, fps: f64) -> Result<Self, SourceError> {
        let path = path.as_ref();

        let paths = if path.is_dir() {
            Self::collect_images(path)?
        } else if Self::is_image_file(path) && path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(SourceError::Unsupported { path: path.display().to_string() });
        };

        let first = paths
            .first()
            .ok_or_else(|| SourceError::OpenFailed {
                path: format!("No supported image files found in {}", path.display()),
            })?;
        let (width, height) = image::image_dimensions(first)
            .map_err(|_| SourceError::OpenFailed { path: first.display().to_string() })?;

        info!("Loaded {} image frame(s) from {:?}", paths.len(), path);

        Ok(Self {
            info: SourceInfo {
                width,
                height,
                fps,
                frame_count: paths.len() as u64,
            },
            paths,
            position: 0,
            closed: false,
        })
    }

    pub fn is_image_file<P: AsRef<Path>>(path: P) -> bool {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) => matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "png" | "bmp"),
            None => false,
        }
    }

    fn collect_images(directory: &Path) -> Result<Vec<PathBuf>, SourceError> {
        let entries = std::fs::read_dir(directory)
            .map_err(|_| SourceError::OpenFailed { path: directory.display().to_string() })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && !Self::is_hidden_file(path) && Self::is_image_file(path))
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn is_hidden_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
    }
}

impl FrameSource for ImageSequenceSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.closed {
            return Ok(None);
        }
        let Some(path) = self.paths.get(self.position as usize) else {
            return Ok(None);
        };

        let image = image::open(path).map_err(|e| SourceError::DecodeFailed {
            reason: format!("{}: {}", path.display(), e),
        })?;
        let frame = Frame::new(image.to_rgb8());

        if frame.dimensions() != (self.info.width, self.info.height) {
            warn!("Image {:?} does not match sequence dimensions", path);
            return Err(SourceError::DecodeFailed {
                reason: format!(
                    "{} is {}x{}, sequence is {}x{}",
                    path.display(),
                    frame.width(),
                    frame.height(),
                    self.info.width,
                    self.info.height
                ),
            });
        }

        self.position += 1;
        Ok(Some(frame))
    }

    fn seek(&mut self, index: u64) -> Result<u64, SourceError> {
        self.position = index.min(self.info.frame_count);
        debug!("Image sequence positioned at frame {}", self.position);
        Ok(self.position)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
