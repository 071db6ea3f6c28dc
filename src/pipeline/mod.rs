//! # Frame Transform Pipeline
//!
//! Side-effect-free transforms from a decoded frame to the frame that gets
//! displayed. Every output is 3-channel RGB, so any combination of transforms
//! can be laid out together by [`compose_grid`].
//!
//! ```rust,no_run
//! use video_analysis::pipeline::{comparison_view, FullscreenMode, FramePipeline, View};
//! use video_analysis::config::PipelineConfig;
//! use video_analysis::video::Frame;
//!
//! let frame = Frame::new_filled(320, 240, [30, 90, 160]);
//! let grid = comparison_view(&frame, (5, 5), 200.0, 300.0).unwrap();
//! assert_eq!(grid.dimensions(), (640, 480));
//!
//! let pipeline = FramePipeline::new(PipelineConfig::default());
//! let edges = pipeline.render(&frame, View::Fullscreen(FullscreenMode::EdgeDetect)).unwrap();
//! ```

mod edges;
mod layout;
mod transforms;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::video::types::Frame;

pub use edges::edge_detect;
pub use layout::{comparison_grid, comparison_view, compose_grid, COMPARISON_COLUMNS, COMPARISON_PANELS};
pub use transforms::{blur, scale, to_grayscale};

/// The single transform shown in fullscreen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullscreenMode {
    #[default]
    Original,
    Grayscale,
    Blur,
    EdgeDetect,
}

impl FullscreenMode {
    pub const ALL: [FullscreenMode; 4] = [
        FullscreenMode::Original,
        FullscreenMode::Grayscale,
        FullscreenMode::Blur,
        FullscreenMode::EdgeDetect,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FullscreenMode::Original => "original",
            FullscreenMode::Grayscale => "grayscale",
            FullscreenMode::Blur => "blur",
            FullscreenMode::EdgeDetect => "edge detect",
        }
    }
}

/// What the display shows for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Comparison,
    Fullscreen(FullscreenMode),
}

/// Applies the configured transforms for a [`View`]
#[derive(Debug, Clone)]
pub struct FramePipeline {
    config: PipelineConfig,
}

impl FramePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Grid rows of the comparison view, and the vertical fullscreen factor
    pub fn grid_rows(&self) -> usize {
        COMPARISON_PANELS / self.config.grid_columns.max(1)
    }

    pub fn render(&self, frame: &Frame, view: View) -> Result<Frame, PipelineError> {
        match view {
            View::Comparison => self.comparison(frame),
            View::Fullscreen(mode) => self.fullscreen(frame, mode),
        }
    }

    pub fn comparison(&self, frame: &Frame) -> Result<Frame, PipelineError> {
        comparison_grid(
            frame,
            self.config.blur_kernel,
            self.config.edge_low_threshold,
            self.config.edge_high_threshold,
            self.config.grid_columns,
        )
    }

    /// Apply `mode` and enlarge the result to the area the grid would cover
    pub fn fullscreen(&self, frame: &Frame, mode: FullscreenMode) -> Result<Frame, PipelineError> {
        let width_factor = self.config.grid_columns as f64;
        let height_factor = self.grid_rows() as f64;

        match mode {
            FullscreenMode::Original => scale(frame, width_factor, height_factor),
            _ => scale(&self.apply_mode(frame, mode)?, width_factor, height_factor),
        }
    }

    /// The transform for `mode` alone, at the input size
    pub fn apply_mode(&self, frame: &Frame, mode: FullscreenMode) -> Result<Frame, PipelineError> {
        match mode {
            FullscreenMode::Original => Ok(frame.clone()),
            FullscreenMode::Grayscale => Ok(to_grayscale(frame)),
            FullscreenMode::Blur => blur(frame, self.config.blur_kernel),
            FullscreenMode::EdgeDetect => edge_detect(
                frame,
                self.config.edge_low_threshold,
                self.config.edge_high_threshold,
            ),
        }
    }
}

impl Default for FramePipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
