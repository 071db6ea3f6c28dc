use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    pipeline::COMPARISON_PANELS,
};

/// Main configuration for the player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transform parameters
    pub pipeline: PipelineConfig,

    /// Playback and seek settings
    pub playback: PlaybackConfig,

    /// Where frames are presented
    pub display: DisplayConfig,

    /// Log level and destination
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        self.playback.validate()?;
        self.display.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Transform parameters shared by the comparison and fullscreen views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gaussian kernel (width, height); both odd
    pub blur_kernel: (u32, u32),

    /// Hysteresis thresholds on the gradient magnitude
    pub edge_low_threshold: f32,
    pub edge_high_threshold: f32,

    /// Columns of the comparison grid; must divide the four panels
    pub grid_columns: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_kernel: (5, 5),
            edge_low_threshold: 200.0,
            edge_high_threshold: 300.0,
            grid_columns: 2,
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        let (kernel_w, kernel_h) = self.blur_kernel;
        if kernel_w == 0 || kernel_h == 0 || kernel_w % 2 == 0 || kernel_h % 2 == 0 {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.blur_kernel".to_string(),
                value: format!("{}x{}", kernel_w, kernel_h)
            }.into());
        }

        if !(self.edge_low_threshold >= 0.0 && self.edge_low_threshold < self.edge_high_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.edge_thresholds".to_string(),
                value: format!("{}-{}", self.edge_low_threshold, self.edge_high_threshold)
            }.into());
        }

        if self.grid_columns == 0 || COMPARISON_PANELS % self.grid_columns != 0 {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.grid_columns".to_string(),
                value: self.grid_columns.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Playback, seek and prompt settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Rewind / fast-forward window in seconds
    pub seek_seconds: f64,

    /// Key poll timeout between frames (milliseconds)
    pub poll_interval_ms: u64,

    /// Frame rate assigned to image sequences
    pub sequence_fps: f64,

    /// Path used when the prompt is left empty
    pub default_video_path: PathBuf,

    /// Label of the display surface
    pub window_name: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            seek_seconds: 5.0,
            poll_interval_ms: 1,
            sequence_fps: 30.0,
            default_video_path: PathBuf::from("Resources/2022 Reel.mp4"),
            window_name: "Video Analysis".to_string(),
        }
    }
}

impl PlaybackConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if !self.seek_seconds.is_finite() || self.seek_seconds < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "playback.seek_seconds".to_string(),
                value: self.seek_seconds.to_string()
            }.into());
        }

        if !self.sequence_fps.is_finite() || self.sequence_fps <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "playback.sequence_fps".to_string(),
                value: self.sequence_fps.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Display backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayBackend {
    /// Truecolor rendering in the terminal
    #[default]
    Terminal,
    /// Write every presented frame to `output_dir` as PNG
    Png,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub backend: DisplayBackend,

    /// Destination of the png backend
    pub output_dir: Option<PathBuf>,
}

impl DisplayConfig {
    fn validate(&self) -> Result<()> {
        if self.backend == DisplayBackend::Png && self.output_dir.is_none() {
            return Err(ConfigError::InvalidValue {
                key: "display.output_dir".to_string(),
                value: "<unset>".to_string()
            }.into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,

    /// Log destination; stderr when unset, which interleaves with raw-mode output
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some(PathBuf::from("video-analysis.log")),
        }
    }
}

impl LoggingConfig {
    /// File that logs are written to, independent of the display backend
    pub fn log_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    fn validate(&self) -> Result<()> {
        let known = ["trace", "debug", "info", "warn", "error", "off"];
        if !known.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.level.clone()
            }.into());
        }
        Ok(())
    }
}
