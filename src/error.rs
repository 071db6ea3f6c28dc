use thiserror::Error;

/// Main error type for the video-analysis library
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Video source error: {0}")]
    Source(#[from] SourceError),

    #[error("Frame pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decode/seek source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to open video source: {path}")]
    OpenFailed { path: String },

    #[error("Failed to probe video source {path}: {reason}")]
    ProbeFailed { path: String, reason: String },

    #[error("Unsupported video source: {path}")]
    Unsupported { path: String },

    #[error("Frame decoding failed: {reason}")]
    DecodeFailed { reason: String },

    #[error("Seek to frame {index} failed: {reason}")]
    SeekFailed { index: u64, reason: String },
}

/// Grid composition and transform errors
///
/// These indicate the pipeline was invoked incorrectly; they are never retried.
#[derive(Error, Debug, PartialEq)]
pub enum PipelineError {
    #[error("Frame {index} is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        index: usize,
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Cannot lay out {frames} frames in {columns} columns")]
    LayoutError { frames: usize, columns: usize },

    #[error("Invalid transform parameters: {details}")]
    InvalidParameters { details: String },
}

/// Display surface and key input errors
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Failed to initialise display: {reason}")]
    InitFailed { reason: String },

    #[error("Failed to present frame: {reason}")]
    PresentFailed { reason: String },

    #[error("Failed to read key input: {reason}")]
    InputFailed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using PlayerError
pub type Result<T> = std::result::Result<T, PlayerError>;

impl PlayerError {
    /// Whether this error aborts a session before the first frame is shown
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            Self::Source(SourceError::OpenFailed { .. })
                | Self::Source(SourceError::ProbeFailed { .. })
                | Self::Source(SourceError::Unsupported { .. })
                | Self::Config(_)
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Source(SourceError::OpenFailed { path }) => {
                format!("Could not open video '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Source(SourceError::ProbeFailed { path, .. }) => {
                format!("Could not read video information from '{}'. Is ffprobe installed and on your PATH?", path)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_failure_is_startup_failure() {
        let err: PlayerError = SourceError::OpenFailed { path: "missing.mp4".to_string() }.into();
        assert!(err.is_startup_failure());
        assert!(err.user_message().contains("missing.mp4"));
    }

    #[test]
    fn test_layout_error_is_not_startup_failure() {
        let err: PlayerError = PipelineError::LayoutError { frames: 3, columns: 2 }.into();
        assert!(!err.is_startup_failure());
        assert_eq!(err.user_message(), "Frame pipeline error: Cannot lay out 3 frames in 2 columns");
    }
}
