use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use video_analysis::{
    config::{Config, DisplayBackend, LoggingConfig},
    display::{DisplaySink, PngSink, TerminalDisplay},
    input::TerminalInput,
    pipeline::FramePipeline,
    playback::{KeyEvent, PlaybackController, PlaybackExit},
    video::open_source,
};

#[derive(Parser)]
#[command(
    name = "video-analysis",
    version,
    about = "Play a video next to its grayscale, blurred and edge-detected versions",
    long_about = "Video Analysis plays a video file, an image or a directory of images as a 2x2 grid of the original frame and three processed versions. Keys pause, seek and switch to a fullscreen view of a single transform."
)]
struct Cli {
    /// Video, image or image directory; prompts when omitted
    path: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(config_path) => Config::from_file(config_path)
            .map_err(|e| anyhow!(e.user_message()))
            .with_context(|| format!("Failed to load configuration from {:?}", config_path))?,
        None => Config::default(),
    };
    config.validate().map_err(|e| anyhow!(e.user_message()))?;

    init_logging(&config.logging, cli.verbose)?;
    info!("Starting Video Analysis v{}", env!("CARGO_PKG_VERSION"));
    match &cli.config {
        Some(config_path) => info!("Loaded configuration from {:?}", config_path),
        None => info!("Using default configuration"),
    }

    print_banner();
    let video_path = match cli.path {
        Some(path) => path,
        None => prompt_for_path(&config.playback.default_video_path)?,
    };
    info!("Video: {:?}", video_path);

    let source = open_source(&video_path, config.playback.sequence_fps)
        .map_err(|e| anyhow!(e.user_message()))?;

    let display: Box<dyn DisplaySink> = match config.display.backend {
        DisplayBackend::Terminal => Box::new(TerminalDisplay::new()?),
        DisplayBackend::Png => {
            let output_dir = config
                .display
                .output_dir
                .as_ref()
                .ok_or_else(|| anyhow!("display.output_dir is required for the png backend"))?;
            Box::new(PngSink::new(output_dir)?)
        }
    };
    let input = TerminalInput::new()?;

    let controller = PlaybackController::new(
        source,
        display,
        Box::new(input),
        FramePipeline::new(config.pipeline.clone()),
        config.playback.clone(),
    );
    let summary = controller.run().map_err(|e| anyhow!(e.user_message()))?;

    if summary.exit == PlaybackExit::EndOfStream {
        println!("End of video!");
    }
    println!(
        "Displayed {} frames, stopped at frame {} of {} ({:.1}s)",
        summary.frames_displayed,
        summary.position.current_frame,
        summary.position.total_frames,
        summary.position.timestamp()
    );
    Ok(())
}

/// Key input puts the terminal in raw mode with either backend, so logs go to
/// the configured file and only fall back to stderr when none is set.
/// RUST_LOG takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    match logging.log_file() {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn print_banner() {
    println!("{}", "-".repeat(20));
    println!("Welcome to Video Analysis!");
    println!("{}", "-".repeat(20));
    println!("{}", KeyEvent::help());
}

/// Ask for a path on stdin; an empty answer selects `default_path`
fn prompt_for_path(default_path: &Path) -> Result<PathBuf> {
    print!("Enter your video's path [{}]: ", default_path.display());
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let answer = line.trim();
    if answer.is_empty() {
        Ok(default_path.to_path_buf())
    } else {
        Ok(PathBuf::from(answer))
    }
}
