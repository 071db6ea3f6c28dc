use tracing::{debug, info, warn};

use crate::{
    config::PlaybackConfig,
    display::DisplaySink,
    error::Result,
    input::InputSource,
    pipeline::FramePipeline,
    playback::position::PlaybackPosition,
    playback::state::{Action, PauseOutcome, SeekDirection, SessionState},
    video::FrameSource,
};

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackExit {
    Quit,
    EndOfStream,
}

/// Result of a finished session
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSummary {
    pub exit: PlaybackExit,
    pub frames_displayed: u64,
    pub position: PlaybackPosition,
}

/// Drives one playback session
///
/// The controller exclusively owns the source, the display and the input for
/// the whole session and releases the first two before `run` returns, on
/// every exit path.
pub struct PlaybackController {
    source: Box<dyn FrameSource>,
    display: Box<dyn DisplaySink>,
    input: Box<dyn InputSource>,
    pipeline: FramePipeline,
    config: PlaybackConfig,
    state: SessionState,
    position: PlaybackPosition,
    frames_displayed: u64,
}

impl PlaybackController {
    pub fn new(
        source: Box<dyn FrameSource>,
        display: Box<dyn DisplaySink>,
        input: Box<dyn InputSource>,
        pipeline: FramePipeline,
        config: PlaybackConfig,
    ) -> Self {
        let position = PlaybackPosition::new(source.frame_rate(), source.frame_count());
        Self {
            source,
            display,
            input,
            pipeline,
            config,
            state: SessionState::new(),
            position,
            frames_displayed: 0,
        }
    }

    /// Play until quit or end of stream, then release the source and display
    pub fn run(mut self) -> Result<PlaybackSummary> {
        info!(
            "Starting playback: {:.2} fps, {} frames",
            self.position.fps, self.position.total_frames
        );

        let outcome = self.play();
        self.release();

        if let Ok(summary) = &outcome {
            info!(
                "Playback finished ({:?}) after {} frames",
                summary.exit, summary.frames_displayed
            );
        }
        outcome
    }

    fn play(&mut self) -> Result<PlaybackSummary> {
        loop {
            if self.state.paused {
                self.wait_while_paused()?;
            }
            if self.state.ended {
                return Ok(self.summary(PlaybackExit::Quit));
            }

            let frame = match self.source.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("End of video: no more frames left");
                    return Ok(self.summary(PlaybackExit::EndOfStream));
                }
                Err(e) => {
                    warn!("Read failed at frame {}, ending playback: {}", self.position.current_frame, e);
                    return Ok(self.summary(PlaybackExit::EndOfStream));
                }
            };
            self.position.advance();

            let display_frame = self.pipeline.render(&frame, self.state.view())?;
            self.display.present(&display_frame, &self.config.window_name)?;
            self.frames_displayed += 1;

            let Some(event) = self.input.poll_key(self.config.poll_interval())? else {
                continue;
            };
            if let Action::Seek(direction) = self.state.apply(event) {
                self.seek(direction)?;
            }
        }
    }

    /// Block until pause is toggled off or quit is pressed
    fn wait_while_paused(&mut self) -> Result<()> {
        info!("Paused at frame {}", self.position.current_frame);
        loop {
            let event = self.input.wait_key()?;
            match self.state.apply_while_paused(event) {
                PauseOutcome::Resume | PauseOutcome::Quit => return Ok(()),
                PauseOutcome::Ignored => continue,
            }
        }
    }

    fn seek(&mut self, direction: SeekDirection) -> Result<()> {
        let target = self.position.seek_target(direction, self.config.seek_seconds);
        info!(
            "{} from frame {} to frame {}",
            match direction {
                SeekDirection::Rewind => "Rewinding",
                SeekDirection::FastForward => "Fast forwarding",
            },
            self.position.current_frame,
            target
        );

        let landed = self.source.seek(target)?;
        if landed != target {
            warn!("Source landed on frame {} instead of {}", landed, target);
        }
        self.position.set_current(landed);
        Ok(())
    }

    fn release(&mut self) {
        debug!("Cleaning up");
        self.source.close();
        self.display.teardown();
    }

    fn summary(&self, exit: PlaybackExit) -> PlaybackSummary {
        PlaybackSummary {
            exit,
            frames_displayed: self.frames_displayed,
            position: self.position,
        }
    }
}
