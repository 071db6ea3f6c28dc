use crate::playback::state::SeekDirection;

/// Frame bookkeeping for one session
///
/// `current_frame` counts frames consumed, which is also the index of the
/// next frame the source yields. It never exceeds `total_frames`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackPosition {
    pub current_frame: u64,
    pub fps: f64,
    pub total_frames: u64,
}

impl PlaybackPosition {
    pub fn new(fps: f64, total_frames: u64) -> Self {
        Self {
            current_frame: 0,
            fps: if fps.is_finite() { fps.max(0.0) } else { 0.0 },
            total_frames,
        }
    }

    /// Record one successfully read frame
    ///
    /// Sources that under-report their length can run past `total_frames`;
    /// the total grows with them so the invariant holds.
    pub fn advance(&mut self) {
        self.current_frame += 1;
        self.total_frames = self.total_frames.max(self.current_frame);
    }

    /// Frames covered by a seek window of `seconds`
    pub fn seek_offset(&self, seconds: f64) -> u64 {
        (self.fps * seconds).round().max(0.0) as u64
    }

    /// Clamped absolute target of a relative seek
    pub fn seek_target(&self, direction: SeekDirection, seconds: f64) -> u64 {
        let offset = self.seek_offset(seconds);
        match direction {
            SeekDirection::Rewind => self.current_frame.saturating_sub(offset),
            SeekDirection::FastForward => self
                .current_frame
                .saturating_add(offset)
                .min(self.total_frames),
        }
    }

    /// Adopt the position the source landed on
    pub fn set_current(&mut self, frame: u64) {
        self.current_frame = frame.min(self.total_frames);
    }

    /// Seconds into the stream at the current frame
    pub fn timestamp(&self) -> f64 {
        if self.fps > 0.0 {
            self.current_frame as f64 / self.fps
        } else {
            0.0
        }
    }
}
