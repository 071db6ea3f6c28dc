use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::video::source::{FrameSource, SourceInfo};
use crate::video::types::Frame;

const RGB_CHANNELS: usize = 3;

/// Decodes a video through a long-running `ffmpeg` process writing raw
/// `rgb24` frames to a pipe
///
/// Seeking restarts the process at the target timestamp, which also covers
/// backward seeks.
pub struct FfmpegSource {
    path: PathBuf,
    info: SourceInfo,
    decoder: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    position: u64,
    frame_bytes: usize,
}

impl FfmpegSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SourceError::OpenFailed { path: path.display().to_string() });
        }

        let info = probe(path)?;
        if info.width == 0 || info.height == 0 {
            return Err(SourceError::OpenFailed { path: path.display().to_string() });
        }

        let mut source = Self {
            path: path.to_path_buf(),
            frame_bytes: info.width as usize * info.height as usize * RGB_CHANNELS,
            info,
            decoder: None,
            stdout: None,
            position: 0,
        };
        source
            .spawn_decoder(0)
            .map_err(|_| SourceError::OpenFailed { path: path.display().to_string() })?;

        Ok(source)
    }

    /// Check that the ffmpeg binary is available
    pub fn check_ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn spawn_decoder(&mut self, start_frame: u64) -> std::io::Result<()> {
        self.stop_decoder();
        let start = StartPoint::for_frame(start_frame, self.info.fps);

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-v", "error", "-nostdin"]);
        if let StartPoint::Timestamp(start_time) = start {
            cmd.args(["-ss", &format!("{:.6}", start_time)]);
        }
        cmd.arg("-i")
            .arg(&self.path)
            .args(["-an", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            // an unread stderr pipe eventually fills and stalls the decoder
            .stderr(Stdio::null());

        let mut child = cmd.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::new(ErrorKind::BrokenPipe, "ffmpeg stdout unavailable"))?;

        debug!("Started ffmpeg decoder for {:?} at {:?}", self.path, start);
        self.decoder = Some(child);
        let mut reader = BufReader::with_capacity(self.frame_bytes, stdout);

        self.position = match start {
            StartPoint::Beginning => 0,
            StartPoint::Timestamp(_) => start_frame,
            StartPoint::Discard(frames) => {
                let skipped = skip_frames(&mut reader, frames, self.frame_bytes)?;
                if skipped < frames {
                    warn!("Stream ended after {} of {} skipped frames", skipped, frames);
                }
                skipped
            }
        };
        self.stdout = Some(reader);
        Ok(())
    }

    fn stop_decoder(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.decoder.take() {
            // the process may already have exited at end of stream
            let _ = child.kill();
            if let Err(e) = child.wait() {
                warn!("Failed to reap ffmpeg decoder: {}", e);
            }
        }
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buffer = vec![0u8; self.frame_bytes];
        match stdout.read_exact(&mut buffer) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => {
                return Err(SourceError::DecodeFailed { reason: e.to_string() });
            }
        }

        self.position += 1;
        Frame::from_rgb_bytes(self.info.width, self.info.height, buffer)
            .map(Some)
            .ok_or_else(|| SourceError::DecodeFailed {
                reason: "frame buffer does not match stream dimensions".to_string(),
            })
    }

    fn seek(&mut self, index: u64) -> Result<u64, SourceError> {
        if index == self.position && self.stdout.is_some() {
            return Ok(self.position);
        }
        self.spawn_decoder(index).map_err(|e| SourceError::SeekFailed {
            index,
            reason: e.to_string(),
        })?;
        Ok(self.position)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) {
        if self.decoder.is_some() {
            info!("Closing ffmpeg decoder for {:?}", self.path);
        }
        self.stop_decoder();
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// Where a restarted decoder begins
#[derive(Debug, Clone, Copy, PartialEq)]
enum StartPoint {
    Beginning,
    /// Input seek with `-ss`, in seconds
    Timestamp(f64),
    /// Decode from the start and drop this many frames; used when the
    /// stream reports no frame rate to convert an index into a timestamp
    Discard(u64),
}

impl StartPoint {
    fn for_frame(start_frame: u64, fps: f64) -> Self {
        if start_frame == 0 {
            StartPoint::Beginning
        } else if fps.is_finite() && fps > 0.0 {
            StartPoint::Timestamp(start_frame as f64 / fps)
        } else {
            StartPoint::Discard(start_frame)
        }
    }
}

/// Read and drop up to `frames` whole frames; returns how many were dropped
fn skip_frames<R: Read>(reader: &mut R, frames: u64, frame_bytes: usize) -> std::io::Result<u64> {
    if frame_bytes == 0 {
        return Ok(0);
    }
    let wanted = frames.saturating_mul(frame_bytes as u64);
    let dropped = std::io::copy(&mut reader.by_ref().take(wanted), &mut std::io::sink())?;
    Ok(dropped / frame_bytes as u64)
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Read stream dimensions, rate and frame count with `ffprobe`
fn probe(path: &Path) -> Result<SourceInfo, SourceError> {
    let output = Command::new("ffprobe")
        .args([
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,avg_frame_rate,nb_frames,duration:format=duration",
            "-of", "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| SourceError::ProbeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        // ffprobe rejects files it cannot demux, which is an open failure
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("ffprobe failed for {}: {}", path.display(), stderr.trim());
        return Err(SourceError::OpenFailed { path: path.display().to_string() });
    }

    parse_probe_output(&output.stdout).map_err(|reason| SourceError::ProbeFailed {
        path: path.display().to_string(),
        reason,
    })
}

fn parse_probe_output(json: &[u8]) -> Result<SourceInfo, String> {
    let probe: ProbeOutput = serde_json::from_slice(json).map_err(|e| e.to_string())?;
    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| "no video stream".to_string())?;

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rational)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rational))
        .unwrap_or(0.0);

    let frame_count = match stream.nb_frames.as_deref().and_then(|n| n.parse::<u64>().ok()) {
        Some(count) => count,
        None => {
            let duration = stream
                .duration
                .as_deref()
                .or(probe.format.as_ref().and_then(|f| f.duration.as_deref()))
                .and_then(|d| d.parse::<f64>().ok())
                .unwrap_or(0.0);
            (duration * fps).round().max(0.0) as u64
        }
    };

    Ok(SourceInfo {
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
        fps,
        frame_count,
    })
}

/// Parse an ffprobe rate such as `30000/1001`; `0/0` yields `None`
fn parse_rational(value: &str) -> Option<f64> {
    let (num, den) = match value.split_once('/') {
        Some((num, den)) => (num.trim().parse::<f64>().ok()?, den.trim().parse::<f64>().ok()?),
        None => (value.trim().parse::<f64>().ok()?, 1.0),
    };
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rational() {
        assert_eq!(parse_rational("30/1"), Some(30.0));
        assert_eq!(parse_rational("25"), Some(25.0));
        assert_eq!(parse_rational("0/0"), None);
        let ntsc = parse_rational("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_probe_output_with_frame_count() {
        let json = br#"{
            "programs": [],
            "streams": [
                { "width": 1280, "height": 720, "r_frame_rate": "30/1",
                  "avg_frame_rate": "30/1", "nb_frames": "300", "duration": "10.000000" }
            ],
            "format": { "duration": "10.010000" }
        }"#;
        let info = parse_probe_output(json).unwrap();

        assert_eq!(info.width, 1280);
        assert_eq!(info.height, 720);
        assert_eq!(info.fps, 30.0);
        assert_eq!(info.frame_count, 300);
    }

    #[test]
    fn test_parse_probe_output_estimates_count_from_duration() {
        let json = br#"{
            "streams": [ { "width": 640, "height": 480, "r_frame_rate": "25/1", "avg_frame_rate": "0/0" } ],
            "format": { "duration": "4.0" }
        }"#;
        let info = parse_probe_output(json).unwrap();

        assert_eq!(info.fps, 25.0);
        assert_eq!(info.frame_count, 100);
    }

    #[test]
    fn test_parse_probe_output_without_video_stream() {
        let json = br#"{ "streams": [], "format": { "duration": "3.0" } }"#;
        assert!(parse_probe_output(json).is_err());
    }

    #[test]
    fn test_start_point_uses_timestamp_when_rate_known() {
        assert_eq!(StartPoint::for_frame(0, 25.0), StartPoint::Beginning);
        assert_eq!(StartPoint::for_frame(50, 25.0), StartPoint::Timestamp(2.0));
    }

    #[test]
    fn test_start_point_discards_without_rate() {
        assert_eq!(StartPoint::for_frame(5, 0.0), StartPoint::Discard(5));
        assert_eq!(StartPoint::for_frame(5, f64::NAN), StartPoint::Discard(5));
        assert_eq!(StartPoint::for_frame(0, 0.0), StartPoint::Beginning);
    }

    /// Ten 2x1 frames whose bytes all hold the frame index
    fn indexed_stream() -> Vec<u8> {
        (0..10u8).flat_map(|i| std::iter::repeat(i).take(6)).collect()
    }

    #[test]
    fn test_skip_frames_lands_on_requested_frame() {
        let mut reader = std::io::Cursor::new(indexed_stream());
        assert_eq!(skip_frames(&mut reader, 5, 6).unwrap(), 5);

        let mut next = vec![0u8; 6];
        reader.read_exact(&mut next).unwrap();
        let frame = Frame::from_rgb_bytes(2, 1, next).unwrap();
        assert_eq!(frame.get_pixel(0, 0), [5, 5, 5]);
    }

    #[test]
    fn test_skip_frames_stops_at_end_of_stream() {
        let mut reader = std::io::Cursor::new(indexed_stream());
        assert_eq!(skip_frames(&mut reader, 25, 6).unwrap(), 10);
        assert_eq!(skip_frames(&mut reader, 1, 6).unwrap(), 0);
    }

    #[test]
    fn test_open_missing_file() {
        let err = FfmpegSource::open("no/such/video.mp4").err().unwrap();
        assert!(matches!(err, SourceError::OpenFailed { .. }));
    }
}
