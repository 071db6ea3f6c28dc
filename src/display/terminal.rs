use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use image::imageops::FilterType;
use tracing::{debug, info};

use crate::display::DisplaySink;
use crate::error::DisplayError;
use crate::video::types::Frame;

// each cell shows two vertically stacked pixels: foreground top, background bottom
const UPPER_HALF_BLOCK: char = '\u{2580}';
const STATUS_ROWS: u16 = 1;

/// Truecolor frame rendering on the alternate screen
pub struct TerminalDisplay {
    stdout: Stdout,
    title: Option<String>,
    layout: Option<Layout>,
    active: bool,
}

/// Placement of the last rendered frame, used to detect when to clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    columns: u16,
    rows: u16,
    width: u32,
    height: u32,
}

impl TerminalDisplay {
    pub fn new() -> Result<Self, DisplayError> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All)).map_err(|e| {
            DisplayError::InitFailed { reason: e.to_string() }
        })?;

        info!("Initialized terminal display");
        Ok(Self {
            stdout,
            title: None,
            layout: None,
            active: true,
        })
    }

    /// Largest pixel size with the frame's aspect ratio that fits the cells
    fn fit(frame_width: u32, frame_height: u32, columns: u16, rows: u16) -> (u32, u32) {
        let max_width = columns.max(1) as f64;
        let max_height = (rows.max(1) as f64) * 2.0;
        let ratio = (max_width / frame_width.max(1) as f64).min(max_height / frame_height.max(1) as f64);

        // the epsilon keeps exact fits like 1080 * (80 / 1920) from flooring to 44
        let width = ((frame_width as f64 * ratio + 1e-9).floor() as u32).max(1);
        let height = ((frame_height as f64 * ratio + 1e-9).floor() as u32).max(1);
        (width, height)
    }

    fn draw(&mut self, frame: &Frame, label: &str) -> io::Result<()> {
        let (columns, rows) = terminal::size()?;
        let image_rows = rows.saturating_sub(STATUS_ROWS).max(1);
        let (width, height) = Self::fit(frame.width(), frame.height(), columns, image_rows);

        let layout = Layout { columns, rows, width, height };
        if self.layout != Some(layout) {
            debug!("Terminal layout changed to {:?}", layout);
            queue!(self.stdout, ResetColor, Clear(ClearType::All))?;
            self.layout = Some(layout);
        }

        if self.title.as_deref() != Some(label) {
            queue!(self.stdout, SetTitle(label))?;
            self.title = Some(label.to_string());
        }

        let resized = image::imageops::resize(frame.as_image(), width, height, FilterType::Triangle);
        let left = (columns as u32).saturating_sub(width) / 2;

        for cell_row in 0..(height + 1) / 2 {
            queue!(self.stdout, MoveTo(left as u16, cell_row as u16))?;
            let mut last: Option<([u8; 3], [u8; 3])> = None;

            for x in 0..width {
                let top = resized.get_pixel(x, cell_row * 2).0;
                let bottom = if cell_row * 2 + 1 < height {
                    resized.get_pixel(x, cell_row * 2 + 1).0
                } else {
                    [0, 0, 0]
                };

                if last != Some((top, bottom)) {
                    queue!(
                        self.stdout,
                        SetForegroundColor(Color::Rgb { r: top[0], g: top[1], b: top[2] }),
                        SetBackgroundColor(Color::Rgb { r: bottom[0], g: bottom[1], b: bottom[2] })
                    )?;
                    last = Some((top, bottom));
                }
                queue!(self.stdout, Print(UPPER_HALF_BLOCK))?;
            }
        }

        queue!(
            self.stdout,
            ResetColor,
            MoveTo(0, rows.saturating_sub(STATUS_ROWS)),
            Print(format!("{} ", label))
        )?;
        self.stdout.flush()
    }
}

impl DisplaySink for TerminalDisplay {
    fn present(&mut self, frame: &Frame, label: &str) -> Result<(), DisplayError> {
        self.draw(frame, label)
            .map_err(|e| DisplayError::PresentFailed { reason: e.to_string() })
    }

    fn teardown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        // best effort: the terminal may already be gone
        let _ = execute!(self.stdout, ResetColor, Show, LeaveAlternateScreen);
        info!("Terminal display closed");
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        self.teardown();
    }
}
