use std::collections::VecDeque;

use image::{GrayImage, Luma};

use crate::error::PipelineError;
use crate::pipeline::transforms::{luma_image, reflect_101};
use crate::video::types::Frame;

const EDGE: u8 = 255;

// tan(22.5°) and tan(67.5°) split gradient directions into four sectors
const TAN_22_5: f32 = 0.414_213_56;
const TAN_67_5: f32 = 2.414_213_6;

/// Canny edge map, expanded back to three channels
///
/// Thresholds apply to the L1 Sobel magnitude (`|gx| + |gy|`, 0..=2040).
/// Pixels above `high` seed edges; pixels above `low` join an edge only when
/// 8-connected to a seed.
pub fn edge_detect(frame: &Frame, low: f32, high: f32) -> Result<Frame, PipelineError> {
    if !(low.is_finite() && high.is_finite()) || low < 0.0 || low >= high {
        return Err(PipelineError::InvalidParameters {
            details: format!("edge thresholds must satisfy 0 <= low < high, got {}/{}", low, high),
        });
    }

    let gray = luma_image(frame);
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Ok(Frame::from_gray(&gray));
    }

    let gradients = Gradients::sobel(&gray);
    let candidates = gradients.suppress_non_maxima(low);
    let edges = hysteresis(&candidates, width as usize, height as usize, high);

    Ok(Frame::from_gray(&edges))
}

struct Gradients {
    width: usize,
    height: usize,
    gx: Vec<i32>,
    gy: Vec<i32>,
    magnitude: Vec<f32>,
}

impl Gradients {
    fn sobel(gray: &GrayImage) -> Self {
        let width = gray.width() as usize;
        let height = gray.height() as usize;
        let raw = gray.as_raw();
        let at = |x: i64, y: i64| raw[reflect_101(y, height) * width + reflect_101(x, width)] as i32;

        let mut gx = vec![0i32; width * height];
        let mut gy = vec![0i32; width * height];
        let mut magnitude = vec![0f32; width * height];

        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let dx = (at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2 * at(x - 1, y) + at(x - 1, y + 1));
                let dy = (at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2 * at(x, y - 1) + at(x + 1, y - 1));

                let i = y as usize * width + x as usize;
                gx[i] = dx;
                gy[i] = dy;
                magnitude[i] = (dx.abs() + dy.abs()) as f32;
            }
        }

        Self { width, height, gx, gy, magnitude }
    }

    fn magnitude_at(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0.0;
        }
        self.magnitude[y as usize * self.width + x as usize]
    }

    /// Keep magnitudes above `low` that peak along their gradient direction
    fn suppress_non_maxima(&self, low: f32) -> Vec<f32> {
        let mut kept = vec![0f32; self.magnitude.len()];

        for y in 0..self.height as i64 {
            for x in 0..self.width as i64 {
                let i = y as usize * self.width + x as usize;
                let m = self.magnitude[i];
                if m <= low {
                    continue;
                }

                let ax = self.gx[i].abs() as f32;
                let ay = self.gy[i].abs() as f32;
                let (before, after) = if ay <= ax * TAN_22_5 {
                    ((x - 1, y), (x + 1, y))
                } else if ay >= ax * TAN_67_5 {
                    ((x, y - 1), (x, y + 1))
                } else if (self.gx[i] > 0) == (self.gy[i] > 0) {
                    ((x - 1, y - 1), (x + 1, y + 1))
                } else {
                    ((x + 1, y - 1), (x - 1, y + 1))
                };

                // strict on one side so plateaus two pixels wide keep one pixel
                if m > self.magnitude_at(before.0, before.1) && m >= self.magnitude_at(after.0, after.1) {
                    kept[i] = m;
                }
            }
        }

        kept
    }
}

fn hysteresis(candidates: &[f32], width: usize, height: usize, high: f32) -> GrayImage {
    let mut edges = GrayImage::new(width as u32, height as u32);
    let mut queue = VecDeque::new();

    for (i, &m) in candidates.iter().enumerate() {
        if m > high {
            edges.put_pixel((i % width) as u32, (i / width) as u32, Luma([EDGE]));
            queue.push_back(i);
        }
    }

    while let Some(i) = queue.pop_front() {
        let (x, y) = ((i % width) as i64, (i / width) as i64);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let n = ny as usize * width + nx as usize;
                if candidates[n] > 0.0 && edges.get_pixel(nx as u32, ny as u32)[0] != EDGE {
                    edges.put_pixel(nx as u32, ny as u32, Luma([EDGE]));
                    queue.push_back(n);
                }
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_step(width: u32, height: u32) -> Frame {
        let mut frame = Frame::new_black(width, height);
        for y in 0..height {
            for x in width / 2..width {
                frame.set_pixel(x, y, [255, 255, 255]);
            }
        }
        frame
    }

    #[test]
    fn test_uniform_frame_has_no_edges() {
        let frame = Frame::new_filled(10, 8, [90, 90, 90]);
        let edges = edge_detect(&frame, 200.0, 300.0).unwrap();

        assert_eq!(edges.dimensions(), (10, 8));
        assert!(edges.as_image().pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_step_produces_edge_near_boundary() {
        let frame = vertical_step(12, 6);
        let edges = edge_detect(&frame, 200.0, 300.0).unwrap();

        for y in 0..6 {
            let row_has_edge = (5..=6).any(|x| edges.get_pixel(x, y) == [EDGE, EDGE, EDGE]);
            assert!(row_has_edge, "row {} has no edge at the step", y);
            assert_eq!(edges.get_pixel(0, y), [0, 0, 0]);
            assert_eq!(edges.get_pixel(11, y), [0, 0, 0]);
        }
    }

    #[test]
    fn test_output_is_binary_and_three_channel() {
        let frame = vertical_step(9, 9);
        let edges = edge_detect(&frame, 50.0, 100.0).unwrap();

        for pixel in edges.as_image().pixels() {
            let [r, g, b] = pixel.0;
            assert!(r == g && g == b);
            assert!(r == 0 || r == EDGE);
        }
    }

    #[test]
    fn test_weak_edge_without_strong_seed_is_dropped() {
        // a 40-level step yields magnitude 160: above low, below high
        let mut frame = Frame::new_filled(10, 6, [100, 100, 100]);
        for y in 0..6 {
            for x in 5..10 {
                frame.set_pixel(x, y, [140, 140, 140]);
            }
        }

        let edges = edge_detect(&frame, 100.0, 300.0).unwrap();
        assert!(edges.as_image().pixels().all(|p| p.0 == [0, 0, 0]));

        let edges = edge_detect(&frame, 100.0, 150.0).unwrap();
        assert!(edges.as_image().pixels().any(|p| p.0 == [EDGE, EDGE, EDGE]));
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let frame = Frame::new_black(4, 4);
        assert!(edge_detect(&frame, 300.0, 200.0).is_err());
        assert!(edge_detect(&frame, 200.0, 200.0).is_err());
        assert!(edge_detect(&frame, -1.0, 200.0).is_err());
    }
}
