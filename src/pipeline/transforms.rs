use image::imageops::FilterType;
use image::{GrayImage, ImageBuffer, Luma};
use rayon::prelude::*;

use crate::error::PipelineError;
use crate::video::types::Frame;

const CHANNELS: usize = 3;

/// Rec.601 luma of every pixel
pub(crate) fn luma_image(frame: &Frame) -> GrayImage {
    let image = frame.as_image();
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        Luma([luma as u8])
    })
}

/// Desaturate, keeping three channels so the result composes with color frames
pub fn to_grayscale(frame: &Frame) -> Frame {
    Frame::from_gray(&luma_image(frame))
}

/// Gaussian blur with an odd `(width, height)` kernel
///
/// Sigma follows the kernel size the way most imaging libraries derive it
/// when none is given. Borders reflect without repeating the edge pixel.
pub fn blur(frame: &Frame, kernel: (u32, u32)) -> Result<Frame, PipelineError> {
    let (kernel_w, kernel_h) = kernel;
    if kernel_w == 0 || kernel_h == 0 || kernel_w % 2 == 0 || kernel_h % 2 == 0 {
        return Err(PipelineError::InvalidParameters {
            details: format!("blur kernel must be odd and positive, got {}x{}", kernel_w, kernel_h),
        });
    }

    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Ok(frame.clone());
    }

    let horizontal_taps = gaussian_kernel(kernel_w);
    let vertical_taps = gaussian_kernel(kernel_h);
    let src = frame.as_image().as_raw();
    let row_len = width as usize * CHANNELS;

    let mut horizontal = vec![0f32; src.len()];
    horizontal
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * row_len..(y + 1) * row_len];
            let radius = (horizontal_taps.len() / 2) as i64;
            for x in 0..width as usize {
                for c in 0..CHANNELS {
                    let mut acc = 0.0f32;
                    for (i, weight) in horizontal_taps.iter().enumerate() {
                        let sx = reflect_101(x as i64 + i as i64 - radius, width as usize);
                        acc += weight * src_row[sx * CHANNELS + c] as f32;
                    }
                    row[x * CHANNELS + c] = acc;
                }
            }
        });

    let mut output = vec![0u8; src.len()];
    output
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let radius = (vertical_taps.len() / 2) as i64;
            for (offset, value) in row.iter_mut().enumerate() {
                let mut acc = 0.0f32;
                for (i, weight) in vertical_taps.iter().enumerate() {
                    let sy = reflect_101(y as i64 + i as i64 - radius, height as usize);
                    acc += weight * horizontal[sy * row_len + offset];
                }
                *value = acc.round().clamp(0.0, 255.0) as u8;
            }
        });

    Frame::from_rgb_bytes(width, height, output).ok_or_else(|| PipelineError::InvalidParameters {
        details: "blurred buffer does not match frame dimensions".to_string(),
    })
}

/// Resize by positive multiplicative factors (bilinear)
pub fn scale(frame: &Frame, width_factor: f64, height_factor: f64) -> Result<Frame, PipelineError> {
    if !(width_factor.is_finite() && height_factor.is_finite()) || width_factor <= 0.0 || height_factor <= 0.0 {
        return Err(PipelineError::InvalidParameters {
            details: format!("scale factors must be positive, got {}x{}", width_factor, height_factor),
        });
    }

    let width = (frame.width() as f64 * width_factor) as u32;
    let height = (frame.height() as f64 * height_factor) as u32;
    if width == 0 || height == 0 {
        return Err(PipelineError::InvalidParameters {
            details: format!(
                "scaling {}x{} by {}x{} leaves an empty frame",
                frame.width(),
                frame.height(),
                width_factor,
                height_factor
            ),
        });
    }

    let resized = image::imageops::resize(frame.as_image(), width, height, FilterType::Triangle);
    Ok(Frame::new(resized))
}

fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let radius = (size / 2) as i32;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Mirror an out-of-range index back into `0..len` (`dcb|abcd|cba`)
pub(crate) fn reflect_101(index: i64, len: usize) -> usize {
    let len = len as i64;
    if len == 1 {
        return 0;
    }
    let mut i = index;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * (len - 1) - i;
        }
    }
    i as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let image = ImageBuffer::from_fn(width, height, |x, y| {
            image::Rgb([(x * 20) as u8, (y * 30) as u8, ((x + y) * 10) as u8])
        });
        Frame::new(image)
    }

    #[test]
    fn test_grayscale_keeps_three_equal_channels() {
        let frame = Frame::new_filled(4, 3, [255, 0, 0]);
        let gray = to_grayscale(&frame);

        assert_eq!(gray.dimensions(), (4, 3));
        assert_eq!(gray.get_pixel(1, 1), [76, 76, 76]);
    }

    #[test]
    fn test_blur_preserves_dimensions() {
        let frame = gradient_frame(13, 9);
        for kernel in [(1, 1), (3, 3), (5, 5), (11, 11), (3, 7)] {
            let blurred = blur(&frame, kernel).unwrap();
            assert_eq!(blurred.dimensions(), frame.dimensions(), "kernel {:?}", kernel);
        }
    }

    #[test]
    fn test_blur_keeps_uniform_frame_uniform() {
        let frame = Frame::new_filled(6, 6, [40, 120, 200]);
        let blurred = blur(&frame, (5, 5)).unwrap();
        assert_eq!(blurred, frame);
    }

    #[test]
    fn test_blur_unit_kernel_is_identity() {
        let frame = gradient_frame(5, 4);
        assert_eq!(blur(&frame, (1, 1)).unwrap(), frame);
    }

    #[test]
    fn test_blur_smooths_a_spike() {
        let mut frame = Frame::new_black(7, 7);
        frame.set_pixel(3, 3, [255, 255, 255]);
        let blurred = blur(&frame, (3, 3)).unwrap();

        assert!(blurred.get_pixel(3, 3)[0] < 255);
        assert!(blurred.get_pixel(2, 3)[0] > 0);
        assert_eq!(blurred.get_pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_blur_rejects_even_kernel() {
        let frame = Frame::new_black(4, 4);
        assert!(matches!(blur(&frame, (4, 5)), Err(PipelineError::InvalidParameters { .. })));
        assert!(matches!(blur(&frame, (0, 3)), Err(PipelineError::InvalidParameters { .. })));
    }

    #[test]
    fn test_blur_kernel_larger_than_frame() {
        let frame = gradient_frame(2, 2);
        assert_eq!(blur(&frame, (11, 11)).unwrap().dimensions(), (2, 2));
    }

    #[test]
    fn test_scale_doubles_dimensions() {
        let frame = gradient_frame(10, 6);
        let scaled = scale(&frame, 2.0, 2.0).unwrap();
        assert_eq!(scaled.dimensions(), (20, 12));
    }

    #[test]
    fn test_scale_rejects_non_positive_factors() {
        let frame = gradient_frame(10, 6);
        assert!(scale(&frame, 0.0, 1.0).is_err());
        assert!(scale(&frame, 1.0, -2.0).is_err());
        assert!(scale(&frame, f64::NAN, 1.0).is_err());
        assert!(scale(&frame, 0.01, 1.0).is_err());
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-3, 1), 0);
        assert_eq!(reflect_101(-4, 2), 0);
    }

    #[test]
    fn test_gaussian_kernel_is_normalised_and_symmetric() {
        let kernel = gaussian_kernel(5);
        assert_eq!(kernel.len(), 5);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((kernel[0] - kernel[4]).abs() < 1e-6);
        assert!(kernel[2] > kernel[1]);
    }
}
