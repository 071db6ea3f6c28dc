use image::{GrayImage, ImageBuffer, Rgb, RgbImage};

/// Represents a single decoded video frame
///
/// Frames are always 3-channel RGB8. Single-channel intermediates (grayscale,
/// edge maps) are expanded through [`Frame::from_gray`] so every transform
/// output can be composed with every other.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        Self { buffer: ImageBuffer::new(width, height) }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self { buffer }
    }

    /// Expand a single-channel image to a 3-channel frame
    pub fn from_gray(gray: &GrayImage) -> Self {
        let buffer = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
            let luma = gray.get_pixel(x, y)[0];
            Rgb([luma, luma, luma])
        });
        Self { buffer }
    }

    /// Create a frame from raw RGB bytes
    pub fn from_rgb_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, data).map(|buffer| Self { buffer })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buffer.put_pixel(x, y, Rgb(color));
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_gray_replicates_luma() {
        let gray = GrayImage::from_fn(3, 2, |x, y| image::Luma([(x * 10 + y) as u8]));
        let frame = Frame::from_gray(&gray);

        assert_eq!(frame.dimensions(), (3, 2));
        assert_eq!(frame.get_pixel(2, 1), [21, 21, 21]);
    }

    #[test]
    fn test_from_rgb_bytes_rejects_short_buffer() {
        assert!(Frame::from_rgb_bytes(4, 4, vec![0; 10]).is_none());
        assert!(Frame::from_rgb_bytes(2, 2, vec![0; 12]).is_some());
    }
}
