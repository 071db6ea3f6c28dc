use image::{GenericImage, RgbImage};

use crate::error::PipelineError;
use crate::pipeline::edges::edge_detect;
use crate::pipeline::transforms::{blur, to_grayscale};
use crate::video::types::Frame;

/// Number of panels in the comparison view
pub const COMPARISON_PANELS: usize = 4;

/// Default column count of the comparison view (2×2)
pub const COMPARISON_COLUMNS: usize = 2;

/// Arrange equally-sized frames left-to-right, top-to-bottom
pub fn compose_grid(frames: &[Frame], columns: usize) -> Result<Frame, PipelineError> {
    if frames.is_empty() || columns == 0 || frames.len() % columns != 0 {
        return Err(PipelineError::LayoutError { frames: frames.len(), columns });
    }

    let (width, height) = frames[0].dimensions();
    for (index, frame) in frames.iter().enumerate().skip(1) {
        let (actual_width, actual_height) = frame.dimensions();
        if (actual_width, actual_height) != (width, height) {
            return Err(PipelineError::DimensionMismatch {
                index,
                expected_width: width,
                expected_height: height,
                actual_width,
                actual_height,
            });
        }
    }

    let rows = frames.len() / columns;
    let grid_width = u32::try_from(columns)
        .ok()
        .and_then(|c| width.checked_mul(c));
    let grid_height = u32::try_from(rows)
        .ok()
        .and_then(|r| height.checked_mul(r));
    let (Some(grid_width), Some(grid_height)) = (grid_width, grid_height) else {
        return Err(PipelineError::LayoutError { frames: frames.len(), columns });
    };

    let mut grid = RgbImage::new(grid_width, grid_height);
    for (i, frame) in frames.iter().enumerate() {
        let x = (i % columns) as u32 * width;
        let y = (i / columns) as u32 * height;
        grid.copy_from(frame.as_image(), x, y)
            .map_err(|e| PipelineError::InvalidParameters { details: e.to_string() })?;
    }

    Ok(Frame::new(grid))
}

/// Original, grayscale, blurred and edge-detected frame in a 2×2 grid
pub fn comparison_view(
    frame: &Frame,
    kernel: (u32, u32),
    low: f32,
    high: f32,
) -> Result<Frame, PipelineError> {
    comparison_grid(frame, kernel, low, high, COMPARISON_COLUMNS)
}

/// Comparison panels laid out in `columns` columns
pub fn comparison_grid(
    frame: &Frame,
    kernel: (u32, u32),
    low: f32,
    high: f32,
    columns: usize,
) -> Result<Frame, PipelineError> {
    let (gray, (blurred, edges)) = rayon::join(
        || to_grayscale(frame),
        || rayon::join(|| blur(frame, kernel), || edge_detect(frame, low, high)),
    );

    compose_grid(&[frame.clone(), gray, blurred?, edges?], columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_frames_two_columns() {
        let frames: Vec<Frame> = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [9, 9, 9]]
            .iter()
            .map(|&c| Frame::new_filled(5, 3, c))
            .collect();
        let grid = compose_grid(&frames, 2).unwrap();

        assert_eq!(grid.dimensions(), (10, 6));
        assert_eq!(grid.get_pixel(0, 0), [255, 0, 0]);
        assert_eq!(grid.get_pixel(5, 0), [0, 255, 0]);
        assert_eq!(grid.get_pixel(0, 3), [0, 0, 255]);
        assert_eq!(grid.get_pixel(9, 5), [9, 9, 9]);
    }

    #[test]
    fn test_single_row_and_single_column() {
        let frames = vec![Frame::new_black(4, 2); 4];
        assert_eq!(compose_grid(&frames, 4).unwrap().dimensions(), (16, 2));
        assert_eq!(compose_grid(&frames, 1).unwrap().dimensions(), (4, 8));
    }

    #[test]
    fn test_columns_must_divide_frame_count() {
        let frames = vec![Frame::new_black(4, 4); 4];
        assert_eq!(
            compose_grid(&frames, 3),
            Err(PipelineError::LayoutError { frames: 4, columns: 3 })
        );
        assert!(matches!(compose_grid(&frames, 0), Err(PipelineError::LayoutError { .. })));
        assert!(matches!(compose_grid(&[], 2), Err(PipelineError::LayoutError { .. })));
    }

    #[test]
    fn test_mismatched_sizes() {
        let frames = vec![
            Frame::new_black(4, 4),
            Frame::new_black(4, 4),
            Frame::new_black(4, 5),
            Frame::new_black(4, 4),
        ];
        assert!(matches!(
            compose_grid(&frames, 2),
            Err(PipelineError::DimensionMismatch { index: 2, actual_height: 5, .. })
        ));
    }

    #[test]
    fn test_comparison_view_layout() {
        let frame = Frame::new_filled(6, 4, [200, 10, 10]);
        let view = comparison_view(&frame, (5, 5), 200.0, 300.0).unwrap();

        assert_eq!(view.dimensions(), (12, 8));
        // top-left original, top-right grayscale, bottom-right edge map
        assert_eq!(view.get_pixel(0, 0), [200, 10, 10]);
        let gray = view.get_pixel(6, 0);
        assert!(gray[0] == gray[1] && gray[1] == gray[2]);
        assert_eq!(view.get_pixel(11, 7), [0, 0, 0]);
    }

    #[test]
    fn test_comparison_view_propagates_bad_kernel() {
        let frame = Frame::new_black(4, 4);
        assert!(comparison_view(&frame, (2, 2), 200.0, 300.0).is_err());
    }
}
