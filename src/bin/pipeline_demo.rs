// Renders the comparison view and every fullscreen mode of a synthetic frame

use std::path::PathBuf;

use video_analysis::{
    config::PipelineConfig,
    pipeline::{FramePipeline, FullscreenMode, View},
    video::Frame,
};

/// Gradient background with a bright square, so every transform has edges to show
fn synthetic_frame(width: u32, height: u32) -> Frame {
    let mut frame = Frame::new_black(width, height);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let b = (y * 255 / height.max(1)) as u8;
            frame.set_pixel(x, y, [r, 64, b]);
        }
    }
    for y in height / 4..height * 3 / 4 {
        for x in width / 4..width * 3 / 4 {
            frame.set_pixel(x, y, [240, 240, 240]);
        }
    }
    frame
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("pipeline_demo_output"));
    std::fs::create_dir_all(&output_dir)?;

    println!("🎬 Rendering pipeline views");

    let frame = synthetic_frame(320, 240);
    println!("   Source frame: {}x{}", frame.width(), frame.height());

    let pipeline = FramePipeline::new(PipelineConfig::default());
    let config = pipeline.config();
    println!(
        "   Blur kernel {:?}, edge thresholds {}/{}, {} grid columns",
        config.blur_kernel, config.edge_low_threshold, config.edge_high_threshold, config.grid_columns
    );

    let grid = pipeline.render(&frame, View::Comparison)?;
    let grid_path = output_dir.join("comparison.png");
    grid.save_png(&grid_path)?;
    println!("   Comparison grid {}x{} -> {}", grid.width(), grid.height(), grid_path.display());

    for mode in FullscreenMode::ALL {
        let rendered = pipeline.render(&frame, View::Fullscreen(mode))?;
        let path = output_dir.join(format!("fullscreen_{}.png", mode.name().replace(' ', "_")));
        rendered.save_png(&path)?;
        println!(
            "   {:<10} {}x{} -> {}",
            mode.name(),
            rendered.width(),
            rendered.height(),
            path.display()
        );
    }

    println!("\n🎉 All views written to {}", output_dir.display());
    Ok(())
}
