//! Draws the keypoint and skeleton overlay onto a canvas.

use crate::config::{KEYPOINT_RADIUS, MIN_KEYPOINT_CONFIDENCE, OVERLAY_COLOR, SKELETON_LINE_WIDTH};
use crate::error::{AppError, Result};
use crate::pose::{Pose, adjacent_keypoints};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use std::io::Cursor;

/// Counts of what was drawn on the last render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub keypoints: usize,
    pub edges: usize,
}

/// Draws the image at native resolution with the pose overlaid.
pub fn render_pose(image: &RgbaImage, pose: Option<&Pose>) -> (RgbaImage, RenderStats) {
    let mut canvas = image.clone();
    let mut stats = RenderStats::default();
    let Some(pose) = pose else {
        return (canvas, stats);
    };

    let color = Rgba(OVERLAY_COLOR);

    for (a, b) in adjacent_keypoints(&pose.keypoints, MIN_KEYPOINT_CONFIDENCE) {
        draw_thick_line(
            &mut canvas,
            (a.position.x, a.position.y),
            (b.position.x, b.position.y),
            SKELETON_LINE_WIDTH,
            color,
        );
        stats.edges += 1;
    }

    for keypoint in pose.confident_keypoints(MIN_KEYPOINT_CONFIDENCE) {
        draw_filled_circle_mut(
            &mut canvas,
            (
                keypoint.position.x.round() as i32,
                keypoint.position.y.round() as i32,
            ),
            KEYPOINT_RADIUS,
            color,
        );
        stats.keypoints += 1;
    }

    (canvas, stats)
}

/// Draws parallel one-pixel segments offset across the line's normal.
fn draw_thick_line(
    canvas: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    width: u32,
    color: Rgba<u8>,
) {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let length = (dx * dx + dy * dy).sqrt();
    let (nx, ny) = if length > f32::EPSILON {
        (-dy / length, dx / length)
    } else {
        (0.0, 0.0)
    };

    for i in 0..width.max(1) {
        let shift = i as f32 - (width.max(1) - 1) as f32 / 2.0;
        let (ox, oy) = (nx * shift, ny * shift);
        draw_line_segment_mut(
            canvas,
            (start.0 + ox, start.1 + oy),
            (end.0 + ox, end.1 + oy),
            color,
        );
    }
}

/// Encodes the canvas as PNG.
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| AppError::Export(e.to_string()))?;
    Ok(bytes)
}
