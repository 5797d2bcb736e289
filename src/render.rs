//! Drawing detections and match locations onto images.

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::info;

use crate::error::Result;
use crate::evaluator::open_image;
use crate::report::ensure_parent_dir;
use crate::types::{BoundingBox, Detection};

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline thickness in pixels.
pub const BOX_THICKNESS: u32 = 3;

/// Draw a hollow rectangle `thickness` pixels wide, growing inwards.
///
/// Parts of the box outside the image are clipped; boxes that collapse to
/// nothing are not drawn.
pub fn draw_box(image: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    let x = bbox.x1.round() as i32;
    let y = bbox.y1.round() as i32;
    let width = bbox.width().round() as i64;
    let height = bbox.height().round() as i64;

    for i in 0..thickness as i64 {
        let w = width - 2 * i;
        let h = height - 2 * i;
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(x + i as i32, y + i as i32).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(image, rect, color);
    }
}

/// Draw every detection box onto the image.
pub fn draw_detections(image: &mut RgbImage, detections: &[Detection]) {
    for det in detections {
        draw_box(image, &det.bbox, BOX_COLOR, BOX_THICKNESS);
    }
}

/// Load `input`, draw the detections and save the result to `output`.
pub fn render_detections_file(input: &Path, output: &Path, detections: &[Detection]) -> Result<()> {
    let mut image = open_image(input)?.to_rgb8();

    draw_detections(&mut image, detections);

    ensure_parent_dir(output)?;
    image.save(output)?;
    info!(path = %output.display(), detections = detections.len(), "saved annotated image");
    Ok(())
}
