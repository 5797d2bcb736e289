//! Locating a template image inside a larger image.
//!
//! Both images are converted to grayscale and compared with the zero-mean
//! normalized correlation coefficient; the location with the highest score
//! wins. Scores lie in [-1, 1] and do not change when the template is
//! brightened or darkened as a whole.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::integral_image::{integral_image, integral_squared_image, sum_image_pixels};
use imageproc::template_matching::{match_template, MatchTemplateMethod};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, YoloEvalError};
use crate::evaluator::open_image;
use crate::render::{draw_box, BOX_COLOR, BOX_THICKNESS};
use crate::report::ensure_parent_dir;
use crate::types::BoundingBox;

/// Fraction of the image a template is shrunk to when it does not fit.
const FIT_SCALE: f64 = 0.9;

/// Best location of the template in the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    /// Top-left corner of the match
    pub x: u32,
    pub y: u32,
    /// Size of the (possibly rescaled) template
    pub width: u32,
    pub height: u32,
    /// Correlation coefficient of the template and the matched window
    pub score: f32,
}

impl TemplateMatch {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(
            self.x as f64,
            self.y as f64,
            (self.x + self.width) as f64,
            (self.y + self.height) as f64,
        )
    }
}

/// Size the template must be resized to so it fits inside the image, if any.
///
/// The limiting dimension is shrunk to 90% of the image's; neither side drops below 1.
pub fn fit_template_size(image: (u32, u32), template: (u32, u32)) -> Option<(u32, u32)> {
    let (iw, ih) = image;
    let (tw, th) = template;
    if tw <= iw && th <= ih {
        return None;
    }

    let scale = f64::min(
        ih as f64 / th as f64 * FIT_SCALE,
        iw as f64 / tw as f64 * FIT_SCALE,
    );
    let new_w = ((tw as f64 * scale) as u32).max(1);
    let new_h = ((th as f64 * scale) as u32).max(1);
    Some((new_w, new_h))
}

/// Find the best match of `template` within `image`.
///
/// A template larger than the image is shrunk first.
pub fn find_template(image: &GrayImage, template: &GrayImage) -> Result<TemplateMatch> {
    if image.width() == 0 || image.height() == 0 || template.width() == 0 || template.height() == 0 {
        return Err(YoloEvalError::InvalidTemplate(
            "template matching needs non-empty images".to_string(),
        ));
    }

    let resized;
    let template = match fit_template_size(image.dimensions(), template.dimensions()) {
        Some((w, h)) => {
            debug!(from = ?template.dimensions(), to = ?(w, h), "shrinking template to fit image");
            resized = imageops::resize(template, w, h, FilterType::Triangle);
            &resized
        }
        None => template,
    };

    let ((x, y), score) = best_correlation(image, template);
    Ok(TemplateMatch {
        x,
        y,
        width: template.width(),
        height: template.height(),
        score: score as f32,
    })
}

/// Location and value of the highest correlation coefficient.
///
/// The raw cross-correlation comes from `match_template`; window sums come
/// from integral images, which turns it into
/// `sum((T - mean T) * (I - mean I)) / sqrt(var T * var I)`.
/// Windows where either side is flat score 0. Ties keep the first location
/// in row-major order.
fn best_correlation(image: &GrayImage, template: &GrayImage) -> ((u32, u32), f64) {
    let (tw, th) = template.dimensions();
    let n = (tw * th) as f64;

    let t_mean = template.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
    let t_var: f64 = template
        .pixels()
        .map(|p| {
            let d = p[0] as f64 - t_mean;
            d * d
        })
        .sum();

    let cross = match_template(image, template, MatchTemplateMethod::CrossCorrelation);
    let sums: Image<Luma<u64>> = integral_image::<_, u64>(image);
    let squares: Image<Luma<u64>> = integral_squared_image::<_, u64>(image);

    let mut best = ((0, 0), f64::NEG_INFINITY);
    for (x, y, raw) in cross.enumerate_pixels() {
        let (right, bottom) = (x + tw - 1, y + th - 1);
        let sum = sum_image_pixels(&sums, x, y, right, bottom)[0] as f64;
        let sum_sq = sum_image_pixels(&squares, x, y, right, bottom)[0] as f64;
        let w_var = (sum_sq - sum * sum / n).max(0.0);

        let denom = (t_var * w_var).sqrt();
        let score = if denom > f64::EPSILON {
            (raw[0] as f64 - t_mean * sum) / denom
        } else {
            0.0
        };
        if score > best.1 {
            best = ((x, y), score);
        }
    }
    best
}

/// Match a template file against an image file and save the image with the
/// match outlined.
pub fn match_template_file(image_path: &Path, template_path: &Path, output: &Path) -> Result<TemplateMatch> {
    let image = open_image(image_path)?;
    let template = open_image(template_path)?;

    let found = find_template(&image.to_luma8(), &template.to_luma8())?;

    let mut out = image.to_rgb8();
    draw_box(&mut out, &found.bbox(), BOX_COLOR, BOX_THICKNESS);
    ensure_parent_dir(output)?;
    out.save(output)?;

    info!(
        path = %output.display(),
        x = found.x,
        y = found.y,
        "template match saved; score={:.3}",
        found.score
    );
    Ok(found)
}
