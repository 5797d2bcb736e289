//! Feature matching between a template and an image.
//!
//! Keypoints come from oriented FAST and are described with 256-bit BRIEF
//! descriptors. Descriptors are paired by Hamming distance and the closest
//! [`MAX_ORB_MATCHES`] pairs are kept. The result can be drawn with the
//! template and the image side by side and a line joining each pair.

use std::path::Path;

use image::{imageops, GrayImage, RgbImage};
use imageproc::binary_descriptors::brief::brief;
use imageproc::binary_descriptors::{match_binary_descriptors, BinaryDescriptor};
use imageproc::corners::oriented_fast;
use imageproc::drawing::draw_line_segment_mut;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, YoloEvalError};
use crate::evaluator::open_image;
use crate::render::BOX_COLOR;
use crate::report::ensure_parent_dir;

/// Number of matches kept, closest first.
pub const MAX_ORB_MATCHES: usize = 40;

/// Keypoints kept per image, strongest first.
const MAX_KEYPOINTS: usize = 1000;

/// FAST intensity threshold.
const FAST_THRESHOLD: u8 = 20;

/// Keypoints must sit this far from every edge so the whole BRIEF patch
/// lies inside the image.
const EDGE_MARGIN: u32 = 20;

const DESCRIPTOR_BITS: usize = 256;

/// Pairs further apart than this are not matches.
const MAX_HAMMING_DISTANCE: u32 = 64;

/// Seed for the hashing used by the descriptor matcher.
const MATCH_SEED: u64 = 0x5eed_0f0b;

/// One matched keypoint pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrbMatch {
    /// Keypoint position in the template
    pub template: (u32, u32),
    /// Keypoint position in the image
    pub image: (u32, u32),
    /// Hamming distance between the two descriptors
    pub distance: u32,
}

/// Oriented FAST keypoints far enough from the edges to be described.
///
/// Images too small to hold a single keypoint give none.
pub fn orb_keypoints(image: &GrayImage) -> Vec<Point<u32>> {
    let (width, height) = image.dimensions();
    if width <= 2 * EDGE_MARGIN || height <= 2 * EDGE_MARGIN {
        return Vec::new();
    }

    oriented_fast(image, Some(FAST_THRESHOLD), MAX_KEYPOINTS, EDGE_MARGIN, Some(MATCH_SEED))
        .into_iter()
        .map(|kp| Point::new(kp.corner.x, kp.corner.y))
        .collect()
}

/// Match template keypoints to image keypoints, closest pairs first.
///
/// At most [`MAX_ORB_MATCHES`] pairs are returned. Either image having no
/// usable keypoints gives an empty list.
pub fn match_orb(image: &GrayImage, template: &GrayImage) -> Result<Vec<OrbMatch>> {
    let template_points = orb_keypoints(template);
    let image_points = orb_keypoints(image);
    debug!(
        template = template_points.len(),
        image = image_points.len(),
        "keypoints found"
    );
    if template_points.is_empty() || image_points.is_empty() {
        return Ok(Vec::new());
    }

    // both sides must be described with the same test pairs
    let (template_desc, pairs) =
        brief(template, &template_points, DESCRIPTOR_BITS, None).map_err(YoloEvalError::InvalidTemplate)?;
    let (image_desc, _) =
        brief(image, &image_points, DESCRIPTOR_BITS, Some(&pairs)).map_err(YoloEvalError::InvalidTemplate)?;

    let mut matches: Vec<OrbMatch> =
        match_binary_descriptors(&template_desc, &image_desc, MAX_HAMMING_DISTANCE, Some(MATCH_SEED))
            .into_iter()
            .map(|(t, i)| OrbMatch {
                template: (t.corner.x, t.corner.y),
                image: (i.corner.x, i.corner.y),
                distance: t.hamming_distance(i),
            })
            .collect();
    matches.sort_by_key(|m| m.distance);
    matches.truncate(MAX_ORB_MATCHES);
    Ok(matches)
}

/// Template on the left, image on the right, one line per match.
pub fn draw_orb_matches(image: &RgbImage, template: &RgbImage, matches: &[OrbMatch]) -> RgbImage {
    let (tw, th) = template.dimensions();
    let (iw, ih) = image.dimensions();
    let mut canvas = RgbImage::new(tw + iw, th.max(ih));
    imageops::replace(&mut canvas, template, 0, 0);
    imageops::replace(&mut canvas, image, tw as i64, 0);

    for m in matches {
        let start = (m.template.0 as f32, m.template.1 as f32);
        let end = ((tw + m.image.0) as f32, m.image.1 as f32);
        draw_line_segment_mut(&mut canvas, start, end, BOX_COLOR);
    }
    canvas
}

/// Match a template file against an image file and save the side-by-side
/// match drawing to `output`.
pub fn orb_match_file(image_path: &Path, template_path: &Path, output: &Path) -> Result<Vec<OrbMatch>> {
    let image = open_image(image_path)?;
    let template = open_image(template_path)?;

    let matches = match_orb(&image.to_luma8(), &template.to_luma8())?;
    let canvas = draw_orb_matches(&image.to_rgb8(), &template.to_rgb8(), &matches);
    ensure_parent_dir(output)?;
    canvas.save(output)?;

    info!(path = %output.display(), matches = matches.len(), "feature matches saved");
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_small_image_has_no_keypoints() {
        let image = GrayImage::from_pixel(40, 100, Luma([0]));
        assert!(orb_keypoints(&image).is_empty());
    }

    #[test]
    fn test_flat_images_have_no_matches() {
        let image = GrayImage::from_pixel(80, 80, Luma([90]));
        let template = GrayImage::from_pixel(50, 50, Luma([90]));
        assert!(match_orb(&image, &template).unwrap().is_empty());
    }

    #[test]
    fn test_draw_places_images_side_by_side() {
        let template = RgbImage::from_pixel(10, 6, Rgb([200, 0, 0]));
        let image = RgbImage::from_pixel(20, 12, Rgb([0, 0, 200]));
        let matches = [OrbMatch {
            template: (0, 0),
            image: (19, 0),
            distance: 0,
        }];

        let canvas = draw_orb_matches(&image, &template, &matches);
        assert_eq!(canvas.dimensions(), (30, 12));
        assert_eq!(*canvas.get_pixel(0, 5), Rgb([200, 0, 0]));
        assert_eq!(*canvas.get_pixel(5, 10), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(15, 11), Rgb([0, 0, 200]));
        // the match line runs along the top row
        assert_eq!(*canvas.get_pixel(20, 0), BOX_COLOR);
    }
}
