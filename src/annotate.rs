//! Auto-labelling: turn detector output into YOLO label files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::detector::{file_name_of, Detector};
use crate::error::Result;
use crate::evaluator::{image_dimensions, list_images};
use crate::labels::{format_label_line, label_path_for};
use crate::types::{Detection, YoloLabel};

/// How detector class ids are written to the label files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassMode {
    /// Every detection becomes class `0`, for single-class fine-tuning.
    #[default]
    Single,
    /// Keep the detector's class ids.
    Preserve,
}

/// What an auto-labelling run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotateSummary {
    pub images: usize,
    pub labels_written: usize,
}

/// Convert detections for one image into label file contents.
///
/// One line per detection in detector order, six decimals per coordinate.
pub fn detections_to_labels(
    detections: &[Detection],
    image_width: u32,
    image_height: u32,
    class_mode: ClassMode,
) -> String {
    detections
        .iter()
        .map(|det| {
            let class_id = match class_mode {
                ClassMode::Single => 0,
                ClassMode::Preserve => det.class_id,
            };
            let label = YoloLabel::from_bbox(class_id, &det.bbox, image_width, image_height);
            format_label_line(&label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write a label file for every image in `images_dir`.
///
/// Existing label files with the same name are overwritten. Images with no
/// detections get an empty label file.
pub fn auto_annotate<D: Detector + ?Sized>(
    images_dir: &Path,
    labels_dir: &Path,
    detector: &D,
    confidence_threshold: f64,
    class_mode: ClassMode,
) -> Result<AnnotateSummary> {
    fs::create_dir_all(labels_dir)?;

    let images = list_images(images_dir)?;
    let mut summary = AnnotateSummary {
        images: images.len(),
        ..AnnotateSummary::default()
    };
    if images.is_empty() {
        warn!(dir = %images_dir.display(), "no images found");
        return Ok(summary);
    }

    for image_path in &images {
        let name = file_name_of(image_path);
        info!(image = %name, "annotating");

        let (width, height) = image_dimensions(image_path)?;
        let detections = detector.predict(image_path, confidence_threshold)?;
        let contents = detections_to_labels(&detections, width, height, class_mode);

        fs::write(label_path_for(labels_dir, &name), contents)?;
        summary.labels_written += 1;
    }

    info!(labels = summary.labels_written, dir = %labels_dir.display(), "auto-annotation done");
    Ok(summary)
}
