//! Core data types for detections, ground truth and evaluation results.

use serde::{Deserialize, Serialize};

use crate::error::{Result, YoloEvalError};
use crate::stats::EvaluationStats;

/// An axis-aligned bounding box in absolute pixel coordinates.
///
/// Coordinates are in XYXY format where `(x1, y1)` is the top-left corner and
/// `(x2, y2)` the bottom-right corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a new bounding box without validating the corners.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a new bounding box, rejecting non-finite or empty boxes.
    pub fn try_new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        let bbox = Self::new(x1, y1, x2, y2);
        if !bbox.is_valid() {
            return Err(YoloEvalError::InvalidBoundingBox(format!(
                "expected finite coordinates with x1 < x2 and y1 < y2, got [{}, {}, {}, {}]",
                x1, y1, x2, y2
            )));
        }
        Ok(bbox)
    }

    /// Build a box from a `[x1, y1, x2, y2]` slice.
    pub fn from_slice(coords: &[f64]) -> Result<Self> {
        if coords.len() != 4 {
            return Err(YoloEvalError::InvalidBoundingBox(format!(
                "Expected 4 values, got {}",
                coords.len()
            )));
        }
        Self::try_new(coords[0], coords[1], coords[2], coords[3])
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Get the area of the bounding box. Inverted boxes have zero area.
    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Check if the bounding box is valid (finite, positive extent on both axes).
    pub fn is_valid(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite())
            && self.x1 < self.x2
            && self.y1 < self.y2
    }
}

/// A single detector output for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Confidence score in [0, 1]
    pub confidence: f64,
    /// Class id reported by the detector. Ignored during matching.
    pub class_id: u32,
}

impl Detection {
    pub fn new(bbox: BoundingBox, confidence: f64, class_id: u32) -> Self {
        Self {
            bbox,
            confidence,
            class_id,
        }
    }
}

/// A normalized YOLO-format annotation (`class cx cy w h`, fractions of the image size).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YoloLabel {
    pub class_id: u32,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloLabel {
    /// Convert to an absolute pixel box for an image of the given size.
    pub fn to_bbox(&self, image_width: u32, image_height: u32) -> BoundingBox {
        let w = image_width as f64;
        let h = image_height as f64;
        BoundingBox::new(
            (self.center_x - self.width / 2.0) * w,
            (self.center_y - self.height / 2.0) * h,
            (self.center_x + self.width / 2.0) * w,
            (self.center_y + self.height / 2.0) * h,
        )
    }

    /// Normalize an absolute pixel box against the given image size.
    pub fn from_bbox(class_id: u32, bbox: &BoundingBox, image_width: u32, image_height: u32) -> Self {
        let w = image_width as f64;
        let h = image_height as f64;
        Self {
            class_id,
            center_x: (bbox.x1 + bbox.x2) / 2.0 / w,
            center_y: (bbox.y1 + bbox.y2) / 2.0 / h,
            width: bbox.width() / w,
            height: bbox.height() / h,
        }
    }
}

/// Ground truth boxes for one image, in label file order.
pub type GroundTruthSet = Vec<BoundingBox>;

/// Outcome of matching a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub detection: Detection,
    /// Index into the image's ground truth set, `None` for a false positive
    pub ground_truth_index: Option<usize>,
    /// IoU with the matched ground truth, or the best IoU seen among
    /// the unmatched candidates for a false positive
    pub iou: f64,
}

impl Match {
    pub fn is_true_positive(&self) -> bool {
        self.ground_truth_index.is_some()
    }
}

/// Per-image matching counts and the individual prediction outcomes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub matches: Vec<Match>,
}

/// One row of the evaluation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReport {
    pub image: String,
    pub predictions: usize,
    pub ground_truth: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub matches: Vec<Match>,
}

/// An image left out of the report because it could not be decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedImage {
    pub image: String,
    pub reason: String,
}

/// Aggregated results of an evaluation run.
///
/// Precision, recall and F1 are micro-averaged over all evaluated images.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub images: Vec<ImageReport>,
    pub skipped: Vec<SkippedImage>,
    pub stats: EvaluationStats,
}

impl EvaluationReport {
    /// Create a new empty EvaluationReport.
    pub fn new() -> Self {
        Self::default()
    }
}
