//! Confidence and IoU thresholding utilities.

use crate::error::{Result, YoloEvalError};
use crate::types::Detection;

/// Default minimum IoU for a prediction to count as a true positive.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.5;

/// Default minimum detector confidence for a prediction to reach matching.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.25;

/// Filter detections by confidence score threshold.
///
/// # Returns
///
/// Returns a new vector containing only detections with confidence >= threshold,
/// in their input order.
///
/// # Errors
///
/// Returns an error if the threshold is not in the valid range [0.0, 1.0].
///
/// # Example
///
/// ```
/// use yolo_eval::threshold::filter_by_confidence;
/// use yolo_eval::types::{BoundingBox, Detection};
///
/// let detections = vec![
///     Detection::new(BoundingBox::new(10.0, 20.0, 30.0, 40.0), 0.9, 0),
///     Detection::new(BoundingBox::new(50.0, 60.0, 70.0, 80.0), 0.1, 0),
/// ];
///
/// let filtered = filter_by_confidence(&detections, 0.25).unwrap();
/// assert_eq!(filtered.len(), 1);
/// ```
pub fn filter_by_confidence(detections: &[Detection], threshold: f64) -> Result<Vec<Detection>> {
    validate_threshold(threshold)?;

    Ok(detections
        .iter()
        .filter(|det| det.confidence >= threshold)
        .cloned()
        .collect())
}

/// Validate that a threshold is in the valid range [0.0, 1.0].
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(YoloEvalError::InvalidThreshold(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            threshold
        )));
    }
    Ok(())
}
