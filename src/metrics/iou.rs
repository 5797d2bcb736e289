//! Intersection over Union (IoU) for XYXY pixel boxes.

use crate::types::BoundingBox;

/// Overlap of two boxes as intersection area over union area.
///
/// The result is symmetric and lies in [0, 1]. Boxes that only share an edge,
/// and boxes with no area, give 0.0.
///
/// # Example
///
/// ```
/// use yolo_eval::metrics::iou::calculate_iou;
/// use yolo_eval::types::BoundingBox;
///
/// let gt = BoundingBox::new(10.0, 10.0, 50.0, 50.0);
/// let pred = BoundingBox::new(12.0, 11.0, 49.0, 52.0);
/// assert!(calculate_iou(&gt, &pred) > 0.85);
/// ```
pub fn calculate_iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let overlap_w = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let overlap_h = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let intersection = overlap_w * overlap_h;
    if intersection <= 0.0 {
        return 0.0;
    }

    let union = a.area() + b.area() - intersection;
    if union <= 0.0 {
        return 0.0;
    }

    // float error can push a near-identical pair just above 1
    (intersection / union).min(1.0)
}
