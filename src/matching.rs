//! Detection matching utilities for evaluating predictions against ground truth.

use serde::{Deserialize, Serialize};

use crate::metrics::iou::calculate_iou;
use crate::types::{BoundingBox, Detection, Match, MatchResult};

/// How a prediction picks among the unmatched ground truth boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Accept the first unmatched ground truth (in label file order) whose
    /// IoU reaches the threshold.
    #[default]
    FirstFit,
    /// Accept the unmatched ground truth with the highest IoU, if it reaches
    /// the threshold. Ties go to the earliest ground truth.
    BestFit,
}

/// Order in which predictions claim ground truth boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionOrder {
    /// Keep the detector's output order.
    #[default]
    Native,
    /// Highest confidence first. Equal confidences keep their native order.
    ConfidenceDescending,
}

/// Apply a prediction ordering policy.
pub fn order_predictions(predictions: &[Detection], order: PredictionOrder) -> Vec<Detection> {
    let mut ordered = predictions.to_vec();
    if order == PredictionOrder::ConfidenceDescending {
        // sort_by is stable
        ordered.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    ordered
}

/// Match predictions to ground truth boxes for a single image.
///
/// Predictions are processed in the order given. Each ground truth box can be
/// claimed by at most one prediction; a prediction that claims nothing is a
/// false positive and every unclaimed ground truth box is a false negative.
///
/// # Arguments
///
/// * `predictions` - Detections for this image, already confidence-filtered
/// * `ground_truths` - Ground truth boxes for this image, in label file order
/// * `iou_threshold` - Minimum IoU to consider a match
/// * `strategy` - First-fit or best-fit selection among candidates
///
/// # Returns
///
/// Returns the counts together with one `Match` per prediction, in processing order.
///
/// # Example
///
/// ```
/// use yolo_eval::matching::{match_detections, MatchStrategy};
/// use yolo_eval::types::{BoundingBox, Detection};
///
/// let gt = vec![BoundingBox::new(10.0, 10.0, 50.0, 50.0)];
/// let preds = vec![Detection::new(BoundingBox::new(12.0, 11.0, 49.0, 52.0), 0.9, 0)];
/// let result = match_detections(&preds, &gt, 0.5, MatchStrategy::FirstFit);
/// assert_eq!(result.true_positives, 1);
/// assert_eq!(result.false_negatives, 0);
/// ```
pub fn match_detections(
    predictions: &[Detection],
    ground_truths: &[BoundingBox],
    iou_threshold: f64,
    strategy: MatchStrategy,
) -> MatchResult {
    let mut matched_gt = vec![false; ground_truths.len()];
    let mut result = MatchResult {
        matches: Vec::with_capacity(predictions.len()),
        ..MatchResult::default()
    };

    for pred in predictions {
        let (ground_truth_index, iou) = match strategy {
            MatchStrategy::FirstFit => first_fit(&pred.bbox, ground_truths, &matched_gt, iou_threshold),
            MatchStrategy::BestFit => best_fit(&pred.bbox, ground_truths, &matched_gt, iou_threshold),
        };

        match ground_truth_index {
            Some(gt_idx) => {
                matched_gt[gt_idx] = true;
                result.true_positives += 1;
            }
            None => result.false_positives += 1,
        }

        result.matches.push(Match {
            detection: pred.clone(),
            ground_truth_index,
            iou,
        });
    }

    result.false_negatives = matched_gt.iter().filter(|&&m| !m).count();
    result
}

fn first_fit(
    pred_box: &BoundingBox,
    ground_truths: &[BoundingBox],
    matched_gt: &[bool],
    iou_threshold: f64,
) -> (Option<usize>, f64) {
    let mut best_iou = 0.0;

    for (gt_idx, gt_box) in ground_truths.iter().enumerate() {
        if matched_gt[gt_idx] {
            continue;
        }

        let iou = calculate_iou(pred_box, gt_box);
        if iou >= iou_threshold {
            return (Some(gt_idx), iou);
        }
        best_iou = f64::max(best_iou, iou);
    }

    (None, best_iou)
}

fn best_fit(
    pred_box: &BoundingBox,
    ground_truths: &[BoundingBox],
    matched_gt: &[bool],
    iou_threshold: f64,
) -> (Option<usize>, f64) {
    let mut best_iou = 0.0;
    let mut best_gt_idx: Option<usize> = None;

    for (gt_idx, gt_box) in ground_truths.iter().enumerate() {
        if matched_gt[gt_idx] {
            continue;
        }

        let iou = calculate_iou(pred_box, gt_box);
        if best_gt_idx.is_none() || iou > best_iou {
            best_iou = iou;
            best_gt_idx = Some(gt_idx);
        }
    }

    match best_gt_idx {
        Some(gt_idx) if best_iou >= iou_threshold => (Some(gt_idx), best_iou),
        _ => (None, best_iou),
    }
}
