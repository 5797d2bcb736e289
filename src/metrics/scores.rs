//! Precision, recall and F1 from match counts.
//!
//! All three are 0.0 whenever their denominator is zero, so an evaluation with
//! no predictions or no ground truth never yields NaN.

use serde::{Deserialize, Serialize};

/// Summary scores for a set of match counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Scores {
    /// Micro-averaged scores for summed TP/FP/FN counts.
    ///
    /// # Example
    ///
    /// ```
    /// use yolo_eval::metrics::Scores;
    ///
    /// let scores = Scores::from_counts(8, 2, 3);
    /// assert_eq!(scores.precision, 0.8);
    /// assert!((scores.recall - 8.0 / 11.0).abs() < 1e-12);
    /// assert!((scores.f1 - 16.0 / 21.0).abs() < 1e-12);
    /// ```
    pub fn from_counts(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        let precision = calculate_precision(true_positives, false_positives);
        let recall = calculate_recall(true_positives, false_negatives);
        Self {
            precision,
            recall,
            f1: calculate_f1_score(precision, recall),
        }
    }
}

/// TP / (TP + FP)
pub fn calculate_precision(true_positives: usize, false_positives: usize) -> f64 {
    ratio(true_positives, true_positives + false_positives)
}

/// TP / (TP + FN)
pub fn calculate_recall(true_positives: usize, false_negatives: usize) -> f64 {
    ratio(true_positives, true_positives + false_negatives)
}

/// Harmonic mean of precision and recall.
pub fn calculate_f1_score(precision: f64, recall: f64) -> f64 {
    let sum = precision + recall;
    if sum > 0.0 {
        2.0 * precision * recall / sum
    } else {
        0.0
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}
