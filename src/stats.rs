//! Statistics tracking for evaluation runs
//!
//! Counts what happened to the inputs of an evaluation so that skipped images
//! and missing label files stay distinguishable in the final report.

use serde::{Deserialize, Serialize};

/// Statistics collected during an evaluation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationStats {
    /// Number of images that were matched and reported
    pub evaluated_images: usize,

    /// Number of images skipped because they could not be decoded
    pub skipped_images: usize,

    /// Number of evaluated images without a label file
    pub missing_label_files: usize,

    /// Number of label lines dropped as malformed
    pub malformed_label_lines: usize,

    /// Total predictions that reached matching
    pub total_predictions: usize,

    /// Total ground truth boxes across evaluated images
    pub total_ground_truth: usize,
}

impl EvaluationStats {
    /// Create a new `EvaluationStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an image that went through matching
    pub fn record_image(&mut self, predictions: usize, ground_truth: usize) {
        self.evaluated_images += 1;
        self.total_predictions += predictions;
        self.total_ground_truth += ground_truth;
    }

    pub fn skip_image(&mut self) {
        self.skipped_images += 1;
    }

    pub fn missing_label_file(&mut self) {
        self.missing_label_files += 1;
    }

    pub fn malformed_lines(&mut self, count: usize) {
        self.malformed_label_lines += count;
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "EvaluationStats {{ evaluated: {}, skipped: {}, missing_labels: {}, malformed_lines: {}, predictions: {}, ground_truth: {} }}",
            self.evaluated_images,
            self.skipped_images,
            self.missing_label_files,
            self.malformed_label_lines,
            self.total_predictions,
            self.total_ground_truth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_are_zero() {
        let stats = EvaluationStats::new();
        assert_eq!(stats.evaluated_images, 0);
        assert_eq!(stats.total_predictions, 0);
        assert_eq!(stats.skipped_images, 0);
    }

    #[test]
    fn test_record_image() {
        let mut stats = EvaluationStats::new();
        stats.record_image(3, 2);
        stats.record_image(0, 4);
        assert_eq!(stats.evaluated_images, 2);
        assert_eq!(stats.total_predictions, 3);
        assert_eq!(stats.total_ground_truth, 6);
    }

    #[test]
    fn test_skip_counters() {
        let mut stats = EvaluationStats::new();
        stats.skip_image();
        stats.missing_label_file();
        stats.malformed_lines(2);
        assert_eq!(stats.skipped_images, 1);
        assert_eq!(stats.missing_label_files, 1);
        assert_eq!(stats.malformed_label_lines, 2);
    }

    #[test]
    fn test_summary_string() {
        let mut stats = EvaluationStats::new();
        stats.record_image(50, 10);

        let summary = stats.summary_string();
        assert!(summary.contains("evaluated: 1"));
        assert!(summary.contains("predictions: 50"));
    }
}
