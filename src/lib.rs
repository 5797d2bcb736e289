//! # yolo-eval
//!
//! A Rust library for evaluating object detectors against YOLO-format ground
//! truth, plus the small dataset utilities that go with it.
//!
//! The evaluator computes:
//! - **True/false positives and false negatives** per image, using greedy IoU matching
//! - **Precision**, **Recall** and **F1**, micro-averaged over the whole dataset
//! - A per-image CSV report with a trailing summary row
//!
//! ## Features
//!
//! - Parse YOLO label files (`class cx cy w h`, normalized) and denormalize them
//!   using each image's real size
//! - First-fit (default) or best-fit matching, in detector order or by confidence
//! - Pluggable [`Detector`] capability; predictions exported to JSON are served
//!   by [`PredictionFileDetector`]
//! - Horizontal-flip augmentation, auto-labelling from detector output,
//!   detection rendering, template matching and keypoint feature matching
//!
//! ## Quick Start
//!
//! ```rust
//! use yolo_eval::evaluator::{evaluate_dir, EvaluationConfig};
//! use yolo_eval::detector::PredictionFileDetector;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load exported predictions (in actual use)
//! // let detector = PredictionFileDetector::from_file("predictions.json")?;
//!
//! // Evaluate with default thresholds (IoU 0.5, confidence 0.25)
//! // let report = evaluate_dir("images/val".as_ref(), "labels/val".as_ref(), &detector, &EvaluationConfig::default())?;
//!
//! // println!("precision={:.3} recall={:.3} f1={:.3}", report.precision, report.recall, report.f1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Label Format
//!
//! One object per line, coordinates as fractions of the image size:
//!
//! ```text
//! 0 0.512 0.433 0.210 0.180
//! ```

pub mod error;
pub mod types;
pub mod stats;
pub mod labels;
pub mod threshold;
pub mod metrics;
pub mod matching;
pub mod detector;
pub mod evaluator;
pub mod report;
pub mod augment;
pub mod annotate;
pub mod render;
pub mod template;
pub mod orb;

// Re-export commonly used types and functions
pub use error::{Result, YoloEvalError};
pub use types::{
    BoundingBox, Detection, EvaluationReport, GroundTruthSet, ImageReport, Match, MatchResult,
    SkippedImage, YoloLabel,
};
pub use detector::{Detector, PredictionFileDetector};
pub use evaluator::{evaluate, evaluate_dir, EvaluationConfig, UnreadableImagePolicy};
pub use labels::{LabelDirectory, LabelSource};
pub use matching::{match_detections, MatchStrategy, PredictionOrder};
pub use stats::EvaluationStats;
