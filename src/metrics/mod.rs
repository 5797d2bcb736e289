//! Metrics calculation modules for detection evaluation.

pub mod iou;
pub mod scores;

pub use iou::calculate_iou;
pub use scores::{calculate_f1_score, calculate_precision, calculate_recall, Scores};
