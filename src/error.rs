//! Error types for the yolo-eval library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for yolo-eval operations.
pub type Result<T> = std::result::Result<T, YoloEvalError>;

/// Error types that can occur during evaluation and dataset processing.
#[derive(Error, Debug)]
pub enum YoloEvalError {
    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error while writing the tabular report.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error while encoding or decoding an image that is not tied to a path.
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    /// An image file could not be read or decoded.
    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Invalid bounding box coordinates.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Invalid IoU or confidence threshold.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Invalid detector output record.
    #[error("Invalid prediction: {0}")]
    InvalidPrediction(String),

    /// Image or template unusable for template matching.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// A path that was expected to be a directory is not.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}
