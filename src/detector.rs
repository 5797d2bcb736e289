//! The detector capability consumed by evaluation and auto-labelling.
//!
//! Model inference itself lives outside this crate. A [`Detector`] is passed
//! explicitly to every operation that needs predictions, so tests can hand
//! in canned detections. [`PredictionFileDetector`] serves predictions that a
//! detection runtime exported to JSON:
//!
//! ```json
//! [
//!   { "image": "truck_01.jpg", "bbox": [12.0, 11.0, 49.0, 52.0], "score": 0.91, "class_id": 0 }
//! ]
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, YoloEvalError};
use crate::threshold::filter_by_confidence;
use crate::types::{BoundingBox, Detection};

/// Source of predictions for a single image.
pub trait Detector {
    /// Detections for the image at `image_path` with confidence >= `confidence_threshold`,
    /// in the detector's native output order.
    fn predict(&self, image_path: &Path, confidence_threshold: f64) -> Result<Vec<Detection>>;
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// One exported prediction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Image file name the prediction belongs to
    pub image: String,
    /// Box in `[x1, y1, x2, y2]` absolute pixel format
    pub bbox: Vec<f64>,
    pub score: f64,
    #[serde(default)]
    pub class_id: u32,
}

impl PredictionRecord {
    pub fn to_detection(&self) -> Result<Detection> {
        if !(0.0..=1.0).contains(&self.score) {
            return Err(YoloEvalError::InvalidPrediction(format!(
                "score for {} must be in [0, 1], got {}",
                self.image, self.score
            )));
        }
        let bbox = BoundingBox::from_slice(&self.bbox)?;
        Ok(Detection::new(bbox, self.score, self.class_id))
    }
}

/// Detector backed by predictions loaded from a JSON file.
///
/// Records are looked up by image file name and keep the order in which they
/// appear in the file.
#[derive(Debug, Clone, Default)]
pub struct PredictionFileDetector {
    by_image: HashMap<String, Vec<Detection>>,
}

impl PredictionFileDetector {
    /// Load predictions from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if any
    /// record has an invalid box or score.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let records: Vec<PredictionRecord> = serde_json::from_reader(reader)?;
        Self::from_records(records)
    }

    /// Load predictions from a JSON string.
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let records: Vec<PredictionRecord> = serde_json::from_str(json_str)?;
        Self::from_records(records)
    }

    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = PredictionRecord>,
    {
        let mut by_image: HashMap<String, Vec<Detection>> = HashMap::new();
        for record in records {
            let detection = record.to_detection()?;
            by_image.entry(record.image).or_default().push(detection);
        }
        Ok(Self { by_image })
    }

    /// Number of images that have at least one prediction.
    pub fn image_count(&self) -> usize {
        self.by_image.len()
    }
}

impl Detector for PredictionFileDetector {
    fn predict(&self, image_path: &Path, confidence_threshold: f64) -> Result<Vec<Detection>> {
        let name = file_name_of(image_path);

        let detections = match self.by_image.get(&name) {
            Some(detections) => filter_by_confidence(detections, confidence_threshold)?,
            None => Vec::new(),
        };
        debug!(image = %name, count = detections.len(), "served predictions");
        Ok(detections)
    }
}

impl Detector for HashMap<String, Vec<Detection>> {
    fn predict(&self, image_path: &Path, confidence_threshold: f64) -> Result<Vec<Detection>> {
        let name = file_name_of(image_path);
        match self.get(&name) {
            Some(detections) => filter_by_confidence(detections, confidence_threshold),
            None => Ok(Vec::new()),
        }
    }
}
