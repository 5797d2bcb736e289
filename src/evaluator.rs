//! Main evaluation orchestrator for detection precision/recall/F1.

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageError, ImageReader};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::detector::{file_name_of, Detector};
use crate::error::{Result, YoloEvalError};
use crate::labels::{denormalize, LabelDirectory, LabelSource};
use crate::matching::{match_detections, order_predictions, MatchStrategy, PredictionOrder};
use crate::metrics::Scores;
use crate::stats::EvaluationStats;
use crate::threshold::{validate_threshold, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD};
use crate::types::{Detection, EvaluationReport, ImageReport, SkippedImage, YoloLabel};

/// File extensions treated as images when listing a directory (case-insensitive).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// What to do when an image cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreadableImagePolicy {
    /// Stop the run with `ImageDecode`; no report is produced.
    #[default]
    Abort,
    /// Leave the image out of the per-image rows and list it under `skipped`.
    Skip,
}

/// Parameters of an evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Minimum IoU for a prediction to claim a ground truth box
    pub iou_threshold: f64,
    /// Minimum confidence, applied by the detector before matching
    pub confidence_threshold: f64,
    pub strategy: MatchStrategy,
    pub order: PredictionOrder,
    pub on_unreadable: UnreadableImagePolicy,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            strategy: MatchStrategy::default(),
            order: PredictionOrder::default(),
            on_unreadable: UnreadableImagePolicy::default(),
        }
    }
}

impl EvaluationConfig {
    /// Check that both thresholds are in [0, 1].
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.iou_threshold)?;
        validate_threshold(self.confidence_threshold)
    }
}

/// Returns true if the path has one of the [`IMAGE_EXTENSIONS`].
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// List the images in a directory, sorted by file name.
///
/// Subdirectories and files with other extensions are ignored.
pub fn list_images<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(YoloEvalError::NotADirectory(dir.to_path_buf()));
    }

    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image_file(&path) {
            images.push(path);
        }
    }
    images.sort_by_key(|path| file_name_of(path));
    Ok(images)
}

/// Open an image reader whose format is taken from the file contents, so a
/// PNG named `*.jpg` still decodes.
fn sniffed_reader(path: &Path) -> std::result::Result<ImageReader<BufReader<File>>, ImageError> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(ImageError::IoError)
}

fn decode_error(path: &Path) -> impl FnOnce(ImageError) -> YoloEvalError + '_ {
    move |source| YoloEvalError::ImageDecode {
        path: path.to_path_buf(),
        source,
    }
}

/// Read the width and height of an image from the file itself.
pub fn image_dimensions(path: &Path) -> Result<(u32, u32)> {
    sniffed_reader(path)
        .and_then(|reader| reader.into_dimensions())
        .map_err(decode_error(path))
}

/// Decode an image, detecting its format from the file contents.
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    sniffed_reader(path)
        .and_then(|reader| reader.decode())
        .map_err(decode_error(path))
}

/// Match one image's predictions against its labels.
///
/// `dimensions` is the `(width, height)` of the image and is used to turn the
/// normalized labels into pixel boxes. Predictions are reordered according to
/// `config.order` before matching.
pub fn evaluate_image(
    image: &str,
    detections: &[Detection],
    labels: &[YoloLabel],
    dimensions: (u32, u32),
    config: &EvaluationConfig,
) -> ImageReport {
    let (width, height) = dimensions;
    let ground_truths = denormalize(labels, width, height);
    let predictions = order_predictions(detections, config.order);
    let result = match_detections(&predictions, &ground_truths, config.iou_threshold, config.strategy);

    debug!(
        image,
        predictions = predictions.len(),
        ground_truth = ground_truths.len(),
        tp = result.true_positives,
        fp = result.false_positives,
        fn_ = result.false_negatives,
        "matched image"
    );

    ImageReport {
        image: image.to_string(),
        predictions: predictions.len(),
        ground_truth: ground_truths.len(),
        true_positives: result.true_positives,
        false_positives: result.false_positives,
        false_negatives: result.false_negatives,
        matches: result.matches,
    }
}

/// Evaluate detector output over a list of images.
///
/// Images are processed one at a time in the order given. Each image's size is
/// read from the image file; a missing label file counts as an image with no
/// objects. TP/FP/FN are summed over all images before precision, recall and
/// F1 are derived, so the metrics are micro-averaged.
///
/// # Arguments
///
/// * `images` - Image paths to evaluate
/// * `labels` - Ground truth lookup by image file name
/// * `detector` - Source of predictions
/// * `config` - Thresholds and matching policies
///
/// # Errors
///
/// Returns `InvalidThreshold` for out-of-range thresholds, `ImageDecode` for an
/// unreadable image under [`UnreadableImagePolicy::Abort`], and any error the
/// detector or label source reports.
pub fn evaluate<L, D>(
    images: &[PathBuf],
    labels: &L,
    detector: &D,
    config: &EvaluationConfig,
) -> Result<EvaluationReport>
where
    L: LabelSource + ?Sized,
    D: Detector + ?Sized,
{
    config.validate()?;

    let mut report = EvaluationReport::new();
    let mut stats = EvaluationStats::new();

    for image_path in images {
        let name = file_name_of(image_path);

        let dimensions = match image_dimensions(image_path) {
            Ok(dimensions) => dimensions,
            Err(err) if config.on_unreadable == UnreadableImagePolicy::Skip => {
                warn!(image = %name, error = %err, "skipping unreadable image");
                stats.skip_image();
                report.skipped.push(SkippedImage {
                    image: name,
                    reason: err.to_string(),
                });
                continue;
            }
            Err(err) => return Err(err),
        };

        let detections = detector.predict(image_path, config.confidence_threshold)?;

        let parsed = match labels.labels_for(&name)? {
            Some(parsed) => parsed,
            None => {
                debug!(image = %name, "no label file, assuming no objects");
                stats.missing_label_file();
                Default::default()
            }
        };
        if parsed.malformed_lines > 0 {
            warn!(image = %name, lines = parsed.malformed_lines, "skipped malformed label lines");
            stats.malformed_lines(parsed.malformed_lines);
        }

        let image_report = evaluate_image(&name, &detections, &parsed.labels, dimensions, config);
        stats.record_image(image_report.predictions, image_report.ground_truth);

        report.true_positives += image_report.true_positives;
        report.false_positives += image_report.false_positives;
        report.false_negatives += image_report.false_negatives;
        report.images.push(image_report);
    }

    let scores = Scores::from_counts(
        report.true_positives,
        report.false_positives,
        report.false_negatives,
    );
    report.precision = scores.precision;
    report.recall = scores.recall;
    report.f1 = scores.f1;
    report.stats = stats;

    info!(
        precision = report.precision,
        recall = report.recall,
        f1 = report.f1,
        "{}",
        report.stats.summary_string()
    );

    Ok(report)
}

/// Evaluate every image in `images_dir` against labels in `labels_dir`.
///
/// Images are visited in file name order.
pub fn evaluate_dir<D: Detector + ?Sized>(
    images_dir: &Path,
    labels_dir: &Path,
    detector: &D,
    config: &EvaluationConfig,
) -> Result<EvaluationReport> {
    let images = list_images(images_dir)?;
    info!(count = images.len(), dir = %images_dir.display(), "evaluating images");
    evaluate(&images, &LabelDirectory::new(labels_dir), detector, config)
}
