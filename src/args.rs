//! Command line arguments for the `yolo-eval` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use yolo_eval::threshold::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD};

/// Evaluation and dataset tooling for YOLO-format detection datasets
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score predictions against ground truth labels (precision/recall/F1)
    Evaluate(EvaluateArgs),
    /// Write horizontally flipped copies of images and labels
    Augment(AugmentArgs),
    /// Write label files from detector output
    Annotate(AnnotateArgs),
    /// Draw detector output onto an image
    Detect(DetectArgs),
    /// Locate a template inside an image
    Template(TemplateArgs),
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Predictions exported by the detector (JSON)
    #[arg(long, value_name = "FILE")]
    pub model: PathBuf,

    /// Directory of images (*.jpg, *.jpeg, *.png)
    #[arg(long, value_name = "DIR")]
    pub images: PathBuf,

    /// Directory of YOLO label files (<stem>.txt)
    #[arg(long, value_name = "DIR")]
    pub labels: PathBuf,

    /// CSV report path
    #[arg(long, default_value = "outputs/eval.csv", value_name = "FILE")]
    pub out: PathBuf,

    /// Optional JSON report with per-match detail
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Minimum IoU for a true positive (0.0 - 1.0)
    #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD, value_name = "THRESHOLD")]
    pub iou: f64,

    /// Minimum detector confidence (0.0 - 1.0)
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD, value_name = "THRESHOLD")]
    pub conf: f64,

    /// Match each prediction to its highest-IoU ground truth instead of the first qualifying one
    #[arg(long)]
    pub best_fit: bool,

    /// Process predictions by descending confidence instead of detector order
    #[arg(long)]
    pub sort_by_confidence: bool,

    /// Skip images that cannot be decoded instead of aborting
    #[arg(long)]
    pub skip_unreadable: bool,
}

#[derive(Args, Debug)]
pub struct AugmentArgs {
    /// Images folder
    #[arg(long, value_name = "DIR")]
    pub src: PathBuf,

    /// Labels folder
    #[arg(long, value_name = "DIR")]
    pub labels: PathBuf,
}

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Predictions exported by the detector (JSON)
    #[arg(long, value_name = "FILE")]
    pub model: PathBuf,

    #[arg(long, value_name = "DIR")]
    pub images: PathBuf,

    /// Output directory for label files
    #[arg(long, value_name = "DIR")]
    pub labels: PathBuf,

    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD, value_name = "THRESHOLD")]
    pub conf: f64,

    /// Keep detector class ids instead of mapping everything to class 0
    #[arg(long)]
    pub keep_classes: bool,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Predictions exported by the detector (JSON)
    #[arg(long, value_name = "FILE")]
    pub model: PathBuf,

    /// Image to annotate
    #[arg(long, value_name = "FILE")]
    pub source: PathBuf,

    #[arg(long, default_value = "outputs/detect_out.jpg", value_name = "FILE")]
    pub output: PathBuf,

    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD, value_name = "THRESHOLD")]
    pub conf: f64,
}

#[derive(Args, Debug)]
pub struct TemplateArgs {
    #[arg(long, value_name = "FILE")]
    pub image: PathBuf,

    #[arg(long, value_name = "FILE")]
    pub template: PathBuf,

    #[arg(long, default_value = "outputs/template_out.jpg", value_name = "FILE")]
    pub output: PathBuf,

    /// Also match keypoint features and save the side-by-side drawing here
    #[arg(long, value_name = "FILE")]
    pub orb_out: Option<PathBuf>,
}
