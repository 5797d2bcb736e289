mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::{AnnotateArgs, AugmentArgs, Cli, Command, DetectArgs, EvaluateArgs, TemplateArgs};
use yolo_eval::annotate::{auto_annotate, ClassMode};
use yolo_eval::augment::flip_dataset;
use yolo_eval::detector::{Detector, PredictionFileDetector};
use yolo_eval::evaluator::{evaluate_dir, EvaluationConfig, UnreadableImagePolicy};
use yolo_eval::matching::{MatchStrategy, PredictionOrder};
use yolo_eval::orb::orb_match_file;
use yolo_eval::render::render_detections_file;
use yolo_eval::report::{write_csv_file, write_json_file};
use yolo_eval::template::match_template_file;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Evaluate(args) => run_evaluate(args),
        Command::Augment(args) => run_augment(args),
        Command::Annotate(args) => run_annotate(args),
        Command::Detect(args) => run_detect(args),
        Command::Template(args) => run_template(args),
    }
}

fn load_detector(path: &std::path::Path) -> Result<PredictionFileDetector> {
    let detector = PredictionFileDetector::from_file(path)
        .with_context(|| format!("failed to load predictions from {}", path.display()))?;
    info!(images = detector.image_count(), "loaded predictions");
    Ok(detector)
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let config = EvaluationConfig {
        iou_threshold: args.iou,
        confidence_threshold: args.conf,
        strategy: if args.best_fit {
            MatchStrategy::BestFit
        } else {
            MatchStrategy::FirstFit
        },
        order: if args.sort_by_confidence {
            PredictionOrder::ConfidenceDescending
        } else {
            PredictionOrder::Native
        },
        on_unreadable: if args.skip_unreadable {
            UnreadableImagePolicy::Skip
        } else {
            UnreadableImagePolicy::Abort
        },
    };
    config.validate()?;

    let detector = load_detector(&args.model)?;
    let report = evaluate_dir(&args.images, &args.labels, &detector, &config)
        .with_context(|| format!("evaluation of {} failed", args.images.display()))?;

    write_csv_file(&report, &args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    if let Some(json) = &args.json {
        write_json_file(&report, json).with_context(|| format!("failed to write {}", json.display()))?;
    }

    for skipped in &report.skipped {
        println!("Skipped {}: {}", skipped.image, skipped.reason);
    }
    println!(
        "Evaluation complete. Precision={:.3}, Recall={:.3}, F1={:.3}. Results saved to {}",
        report.precision,
        report.recall,
        report.f1,
        args.out.display()
    );
    Ok(())
}

fn run_augment(args: AugmentArgs) -> Result<()> {
    let summary = flip_dataset(&args.src, &args.labels)?;
    println!(
        "Augmented images written to {}; labels to {}",
        summary.images_dir.display(),
        summary.labels_dir.display()
    );
    Ok(())
}

fn run_annotate(args: AnnotateArgs) -> Result<()> {
    let detector = load_detector(&args.model)?;
    let class_mode = if args.keep_classes {
        ClassMode::Preserve
    } else {
        ClassMode::Single
    };
    let summary = auto_annotate(&args.images, &args.labels, &detector, args.conf, class_mode)?;
    if summary.images == 0 {
        println!("No images found in {}", args.images.display());
    } else {
        println!("Done: {} label files written", summary.labels_written);
    }
    Ok(())
}

fn run_detect(args: DetectArgs) -> Result<()> {
    let detector = load_detector(&args.model)?;
    let detections = detector.predict(&args.source, args.conf)?;
    render_detections_file(&args.source, &args.output, &detections)?;
    println!("Saved annotated image to {}", args.output.display());
    Ok(())
}

fn run_template(args: TemplateArgs) -> Result<()> {
    let found = match_template_file(&args.image, &args.template, &args.output)?;
    println!(
        "Template match result saved to {}; score={:.3}",
        args.output.display(),
        found.score
    );

    if let Some(orb_out) = &args.orb_out {
        let matches = orb_match_file(&args.image, &args.template, orb_out)?;
        println!("ORB matches: {}; saved to {}", matches.len(), orb_out.display());
    }
    Ok(())
}
