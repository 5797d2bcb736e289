//! Integration tests for the complete evaluation pipeline.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use image::RgbImage;
use tempfile::TempDir;
use yolo_eval::detector::PredictionFileDetector;
use yolo_eval::evaluator::{evaluate, evaluate_dir, EvaluationConfig};
use yolo_eval::labels::LabelDirectory;
use yolo_eval::matching::MatchStrategy;
use yolo_eval::report::write_csv_file;
use yolo_eval::types::{BoundingBox, Detection};

struct Dataset {
    _root: TempDir,
    images: PathBuf,
    labels: PathBuf,
}

impl Dataset {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let images = root.path().join("images");
        let labels = root.path().join("labels");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&labels).unwrap();
        Self {
            _root: root,
            images,
            labels,
        }
    }

    fn add_image(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.images.join(name);
        RgbImage::new(width, height).save(&path).unwrap();
        path
    }

    fn add_label(&self, stem: &str, contents: &str) {
        fs::write(self.labels.join(format!("{}.txt", stem)), contents).unwrap();
    }
}

fn det(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64) -> Detection {
    Detection::new(BoundingBox::new(x1, y1, x2, y2), confidence, 0)
}

fn detector(entries: Vec<(&str, Vec<Detection>)>) -> HashMap<String, Vec<Detection>> {
    entries
        .into_iter()
        .map(|(name, dets)| (name.to_string(), dets))
        .collect()
}

#[test]
fn test_single_close_match() {
    // ground truth [10,10,50,50] in a 100x100 image
    let data = Dataset::new();
    data.add_image("truck.png", 100, 100);
    data.add_label("truck", "0 0.3 0.3 0.4 0.4\n");
    let detector = detector(vec![("truck.png", vec![det(12.0, 11.0, 49.0, 52.0, 0.9)])]);

    let report = evaluate_dir(&data.images, &data.labels, &detector, &EvaluationConfig::default()).unwrap();

    assert_eq!(report.true_positives, 1);
    assert_eq!(report.false_positives, 0);
    assert_eq!(report.false_negatives, 0);
    assert_eq!(report.precision, 1.0);
    assert_eq!(report.recall, 1.0);
    assert_eq!(report.f1, 1.0);
    assert!(report.images[0].matches[0].iou > 0.85);
}

#[test]
fn test_disjoint_prediction() {
    // ground truth [0,0,100,100] in a 400x400 image
    let data = Dataset::new();
    data.add_image("truck.png", 400, 400);
    data.add_label("truck", "0 0.125 0.125 0.25 0.25\n");
    let detector = detector(vec![("truck.png", vec![det(200.0, 200.0, 300.0, 300.0, 0.9)])]);

    let report = evaluate_dir(&data.images, &data.labels, &detector, &EvaluationConfig::default()).unwrap();

    assert_eq!(report.true_positives, 0);
    assert_eq!(report.false_positives, 1);
    assert_eq!(report.false_negatives, 1);
    assert_eq!(report.precision, 0.0);
    assert_eq!(report.recall, 0.0);
    assert_eq!(report.f1, 0.0);
}

#[test]
fn test_first_fit_claims_first_ground_truth() {
    // ground truth [0,0,100,100] and [10,0,110,100] in a 200x100 image
    let data = Dataset::new();
    data.add_image("truck.png", 200, 100);
    data.add_label("truck", "0 0.25 0.5 0.5 1.0\n0 0.3 0.5 0.5 1.0\n");
    let detector = detector(vec![("truck.png", vec![det(5.0, 0.0, 105.0, 100.0, 0.9)])]);

    let report = evaluate_dir(&data.images, &data.labels, &detector, &EvaluationConfig::default()).unwrap();

    let image = &report.images[0];
    assert_eq!(image.true_positives, 1);
    assert_eq!(image.false_negatives, 1);
    assert_eq!(image.matches[0].ground_truth_index, Some(0));
}

#[test]
fn test_best_fit_claims_highest_iou() {
    // ground truth [0,0,100,100] and [40,0,140,100]; prediction overlaps the second more
    let data = Dataset::new();
    data.add_image("truck.png", 200, 100);
    data.add_label("truck", "0 0.25 0.5 0.5 1.0\n0 0.45 0.5 0.5 1.0\n");
    let detector = detector(vec![("truck.png", vec![det(30.0, 0.0, 130.0, 100.0, 0.9)])]);

    let first = evaluate_dir(&data.images, &data.labels, &detector, &EvaluationConfig::default()).unwrap();
    assert_eq!(first.images[0].matches[0].ground_truth_index, Some(0));

    let config = EvaluationConfig {
        strategy: MatchStrategy::BestFit,
        ..EvaluationConfig::default()
    };
    let best = evaluate_dir(&data.images, &data.labels, &detector, &config).unwrap();
    assert_eq!(best.images[0].matches[0].ground_truth_index, Some(1));
    assert_eq!(best.true_positives, 1);
}

#[test]
fn test_missing_label_file() {
    let data = Dataset::new();
    data.add_image("unlabelled.png", 100, 100);
    let detector = detector(vec![("unlabelled.png", vec![det(10.0, 10.0, 20.0, 20.0, 0.9)])]);

    let report = evaluate_dir(&data.images, &data.labels, &detector, &EvaluationConfig::default()).unwrap();

    assert_eq!(report.false_positives, 1);
    assert_eq!(report.images[0].ground_truth, 0);
    assert_eq!(report.stats.missing_label_files, 1);

    let out = data.images.parent().unwrap().join("outputs/eval.csv");
    write_csv_file(&report, &out).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("unlabelled.png,1,0\n"));
}

#[test]
fn test_micro_averaging_across_images() {
    let data = Dataset::new();
    data.add_image("a.png", 100, 100);
    data.add_image("b.png", 100, 100);
    // a: two objects, both found; b: one object, missed, one false alarm
    data.add_label("a", "0 0.25 0.25 0.2 0.2\n0 0.75 0.75 0.2 0.2\n");
    data.add_label("b", "0 0.5 0.5 0.2 0.2\n");
    let detector = detector(vec![
        ("a.png", vec![det(15.0, 15.0, 35.0, 35.0, 0.9), det(65.0, 65.0, 85.0, 85.0, 0.8)]),
        ("b.png", vec![det(0.0, 0.0, 10.0, 10.0, 0.7)]),
    ]);

    let report = evaluate_dir(&data.images, &data.labels, &detector, &EvaluationConfig::default()).unwrap();

    assert_eq!(report.true_positives, 2);
    assert_eq!(report.false_positives, 1);
    assert_eq!(report.false_negatives, 1);
    assert!((report.precision - 2.0 / 3.0).abs() < 1e-10);
    assert!((report.recall - 2.0 / 3.0).abs() < 1e-10);
    assert!((report.f1 - 2.0 / 3.0).abs() < 1e-10);
    // per-image average would give a different answer: (1.0 + 0.0) / 2
    assert_eq!(report.images.len(), 2);
    assert_eq!(report.images[0].image, "a.png");
}

#[test]
fn test_confidence_threshold_applied_by_detector() {
    let data = Dataset::new();
    data.add_image("a.png", 100, 100);
    data.add_label("a", "0 0.5 0.5 0.2 0.2\n");
    let detector = detector(vec![("a.png", vec![det(40.0, 40.0, 60.0, 60.0, 0.2), det(0.0, 0.0, 5.0, 5.0, 0.3)])]);

    let report = evaluate_dir(&data.images, &data.labels, &detector, &EvaluationConfig::default()).unwrap();

    // the matching box is below the default 0.25 confidence
    assert_eq!(report.images[0].predictions, 1);
    assert_eq!(report.true_positives, 0);
    assert_eq!(report.false_positives, 1);
    assert_eq!(report.false_negatives, 1);
}

#[test]
fn test_prediction_file_end_to_end() {
    let data = Dataset::new();
    data.add_image("b.png", 100, 100);
    data.add_image("a.jpg", 100, 100);
    data.add_label("a", "0 0.3 0.3 0.4 0.4\n");
    data.add_label("b", "0 0.5 0.5 0.2 0.2\n");
    fs::write(data.images.join("notes.txt"), "ignored").unwrap();

    let detector = PredictionFileDetector::from_json_str(
        r#"[
            {"image": "a.jpg", "bbox": [12.0, 11.0, 49.0, 52.0], "score": 0.9},
            {"image": "b.png", "bbox": [40.0, 40.0, 60.0, 60.0], "score": 0.8}
        ]"#,
    )
    .unwrap();

    let report = evaluate_dir(&data.images, &data.labels, &detector, &EvaluationConfig::default()).unwrap();

    let names: Vec<&str> = report.images.iter().map(|r| r.image.as_str()).collect();
    assert_eq!(names, vec!["a.jpg", "b.png"]);
    assert_eq!(report.true_positives, 2);
    assert_eq!(report.stats.evaluated_images, 2);

    let out = data.labels.join("eval.csv");
    write_csv_file(&report, &out).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(
        text,
        "image,predictions,gt\na.jpg,1,1\nb.png,1,1\nSUMMARY,precision=1.000,\"recall=1.000, f1=1.000\"\n"
    );
}

#[test]
fn test_evaluate_with_explicit_image_list() {
    let data = Dataset::new();
    let b = data.add_image("b.png", 100, 100);
    let a = data.add_image("a.png", 100, 100);
    let detector = detector(vec![]);

    // the given order is kept
    let report = evaluate(&[b, a], &LabelDirectory::new(&data.labels), &detector, &EvaluationConfig::default()).unwrap();
    assert_eq!(report.images[0].image, "b.png");
    assert_eq!(report.images[1].image, "a.png");
    assert_eq!(report.precision, 0.0);
    assert_eq!(report.recall, 0.0);
    assert_eq!(report.f1, 0.0);
}
