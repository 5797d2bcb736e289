//! Tests for label loading, core types and report serialization.

use std::collections::HashMap;
use std::fs;

use image::RgbImage;
use yolo_eval::evaluator::{evaluate, EvaluationConfig};
use yolo_eval::labels::{label_path_for, LabelDirectory, LabelSource};
use yolo_eval::report::write_json_file;
use yolo_eval::types::{BoundingBox, Detection, EvaluationReport, YoloLabel};

#[test]
fn test_bounding_box_area_inverted_is_zero() {
    let bbox = BoundingBox::new(10.0, 10.0, 5.0, 5.0);
    assert_eq!(bbox.area(), 0.0);
    assert!(!bbox.is_valid());
}

#[test]
fn test_bounding_box_is_valid_zero_width() {
    assert!(!BoundingBox::new(0.0, 0.0, 0.0, 10.0).is_valid());
    assert!(!BoundingBox::new(0.0, 0.0, 10.0, 0.0).is_valid());
    assert!(!BoundingBox::new(0.0, 0.0, f64::INFINITY, 10.0).is_valid());
}

#[test]
fn test_bounding_box_from_slice() {
    let bbox = BoundingBox::from_slice(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    assert!(BoundingBox::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]).is_err());
}

#[test]
fn test_label_path_for() {
    let dir = std::path::Path::new("labels");
    assert_eq!(label_path_for(dir, "truck_01.jpg"), dir.join("truck_01.txt"));
    assert_eq!(label_path_for(dir, "a.b.png"), dir.join("a.b.txt"));
    assert_eq!(label_path_for(dir, "noext"), dir.join("noext.txt"));
}

#[test]
fn test_label_directory_lookup() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("a.txt"), "0 0.5 0.5 0.2 0.2\n0 0.5\n").unwrap();
    let source = LabelDirectory::new(root.path());
    assert_eq!(source.root(), root.path());

    let parsed = source.labels_for("a.jpg").unwrap().unwrap();
    assert_eq!(parsed.labels.len(), 1);
    assert_eq!(parsed.malformed_lines, 1);

    assert!(source.labels_for("b.jpg").unwrap().is_none());
}

#[test]
fn test_in_memory_labels_with_evaluate() {
    let root = tempfile::tempdir().unwrap();
    let image = root.path().join("a.png");
    RgbImage::new(100, 50).save(&image).unwrap();

    let labels: HashMap<String, Vec<YoloLabel>> = [(
        "a.png".to_string(),
        vec![YoloLabel {
            class_id: 0,
            center_x: 0.5,
            center_y: 0.5,
            width: 0.2,
            height: 0.4,
        }],
    )]
    .into_iter()
    .collect();
    // [40,15,60,35] in pixels
    let detector: HashMap<String, Vec<Detection>> = [(
        "a.png".to_string(),
        vec![Detection::new(BoundingBox::new(41.0, 15.0, 60.0, 35.0), 0.8, 0)],
    )]
    .into_iter()
    .collect();

    let report = evaluate(&[image], &labels, &detector, &EvaluationConfig::default()).unwrap();
    assert_eq!(report.true_positives, 1);
    assert_eq!(report.stats.missing_label_files, 0);
    assert_eq!(report.stats.total_ground_truth, 1);
}

#[test]
fn test_report_json_roundtrip() {
    let root = tempfile::tempdir().unwrap();
    let image = root.path().join("a.png");
    RgbImage::new(100, 100).save(&image).unwrap();
    let labels: HashMap<String, Vec<YoloLabel>> = HashMap::new();
    let detector: HashMap<String, Vec<Detection>> = [(
        "a.png".to_string(),
        vec![Detection::new(BoundingBox::new(1.0, 1.0, 9.0, 9.0), 0.7, 4)],
    )]
    .into_iter()
    .collect();

    let report = evaluate(&[image], &labels, &detector, &EvaluationConfig::default()).unwrap();
    let path = root.path().join("out/report.json");
    write_json_file(&report, &path).unwrap();

    let loaded: EvaluationReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded.false_positives, 1);
    assert_eq!(loaded.images[0].image, "a.png");
    assert_eq!(loaded.images[0].matches[0].detection.class_id, 4);
    assert_eq!(loaded.images[0].matches[0].ground_truth_index, None);
    assert_eq!(loaded.stats.missing_label_files, 1);
}
