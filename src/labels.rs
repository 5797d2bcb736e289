//! Loading utilities for YOLO-format label files.
//!
//! A label file holds one object per line:
//!
//! ```text
//! <class_id> <center_x> <center_y> <width> <height>
//! ```
//!
//! The last four fields are fractions of the image width/height. Lines with
//! fewer than five fields, or with fields that do not parse as numbers, are
//! skipped and counted rather than treated as errors.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::types::{GroundTruthSet, YoloLabel};

/// Labels parsed from one file, plus the number of lines that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLabels {
    pub labels: Vec<YoloLabel>,
    pub malformed_lines: usize,
}

/// Parse a single label line.
///
/// Returns `None` for blank lines, lines with fewer than five fields and
/// lines whose fields are not numeric. Fields after the fifth are ignored.
///
/// # Example
///
/// ```
/// use yolo_eval::labels::parse_label_line;
///
/// let label = parse_label_line("0 0.5 0.5 0.2 0.4").unwrap();
/// assert_eq!(label.class_id, 0);
/// assert!(parse_label_line("0 0.5 0.5").is_none());
/// ```
pub fn parse_label_line(line: &str) -> Option<YoloLabel> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return None;
    }

    let class_id = parts[0].parse::<u32>().ok()?;
    let center_x = parts[1].parse::<f64>().ok()?;
    let center_y = parts[2].parse::<f64>().ok()?;
    let width = parts[3].parse::<f64>().ok()?;
    let height = parts[4].parse::<f64>().ok()?;

    Some(YoloLabel {
        class_id,
        center_x,
        center_y,
        width,
        height,
    })
}

/// Parse the contents of a label file, keeping file order.
///
/// Blank lines are ignored silently; any other unparsable line counts as malformed.
pub fn parse_labels(text: &str) -> ParsedLabels {
    let mut parsed = ParsedLabels::default();

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_label_line(line) {
            Some(label) => parsed.labels.push(label),
            None => {
                debug!(line = line_no + 1, content = line, "skipping malformed label line");
                parsed.malformed_lines += 1;
            }
        }
    }

    parsed
}

/// Format a label the way auto-labelling writes it (six decimals per coordinate).
pub fn format_label_line(label: &YoloLabel) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        label.class_id, label.center_x, label.center_y, label.width, label.height
    )
}

/// Convert normalized labels to absolute pixel boxes for one image.
pub fn denormalize(labels: &[YoloLabel], image_width: u32, image_height: u32) -> GroundTruthSet {
    labels
        .iter()
        .map(|label| label.to_bbox(image_width, image_height))
        .collect()
}

/// Path of the label file that belongs to an image (`<labels_dir>/<stem>.txt`).
pub fn label_path_for(labels_dir: &Path, image_name: &str) -> PathBuf {
    let stem = Path::new(image_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| image_name.to_string());
    labels_dir.join(format!("{}.txt", stem))
}

/// Lookup of ground truth labels by image file name.
pub trait LabelSource {
    /// Labels for the named image, or `None` if the image has no label file.
    fn labels_for(&self, image_name: &str) -> Result<Option<ParsedLabels>>;
}

/// Labels stored as `<stem>.txt` files in a directory.
#[derive(Debug, Clone)]
pub struct LabelDirectory {
    root: PathBuf,
}

impl LabelDirectory {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl LabelSource for LabelDirectory {
    fn labels_for(&self, image_name: &str) -> Result<Option<ParsedLabels>> {
        let path = label_path_for(&self.root, image_name);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(parse_labels(&text))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl LabelSource for HashMap<String, Vec<YoloLabel>> {
    fn labels_for(&self, image_name: &str) -> Result<Option<ParsedLabels>> {
        Ok(self.get(image_name).map(|labels| ParsedLabels {
            labels: labels.clone(),
            malformed_lines: 0,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_line() {
        let label = parse_label_line("2 0.25 0.75 0.1 0.2").unwrap();
        assert_eq!(label.class_id, 2);
        assert_eq!(label.center_x, 0.25);
        assert_eq!(label.center_y, 0.75);
        assert_eq!(label.width, 0.1);
        assert_eq!(label.height, 0.2);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let label = parse_label_line("0 0.5 0.5 0.2 0.2 0.99").unwrap();
        assert_eq!(label.height, 0.2);
    }

    #[test]
    fn test_short_and_garbled_lines() {
        assert!(parse_label_line("").is_none());
        assert!(parse_label_line("0 0.5 0.5 0.2").is_none());
        assert!(parse_label_line("truck 0.5 0.5 0.2 0.2").is_none());
        assert!(parse_label_line("0 0.5 x 0.2 0.2").is_none());
    }

    #[test]
    fn test_parse_labels_counts_malformed() {
        let text = "0 0.5 0.5 0.2 0.2\n\n0 0.1\n1 0.3 0.3 0.1 0.1\n";
        let parsed = parse_labels(text);
        assert_eq!(parsed.labels.len(), 2);
        assert_eq!(parsed.malformed_lines, 1);
        assert_eq!(parsed.labels[1].class_id, 1);
    }

    #[test]
    fn test_format_label_line() {
        let label = YoloLabel {
            class_id: 0,
            center_x: 0.5,
            center_y: 0.25,
            width: 0.1,
            height: 1.0 / 3.0,
        };
        assert_eq!(format_label_line(&label), "0 0.500000 0.250000 0.100000 0.333333");
    }

    #[test]
    fn test_label_path_for() {
        let path = label_path_for(Path::new("labels"), "truck_01.jpg");
        assert_eq!(path, Path::new("labels").join("truck_01.txt"));
    }

    #[test]
    fn test_map_source() {
        let mut map: HashMap<String, Vec<YoloLabel>> = HashMap::new();
        map.insert("a.jpg".to_string(), vec![parse_label_line("0 0.5 0.5 1 1").unwrap()]);

        assert_eq!(map.labels_for("a.jpg").unwrap().unwrap().labels.len(), 1);
        assert!(map.labels_for("b.jpg").unwrap().is_none());
    }
}
