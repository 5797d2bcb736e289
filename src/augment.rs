//! Horizontal-flip augmentation for YOLO datasets.
//!
//! Every image in a directory is mirrored left-to-right and its label file is
//! rewritten so that `center_x` becomes `1 - center_x`. Outputs go to sibling
//! directories suffixed with `_flip`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::detector::file_name_of;
use crate::error::Result;
use crate::evaluator::{list_images, open_image};
use crate::labels::label_path_for;

/// Suffix appended to output directory and file names.
pub const FLIP_SUFFIX: &str = "_flip";

/// What a flip run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AugmentSummary {
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
    pub images_written: usize,
    pub labels_written: usize,
    pub images_skipped: usize,
}

/// Mirror one label line horizontally.
///
/// `center_x` and `center_y` are rewritten with six decimals; class, width
/// and height are carried over verbatim. Lines with fewer than five fields,
/// or a non-numeric center, are returned unchanged.
///
/// # Example
///
/// ```
/// use yolo_eval::augment::flip_label_line;
///
/// assert_eq!(flip_label_line("0 0.25 0.5 0.1 0.2"), "0 0.750000 0.500000 0.1 0.2");
/// assert_eq!(flip_label_line("0 0.25"), "0 0.25");
/// ```
pub fn flip_label_line(line: &str) -> String {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return line.to_string();
    }

    let (Ok(cx), Ok(cy)) = (parts[1].parse::<f64>(), parts[2].parse::<f64>()) else {
        return line.to_string();
    };

    format!("{} {:.6} {:.6} {} {}", parts[0], 1.0 - cx, cy, parts[3], parts[4])
}

/// Mirror the contents of a label file. Blank lines are dropped.
pub fn flip_labels(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(flip_label_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sibling directory of `dir` with [`FLIP_SUFFIX`] appended to its name.
pub fn flipped_dir(dir: &Path) -> PathBuf {
    let name = format!("{}{}", file_name_of(dir), FLIP_SUFFIX);
    match dir.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// `<stem>_flip.<ext>` for an image file name.
pub fn flipped_file_name(image_name: &str) -> String {
    let path = Path::new(image_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, FLIP_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, FLIP_SUFFIX),
    }
}

/// Flip every image in `images_dir` and its label from `labels_dir`.
///
/// Images that cannot be decoded are skipped. A label file is only written
/// when the source image has one.
pub fn flip_dataset(images_dir: &Path, labels_dir: &Path) -> Result<AugmentSummary> {
    let out_images_dir = flipped_dir(images_dir);
    let out_labels_dir = flipped_dir(labels_dir);
    fs::create_dir_all(&out_images_dir)?;
    fs::create_dir_all(&out_labels_dir)?;

    let mut summary = AugmentSummary {
        images_dir: out_images_dir.clone(),
        labels_dir: out_labels_dir.clone(),
        ..AugmentSummary::default()
    };

    for image_path in list_images(images_dir)? {
        let name = file_name_of(&image_path);
        let img = match open_image(&image_path) {
            Ok(img) => img,
            Err(err) => {
                warn!(image = %name, error = %err, "skipping unreadable image");
                summary.images_skipped += 1;
                continue;
            }
        };

        let flipped = img.fliph();
        let out_name = flipped_file_name(&name);
        flipped.save(out_images_dir.join(&out_name))?;
        summary.images_written += 1;
        debug!(image = %name, output = %out_name, "flipped image");

        let label_path = label_path_for(labels_dir, &name);
        match fs::read_to_string(&label_path) {
            Ok(text) => {
                let out_label = label_path_for(&out_labels_dir, &out_name);
                fs::write(out_label, flip_labels(&text))?;
                summary.labels_written += 1;
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        images = summary.images_written,
        labels = summary.labels_written,
        skipped = summary.images_skipped,
        "augmented images written to {}; labels to {}",
        summary.images_dir.display(),
        summary.labels_dir.display()
    );
    Ok(summary)
}
