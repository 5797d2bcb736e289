//! Writers for evaluation reports.
//!
//! The CSV report has one row per evaluated image and a trailing summary row:
//!
//! ```text
//! image,predictions,gt
//! truck_01.jpg,2,1
//! SUMMARY,precision=0.500,"recall=1.000, f1=0.667"
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::types::EvaluationReport;

/// Header of the tabular report.
pub const CSV_HEADER: [&str; 3] = ["image", "predictions", "gt"];

/// Image column value of the summary row.
pub const SUMMARY_ROW: &str = "SUMMARY";

/// Write the tabular report to any writer.
pub fn write_csv<W: Write>(report: &EvaluationReport, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;
    for row in &report.images {
        let predictions = row.predictions.to_string();
        let ground_truth = row.ground_truth.to_string();
        csv_writer.write_record([row.image.as_str(), predictions.as_str(), ground_truth.as_str()])?;
    }

    let precision = format!("precision={:.3}", report.precision);
    let recall_f1 = format!("recall={:.3}, f1={:.3}", report.recall, report.f1);
    csv_writer.write_record([SUMMARY_ROW, precision.as_str(), recall_f1.as_str()])?;

    csv_writer.flush()?;
    Ok(())
}

/// Write the tabular report to a file, creating parent directories as needed.
pub fn write_csv_file<P: AsRef<Path>>(report: &EvaluationReport, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    write_csv(report, BufWriter::new(File::create(path)?))?;
    info!(path = %path.display(), rows = report.images.len(), "wrote CSV report");
    Ok(())
}

/// Write the full structured report (per-match detail, skipped images, stats) as JSON.
pub fn write_json_file<P: AsRef<Path>>(report: &EvaluationReport, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    info!(path = %path.display(), "wrote JSON report");
    Ok(())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
