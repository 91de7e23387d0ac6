use std::{io::Write, path::PathBuf};

use clap::ValueEnum;
use serde::Serialize;

use pcd_core::pointcloud::{LabelCounts, LabelSet, SourceMetadata};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// What `relabel labels` prints about an open cloud.
#[derive(Debug, Clone, Serialize)]
pub struct LabelReport {
    pub path: PathBuf,
    pub metadata: SourceMetadata,
    pub label_attribute: String,
    pub label_type: String,
    pub labels: LabelSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<LabelCounts>,
}

#[derive(Serialize)]
struct LabelRow {
    label: i64,
    count: Option<usize>,
}

pub fn write_report<W: Write>(
    report: &LabelReport,
    format: ReportFormat,
    mut out: W,
) -> Result<(), AppError> {
    match format {
        ReportFormat::Text => {
            writeln!(out, "{}", report.path.display())?;
            writeln!(out, "{}", report.metadata)?;
            writeln!(
                out,
                "label attribute: {} ({})",
                report.label_attribute, report.label_type
            )?;
            writeln!(out, "labels: {}", report.labels)?;
            if let Some(counts) = &report.counts {
                for (label, count) in counts.iter() {
                    writeln!(out, "  {:>6}: {}", label, count)?;
                }
            }
        }
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)?;
        }
        ReportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for label in report.labels.iter() {
                writer.serialize(LabelRow {
                    label,
                    count: report.counts.as_ref().map(|counts| counts.get(label)),
                })?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
