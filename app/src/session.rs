use std::{fmt, path::Path};

use pcd_core::pointcloud::{
    label_counts, unique_labels, AttributeExtractor, LabelCounts, LabelSet, PointRecordSet,
    RelabelEngine, RelabelOutcome, RelabelRequest, SourceMetadata,
};
use pcd_exporter::{serialize, suggested_output_path, Destination, WriteOptions, WriteSummary};
use pcd_parser::{
    parsers::{las::LasParserProvider, ParserProvider as _},
    LasDocument,
};

use crate::{error::AppError, report::LabelReport};

struct OpenCloud {
    document: LasDocument,
    records: PointRecordSet,
}

#[derive(Debug)]
pub enum ChangeOutcome {
    Saved {
        summary: WriteSummary,
        outcome: RelabelOutcome,
    },
    Cancelled,
}

impl fmt::Display for ChangeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeOutcome::Saved { summary, outcome } => write!(
                f,
                "relabeled {} points, labels now {}; saved {} points to {}",
                outcome.matched,
                outcome.labels,
                summary.points,
                summary.path.display()
            ),
            ChangeOutcome::Cancelled => f.write_str("cancelled, nothing was changed"),
        }
    }
}

/// The point cloud currently being edited. At most one is open at a time.
pub struct Session {
    extractor: AttributeExtractor,
    cloud: Option<OpenCloud>,
}

impl Session {
    pub fn new(extractor: AttributeExtractor) -> Self {
        Self {
            extractor,
            cloud: None,
        }
    }

    /// Reads and extracts `path`, replacing the open cloud. On error the
    /// previously open cloud stays open.
    pub fn open(&mut self, path: &Path) -> Result<LabelSet, AppError> {
        let provider = LasParserProvider {
            filename: path.to_path_buf(),
        };
        let document = provider.get_parser().parse()?;
        let records = self.extractor.extract(&document)?;

        let labels = unique_labels(&records);
        log::info!(
            "opened {:?}: {} points, labels in '{}': {}",
            path,
            records.len(),
            records.label_attribute(),
            labels
        );
        self.cloud = Some(OpenCloud { document, records });
        Ok(labels)
    }

    pub fn is_open(&self) -> bool {
        self.cloud.is_some()
    }

    pub fn records(&self) -> Option<&PointRecordSet> {
        self.cloud.as_ref().map(|cloud| &cloud.records)
    }

    /// Label set of the open cloud, recomputed on every call.
    pub fn labels(&self) -> LabelSet {
        unique_labels(self.records())
    }

    pub fn label_counts(&self) -> LabelCounts {
        label_counts(self.records())
    }

    pub fn metadata(&self) -> Result<SourceMetadata, AppError> {
        let cloud = self.cloud.as_ref().ok_or(AppError::NoCloudOpen)?;
        Ok(cloud.document.metadata())
    }

    pub fn report(&self, with_counts: bool) -> Result<LabelReport, AppError> {
        let cloud = self.cloud.as_ref().ok_or(AppError::NoCloudOpen)?;
        Ok(LabelReport {
            path: cloud.document.path().to_path_buf(),
            metadata: cloud.document.metadata(),
            label_attribute: cloud.records.label_attribute().to_string(),
            label_type: cloud.records.labels().label_type().to_string(),
            labels: self.labels(),
            counts: with_counts.then(|| self.label_counts()),
        })
    }

    /// Relabels the open cloud and saves it to a file picked by `destination`.
    ///
    /// `old` selects a remap; without it every point gets `new`. The session
    /// keeps its labels unless the file was written: a parse or validation
    /// error, a cancelled destination or a failed write all leave it as is.
    pub fn change_label(
        &mut self,
        old: Option<&str>,
        new: &str,
        destination: &mut dyn Destination,
        options: &WriteOptions,
    ) -> Result<ChangeOutcome, AppError> {
        let request = RelabelRequest::parse(old, new)?;
        let cloud = self.cloud.as_mut().ok_or(AppError::NoCloudOpen)?;

        let (column, outcome) = RelabelEngine::for_request(&request).relabeled(&cloud.records)?;

        let suggested = suggested_output_path(cloud.document.path());
        let Some(path) = destination.choose(&suggested) else {
            log::info!("label change {} cancelled", request);
            return Ok(ChangeOutcome::Cancelled);
        };

        let previous = cloud.records.replace_labels(column)?;
        match serialize(&cloud.document, &cloud.records, &path, options) {
            Ok(summary) => Ok(ChangeOutcome::Saved { summary, outcome }),
            Err(e) => {
                cloud.records.replace_labels(previous)?;
                log::warn!("label change {} rolled back: {}", request, e);
                Err(e.into())
            }
        }
    }
}
