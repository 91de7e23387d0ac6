use std::io;

use thiserror::Error;

use pcd_core::pointcloud::{ExtractError, RecordError, RelabelError};
use pcd_exporter::WriteError;
use pcd_parser::ParseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no point cloud is open")]
    NoCloudOpen,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Relabel(#[from] RelabelError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("invalid LAS version {0:?}: expected MAJOR.MINOR, e.g. 1.4")]
    InvalidVersion(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode report: {0}")]
    Csv(#[from] csv::Error),
}
