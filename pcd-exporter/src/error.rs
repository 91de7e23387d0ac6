use std::{io, path::PathBuf};

use thiserror::Error;

use pcd_core::pointcloud::RecordError;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Las {
        path: PathBuf,
        #[source]
        source: las::Error,
    },

    #[error("invalid output format: {0}")]
    Format(#[source] las::Error),

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported destination {path}: expected a .las or .laz file")]
    UnsupportedDestination { path: PathBuf },

    #[error("invalid record set: {0}")]
    Records(#[from] RecordError),

    #[error("record set has {records} rows but the source document has {points} points")]
    RowCountMismatch { records: usize, points: usize },

    #[error("label {label} cannot be stored in '{slot}'")]
    LabelNotRepresentable { label: i64, slot: String },

    #[error("the source document has no '{0}' attribute to write labels into")]
    UnknownLabelSlot(String),
}
