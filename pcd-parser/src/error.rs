use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),

    #[error("failed to read {path}: {source}")]
    Las {
        path: PathBuf,
        #[source]
        source: las::Error,
    },

    #[error("invalid extra bytes descriptor #{index}: {message}")]
    ExtraBytesDescriptor { index: usize, message: String },

    #[error("point {index} carries {actual} extra bytes, the schema needs {expected}")]
    ExtraBytesLength {
        index: usize,
        expected: usize,
        actual: usize,
    },
}
