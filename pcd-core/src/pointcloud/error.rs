use thiserror::Error;

use super::{labels::LabelSet, point::LabelType};

/// Errors raised while building a record set from a document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// None of the label attribute candidates exist in the document schema.
    #[error("label attribute not found (looked for: {})", .candidates.join(", "))]
    MissingAttribute { candidates: Vec<String> },

    /// A required (non-label) attribute is absent.
    #[error("attribute '{name}' not found in document")]
    AttributeNotFound { name: String },

    /// The attribute exists but does not have the expected column type.
    #[error("attribute '{name}' has type {actual}, expected {expected}")]
    AttributeType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Record(#[from] RecordError),
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("column '{name}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("value {value} in column '{name}' does not fit {label_type}")]
    ValueOutOfRange {
        name: &'static str,
        value: i64,
        label_type: LabelType,
    },
}

/// Errors raised by label parsing and the relabel engine. None of them leave
/// the record set modified.
#[derive(Debug, Error)]
pub enum RelabelError {
    #[error("invalid {field} label {text:?}: expected an integer")]
    InvalidInput { field: &'static str, text: String },

    #[error("label {label} does not exist (available labels: {available})")]
    UnknownLabel { label: i64, available: LabelSet },

    #[error("label {label} is out of range for a {label_type} column ({min}..={max})")]
    OutOfRange {
        label: i64,
        label_type: LabelType,
        min: i64,
        max: i64,
    },
}
