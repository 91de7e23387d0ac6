pub mod document;
pub mod error;
pub mod extractor;
pub mod labels;
pub mod point;
pub mod relabel;

pub use document::{AttributeArray, PointDocument};
pub use error::{ExtractError, RecordError, RelabelError};
pub use extractor::AttributeExtractor;
pub use labels::{label_counts, unique_labels, LabelCounts, LabelSet};
pub use point::{
    Color, ExtendedAttributes, LabelColumn, LabelType, PointRecordSet, SourceMetadata,
};
pub use relabel::{RelabelEngine, RelabelOutcome, RelabelRequest};
