use std::fmt;

use super::{error::RelabelError, point::PointRecordSet};

pub mod engine;
pub mod overwrite;
pub mod remap;
pub mod request;

pub use engine::{RelabelEngine, RelabelOutcome};
pub use overwrite::BlanketOverwrite;
pub use remap::SelectiveRemap;
pub use request::{parse_label, RelabelRequest};

/// A label transformation.
///
/// `validate` is always called before `relabel`, against the same record set,
/// and `relabel` must not fail once validation has passed.
pub trait Relabel: fmt::Display {
    fn validate(&self, records: &PointRecordSet) -> Result<(), RelabelError>;

    /// Rewrites `labels` in place and returns the number of rows it selected.
    fn relabel(&self, labels: &mut [i64]) -> usize;
}

fn check_range(records: &PointRecordSet, label: i64) -> Result<(), RelabelError> {
    let label_type = records.labels().label_type();
    if label_type.contains(label) {
        Ok(())
    } else {
        Err(RelabelError::OutOfRange {
            label,
            label_type,
            min: label_type.min(),
            max: label_type.max(),
        })
    }
}
