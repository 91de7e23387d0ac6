use std::fmt;

use super::{check_range, Relabel};
use crate::pointcloud::{error::RelabelError, labels::unique_labels, point::PointRecordSet};

/// Replaces one label value with another, leaving every other row alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectiveRemap {
    pub old_label: i64,
    pub new_label: i64,
}

impl Relabel for SelectiveRemap {
    fn validate(&self, records: &PointRecordSet) -> Result<(), RelabelError> {
        check_range(records, self.new_label)?;

        let available = unique_labels(records);
        if !available.contains(self.old_label) {
            return Err(RelabelError::UnknownLabel {
                label: self.old_label,
                available,
            });
        }
        Ok(())
    }

    fn relabel(&self, labels: &mut [i64]) -> usize {
        let mut matched = 0;
        for label in labels.iter_mut().filter(|l| **l == self.old_label) {
            *label = self.new_label;
            matched += 1;
        }
        matched
    }
}

impl fmt::Display for SelectiveRemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remap {} -> {}", self.old_label, self.new_label)
    }
}
