use std::fmt;

use super::{check_range, Relabel};
use crate::pointcloud::{error::RelabelError, point::PointRecordSet};

/// Sets every row to the same label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlanketOverwrite {
    pub new_label: i64,
}

impl Relabel for BlanketOverwrite {
    fn validate(&self, records: &PointRecordSet) -> Result<(), RelabelError> {
        check_range(records, self.new_label)
    }

    fn relabel(&self, labels: &mut [i64]) -> usize {
        labels.fill(self.new_label);
        labels.len()
    }
}

impl fmt::Display for BlanketOverwrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overwrite all -> {}", self.new_label)
    }
}
