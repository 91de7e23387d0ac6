use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::Serialize;

use super::point::PointRecordSet;

/// Distinct label values observed at one point in time, ascending.
///
/// A `LabelSet` is a snapshot: it is not updated when the record set it was
/// computed from changes, so recompute it with [`unique_labels`] after every
/// relabel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<i64>);

impl LabelSet {
    pub fn contains(&self, label: i64) -> bool {
        self.0.contains(&label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<i64> for LabelSet {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none");
        }
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", label)?;
        }
        Ok(())
    }
}

/// Number of points per label, ascending by label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelCounts(BTreeMap<i64, usize>);

impl LabelCounts {
    pub fn get(&self, label: i64) -> usize {
        self.0.get(&label).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, usize)> + '_ {
        self.0.iter().map(|(&label, &count)| (label, count))
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn labels(&self) -> LabelSet {
        self.0.keys().copied().collect()
    }
}

pub fn unique_labels<'a>(records: impl Into<Option<&'a PointRecordSet>>) -> LabelSet {
    match records.into() {
        Some(records) => records.labels().values().iter().copied().collect(),
        None => LabelSet::default(),
    }
}

pub fn label_counts<'a>(records: impl Into<Option<&'a PointRecordSet>>) -> LabelCounts {
    let mut counts = BTreeMap::new();
    if let Some(records) = records.into() {
        for &label in records.labels().values() {
            *counts.entry(label).or_insert(0) += 1;
        }
    }
    LabelCounts(counts)
}
