use crate::pointcloud::{
    error::RelabelError,
    labels::LabelSet,
    point::{LabelColumn, PointRecordSet},
};

use super::{Relabel, RelabelRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelabelOutcome {
    /// Rows selected by the transformation.
    pub matched: usize,
    /// Label set recomputed after the change.
    pub labels: LabelSet,
}

/// Runs a [`Relabel`] against a record set with validate-before-mutate
/// semantics: on error the record set is untouched.
pub struct RelabelEngine {
    relabel: Box<dyn Relabel>,
}

impl RelabelEngine {
    pub fn new(relabel: Box<dyn Relabel>) -> Self {
        Self { relabel }
    }

    pub fn for_request(request: &RelabelRequest) -> Self {
        Self::new(request.build())
    }

    /// Mutates `records` in place.
    pub fn apply(&self, records: &mut PointRecordSet) -> Result<RelabelOutcome, RelabelError> {
        self.relabel.validate(records)?;

        let matched = self.relabel.relabel(records.labels_mut().values_mut());
        Ok(self.outcome(matched, records.labels()))
    }

    /// Computes the relabeled column without touching `records`. The caller
    /// commits it with [`PointRecordSet::replace_labels`] once it is sure.
    pub fn relabeled(
        &self,
        records: &PointRecordSet,
    ) -> Result<(LabelColumn, RelabelOutcome), RelabelError> {
        self.relabel.validate(records)?;

        let mut column = records.labels().clone();
        let matched = self.relabel.relabel(column.values_mut());
        let outcome = self.outcome(matched, &column);
        Ok((column, outcome))
    }

    fn outcome(&self, matched: usize, column: &LabelColumn) -> RelabelOutcome {
        let labels: LabelSet = column.values().iter().copied().collect();
        log::info!(
            "{}: {} of {} points relabeled, labels now {}",
            self.relabel,
            matched,
            column.len(),
            labels
        );
        RelabelOutcome { matched, labels }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::pointcloud::{
        labels::{label_counts, unique_labels},
        point::LabelType,
    };

    fn records(labels: Vec<i64>) -> PointRecordSet {
        let n = labels.len();
        PointRecordSet::new(
            (0..n).map(|i| i as f64).collect(),
            vec![1.0; n],
            vec![2.0; n],
            vec![100; n],
            LabelColumn::new(LabelType::U8, labels).unwrap(),
            "Ext_Class",
        )
        .unwrap()
    }

    fn remap(old_label: i64, new_label: i64) -> RelabelEngine {
        RelabelEngine::for_request(&RelabelRequest::Remap {
            old_label,
            new_label,
        })
    }

    fn labels(values: &[i64]) -> LabelSet {
        values.iter().copied().collect()
    }

    #[test]
    fn remap_existing_label() {
        let mut records = records(vec![2, 5, 9, 5, 2]);
        let outcome = remap(5, 7).apply(&mut records).unwrap();

        assert_eq!(outcome.matched, 2);
        assert_eq!(outcome.labels, labels(&[2, 7, 9]));
        assert_eq!(unique_labels(&records), labels(&[2, 7, 9]));
        assert_eq!(records.len(), 5);
        assert_eq!(records.labels().values(), &[2, 7, 9, 7, 2]);
    }

    #[test]
    fn invalid_text_leaves_labels_alone() {
        let records = records(vec![2, 5, 9]);
        let before = records.clone();

        let err = RelabelRequest::parse(Some("abc"), "7").unwrap_err();
        assert!(matches!(err, RelabelError::InvalidInput { field: "old", .. }));
        assert_eq!(records, before);
        assert_eq!(unique_labels(&records), labels(&[2, 5, 9]));
    }

    #[test]
    fn unknown_label_leaves_labels_alone() {
        let mut records = records(vec![2, 5, 9]);
        let before = records.clone();

        let err = remap(6, 7).apply(&mut records).unwrap_err();
        assert!(matches!(err, RelabelError::UnknownLabel { label: 6, .. }));
        assert_eq!(records, before);
    }

    #[test]
    fn out_of_range_new_label_is_rejected() {
        let mut records = records(vec![2, 5, 9]);
        let before = records.clone();

        for new_label in [256, -1] {
            let err = remap(5, new_label).apply(&mut records).unwrap_err();
            assert!(matches!(
                err,
                RelabelError::OutOfRange {
                    min: 0,
                    max: 255,
                    ..
                }
            ));
        }
        let err = RelabelEngine::for_request(&RelabelRequest::Overwrite { new_label: 300 })
            .apply(&mut records)
            .unwrap_err();
        assert!(matches!(err, RelabelError::OutOfRange { label: 300, .. }));
        assert_eq!(records, before);
    }

    #[test]
    fn legacy_classification_is_limited_to_five_bits() {
        let mut records = PointRecordSet::new(
            vec![0.0],
            vec![0.0],
            vec![0.0],
            vec![0],
            LabelColumn::new(LabelType::Classification5, vec![2]).unwrap(),
            "classification",
        )
        .unwrap();
        assert!(remap(2, 32).apply(&mut records).is_err());
        assert!(remap(2, 31).apply(&mut records).is_ok());
    }

    #[test]
    fn second_identical_remap_fails() {
        let mut records = records(vec![2, 5, 9]);
        remap(5, 7).apply(&mut records).unwrap();
        let after_first = records.clone();

        let err = remap(5, 7).apply(&mut records).unwrap_err();
        assert!(matches!(err, RelabelError::UnknownLabel { label: 5, .. }));
        assert_eq!(records, after_first);
    }

    #[test]
    fn overwrite_needs_no_existing_label() {
        let mut records = records(vec![2, 5, 9]);
        let outcome = RelabelEngine::for_request(&RelabelRequest::Overwrite { new_label: 11 })
            .apply(&mut records)
            .unwrap();
        assert_eq!(outcome.matched, 3);
        assert_eq!(outcome.labels, labels(&[11]));
    }

    #[test]
    fn overwrite_of_empty_record_set_is_a_no_op() {
        let mut records = records(vec![]);
        let outcome = RelabelEngine::for_request(&RelabelRequest::Overwrite { new_label: 1 })
            .apply(&mut records)
            .unwrap();
        assert_eq!(outcome.matched, 0);
        assert!(outcome.labels.is_empty());
    }

    #[test]
    fn relabeled_does_not_touch_the_source() {
        let records = records(vec![2, 5, 9]);
        let (column, outcome) = remap(9, 2).relabeled(&records).unwrap();

        assert_eq!(column.values(), &[2, 5, 2]);
        assert_eq!(outcome.labels, labels(&[2, 5]));
        assert_eq!(records.labels().values(), &[2, 5, 9]);
    }

    #[test]
    fn relabeled_agrees_with_apply() {
        let mut records = records(vec![2, 5, 9, 5]);
        let (column, staged) = remap(5, 3).relabeled(&records).unwrap();
        assert_eq!(column.label_type(), LabelType::U8);

        let applied = remap(5, 3).apply(&mut records).unwrap();
        assert_eq!(staged, applied);
        assert_eq!(&column, records.labels());

        assert!(matches!(
            remap(5, 3).relabeled(&records),
            Err(RelabelError::UnknownLabel { label: 5, .. })
        ));
    }

    #[test]
    fn only_the_label_column_changes() {
        let mut records = records(vec![1, 2, 1]);
        let before = records.clone();
        remap(1, 3).apply(&mut records).unwrap();

        assert_eq!(records.x, before.x);
        assert_eq!(records.y, before.y);
        assert_eq!(records.z, before.z);
        assert_eq!(records.intensity, before.intensity);
        assert_eq!(records.label_attribute(), "Ext_Class");
    }

    proptest! {
        #[test]
        fn absent_label_is_rejected_without_mutation(
            values in prop::collection::vec(0i64..20, 0..200),
            missing in 20i64..256,
            new_label in 0i64..256,
        ) {
            let mut records = records(values);
            let before = records.clone();
            let result = remap(missing, new_label).apply(&mut records);
            let is_unknown = matches!(result, Err(RelabelError::UnknownLabel { .. }));
            prop_assert!(is_unknown);
            prop_assert_eq!(records, before);
        }

        #[test]
        fn remap_merges_counts(
            values in prop::collection::vec(0i64..8, 1..200),
            pick in any::<prop::sample::Index>(),
            new_label in 0i64..8,
        ) {
            let old_label = values[pick.index(values.len())];
            prop_assume!(old_label != new_label);

            let mut records = records(values);
            let before = label_counts(&records);
            remap(old_label, new_label).apply(&mut records).unwrap();
            let after = label_counts(&records);

            prop_assert_eq!(after.get(old_label), 0);
            prop_assert_eq!(
                after.get(new_label),
                before.get(old_label) + before.get(new_label)
            );
            prop_assert_eq!(after.total(), before.total());
        }

        #[test]
        fn remap_twice_equals_remap_once(
            values in prop::collection::vec(0i64..8, 1..100),
            pick in any::<prop::sample::Index>(),
            new_label in 8i64..16,
        ) {
            let old_label = values[pick.index(values.len())];
            let mut once = records(values);
            remap(old_label, new_label).apply(&mut once).unwrap();

            let mut twice = once.clone();
            let second = remap(old_label, new_label).apply(&mut twice);
            let is_unknown = matches!(second, Err(RelabelError::UnknownLabel { .. }));
            prop_assert!(is_unknown);
            prop_assert_eq!(twice, once);
        }
    }
}
