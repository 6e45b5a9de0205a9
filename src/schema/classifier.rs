use super::diff::TableDiff;
use super::index::IndexDescriptor;

/// Splits index changes between the generic DDL path and the spatial one.
pub struct IndexClassifier;

impl IndexClassifier {
    /// Remove spatial indexes from `added_indexes` and `changed_indexes`.
    ///
    /// Every spatial changed index is also appended to `removed_indexes`, so
    /// the generic path drops it and it is recreated rather than altered in
    /// place. Returns the isolated spatial indexes (added first, then changed),
    /// which must be created after the generic statements.
    pub fn classify(diff: &mut TableDiff) -> Vec<IndexDescriptor> {
        let (spatial_added, ordinary_added): (Vec<_>, Vec<_>) =
            std::mem::take(&mut diff.added_indexes).into_iter().partition(|i| i.spatial);
        let (spatial_changed, ordinary_changed): (Vec<_>, Vec<_>) =
            std::mem::take(&mut diff.changed_indexes).into_iter().partition(|i| i.spatial);

        diff.added_indexes = ordinary_added;
        diff.changed_indexes = ordinary_changed;

        for index in &spatial_changed {
            if !diff.removed_indexes.iter().any(|r| r.name == index.name) {
                diff.removed_indexes.push(index.clone());
            }
        }

        let mut spatial = spatial_added;
        spatial.extend(spatial_changed);
        spatial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_spatial_index_is_dropped_and_isolated() {
        let mut diff = TableDiff::new("parcels");
        diff.changed_indexes = vec![
            IndexDescriptor::new("idx_name", ["name"]),
            IndexDescriptor::new("idx_geom", ["geom"]).spatial(),
        ];

        let spatial = IndexClassifier::classify(&mut diff);

        assert_eq!(spatial.len(), 1);
        assert_eq!(spatial[0].name, "idx_geom");
        assert_eq!(diff.changed_indexes.len(), 1);
        assert_eq!(diff.changed_indexes[0].name, "idx_name");
        assert_eq!(diff.removed_indexes.len(), 1);
        assert_eq!(diff.removed_indexes[0].name, "idx_geom");
    }

    #[test]
    fn test_added_spatial_index_is_not_dropped() {
        let mut diff = TableDiff::new("parcels");
        diff.added_indexes = vec![
            IndexDescriptor::new("idx_geom", ["geom"]).spatial(),
            IndexDescriptor::new("idx_name", ["name"]),
        ];

        let spatial = IndexClassifier::classify(&mut diff);

        assert_eq!(spatial.len(), 1);
        assert!(diff.added_indexes.iter().all(|i| !i.spatial));
        assert!(diff.removed_indexes.is_empty());
    }

    #[test]
    fn test_no_duplicate_removal() {
        let mut diff = TableDiff::new("parcels");
        diff.changed_indexes = vec![IndexDescriptor::new("idx_geom", ["geom"]).spatial()];
        diff.removed_indexes = vec![IndexDescriptor::new("idx_geom", ["geom"]).spatial()];

        IndexClassifier::classify(&mut diff);
        assert_eq!(diff.removed_indexes.len(), 1);
    }

    #[test]
    fn test_ordinary_only_diff_is_untouched() {
        let mut diff = TableDiff::new("parcels");
        diff.added_indexes = vec![IndexDescriptor::new("idx_name", ["name"]).unique()];
        let before = diff.clone();

        assert!(IndexClassifier::classify(&mut diff).is_empty());
        assert_eq!(diff, before);
    }
}
