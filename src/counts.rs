//! Child record counts for the browse listing.

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use log::{debug, info, warn};
use serde::Serialize;

use crate::catalog::{CatalogObject, SourceId, schema};
use crate::table::Table;

/// Number of rows per source in one child table.
///
/// Sources without rows are absent; use [`ChildCounts::get`] to read them as 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChildCounts {
    /// Name of the counted table.
    pub table: String,
    /// Row count per source id.
    pub counts: BTreeMap<SourceId, usize>,
}

impl ChildCounts {
    /// Count for `source_id`, 0 when it has no rows.
    pub fn get(&self, source_id: SourceId) -> usize {
        self.counts.get(&source_id).copied().unwrap_or(0)
    }
}

/// Group the rows of a child table by `source_id` and count them.
///
/// Rows without an integer `source_id` are skipped.
pub fn count_children(table_name: &str, rows: &Table) -> ChildCounts {
    let ids = rows
        .rows()
        .filter_map(|row| row.get(schema::SOURCE_ID).as_i64())
        .collect_vec();
    let skipped = rows.len() - ids.len();
    if skipped > 0 {
        warn!("Skipped {skipped} `{table_name}` rows without a source id.");
    }

    let counts: BTreeMap<SourceId, usize> = ids.into_iter().counts().into_iter().collect();
    debug!(
        "Counted {} `{table_name}` rows for {} sources.",
        rows.len() - skipped,
        counts.len()
    );

    ChildCounts {
        table: table_name.to_owned(),
        counts,
    }
}

/// One object of the browse listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListingRow {
    /// The catalog object.
    pub object: CatalogObject,
    /// Counts in the order of [`BrowseListing::count_columns`].
    pub counts: Vec<usize>,
}

/// Every catalog object with its child record counts.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BrowseListing {
    /// Names of the counted tables.
    pub count_columns: Vec<String>,
    /// One row per catalog object, in catalog order.
    pub rows: Vec<ListingRow>,
}

impl BrowseListing {
    /// Counts of one column, in row order.
    pub fn column(&self, table: &str) -> Option<Vec<usize>> {
        let index = self.count_columns.iter().position(|c| c == table)?;
        Some(self.rows.iter().map(|row| row.counts[index]).collect())
    }
}

/// Attach counts to every object.
///
/// Every object appears exactly once with a count per set, 0 where a set has no
/// rows for it. Counts of ids that are not in `objects` are dropped.
pub fn merge_counts(objects: Vec<CatalogObject>, count_sets: &[ChildCounts]) -> BrowseListing {
    info!(
        "Merging {} count sets into {} objects.",
        count_sets.len(),
        objects.len()
    );

    let known: HashSet<SourceId> = objects.iter().map(|o| o.id).collect();
    for set in count_sets {
        let orphans = set.counts.keys().filter(|id| !known.contains(id)).count();
        if orphans > 0 {
            warn!(
                "Dropping `{}` counts of {orphans} ids missing from the catalog.",
                set.table
            );
        }
    }

    let rows = objects
        .into_iter()
        .map(|object| ListingRow {
            counts: count_sets.iter().map(|set| set.get(object.id)).collect(),
            object,
        })
        .collect();

    BrowseListing {
        count_columns: count_sets.iter().map(|set| set.table.clone()).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn object(id: SourceId) -> CatalogObject {
        CatalogObject {
            id,
            designation: format!("src{id}"),
            alternate_names: String::new(),
            ra: None,
            dec: None,
            comments: String::new(),
        }
    }

    fn child_table(name: &str, source_ids: &[Value]) -> Table {
        source_ids
            .iter()
            .enumerate()
            .fold(Table::new(name, ["id", "source_id"]), |t, (i, id)| {
                t.with_row([Value::from(i as i64), id.clone()])
            })
    }

    #[test]
    fn counts_by_source() {
        let table = child_table("photometry", &[1.into(), 1.into(), 2.into(), 1.into()]);
        let counts = count_children("photometry", &table);
        assert_eq!(counts.table, "photometry");
        assert_eq!(counts.get(1), 3);
        assert_eq!(counts.get(2), 1);
        assert_eq!(counts.get(3), 0);
        assert!(!counts.counts.contains_key(&3));
    }

    #[test]
    fn rows_without_source_are_skipped() {
        let table = child_table("spectra", &[Value::Null, 4.into(), "x".into()]);
        let counts = count_children("spectra", &table);
        assert_eq!(counts.counts.len(), 1);
        assert_eq!(counts.get(4), 1);
    }

    #[test]
    fn left_outer_merge() {
        let photometry = count_children(
            "photometry",
            &child_table("photometry", &[1.into(), 1.into(), 1.into()]),
        );
        let spectra = count_children(
            "spectra",
            &child_table("spectra", &[2.into(), 2.into(), 2.into(), 2.into(), 2.into()]),
        );

        let listing = merge_counts(vec![object(1), object(2), object(3)], &[photometry, spectra]);
        assert_eq!(
            listing.rows.iter().map(|r| r.object.id).collect_vec(),
            vec![1, 2, 3]
        );
        assert_eq!(listing.column("photometry").unwrap(), vec![3, 0, 0]);
        assert_eq!(listing.column("spectra").unwrap(), vec![0, 5, 0]);
        assert!(listing.column("images").is_none());
    }

    #[test]
    fn orphan_counts_are_dropped() {
        let photometry =
            count_children("photometry", &child_table("photometry", &[9.into(), 1.into()]));
        let listing = merge_counts(vec![object(1)], &[photometry]);
        assert_eq!(listing.rows.len(), 1);
        assert_eq!(listing.rows[0].counts, vec![1]);
    }

    #[test]
    fn empty_inputs() {
        let listing = merge_counts(Vec::new(), &[]);
        assert!(listing.rows.is_empty());
        let listing = merge_counts(vec![object(5)], &[]);
        assert_eq!(listing.rows[0].counts, Vec::<usize>::new());
    }
}
