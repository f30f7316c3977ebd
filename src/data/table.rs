//! The merged in-memory table and its row filters.

use crate::models::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Names of the two identifier columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyColumns {
    /// Region (state) column.
    pub region: String,
    /// Sub-region (district) column.
    pub sub_region: String,
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self {
            region: "States/UTs".to_string(),
            sub_region: "District".to_string(),
        }
    }
}

/// An immutable, ordered collection of records.
///
/// `columns` lists the non-identifier columns in first-seen order and only
/// contains columns that hold at least one cell in `records`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    keys: KeyColumns,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Build a table, dropping columns that have no cell in any record.
    pub fn new(keys: KeyColumns, columns: Vec<String>, records: Vec<Record>) -> Self {
        let columns = columns
            .into_iter()
            .filter(|col| records.iter().any(|r| r.cells.contains_key(col)))
            .collect();

        Self {
            keys,
            columns,
            records,
        }
    }

    pub fn keys(&self) -> &KeyColumns {
        &self.keys
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a non-identifier column holds data in this table.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Distinct regions in first-seen order.
    pub fn regions(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.region.as_str()))
    }

    /// Distinct sub-regions of a region in first-seen order.
    pub fn sub_regions(&self, region: &str) -> Vec<String> {
        distinct(
            self.records
                .iter()
                .filter(|r| r.region == region)
                .map(|r| r.sub_region.as_str()),
        )
    }

    /// Rows whose region matches exactly. May be empty.
    pub fn filter_by_region(&self, region: &str) -> Table {
        self.filtered(|r| r.region == region)
    }

    /// Rows whose region and sub-region both match exactly. May be empty.
    pub fn filter_by_sub_region(&self, region: &str, sub_region: &str) -> Table {
        self.filtered(|r| r.region == region && r.sub_region == sub_region)
    }

    /// Intersect `wanted` with the columns present here, keeping `wanted` order.
    pub fn available_categories(&self, wanted: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut available = Vec::new();

        for category in wanted {
            if !self.has_column(category) {
                debug!("Category column not present: {}", category);
                continue;
            }
            if seen.insert(category.as_str()) {
                available.push(category.clone());
            }
        }

        available
    }

    fn filtered<F>(&self, predicate: F) -> Table
    where
        F: Fn(&Record) -> bool,
    {
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect();

        Table::new(self.keys.clone(), self.columns.clone(), records)
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use std::collections::BTreeMap;

    fn record(region: &str, sub_region: &str, cells: &[(&str, f64)]) -> Record {
        Record {
            region: region.to_string(),
            sub_region: sub_region.to_string(),
            source: 0,
            cells: cells
                .iter()
                .map(|(k, v)| (k.to_string(), Cell::Number(*v)))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn sample_table() -> Table {
        Table::new(
            KeyColumns::default(),
            vec!["Murder".to_string(), "Rape".to_string(), "Arson".to_string()],
            vec![
                record("Kerala", "Kollam", &[("Murder", 4.0), ("Rape", 2.0)]),
                record("Goa", "North Goa", &[("Murder", 1.0)]),
                record("Kerala", "Idukki", &[("Murder", 3.0), ("Arson", 1.0)]),
                record("Kerala", "Kollam", &[("Murder", 2.0)]),
                record("Goa", "South Goa", &[("Rape", 5.0)]),
            ],
        )
    }

    #[test]
    fn test_regions_first_seen_order() {
        let table = sample_table();
        assert_eq!(table.regions(), vec!["Kerala", "Goa"]);
        assert_eq!(table.sub_regions("Kerala"), vec!["Kollam", "Idukki"]);
        assert!(table.sub_regions("Punjab").is_empty());
    }

    #[test]
    fn test_filter_by_region_partitions_table() {
        let table = sample_table();
        let mut reassembled: Vec<Record> = Vec::new();

        for region in table.regions() {
            let filtered = table.filter_by_region(&region);
            assert!(filtered.records().iter().all(|r| r.region == region));
            reassembled.extend(filtered.records().iter().cloned());
        }

        assert_eq!(reassembled.len(), table.len());
        for record in table.records() {
            let expected = table.records().iter().filter(|r| *r == record).count();
            let found = reassembled.iter().filter(|r| *r == record).count();
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn test_filter_by_sub_region() {
        let table = sample_table();
        let kollam = table.filter_by_sub_region("Kerala", "Kollam");

        assert_eq!(kollam.len(), 2);
        assert!(kollam.records().iter().all(|r| r.sub_region == "Kollam"));
        // Arson only appears in Idukki.
        assert_eq!(kollam.columns(), &["Murder".to_string(), "Rape".to_string()]);
    }

    #[test]
    fn test_filter_without_match_is_empty() {
        let table = sample_table();

        let none = table.filter_by_region("Punjab");
        assert!(none.is_empty());
        assert!(none.columns().is_empty());

        let wrong_region = table.filter_by_sub_region("Goa", "Kollam");
        assert!(wrong_region.is_empty());
    }

    #[test]
    fn test_available_categories_order_and_idempotence() {
        let table = sample_table();
        let wanted: Vec<String> = ["Arson", "Kidnapping", "Murder", "Arson"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let once = table.available_categories(&wanted);
        assert_eq!(once, vec!["Arson", "Murder"]);

        let twice = table.available_categories(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_new_drops_empty_columns() {
        let table = Table::new(
            KeyColumns::default(),
            vec!["Murder".to_string(), "Dowry Deaths".to_string()],
            vec![record("Goa", "North Goa", &[("Murder", 1.0)])],
        );

        assert!(table.has_column("Murder"));
        assert!(!table.has_column("Dowry Deaths"));
    }
}
