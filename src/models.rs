//! Data models for the crime navigator.
//!
//! This module contains the core data structures shared by the loader,
//! the aggregation pipeline and the report renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tokens treated as missing values when reading a cell.
const MISSING_TOKENS: &[&str] = &["na", "n/a", "nan", "null", "none", "-", "#n/a"];

/// Danger level of a sub-region, derived from its total crime count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DangerLevel {
    /// At or below the medium threshold
    Low,
    /// Above the medium threshold, at or below the high threshold
    Medium,
    /// Above the high threshold
    High,
}

impl fmt::Display for DangerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DangerLevel::Low => write!(f, "Low"),
            DangerLevel::Medium => write!(f, "Medium"),
            DangerLevel::High => write!(f, "High"),
        }
    }
}

impl DangerLevel {
    /// Returns an emoji representation of the level.
    pub fn emoji(&self) -> &'static str {
        match self {
            DangerLevel::Low => "🟢",
            DangerLevel::Medium => "🟡",
            DangerLevel::High => "🔴",
        }
    }
}

/// A single non-missing cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Parse a raw field. Returns `None` for empty fields and missing-value tokens.
    pub fn parse(raw: &str) -> Option<Cell> {
        let raw = raw.trim();
        if raw.is_empty() || MISSING_TOKENS.contains(&raw.to_lowercase().as_str()) {
            return None;
        }

        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Cell::Number(n)),
            _ => Some(Cell::Text(raw.to_string())),
        }
    }

    /// The numeric value, if this cell holds one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One row of the merged table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Region (state) identifier.
    pub region: String,
    /// Sub-region (district) identifier.
    pub sub_region: String,
    /// Index of the source file this row came from.
    pub source: usize,
    /// Non-identifier cells. Columns absent here are missing, not zero.
    pub cells: BTreeMap<String, Cell>,
}

impl Record {
    /// Numeric count for a category, `None` when missing or non-numeric.
    pub fn count(&self, category: &str) -> Option<f64> {
        self.cells.get(category).and_then(Cell::as_number)
    }
}

/// Sum of one category over a set of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Look up one category in a list of totals.
pub fn find_total(totals: &[CategoryTotal], category: &str) -> Option<f64> {
    totals
        .iter()
        .find(|t| t.category == category)
        .map(|t| t.total)
}

/// Label of a comparison row.
///
/// The synthesized total is a distinct variant so it can never collide
/// with a sub-region whose name happens to be "Total".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLabel {
    SubRegion(String),
    Total,
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLabel::SubRegion(name) => write!(f, "{}", name),
            RowLabel::Total => write!(f, "Total"),
        }
    }
}

/// Per sub-region category sums within a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub label: RowLabel,
    /// Sums in category order; categories with no values in the group are absent.
    pub totals: Vec<CategoryTotal>,
}

impl ComparisonRow {
    /// Sum for a category, `None` when the group has no values for it.
    pub fn get(&self, category: &str) -> Option<f64> {
        find_total(&self.totals, category)
    }

    /// Whether this is the synthesized total row.
    pub fn is_total(&self) -> bool {
        self.label == RowLabel::Total
    }
}

/// Sub-region comparison table for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubRegionComparison {
    pub region: String,
    pub categories: Vec<String>,
    /// One row per sub-region, ordered by sub-region name.
    pub rows: Vec<ComparisonRow>,
    /// Column-wise sum over `rows`.
    pub total: ComparisonRow,
}

impl SubRegionComparison {
    /// Rows to chart: every real sub-region, never the total.
    pub fn chart_rows(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter(|row| !row.is_total())
    }

    /// Rows for tabular display: sub-regions followed by the total.
    pub fn table_rows(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().chain(std::iter::once(&self.total))
    }
}

/// One cell of the long-format category distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub sub_region: String,
    pub category: String,
    /// `None` when the source row has no value for the category.
    pub count: Option<f64>,
}

/// Danger assessment of a single sub-region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DangerAssessment {
    pub region: String,
    pub sub_region: String,
    pub score: f64,
    pub level: DangerLevel,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Source files, in load order.
    pub sources: Vec<String>,
    /// Number of rows in the merged table.
    pub total_rows: usize,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Time spent loading and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// Row and sub-region counts of one region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSummary {
    pub name: String,
    pub sub_regions: usize,
    pub rows: usize,
}

/// Dataset overview shown on the landing view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub regions: Vec<RegionSummary>,
    /// Configured categories present in the merged table.
    pub categories: Vec<String>,
}

/// Detail of one selected region and sub-region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSection {
    pub region: String,
    pub sub_region: Option<String>,
    /// Names of the region and sub-region columns.
    pub key_columns: (String, String),
    /// Non-identifier columns holding data for the selected sub-region.
    pub columns: Vec<String>,
    /// Rows of the selected sub-region.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub records: Vec<Record>,
    /// Category totals of the selected sub-region, ascending.
    pub category_totals: Vec<CategoryTotal>,
    pub comparison: SubRegionComparison,
    /// Category charted across sub-regions.
    pub comparison_category: Option<String>,
}

/// Category distribution across a region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionSection {
    pub region: String,
    pub entries: Vec<DistributionEntry>,
    /// Sum per category, in category order.
    pub totals: Vec<CategoryTotal>,
}

/// A complete dashboard report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<DatasetOverview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<DistributionSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<DangerAssessment>,
}

impl Report {
    /// Creates an empty report with the given metadata.
    pub fn new(metadata: ReportMetadata) -> Self {
        Self {
            metadata,
            overview: None,
            region: None,
            distribution: None,
            danger: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_danger_level_ordering() {
        assert!(DangerLevel::Low < DangerLevel::Medium);
        assert!(DangerLevel::Medium < DangerLevel::High);
    }

    #[test]
    fn test_danger_level_emoji() {
        assert_eq!(DangerLevel::High.emoji(), "🔴");
        assert_eq!(DangerLevel::Medium.emoji(), "🟡");
        assert_eq!(DangerLevel::Low.emoji(), "🟢");
    }

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse("42"), Some(Cell::Number(42.0)));
        assert_eq!(Cell::parse(" 3.5 "), Some(Cell::Number(3.5)));
        assert_eq!(Cell::parse("Kerala"), Some(Cell::Text("Kerala".to_string())));
        assert_eq!(Cell::parse(""), None);
        assert_eq!(Cell::parse("NA"), None);
        assert_eq!(Cell::parse("nan"), None);
        assert_eq!(Cell::parse("#N/A"), None);
    }

    #[test]
    fn test_record_count_ignores_text() {
        let mut cells = BTreeMap::new();
        cells.insert("Murder".to_string(), Cell::Number(4.0));
        cells.insert("Note".to_string(), Cell::Text("revised".to_string()));
        let record = Record {
            region: "A".to_string(),
            sub_region: "X".to_string(),
            source: 0,
            cells,
        };

        assert_eq!(record.count("Murder"), Some(4.0));
        assert_eq!(record.count("Note"), None);
        assert_eq!(record.count("Arson"), None);
    }

    #[test]
    fn test_total_label_is_not_a_sub_region() {
        let real = RowLabel::SubRegion("Total".to_string());
        assert_ne!(real, RowLabel::Total);
        assert_eq!(real.to_string(), RowLabel::Total.to_string());
    }

    #[test]
    fn test_comparison_chart_rows_exclude_total() {
        let row = |label: RowLabel, n: f64| ComparisonRow {
            label,
            totals: vec![CategoryTotal {
                category: "Murder".to_string(),
                total: n,
            }],
        };
        let comparison = SubRegionComparison {
            region: "A".to_string(),
            categories: vec!["Murder".to_string()],
            rows: vec![
                row(RowLabel::SubRegion("Total".to_string()), 1.0),
                row(RowLabel::SubRegion("X".to_string()), 2.0),
            ],
            total: row(RowLabel::Total, 3.0),
        };

        assert_eq!(comparison.chart_rows().count(), 2);
        assert_eq!(comparison.table_rows().count(), 3);
        assert_eq!(comparison.total.get("Murder"), Some(3.0));
        assert_eq!(comparison.total.get("Arson"), None);
    }
}
