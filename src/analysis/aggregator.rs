//! Crime aggregation and statistics.
//!
//! This module turns a (filtered) table into the summaries the report
//! renders: category totals, sub-region comparisons, the long-format
//! category distribution and the danger assessment.

use crate::data::Table;
use crate::models::{
    CategoryTotal, ComparisonRow, DangerAssessment, DangerLevel, DistributionEntry, Record,
    RegionSummary, RowLabel, SubRegionComparison,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Score boundaries for the danger classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DangerThresholds {
    /// Scores above this are at least Medium.
    pub medium_above: f64,
    /// Scores above this are High.
    pub high_above: f64,
}

impl Default for DangerThresholds {
    fn default() -> Self {
        Self {
            medium_above: 100.0,
            high_above: 500.0,
        }
    }
}

impl From<&crate::config::DangerConfig> for DangerThresholds {
    fn from(config: &crate::config::DangerConfig) -> Self {
        Self {
            medium_above: config.medium_above,
            high_above: config.high_above,
        }
    }
}

impl DangerThresholds {
    /// Classify a score.
    pub fn classify(&self, score: f64) -> DangerLevel {
        if score > self.high_above {
            DangerLevel::High
        } else if score > self.medium_above {
            DangerLevel::Medium
        } else {
            DangerLevel::Low
        }
    }
}

/// Sum of some counts; `None` when there are none.
///
/// Starts from `0.0` rather than using `Iterator::sum`, which yields `-0.0`
/// for floats.
fn sum_counts(counts: impl IntoIterator<Item = f64>) -> Option<f64> {
    counts
        .into_iter()
        .fold(None, |acc, n| Some(acc.unwrap_or(0.0) + n))
}

/// Sum of a category over some records; `None` when no record has a value.
fn sum_category<'a>(records: impl IntoIterator<Item = &'a Record>, category: &str) -> Option<f64> {
    sum_counts(records.into_iter().filter_map(|r| r.count(category)))
}

/// Per-category sums in the order of `categories`.
///
/// Categories without a numeric value in `table` are left out rather than
/// reported as zero.
pub fn totals_by_category(table: &Table, categories: &[String]) -> Vec<CategoryTotal> {
    categories
        .iter()
        .filter(|c| table.has_column(c))
        .filter_map(|c| {
            sum_category(table.records(), c).map(|total| CategoryTotal {
                category: c.clone(),
                total,
            })
        })
        .collect()
}

/// Per-category sums sorted ascending by total, ready for a sorted bar chart.
pub fn category_totals(table: &Table, categories: &[String]) -> Vec<CategoryTotal> {
    let mut totals = totals_by_category(table, categories);
    totals.sort_by(|a, b| {
        a.total
            .partial_cmp(&b.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    totals
}

/// Group a region's rows by sub-region and sum each category, plus a total row.
pub fn sub_region_comparison(
    table: &Table,
    region: &str,
    categories: &[String],
) -> SubRegionComparison {
    let region_table = table.filter_by_region(region);
    let categories = region_table.available_categories(categories);

    let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in region_table.records() {
        groups
            .entry(record.sub_region.as_str())
            .or_default()
            .push(record);
    }

    if groups.contains_key("Total") {
        warn!(
            "Region '{}' has a sub-region named 'Total'; it is kept separate from the computed total",
            region
        );
    }

    let rows: Vec<ComparisonRow> = groups
        .into_iter()
        .map(|(sub_region, records)| ComparisonRow {
            label: RowLabel::SubRegion(sub_region.to_string()),
            totals: categories
                .iter()
                .filter_map(|c| {
                    sum_category(records.iter().copied(), c).map(|total| CategoryTotal {
                        category: c.clone(),
                        total,
                    })
                })
                .collect(),
        })
        .collect();

    let total = ComparisonRow {
        label: RowLabel::Total,
        totals: categories
            .iter()
            .filter_map(|c| {
                sum_counts(rows.iter().filter_map(|row| row.get(c)))
                    .map(|total| CategoryTotal {
                        category: c.clone(),
                        total,
                    })
            })
            .collect(),
    };

    debug!(
        "Compared {} sub-regions of {} over {} categories",
        rows.len(),
        region,
        categories.len()
    );

    SubRegionComparison {
        region: region.to_string(),
        categories,
        rows,
        total,
    }
}

/// Reshape a region's rows into one entry per (row, category).
///
/// Entries are category-major and rows sharing a sub-region are not summed.
pub fn category_distribution(
    table: &Table,
    region: &str,
    categories: &[String],
) -> Vec<DistributionEntry> {
    let region_table = table.filter_by_region(region);
    let categories = region_table.available_categories(categories);

    categories
        .iter()
        .flat_map(|category| {
            region_table.records().iter().map(move |r| DistributionEntry {
                sub_region: r.sub_region.clone(),
                category: category.clone(),
                count: r.count(category),
            })
        })
        .collect()
}

/// Sum distribution entries per category, in the order of `categories`.
///
/// Repeated categories are summed once and categories whose entries are all
/// missing are left out.
pub fn distribution_totals(
    entries: &[DistributionEntry],
    categories: &[String],
) -> Vec<CategoryTotal> {
    let mut seen = Vec::new();

    categories
        .iter()
        .filter(|c| {
            if seen.contains(c) {
                return false;
            }
            seen.push(*c);
            true
        })
        .filter_map(|c| {
            let counts = entries
                .iter()
                .filter(|e| &e.category == c)
                .filter_map(|e| e.count);
            sum_counts(counts).map(|total| CategoryTotal {
                category: c.clone(),
                total,
            })
        })
        .collect()
}

/// Total crime count of a sub-region over the available categories.
pub fn danger_score(table: &Table, region: &str, sub_region: &str, categories: &[String]) -> f64 {
    let selected = table.filter_by_sub_region(region, sub_region);
    let categories = selected.available_categories(categories);

    totals_by_category(&selected, &categories)
        .iter()
        .fold(0.0, |score, t| score + t.total)
}

/// Score and classify a sub-region.
pub fn assess_danger(
    table: &Table,
    region: &str,
    sub_region: &str,
    categories: &[String],
    thresholds: &DangerThresholds,
) -> DangerAssessment {
    let score = danger_score(table, region, sub_region, categories);

    DangerAssessment {
        region: region.to_string(),
        sub_region: sub_region.to_string(),
        score,
        level: thresholds.classify(score),
    }
}

/// Row and sub-region counts per region, in first-seen order.
pub fn region_summaries(table: &Table) -> Vec<RegionSummary> {
    table
        .regions()
        .into_iter()
        .map(|region| RegionSummary {
            sub_regions: table.sub_regions(&region).len(),
            rows: table.records().iter().filter(|r| r.region == region).count(),
            name: region,
        })
        .collect()
}
