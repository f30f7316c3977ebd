//! Dashboard views.
//!
//! Resolves the cascading region/sub-region selection and assembles the
//! sections of a [`Report`] for the requested view.

use crate::analysis::{self, DangerThresholds};
use crate::cli::View;
use crate::config::Config;
use crate::data::Table;
use crate::models::{DatasetOverview, DistributionSection, RegionSection, Report, ReportMetadata};
use tracing::{debug, warn};

/// A region and sub-region choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub region: Option<String>,
    pub sub_region: Option<String>,
}

impl Selection {
    /// Fill in missing choices with the first available option, like a
    /// dropdown showing its first entry.
    pub fn resolve(table: &Table, region: Option<&str>, sub_region: Option<&str>) -> Self {
        let region = region
            .map(String::from)
            .or_else(|| table.regions().into_iter().next());

        let sub_region = match (&region, sub_region) {
            (_, Some(sub_region)) => Some(sub_region.to_string()),
            (Some(region), None) => table.sub_regions(region).into_iter().next(),
            (None, None) => None,
        };

        debug!("Selection resolved to {:?} / {:?}", region, sub_region);

        Self { region, sub_region }
    }
}

/// Listing of the regions, or of one region's sub-regions.
pub fn list_options(table: &Table, region: Option<&str>) -> String {
    let (title, empty, values) = match region {
        Some(region) => (
            format!("Sub-regions of {}", region),
            format!("No sub-regions of {} found.", region),
            table.sub_regions(region),
        ),
        None => (
            "Regions".to_string(),
            "No regions found.".to_string(),
            table.regions(),
        ),
    };

    if values.is_empty() {
        return format!("{}\n", empty);
    }

    let mut listing = format!("{} ({}):\n", title, values.len());
    for value in values {
        listing.push_str(&format!("  {}\n", value));
    }
    listing
}

/// Regions and configured categories present in the table.
pub fn build_overview(table: &Table, categories: &[String]) -> DatasetOverview {
    DatasetOverview {
        regions: analysis::region_summaries(table),
        categories: table.available_categories(categories),
    }
}

/// Rows, totals and the sub-region comparison for a selection.
pub fn build_region_section(
    table: &Table,
    region: &str,
    sub_region: Option<&str>,
    config: &Config,
) -> RegionSection {
    let selected = match sub_region {
        Some(sub_region) => table.filter_by_sub_region(region, sub_region),
        None => Table::new(table.keys().clone(), Vec::new(), Vec::new()),
    };

    if selected.is_empty() {
        warn!(
            "No rows for {} / {}",
            region,
            sub_region.unwrap_or("(no sub-region)")
        );
    }

    let categories = selected.available_categories(&config.data.categories);
    let comparison = analysis::sub_region_comparison(table, region, &config.data.categories);

    let wanted = &config.report.comparison_category;
    let comparison_category = if comparison.categories.contains(wanted) {
        Some(wanted.clone())
    } else {
        comparison.categories.first().cloned()
    };

    let keys = table.keys();

    RegionSection {
        region: region.to_string(),
        sub_region: sub_region.map(String::from),
        key_columns: (keys.region.clone(), keys.sub_region.clone()),
        columns: selected.columns().to_vec(),
        records: if config.report.include_records {
            selected.records().to_vec()
        } else {
            Vec::new()
        },
        category_totals: analysis::category_totals(&selected, &categories),
        comparison,
        comparison_category,
    }
}

/// Long-format distribution of a region and its per-category sums.
pub fn build_distribution_section(
    table: &Table,
    region: &str,
    categories: &[String],
) -> DistributionSection {
    let categories = table.filter_by_region(region).available_categories(categories);
    let entries = analysis::category_distribution(table, region, &categories);
    let totals = analysis::distribution_totals(&entries, &categories);

    DistributionSection {
        region: region.to_string(),
        entries,
        totals,
    }
}

/// Assemble the report for a view.
pub fn build_report(
    table: &Table,
    config: &Config,
    view: View,
    selection: &Selection,
    metadata: ReportMetadata,
) -> Report {
    let mut report = Report::new(metadata);
    let categories = &config.data.categories;

    let Some(ref region) = selection.region else {
        if view == View::Overview {
            report.overview = Some(build_overview(table, categories));
        } else {
            warn!("No regions found in the loaded data");
        }
        return report;
    };
    let sub_region = selection.sub_region.as_deref();

    match view {
        View::Overview => {
            report.overview = Some(build_overview(table, categories));
        }
        View::Region => {
            report.region = Some(build_region_section(table, region, sub_region, config));
            report.distribution = Some(build_distribution_section(table, region, categories));
        }
        View::Distribution => {
            report.distribution = Some(build_distribution_section(table, region, categories));
        }
        View::Danger => {
            let Some(sub_region) = sub_region else {
                warn!("Region '{}' has no sub-regions to assess", region);
                return report;
            };

            if table.filter_by_sub_region(region, sub_region).is_empty() {
                warn!("No rows for {} / {}; skipping danger assessment", region, sub_region);
            } else {
                let thresholds = DangerThresholds::from(&config.danger);
                report.danger = Some(analysis::assess_danger(
                    table,
                    region,
                    sub_region,
                    categories,
                    &thresholds,
                ));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{load_and_merge, LoadOptions};
    use crate::models::DangerLevel;
    use chrono::Utc;
    use std::path::Path;

    fn fixture_table() -> Table {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        load_and_merge(
            &[
                root.join("district_crimes_2013.csv"),
                root.join("district_crimes_2014.csv"),
            ],
            &LoadOptions::default(),
        )
        .unwrap()
    }

    fn metadata(table: &Table) -> ReportMetadata {
        ReportMetadata {
            sources: Vec::new(),
            total_rows: table.len(),
            generated_at: Utc::now(),
            duration_seconds: 0.0,
        }
    }

    #[test]
    fn test_selection_defaults_to_first_options() {
        let table = fixture_table();

        let selection = Selection::resolve(&table, None, None);
        assert_eq!(selection.region.as_deref(), Some("Kerala"));
        assert_eq!(selection.sub_region.as_deref(), Some("Kollam"));

        let goa = Selection::resolve(&table, Some("Goa"), None);
        assert_eq!(goa.sub_region.as_deref(), Some("North Goa"));

        let unknown = Selection::resolve(&table, Some("Punjab"), None);
        assert_eq!(unknown.sub_region, None);
    }

    #[test]
    fn test_list_options() {
        let table = fixture_table();

        assert_eq!(list_options(&table, None), "Regions (2):\n  Kerala\n  Goa\n");
        assert!(list_options(&table, Some("Goa")).starts_with("Sub-regions of Goa (2):\n"));
        assert_eq!(
            list_options(&table, Some("Punjab")),
            "No sub-regions of Punjab found.\n"
        );
    }

    #[test]
    fn test_region_view_over_fixtures() {
        let table = fixture_table();
        let config = Config::default();
        let selection = Selection::resolve(&table, Some("Kerala"), Some("Kollam"));

        let report = build_report(&table, &config, View::Region, &selection, metadata(&table));
        let region = report.region.unwrap();

        assert_eq!(region.records.len(), 2);
        assert!(region.columns.contains(&"Year".to_string()));
        assert_eq!(region.comparison_category.as_deref(), Some("Murder"));
        assert_eq!(
            crate::models::find_total(&region.category_totals, "Murder"),
            Some(81.0)
        );

        // Idukki, Kollam and the district literally named "Total".
        assert_eq!(region.comparison.rows.len(), 3);
        assert_eq!(region.comparison.chart_rows().count(), 3);
        assert_eq!(region.comparison.total.get("Murder"), Some(180.0));

        let distribution = report.distribution.unwrap();
        assert_eq!(distribution.entries.len(), 5 * 5);
    }

    #[test]
    fn test_danger_view_over_fixtures() {
        let table = fixture_table();
        let config = Config::default();
        let selection = Selection::resolve(&table, Some("Goa"), Some("South Goa"));

        let report = build_report(&table, &config, View::Danger, &selection, metadata(&table));
        let danger = report.danger.unwrap();

        // 16 + 30 + 9 + 13 + 27 + 0
        assert_eq!(danger.score, 95.0);
        assert_eq!(danger.level, DangerLevel::Low);
        assert!(report.region.is_none());
    }

    #[test]
    fn test_danger_view_unknown_sub_region_is_not_assessed() {
        let table = fixture_table();
        let config = Config::default();
        let selection = Selection::resolve(&table, Some("Kerala"), Some("Kolam"));

        let report = build_report(&table, &config, View::Danger, &selection, metadata(&table));

        assert!(report.danger.is_none());
        let markdown = crate::report::generate_markdown_report(&report, config.report.chart_width);
        assert!(!markdown.contains("Danger Level"));
        assert!(markdown.contains("_No data for this selection._"));
    }

    #[test]
    fn test_distribution_totals_ignore_repeated_categories() {
        let table = fixture_table();
        let categories = vec!["Murder".to_string(), "Murder".to_string()];

        let section = build_distribution_section(&table, "Goa", &categories);

        assert_eq!(section.totals.len(), 1);
        // 20 + 16 + 22 + 13
        assert_eq!(section.totals[0].total, 71.0);
        assert_eq!(section.entries.len(), 4);
    }

    #[test]
    fn test_unknown_region_yields_empty_sections() {
        let table = fixture_table();
        let config = Config::default();
        let selection = Selection::resolve(&table, Some("Punjab"), None);

        let report = build_report(&table, &config, View::Region, &selection, metadata(&table));
        let region = report.region.unwrap();

        assert!(region.records.is_empty());
        assert!(region.category_totals.is_empty());
        assert!(region.comparison.rows.is_empty());
        assert_eq!(region.comparison_category, None);
        assert!(report.distribution.unwrap().entries.is_empty());
    }

    #[test]
    fn test_overview_lists_present_categories() {
        let table = fixture_table();
        let overview = build_overview(&table, &Config::default().data.categories);

        assert_eq!(overview.regions.len(), 2);
        assert_eq!(
            overview.categories,
            vec![
                "Murder",
                "Rape",
                "Kidnapping and Abduction",
                "Arson",
                "Grievous Hurt"
            ]
        );
    }
}
