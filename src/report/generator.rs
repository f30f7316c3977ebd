//! Markdown and JSON report generation.
//!
//! This module renders the views of a [`Report`] as Markdown, with text bar
//! charts standing in for graphical ones, or serializes it as JSON.

use crate::models::{
    CategoryTotal, DangerAssessment, DatasetOverview, DistributionSection, RegionSection, Report,
    ReportMetadata,
};
use anyhow::Result;

const NO_DATA: &str = "_No data for this selection._\n\n";

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, chart_width: usize) -> String {
    let mut output = String::new();

    output.push_str("# CrimeNav Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    if report.overview.is_none()
        && report.region.is_none()
        && report.distribution.is_none()
        && report.danger.is_none()
    {
        output.push_str(NO_DATA);
    }

    if let Some(ref overview) = report.overview {
        output.push_str(&generate_overview_section(overview));
    }

    if let Some(ref region) = report.region {
        output.push_str(&generate_region_section(region, chart_width));
    }

    if let Some(ref distribution) = report.distribution {
        output.push_str(&generate_distribution_section(distribution, chart_width));
    }

    if let Some(ref danger) = report.danger {
        output.push_str(&generate_danger_section(danger));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Rows Loaded:** {}\n", metadata.total_rows));
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push_str("- **Sources:**\n");
    for source in &metadata.sources {
        section.push_str(&format!("  - `{}`\n", source));
    }
    section.push('\n');

    section
}

/// Generate the dataset overview section.
fn generate_overview_section(overview: &DatasetOverview) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");

    if overview.regions.is_empty() {
        section.push_str(NO_DATA);
        return section;
    }

    section.push_str("| Region | Sub-regions | Rows |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for region in &overview.regions {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            region.name, region.sub_regions, region.rows
        ));
    }
    section.push('\n');

    if overview.categories.is_empty() {
        section.push_str("None of the configured crime categories are present.\n\n");
    } else {
        section.push_str(&format!(
            "**Categories:** {}\n\n",
            overview.categories.join(", ")
        ));
    }

    section
}

/// Generate the region section: rows, totals and the sub-region comparison.
fn generate_region_section(region: &RegionSection, chart_width: usize) -> String {
    let mut section = String::new();

    let place = match region.sub_region {
        Some(ref sub_region) => format!("{} in {}", sub_region, region.region),
        None => region.region.clone(),
    };

    if !region.records.is_empty() {
        section.push_str(&format!("## Crime Data for {}\n\n", place));
        section.push_str(&generate_records_table(region));
    }

    section.push_str(&format!("## Crime Statistics in {}\n\n", place));
    if region.category_totals.is_empty() {
        section.push_str(NO_DATA);
    } else {
        section.push_str(&generate_bar_chart(
            &bars(&region.category_totals),
            chart_width,
        ));
    }

    section.push_str(&format!("## Crime Comparison in {}\n\n", region.region));
    let comparison = &region.comparison;
    if comparison.rows.is_empty() || comparison.categories.is_empty() {
        section.push_str(NO_DATA);
        return section;
    }

    section.push_str("| Sub-region |");
    for category in &comparison.categories {
        section.push_str(&format!(" {} |", category));
    }
    section.push_str("\n|:---|");
    section.push_str(&":---:|".repeat(comparison.categories.len()));
    section.push('\n');

    for row in comparison.table_rows() {
        let label = if row.is_total() {
            format!("**{}**", row.label)
        } else {
            row.label.to_string()
        };
        section.push_str(&format!("| {} |", label));
        for category in &comparison.categories {
            let value = row.get(category).map(format_count).unwrap_or_default();
            section.push_str(&format!(" {} |", value));
        }
        section.push('\n');
    }
    section.push('\n');

    if let Some(ref category) = region.comparison_category {
        section.push_str(&format!(
            "### Comparison of {} across Sub-regions in {}\n\n",
            category, region.region
        ));
        let chart: Vec<(String, f64)> = comparison
            .chart_rows()
            .filter_map(|row| row.get(category).map(|n| (row.label.to_string(), n)))
            .collect();
        section.push_str(&generate_bar_chart(&chart, chart_width));
    }

    section
}

/// Rows of the selected sub-region, identifier columns first.
fn generate_records_table(region: &RegionSection) -> String {
    let mut table = String::new();
    let (ref region_column, ref sub_region_column) = region.key_columns;

    table.push_str(&format!("| {} | {} |", region_column, sub_region_column));
    for column in &region.columns {
        table.push_str(&format!(" {} |", column));
    }
    table.push_str("\n|:---|:---|");
    table.push_str(&":---:|".repeat(region.columns.len()));
    table.push('\n');

    for record in &region.records {
        table.push_str(&format!("| {} | {} |", record.region, record.sub_region));
        for column in &region.columns {
            let value = record
                .cells
                .get(column)
                .map(|c| c.to_string())
                .unwrap_or_default();
            table.push_str(&format!(" {} |", value));
        }
        table.push('\n');
    }
    table.push('\n');

    table
}

/// Generate the category distribution section.
fn generate_distribution_section(distribution: &DistributionSection, chart_width: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## Crime Type Distribution in {}\n\n",
        distribution.region
    ));

    if distribution.totals.is_empty() {
        section.push_str(NO_DATA);
        return section;
    }

    section.push_str(&generate_bar_chart(&bars(&distribution.totals), chart_width));

    section.push_str("<details>\n<summary>View Entries</summary>\n\n");
    section.push_str("| Sub-region | Crime Type | Count |\n");
    section.push_str("|:---|:---|:---:|\n");
    for entry in &distribution.entries {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            entry.sub_region,
            entry.category,
            entry.count.map(format_count).unwrap_or_default()
        ));
    }
    section.push_str("\n</details>\n\n");

    section
}

/// Generate the danger assessment section.
fn generate_danger_section(danger: &DangerAssessment) -> String {
    let mut section = String::new();

    section.push_str("## Danger Level Assessment\n\n");
    section.push_str(&format!(
        "{} **Danger Level: {}** ({} crimes reported in {}, {})\n\n",
        danger.level.emoji(),
        danger.level,
        format_count(danger.score),
        danger.sub_region,
        danger.region
    ));

    section
}

/// Render labelled values as a horizontal text bar chart in a code block.
///
/// The largest value spans `width` cells; bars keep the input order.
pub fn generate_bar_chart(bars: &[(String, f64)], width: usize) -> String {
    if bars.is_empty() {
        return NO_DATA.to_string();
    }

    let label_width = bars
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let max = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

    let mut chart = String::from("```text\n");
    for (label, value) in bars {
        let len = if max > 0.0 && *value > 0.0 {
            ((value / max) * width as f64).round().max(1.0) as usize
        } else {
            0
        };
        chart.push_str(&format!(
            "{:<lw$} | {} {}\n",
            label,
            "█".repeat(len),
            format_count(*value),
            lw = label_width
        ));
    }
    chart.push_str("```\n\n");

    chart
}

fn bars(totals: &[CategoryTotal]) -> Vec<(String, f64)> {
    totals
        .iter()
        .map(|t| (t.category.clone(), t.total))
        .collect()
}

/// Format a count without a trailing `.0` for whole numbers.
pub fn format_count(n: f64) -> String {
    // -0.0 == 0.0, so this also drops the sign of a negative zero.
    let n = if n == 0.0 { 0.0 } else { n };
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    }
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by CrimeNav*\n".to_string()
}
