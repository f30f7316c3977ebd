//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.crimenav.toml` files.

use crate::cli::{Args, OutputFormat};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".crimenav.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Danger level thresholds.
    #[serde(default)]
    pub danger: DangerConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Report format.
    #[serde(default)]
    pub format: ReportFormat,
}

/// Report format as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Markdown => ReportFormat::Markdown,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Source files, loaded in this order.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// Directories scanned for additional `.csv` sources.
    #[serde(default)]
    pub directories: Vec<String>,

    /// Names skipped while scanning directories.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    /// Region (state) column name.
    #[serde(default = "default_region_column")]
    pub region_column: String,

    /// Sub-region (district) column name.
    #[serde(default = "default_sub_region_column")]
    pub sub_region_column: String,

    /// Field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Crime categories to chart, in display order.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            directories: Vec::new(),
            excludes: default_excludes(),
            region_column: default_region_column(),
            sub_region_column: default_sub_region_column(),
            delimiter: default_delimiter(),
            categories: default_categories(),
        }
    }
}

fn default_sources() -> Vec<String> {
    vec![
        "data/01_District_wise_crimes_committed_IPC_2013.csv",
        "data/02_01_District_wise_crimes_committed_against_SC_2001_2012.csv",
        "data/01_District_wise_crimes_committed_IPC_2014.csv",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_excludes() -> Vec<String> {
    vec![".git", "target", "archive"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_region_column() -> String {
    "States/UTs".to_string()
}

fn default_sub_region_column() -> String {
    "District".to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_categories() -> Vec<String> {
    vec![
        "Murder",
        "Rape",
        "Kidnapping and Abduction",
        "Arson",
        "Grievous Hurt",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Danger level thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DangerConfig {
    /// Scores above this are Medium.
    #[serde(default = "default_medium_above")]
    pub medium_above: f64,

    /// Scores above this are High.
    #[serde(default = "default_high_above")]
    pub high_above: f64,
}

impl Default for DangerConfig {
    fn default() -> Self {
        Self {
            medium_above: default_medium_above(),
            high_above: default_high_above(),
        }
    }
}

fn default_medium_above() -> f64 {
    100.0
}

fn default_high_above() -> f64 {
    500.0
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Category charted across sub-regions.
    #[serde(default = "default_comparison_category")]
    pub comparison_category: String,

    /// Width of the longest bar in text charts.
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,

    /// Include the raw rows of the selected sub-region.
    #[serde(default = "default_true")]
    pub include_records: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            comparison_category: default_comparison_category(),
            chart_width: default_chart_width(),
            include_records: true,
        }
    }
}

fn default_comparison_category() -> String {
    "Murder".to_string()
}

fn default_chart_width() -> usize {
    40
}

fn default_true() -> bool {
    true
}

impl DataConfig {
    /// The delimiter as a single byte.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if !self.delimiter.is_ascii() {
            bail!("Delimiter must be an ASCII character, got '{}'", self.delimiter);
        }
        Ok(self.delimiter as u8)
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments only override config values they explicitly provide.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref sources) = args.sources {
            self.data.sources = sources.clone();
        }
        if let Some(ref dir) = args.data_dir {
            self.data.directories = vec![dir.to_string_lossy().to_string()];
            // An explicit directory replaces the default file list.
            if args.sources.is_none() {
                self.data.sources.clear();
            }
        }
        if let Some(ref categories) = args.categories {
            self.data.categories = categories.clone();
        }
        if let Some(format) = args.format {
            self.general.format = format.into();
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.region_column, "States/UTs");
        assert_eq!(config.data.sub_region_column, "District");
        assert_eq!(config.data.sources.len(), 3);
        assert!(config.data.categories.contains(&"Murder".to_string()));
        assert_eq!(config.danger.medium_above, 100.0);
        assert_eq!(config.general.format, ReportFormat::Markdown);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true
format = "json"

[data]
sources = ["a.csv", "b.csv"]
region_column = "region"
sub_region_column = "sub-region"
delimiter = ";"
categories = ["Murder", "Arson"]

[danger]
high_above = 1000.0
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.general.format, ReportFormat::Json);
        assert_eq!(config.data.sources, vec!["a.csv", "b.csv"]);
        assert_eq!(config.data.region_column, "region");
        assert_eq!(config.data.delimiter_byte().unwrap(), b';');
        assert_eq!(config.data.categories, vec!["Murder", "Arson"]);
        assert_eq!(config.danger.medium_above, 100.0);
        assert_eq!(config.danger.high_above, 1000.0);
        assert_eq!(config.report.chart_width, 40);
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let mut config = Config::default();
        config.data.delimiter = '§';
        assert!(config.data.delimiter_byte().is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let mut args = make_args();
        args.sources = Some(vec!["x.csv".to_string()]);
        args.categories = Some(vec!["Arson".to_string()]);
        args.format = Some(OutputFormat::Json);

        config.merge_with_args(&args);

        assert_eq!(config.data.sources, vec!["x.csv"]);
        assert_eq!(config.data.categories, vec!["Arson"]);
        assert_eq!(config.general.format, ReportFormat::Json);
    }

    #[test]
    fn test_merge_data_dir_replaces_default_sources() {
        let mut config = Config::default();
        let mut args = make_args();
        args.data_dir = Some(PathBuf::from("fixtures"));

        config.merge_with_args(&args);

        assert!(config.data.sources.is_empty());
        assert_eq!(config.data.directories, vec!["fixtures"]);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[danger]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data.categories, Config::default().data.categories);
    }
}
