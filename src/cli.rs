//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// CrimeNav - explore district-wise crime statistics
///
/// Loads one or more crime CSV files, narrows them down to a state and a
/// district, and renders totals, comparisons and danger levels as a
/// Markdown or JSON report.
///
/// Examples:
///   crimenav --list
///   crimenav --region Kerala --list
///   crimenav --region Kerala --sub-region Kollam
///   crimenav --region Goa --view distribution --format json
///   crimenav --data-dir ./data --view overview
///   crimenav --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Region (state) to report on
    ///
    /// Defaults to the first region found in the data.
    #[arg(short, long, value_name = "NAME")]
    pub region: Option<String>,

    /// Sub-region (district) within the region
    ///
    /// Defaults to the first sub-region of the selected region.
    #[arg(short, long, value_name = "NAME", requires = "region")]
    pub sub_region: Option<String>,

    /// Which view to render
    #[arg(long, default_value = "region", value_name = "VIEW")]
    pub view: View,

    /// Source CSV files, in load order (comma-separated or repeated)
    ///
    /// Overrides the sources listed in the config file.
    #[arg(long = "source", value_name = "FILES", value_delimiter = ',')]
    pub sources: Option<Vec<String>>,

    /// Directory scanned recursively for .csv sources
    #[arg(long, value_name = "DIR", env = "CRIMENAV_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Crime categories to include (comma-separated)
    ///
    /// Example: --categories Murder,Arson
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub categories: Option<Vec<String>>,

    /// Output format (markdown, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .crimenav.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// List regions, or the sub-regions of --region, and exit
    #[arg(long)]
    pub list: bool,

    /// Exit with code 2 if the danger level is at or above this level
    ///
    /// Values: low, medium, high
    #[arg(long, value_name = "LEVEL")]
    pub fail_on_danger: Option<FailOnLevel>,

    /// Generate a default .crimenav.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Report view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    /// Dataset overview: sources, regions and categories
    Overview,
    /// Crime data for a region and sub-region (default)
    #[default]
    Region,
    /// Danger level of a sub-region
    Danger,
    /// Crime type distribution across a region
    Distribution,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Danger level for --fail-on-danger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum FailOnLevel {
    Low,
    Medium,
    High,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref region) = self.region {
            if region.trim().is_empty() {
                return Err("Region must not be empty".to_string());
            }
        }

        if let Some(ref sources) = self.sources {
            if sources.iter().any(|s| s.trim().is_empty()) {
                return Err("Source paths must not be empty".to_string());
            }
        }

        if let Some(ref categories) = self.categories {
            if categories.is_empty() || categories.iter().any(|c| c.trim().is_empty()) {
                return Err("Categories must not be empty".to_string());
            }
        }

        if let Some(ref dir) = self.data_dir {
            if !dir.exists() {
                return Err(format!("Data directory does not exist: {}", dir.display()));
            }
            if !dir.is_dir() {
                return Err(format!("Data path is not a directory: {}", dir.display()));
            }
        }

        if self.fail_on_danger.is_some() && self.view != View::Danger {
            return Err("--fail-on-danger requires --view danger".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            region: None,
            sub_region: None,
            view: View::Region,
            sources: None,
            data_dir: None,
            categories: None,
            format: None,
            output: None,
            config: None,
            verbose: false,
            quiet: false,
            list: false,
            fail_on_danger: None,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "crimenav",
            "--region",
            "Kerala",
            "--sub-region",
            "Kollam",
            "--source",
            "a.csv,b.csv",
            "--categories",
            "Murder,Arson",
            "--view",
            "danger",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.region.as_deref(), Some("Kerala"));
        assert_eq!(args.sub_region.as_deref(), Some("Kollam"));
        assert_eq!(
            args.sources,
            Some(vec!["a.csv".to_string(), "b.csv".to_string()])
        );
        assert_eq!(args.view, View::Danger);
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_sub_region_requires_region() {
        let result = Args::try_parse_from(["crimenav", "--sub-region", "Kollam"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_data_dir() {
        let mut args = make_args();
        args.data_dir = Some(PathBuf::from("/definitely/not/here"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_fail_on_needs_danger_view() {
        let mut args = make_args();
        args.fail_on_danger = Some(FailOnLevel::High);
        assert!(args.validate().is_err());

        args.view = View::Danger;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
