//! CrimeNav - district-wise crime statistics explorer
//!
//! A CLI tool that merges crime CSV files, filters them by state and
//! district, and renders totals, comparisons and danger levels.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing source, bad config, write failure, etc.)
//!   2 - Danger level at or above --fail-on-danger

mod analysis;
mod cli;
mod config;
mod data;
mod models;
mod report;
mod scanner;
mod views;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, FailOnLevel};
use config::{Config, ReportFormat, CONFIG_FILE};
use data::{KeyColumns, LoadOptions, Table};
use models::{DangerLevel, ReportMetadata};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use views::Selection;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so general.verbose can apply
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, &config);

    info!("CrimeNav v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .crimenav.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize sources, columns, categories, and thresholds.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the data and render the selected view. Returns exit code (0 or 2).
fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    // Step 1: Resolve and load the sources
    let sources = scanner::resolve_sources(&config.data)?;
    if !args.quiet {
        eprintln!("📥 Loading {} source file(s)...", sources.len());
    }

    let options = LoadOptions {
        keys: KeyColumns {
            region: config.data.region_column.clone(),
            sub_region: config.data.sub_region_column.clone(),
        },
        delimiter: config.data.delimiter_byte()?,
        show_progress: !args.quiet,
    };
    let table = data::load_and_merge(&sources, &options).context("Failed to load crime data")?;

    // Handle --list: print the dropdown options and exit
    if args.list {
        handle_list(&table, args.region.as_deref());
        return Ok(0);
    }

    // Step 2: Resolve the cascading selection
    let selection = Selection::resolve(&table, args.region.as_deref(), args.sub_region.as_deref());
    if let Some(ref region) = selection.region {
        if table.filter_by_region(region).is_empty() {
            warn!("Region '{}' not found in the loaded data", region);
        }
    }

    // Step 3: Build the report
    let metadata = ReportMetadata {
        sources: sources.iter().map(|p| p.display().to_string()).collect(),
        total_rows: table.len(),
        generated_at: Utc::now(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = views::build_report(&table, &config, args.view, &selection, metadata);

    let output = match config.general.format {
        ReportFormat::Json => report::generate_json_report(&report)?,
        ReportFormat::Markdown => {
            report::generate_markdown_report(&report, config.report.chart_width)
        }
    };

    // Step 4: Write the report
    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                eprintln!("✅ Report saved to: {}", path.display());
            }
        }
        None => print!("{}", output),
    }

    // Check --fail-on-danger threshold
    if let (Some(fail_level), Some(danger)) = (args.fail_on_danger, &report.danger) {
        if danger.level >= fail_on_to_level(fail_level) {
            eprintln!(
                "\n⛔ Danger level {} in {} is at or above {:?}. Failing (exit code 2).",
                danger.level, danger.sub_region, fail_level
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Handle --list: print regions, or the sub-regions of one region.
fn handle_list(table: &Table, region: Option<&str>) {
    print!("{}", views::list_options(table, region));
}

/// Convert FailOnLevel to DangerLevel for comparison.
fn fail_on_to_level(level: FailOnLevel) -> DangerLevel {
    match level {
        FailOnLevel::Low => DangerLevel::Low,
        FailOnLevel::Medium => DangerLevel::Medium,
        FailOnLevel::High => DangerLevel::High,
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
