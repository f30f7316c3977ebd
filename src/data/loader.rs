//! Loading and merging delimited source files.
//!
//! Every source is read with a header row; rows are concatenated in file
//! order and the column set of the result is the union of all headers.

use super::table::{KeyColumns, Table};
use crate::models::{Cell, Record};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure to build the merged table. The whole load fails on any of these.
#[derive(Error, Debug)]
pub enum IngestError {
    /// No source files were configured
    #[error("No source files configured")]
    NoSources,

    /// A source path does not exist or is not a file
    #[error("Source file not found: {}", path.display())]
    Missing { path: PathBuf },

    /// A source could not be opened or its header could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A data row is not valid delimited text
    #[error("Malformed row in {} at line {line}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// The header lacks one of the identifier columns
    #[error("{} has no '{column}' column", path.display())]
    MissingKeyColumn { path: PathBuf, column: String },
}

/// Options for loading sources.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Identifier column names.
    pub keys: KeyColumns,
    /// Field delimiter.
    pub delimiter: u8,
    /// Whether to show a progress bar.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            keys: KeyColumns::default(),
            delimiter: b',',
            show_progress: false,
        }
    }
}

/// Rows and header of a single source file.
struct SourceRows {
    headers: Vec<String>,
    records: Vec<Record>,
}

/// Read every source and concatenate their rows into one table.
pub fn load_and_merge<P: AsRef<Path>>(
    sources: &[P],
    options: &LoadOptions,
) -> Result<Table, IngestError> {
    if sources.is_empty() {
        return Err(IngestError::NoSources);
    }

    let progress_bar = if options.show_progress && sources.len() > 1 {
        let pb = ProgressBar::new(sources.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut columns: Vec<String> = Vec::new();
    let mut seen_columns: HashSet<String> = HashSet::new();
    let mut records: Vec<Record> = Vec::new();

    for (index, source) in sources.iter().enumerate() {
        let path = source.as_ref();

        if let Some(ref pb) = progress_bar {
            pb.set_message(path.display().to_string());
        }

        let rows = read_source(path, index, options)?;
        info!("Loaded {} rows from {}", rows.records.len(), path.display());

        for header in rows.headers {
            if seen_columns.insert(header.clone()) {
                columns.push(header);
            }
        }
        records.extend(rows.records);

        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Sources loaded");
    }

    let table = Table::new(options.keys.clone(), columns, records);
    info!(
        "Merged {} sources into {} rows, {} columns",
        sources.len(),
        table.len(),
        table.columns().len()
    );

    Ok(table)
}

/// Read one source file into records tagged with `index`.
fn read_source(
    path: &Path,
    index: usize,
    options: &LoadOptions,
) -> Result<SourceRows, IngestError> {
    if !path.is_file() {
        return Err(IngestError::Missing {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| IngestError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| IngestError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let region_idx = key_index(&headers, &options.keys.region, path)?;
    let sub_region_idx = key_index(&headers, &options.keys.sub_region, path)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let row = result.map_err(|source| IngestError::Malformed {
            path: path.to_path_buf(),
            line: source.position().map(|p| p.line()).unwrap_or(0),
            source,
        })?;

        let region = row.get(region_idx).unwrap_or("").to_string();
        let sub_region = row.get(sub_region_idx).unwrap_or("").to_string();
        if region.is_empty() || sub_region.is_empty() {
            skipped += 1;
            continue;
        }

        let mut cells = BTreeMap::new();
        for (idx, field) in row.iter().enumerate() {
            if idx == region_idx || idx == sub_region_idx {
                continue;
            }
            let Some(name) = headers.get(idx) else {
                continue;
            };
            if let Some(cell) = Cell::parse(field) {
                cells.insert(name.clone(), cell);
            }
        }

        records.push(Record {
            region,
            sub_region,
            source: index,
            cells,
        });
    }

    if skipped > 0 {
        warn!(
            "Skipped {} rows without a region or sub-region in {}",
            skipped,
            path.display()
        );
    }

    let headers = headers
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| *idx != region_idx && *idx != sub_region_idx)
        .map(|(_, h)| h)
        .collect();

    debug!("Read {} rows from {}", records.len(), path.display());

    Ok(SourceRows { headers, records })
}

fn key_index(headers: &[String], column: &str, path: &Path) -> Result<usize, IngestError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| IngestError::MissingKeyColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}
