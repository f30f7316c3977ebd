//! Source discovery for data directories.
//!
//! Expands configured directories into an ordered list of `.csv` files,
//! skipping hidden entries and configured exclude names.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Configuration for source discovery.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions treated as sources (without dot)
    pub extensions: Vec<String>,
    /// Directory or file names to skip
    pub excludes: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["csv".to_string()],
            excludes: vec![".git".to_string(), "target".to_string()],
        }
    }
}

impl From<&crate::config::DataConfig> for ScanConfig {
    fn from(config: &crate::config::DataConfig) -> Self {
        Self {
            excludes: config.excludes.clone(),
            ..Self::default()
        }
    }
}

/// Finds source files below a directory.
pub struct SourceScanner {
    config: ScanConfig,
}

impl SourceScanner {
    /// Create a new source scanner.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan a directory recursively. Results are sorted by path.
    pub fn scan(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_excluded(e));

        for entry in walker {
            let entry =
                entry.with_context(|| format!("Failed to scan directory: {}", root.display()))?;

            if entry.file_type().is_file() && self.matches(entry.path()) {
                debug!("Discovered source: {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Check if a file has a source extension.
    pub fn matches(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        self.config.extensions.iter().any(|e| *e == ext)
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();

        // Hidden files
        if name.starts_with('.') {
            return true;
        }

        self.config.excludes.iter().any(|pattern| name == pattern.as_str())
    }
}

/// Configured sources followed by sources discovered in `directories`.
pub fn resolve_sources(data: &crate::config::DataConfig) -> Result<Vec<PathBuf>> {
    let mut sources: Vec<PathBuf> = data.sources.iter().map(PathBuf::from).collect();

    let scanner = SourceScanner::new(ScanConfig::from(data));
    for dir in &data.directories {
        for path in scanner.scan(Path::new(dir))? {
            if !sources.contains(&path) {
                sources.push(path);
            }
        }
    }

    Ok(sources)
}
