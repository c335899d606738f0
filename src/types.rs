//! Public types for the docdex API: run options, output kind, run summary.

use anyhow::{Result, bail};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::config::{MAX_TOKEN_LENGTH, RunDefaults};

/// Which output backend a run writes to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    /// Array of JSON records in `lunr-<timestamp>.json[.gz]`.
    #[default]
    Json,
    /// SQLite database with a full-text table.
    Sqlite,
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexType::Json => write!(f, "json"),
            IndexType::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for IndexType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "lunr" => Ok(IndexType::Json),
            "sqlite" | "db" => Ok(IndexType::Sqlite),
            other => bail!("unknown index type '{other}' (expected json or sqlite)"),
        }
    }
}

/// Options for one indexing run. Built by the CLI (config file + flags) or directly by library callers.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Directories to crawl. Must be non-empty; each must exist.
    pub input_dirs: Vec<PathBuf>,
    /// Existing directory the index is written into.
    pub output_dir: PathBuf,
    /// Extra stop words, one per line, added to the built-in English set.
    pub stopwords: Option<PathBuf>,
    /// Descend into subdirectories.
    pub recurse: bool,
    /// Worker threads in the pool (>= 1).
    pub workers: usize,
    /// Shortest token kept by the analyzer (>= 1).
    pub min_token_length: usize,
    /// gzip the JSON index.
    pub compress: bool,
    /// Pretty-print the JSON index.
    pub pretty: bool,
    pub index_type: IndexType,
    /// External per-manuscript metadata file. When set, records carry metadata fields and raw text.
    pub metadata: Option<PathBuf>,
    /// File extensions accepted by the crawler (case-insensitive, without the dot).
    pub extensions: Vec<String>,
    /// Exclude patterns (glob syntax, matched on names and full paths).
    pub exclude: Vec<String>,
    /// Follow symbolic links while crawling.
    pub follow_links: bool,
    /// Ceiling on the wait for in-flight work at shutdown.
    pub shutdown_timeout: Duration,
    /// Show a progress counter of completed files.
    pub progress: bool,
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            input_dirs: Vec::new(),
            output_dir: PathBuf::from("."),
            stopwords: None,
            recurse: false,
            workers: RunDefaults::WORKERS,
            min_token_length: RunDefaults::MIN_TOKEN_LENGTH,
            compress: false,
            pretty: false,
            index_type: IndexType::default(),
            metadata: None,
            extensions: vec![RunDefaults::EXTENSION.to_string()],
            exclude: Vec::new(),
            follow_links: false,
            shutdown_timeout: RunDefaults::SHUTDOWN_TIMEOUT,
            progress: false,
            verbose: false,
        }
    }
}

impl Opts {
    /// Reject configuration errors before any crawl starts.
    pub fn validate(&self) -> Result<()> {
        if self.input_dirs.is_empty() {
            bail!("no input directories provided");
        }
        for dir in &self.input_dirs {
            if !dir.is_dir() {
                bail!(
                    "input directory does not exist or isn't a directory: {}",
                    dir.display()
                );
            }
        }
        if !self.output_dir.is_dir() {
            bail!(
                "output directory does not exist or isn't a directory: {}",
                self.output_dir.display()
            );
        }
        if let Some(p) = &self.stopwords
            && !p.is_file()
        {
            bail!("stop words path doesn't exist or isn't a file: {}", p.display());
        }
        if let Some(p) = &self.metadata
            && !p.is_file()
        {
            bail!("metadata path doesn't exist or isn't a file: {}", p.display());
        }
        if self.workers < 1 {
            bail!("workers must be >= 1");
        }
        if !(1..=MAX_TOKEN_LENGTH).contains(&self.min_token_length) {
            bail!("min token length must be between 1 and {MAX_TOKEN_LENGTH}");
        }
        if self.extensions.iter().all(|e| e.trim_start_matches('.').is_empty()) {
            bail!("no file extensions to index");
        }
        Ok(())
    }
}

/// Counts and location reported when a run finishes (successfully or not).
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    /// Work items submitted to the pool.
    pub files_seen: u64,
    /// Failed work items plus crawl failures.
    pub failures: u64,
    /// Records accepted by the output writer.
    pub written: u64,
    /// Items that produced no record (no text, no metadata entry).
    pub skipped: u64,
    /// Index file written by this run.
    pub output: PathBuf,
    pub elapsed: Duration,
}
