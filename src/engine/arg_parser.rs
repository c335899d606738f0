use clap::Parser;
use std::path::PathBuf;

use crate::IndexType;

/// Concurrent document indexer: extracts keywords from documents into a searchable index.
#[derive(Clone, Debug, Parser)]
#[command(name = "docdex")]
#[command(about = "Crawl directories of documents and write a keyword index (JSON or SQLite).")]
pub struct Cli {
    /// Directory to crawl. Repeat for several roots. Required here or in the config file.
    #[arg(long, short = 'i', value_name = "DIR")]
    pub input_dir: Vec<PathBuf>,

    /// Existing directory the index is written into. Default: current directory.
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// File of extra stop words, one per line (added to the built-in English set).
    #[arg(long, short = 's', value_name = "FILE")]
    pub stopwords: Option<PathBuf>,

    /// Descend into subdirectories.
    #[arg(long, short = 'r', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub recurse: Option<bool>,

    /// Number of worker threads. Default: 10.
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Shortest token kept in the keywords. Default: 5.
    #[arg(long, short = 'l', value_parser = clap::value_parser!(usize))]
    pub min_token_length: Option<usize>,

    /// gzip the JSON index.
    #[arg(long, short = 'c', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub compress: Option<bool>,

    /// Pretty-print the JSON index.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub pretty: Option<bool>,

    /// Output backend. Default: json.
    #[arg(long, short = 'x', value_enum)]
    pub index_type: Option<IndexType>,

    /// Manuscript metadata file (JSON). Records then carry metadata fields and raw text.
    #[arg(long, short = 'm', value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Accepted file extension, without the dot. Repeatable. Default: pdf.
    #[arg(long, short = 'e', value_name = "EXT")]
    pub extension: Vec<String>,

    /// Exclude patterns (glob syntax). Can specify multiple: --exclude pattern1 pattern2
    #[arg(long, num_args = 1..)]
    pub exclude: Vec<String>,

    /// Follow symbolic links.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Longest wait for in-flight files at shutdown, in seconds. Default: 3600.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Show a counter of completed files.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Config file. Default: `docdex.toml` in the working directory, if present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
