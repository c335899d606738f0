//! Load `docdex.toml` (CLI only). Library callers build [`Opts`] themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{IndexType, Opts};

#[derive(Debug, Default, Deserialize)]
pub struct DocdexToml {
    #[serde(default)]
    settings: IndexSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexSection {
    input_dirs: Option<Vec<PathBuf>>,
    output_dir: Option<PathBuf>,
    stopwords: Option<PathBuf>,
    recurse: Option<bool>,
    workers: Option<usize>,
    min_token_length: Option<usize>,
    compress: Option<bool>,
    pretty: Option<bool>,
    index_type: Option<IndexType>,
    metadata: Option<PathBuf>,
    extensions: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    follow_links: Option<bool>,
    timeout: Option<u64>,
    progress: Option<bool>,
    verbose: Option<bool>,
}

impl DocdexToml {
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).context("parse config")
    }
}

/// Load the config file: `path` if given (must exist), else `default_name` in the working
/// directory if present. A file that exists but does not parse is an error either way.
pub fn load_docdex_toml(path: Option<&Path>, default_name: &str) -> Result<Option<DocdexToml>> {
    let path = match path {
        Some(p) => p,
        None if Path::new(default_name).is_file() => Path::new(default_name),
        None => return Ok(None),
    };
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    DocdexToml::from_toml(&s)
        .with_context(|| path.display().to_string())
        .map(Some)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(v) = $idx.$idx_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only set fields present in the file). Call before applying CLI.
pub fn apply_file_to_opts(file: &DocdexToml, opts: &mut Opts) {
    let idx = &file.settings;
    apply_file_opt!(idx, opts, input_dirs => input_dirs);
    apply_file_opt!(idx, opts, output_dir => output_dir);
    if idx.stopwords.is_some() {
        opts.stopwords = idx.stopwords.clone();
    }
    apply_file_opt!(idx, opts, recurse => recurse);
    apply_file_opt!(idx, opts, workers => workers);
    apply_file_opt!(idx, opts, min_token_length => min_token_length);
    apply_file_opt!(idx, opts, compress => compress);
    apply_file_opt!(idx, opts, pretty => pretty);
    apply_file_opt!(idx, opts, index_type => index_type);
    if idx.metadata.is_some() {
        opts.metadata = idx.metadata.clone();
    }
    apply_file_opt!(idx, opts, extensions => extensions);
    apply_file_opt!(idx, opts, exclude => exclude);
    apply_file_opt!(idx, opts, follow_links => follow_links);
    if let Some(secs) = idx.timeout {
        opts.shutdown_timeout = Duration::from_secs(secs);
    }
    apply_file_opt!(idx, opts, progress => progress);
    apply_file_opt!(idx, opts, verbose => verbose);
}
