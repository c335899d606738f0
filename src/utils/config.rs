//! Application configuration constants.
//! Defaults, tuning and output naming in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    index_filename: String,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                index_filename: format!("{pkg}-index.db"),
                config_filename: format!("{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// File name of the SQLite index written into the output directory.
    pub fn index_filename(&self) -> &str {
        &self.index_filename
    }

    /// Config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Run defaults ----

/// Defaults for [`Opts`](crate::Opts) fields that the CLI and config file may leave unset.
pub struct RunDefaults;

impl RunDefaults {
    pub const WORKERS: usize = 10;
    pub const MIN_TOKEN_LENGTH: usize = 5;
    /// Ceiling on the drain wait at shutdown.
    pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60 * 60);
    pub const EXTENSION: &'static str = "pdf";
    pub const AUDIO_EXTENSION: &'static str = "mp3";
}

// ---- Analyzer ----

/// Tokens longer than this are dropped by the length filter.
pub const MAX_TOKEN_LENGTH: usize = 255;

// ---- Work manager ----

/// Capacity of the work queue between the crawler and the pool. A full queue blocks `submit`.
pub const WORK_QUEUE_CAP: usize = 1_024;

/// How often the drain loop wakes up to check for Ctrl+C while waiting on workers.
pub const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(200);

// ---- Output ----

/// Prefix of the JSON index file name: `lunr-<timestamp>.json[.gz]`.
pub const JSON_FILE_PREFIX: &str = "lunr";

/// `chrono` format for the run timestamp in the JSON index file name.
pub const JSON_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Numbered names tried (`lunr-<timestamp>-N.json`) when runs share a timestamp.
pub const JSON_NAME_ATTEMPTS: usize = 100;

/// Rows per SQLite transaction before committing (balance transaction size vs round-trips).
pub const DB_INSERT_BATCH_SIZE: usize = 500;
