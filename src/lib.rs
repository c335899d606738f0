//! docdex: concurrent document indexer.
//!
//! A [`Crawler`](pipeline::Crawler) walks input directories and submits each accepted file to
//! a fixed-size [`WorkManager`](pipeline::WorkManager). Workers extract text, tokenize it, and
//! hand one [`IndexEntry`] per file to a single
//! [`SynchronizedOutputWriter`](output::SynchronizedOutputWriter), which streams either a JSON
//! array or a SQLite database.
//!
//! ```ignore
//! let opts = docdex::Opts {
//!     input_dirs: vec!["manuscripts".into()],
//!     output_dir: "out".into(),
//!     recurse: true,
//!     ..Default::default()
//! };
//! let summary = docdex::run_index(&opts)?;
//! println!("{} files, index at {}", summary.files_seen, summary.output.display());
//! ```

pub mod engine;
pub mod error;
pub mod extract;
pub mod index;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::RunError;
pub use index::{run_index, run_index_with_cancel};
pub use record::{IndexEntry, WorkItem};
pub use types::*;

/// Result alias used by public docdex API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
