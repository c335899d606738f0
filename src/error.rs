//! Terminal run errors surfaced by the work manager at shutdown.

use std::time::Duration;
use thiserror::Error;

/// Aggregate outcomes that end a run with a non-zero exit status.
///
/// Per-item causes are logged where they happen; these carry only what the caller needs to
/// decide how to report the run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{failures} indexing task(s) failed; check logs for details")]
    TasksFailed { failures: u64 },

    #[error("interrupted while waiting for workers to finish")]
    Interrupted,

    #[error("workers still running after {waited:?}; output was closed without them")]
    DrainTimeout { waited: Duration },

    #[error("work manager is no longer accepting work")]
    ManagerClosed,
}
