//! Output backends and the single synchronized writer shared by all workers.

pub mod json;
pub mod sqlite;

pub use json::JsonStreamSink;
pub use sqlite::SqliteIndexSink;

use anyhow::{Result, anyhow};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::IndexEntry;

/// One output artifact. Calls are never concurrent: [`SynchronizedOutputWriter`] serializes them.
pub trait OutputSink: Send {
    /// Append one record. On error, the artifact must still be well-formed up to the previous record.
    fn write_entry(&mut self, entry: &IndexEntry) -> Result<()>;

    /// Flush and seal the artifact.
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Serializes concurrent writes from workers into one sink.
///
/// Every `write` holds the lock for the whole sink call, so framing (JSON array separators,
/// SQLite transactions) never interleaves. `close` takes the sink out; later writes fail.
pub struct SynchronizedOutputWriter {
    sink: Mutex<Option<Box<dyn OutputSink>>>,
    location: PathBuf,
}

impl SynchronizedOutputWriter {
    pub fn new(sink: Box<dyn OutputSink>, location: PathBuf) -> Self {
        info!("Initialized output writer on {}", location.display());
        Self {
            sink: Mutex::new(Some(sink)),
            location,
        }
    }

    /// Write one record. A failing write is logged here and returned so the caller can count it;
    /// the lock is released either way.
    pub fn write(&self, entry: &IndexEntry) -> Result<()> {
        let mut guard = self.lock_sink();
        let Some(sink) = guard.as_mut() else {
            error!("Dropping index entry for {}: output writer is closed", entry);
            return Err(anyhow!("output writer is closed"));
        };
        debug!("Attempting to write index entry for \"{}\"", entry);
        sink.write_entry(entry).inspect_err(|e| {
            error!("Failed writing index entry for {}: {:#}", entry, e);
        })
    }

    /// Seal the artifact. Only the first call does anything, and it runs even if a worker
    /// panicked while holding the lock.
    pub fn close(&self) -> Result<()> {
        let sink = self.lock_sink().take();
        match sink {
            Some(sink) => {
                sink.finish()?;
                info!("Closed output writer on {}", self.location.display());
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock_sink().is_none()
    }

    /// Sinks write each record whole or not at all, so a panic mid-call leaves them usable.
    fn lock_sink(&self) -> MutexGuard<'_, Option<Box<dyn OutputSink>>> {
        self.sink.lock().unwrap_or_else(|poisoned| {
            warn!("Output writer lock poisoned by a panicked worker; recovering");
            self.sink.clear_poison();
            PoisonError::into_inner(poisoned)
        })
    }

    /// Path of the artifact being written.
    pub fn location(&self) -> &Path {
        &self.location
    }
}
