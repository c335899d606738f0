//! Top-level indexing run: build the writer, pool and crawler, crawl, drain, report.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::engine::progress::{completion_callback, create_counter, finish_counter};
use crate::extract::StopWords;
use crate::metadata::MetadataTable;
use crate::output::{JsonStreamSink, OutputSink, SqliteIndexSink, SynchronizedOutputWriter};
use crate::pipeline::{CrawlFilter, Crawler, ManagerOptions, WorkManager, WorkerFactory};
use crate::utils::config::PackagePaths;
use crate::{IndexType, Opts, RunSummary};

/// Index every accepted file under `opts.input_dirs`. See [`run_index_with_cancel`].
pub fn run_index(opts: &Opts) -> Result<RunSummary> {
    run_index_with_cancel(opts, Arc::new(AtomicBool::new(false)))
}

/// Run with an external cancel flag (set by the CLI's Ctrl+C handler).
///
/// The summary line is logged on every path once the pool has started. The returned error,
/// if any, is the first of: a [`RunError`](crate::RunError) from the drain, then a crawl error.
pub fn run_index_with_cancel(opts: &Opts, cancel: Arc<AtomicBool>) -> Result<RunSummary> {
    let start = Instant::now();
    opts.validate()?;
    debug!(
        "{} CONFIG:{:#?}",
        PackagePaths::get().pkg_name().to_uppercase(),
        opts
    );

    let stop_words = StopWords::from_optional_file(opts.stopwords.as_deref())?;
    debug!("Loaded {} stop words", stop_words.len());
    let metadata = opts
        .metadata
        .as_deref()
        .map(MetadataTable::load)
        .transpose()?;
    if let Some(table) = &metadata {
        info!("Loaded metadata for {} manuscripts", table.len());
    }

    let (sink, output) = open_sink(opts)?;
    let writer = Arc::new(SynchronizedOutputWriter::new(sink, output.clone()));
    let mut factory = WorkerFactory::new(writer, stop_words, opts.min_token_length);
    if let Some(table) = metadata {
        factory = factory.with_metadata(table);
    }

    let bar = opts.progress.then(|| create_counter("Indexing"));
    let mut manager = WorkManager::with_options(
        opts.workers,
        factory,
        ManagerOptions {
            shutdown_timeout: opts.shutdown_timeout,
            cancel,
            on_complete: completion_callback(&bar),
        },
    )?;

    let crawled = Crawler::new(opts.input_dirs.clone(), opts.recurse, &manager).and_then(|c| {
        c.with_filter(CrawlFilter::new(
            opts.extensions.clone(),
            opts.exclude.clone(),
        ))
        .follow_links(opts.follow_links)
        .crawl()
    });
    if let Err(e) = &crawled {
        manager.record_failure(&format!("Crawl aborted: {:#}", e));
    }

    let drained = manager.shutdown();
    if let Some(bar) = &bar {
        finish_counter(bar);
    }

    let run = manager.run_state();
    let summary = RunSummary {
        files_seen: run.metrics().files_seen(),
        failures: run.metrics().failures(),
        written: run.written(),
        skipped: run.skipped(),
        output,
        elapsed: start.elapsed(),
    };
    info!(
        "Index completed in {:.3} seconds. Processed {} files with {} failure(s). Index written to {}.",
        summary.elapsed.as_secs_f64(),
        summary.files_seen,
        summary.failures,
        summary.output.display()
    );
    debug!(
        "{} records written, {} files skipped",
        summary.written, summary.skipped
    );

    drained?;
    crawled?;
    Ok(summary)
}

/// Open the backend chosen by `opts.index_type` inside `opts.output_dir`.
fn open_sink(opts: &Opts) -> Result<(Box<dyn OutputSink>, PathBuf)> {
    match opts.index_type {
        IndexType::Json => {
            let (sink, path) =
                JsonStreamSink::create_timestamped(&opts.output_dir, opts.compress, opts.pretty)?;
            Ok((Box::new(sink), path))
        }
        IndexType::Sqlite => {
            let path = opts
                .output_dir
                .join(PackagePaths::get().index_filename());
            let sink = SqliteIndexSink::create(&path)
                .with_context(|| format!("create sqlite index {}", path.display()))?;
            Ok((Box::new(sink), path))
        }
    }
}
