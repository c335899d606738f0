//! Fixed-size worker pool: accepts work items, runs them, aggregates failures, and closes the
//! output writer exactly once after the pool has drained.
//!
//! State moves one way: Accepting → Draining → Closed. Failures inside a task (errors or
//! panics) are caught at the pool boundary, counted, and flip the run-level failure flag;
//! `shutdown` turns that flag into a single [`RunError::TasksFailed`].

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::{debug, error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::WorkItem;
use crate::error::RunError;
use crate::utils::config::{DRAIN_POLL_INTERVAL, RunDefaults, WORK_QUEUE_CAP};

use super::metrics::Metrics;
use super::worker::{WorkOutcome, WorkerFactory};

/// Callback fired after each task finishes, whatever the outcome.
pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManagerState {
    Accepting,
    Draining,
    Closed,
}

/// Shared state of one run: metrics, the failure flag, and outcome counts.
#[derive(Debug, Default)]
pub struct RunState {
    metrics: Metrics,
    failed: AtomicBool,
    written: AtomicU64,
    skipped: AtomicU64,
}

impl RunState {
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Count a failure and mark the run failed. The flag never clears.
    pub fn record_failure(&self) {
        self.metrics.failure();
        self.failed.store(true, Ordering::SeqCst);
    }

    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    fn record_outcome(&self, outcome: WorkOutcome) {
        match outcome {
            WorkOutcome::Written => self.written.fetch_add(1, Ordering::Relaxed),
            WorkOutcome::NoText | WorkOutcome::NoMetadata => {
                self.skipped.fetch_add(1, Ordering::Relaxed)
            }
        };
    }
}

/// Tuning for [`WorkManager::with_options`].
#[derive(Clone)]
pub struct ManagerOptions {
    /// Longest `shutdown` waits for in-flight work.
    pub shutdown_timeout: Duration,
    /// Set from outside (e.g. Ctrl+C) to abandon the drain.
    pub cancel: Arc<AtomicBool>,
    pub on_complete: Option<CompletionCallback>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            shutdown_timeout: RunDefaults::SHUTDOWN_TIMEOUT,
            cancel: Arc::new(AtomicBool::new(false)),
            on_complete: None,
        }
    }
}

enum Drain {
    Finished,
    TimedOut,
    Interrupted,
}

pub struct WorkManager {
    state: ManagerState,
    work_tx: Option<Sender<WorkItem>>,
    /// Never sent on; disconnects once every worker thread has exited.
    done_rx: Receiver<()>,
    handles: Vec<JoinHandle<()>>,
    factory: Arc<WorkerFactory>,
    run: Arc<RunState>,
    opts: ManagerOptions,
}

impl WorkManager {
    pub fn new(workers: usize, factory: WorkerFactory) -> Result<Self> {
        Self::with_options(workers, factory, ManagerOptions::default())
    }

    /// Spawn `workers` threads (`index-worker-N`) that pull from a bounded queue.
    pub fn with_options(
        workers: usize,
        factory: WorkerFactory,
        opts: ManagerOptions,
    ) -> Result<Self> {
        if workers < 1 {
            anyhow::bail!("workers must be >= 1");
        }
        let (work_tx, work_rx) = bounded::<WorkItem>(WORK_QUEUE_CAP);
        let (done_tx, done_rx) = bounded::<()>(0);
        let factory = Arc::new(factory);
        let run = Arc::new(RunState::default());

        let handles = spawn_workers(
            workers,
            &work_rx,
            &done_tx,
            &factory,
            &run,
            opts.on_complete.as_ref(),
        )?;
        // Workers hold the remaining clones; the channel disconnects when the last one exits.
        drop(done_tx);
        debug!("Started {} index workers", workers);

        Ok(Self {
            state: ManagerState::Accepting,
            work_tx: Some(work_tx),
            done_rx,
            handles,
            factory,
            run,
            opts,
        })
    }

    /// Queue one item. Blocks only while the queue is full.
    pub fn submit(&self, item: WorkItem) -> Result<()> {
        let tx = match (&self.state, &self.work_tx) {
            (ManagerState::Accepting, Some(tx)) => tx,
            _ => return Err(RunError::ManagerClosed.into()),
        };
        debug!("Queueing file {}", item);
        self.run.metrics().file_seen();
        tx.send(item).map_err(|_| RunError::ManagerClosed)?;
        Ok(())
    }

    /// Record a failure that happened outside a task (e.g. an unreadable directory).
    pub fn record_failure(&self, what: &str) {
        warn!("{}", what);
        self.run.record_failure();
    }

    pub fn run_state(&self) -> &Arc<RunState> {
        &self.run
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn cancel_requested(&self) -> bool {
        self.opts.cancel.load(Ordering::Relaxed)
    }

    /// Stop accepting work, wait (bounded) for in-flight items, close the writer, and report
    /// the aggregate result. The writer is closed on every path out of the drain.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.state != ManagerState::Accepting {
            return Err(RunError::ManagerClosed.into());
        }
        self.state = ManagerState::Draining;
        drop(self.work_tx.take());

        info!("Awaiting worker pool shutdown.");
        let drain = self.await_workers();

        let closed = self.factory.close().context("close output writer");
        self.state = ManagerState::Closed;
        if let Err(e) = &closed {
            error!("{:#}", e);
            self.run.record_failure();
        }

        match drain {
            Drain::Interrupted => {
                error!("Worker pool interrupted while awaiting worker completion.");
                return Err(RunError::Interrupted.into());
            }
            Drain::TimedOut => {
                let waited = self.opts.shutdown_timeout;
                error!(
                    "Workers still running after {:?}; abandoning them",
                    waited
                );
                self.run.record_failure();
                return Err(RunError::DrainTimeout { waited }.into());
            }
            Drain::Finished => {
                for h in self.handles.drain(..) {
                    if h.join().is_err() {
                        error!("Worker thread panicked outside a task");
                        self.run.record_failure();
                    }
                }
            }
        }

        closed?;
        if self.run.failed() {
            return Err(RunError::TasksFailed {
                failures: self.run.metrics().failures(),
            }
            .into());
        }
        info!("Worker pool shutdown complete.");
        Ok(())
    }

    fn await_workers(&self) -> Drain {
        let deadline = Instant::now() + self.opts.shutdown_timeout;
        loop {
            if self.cancel_requested() {
                return Drain::Interrupted;
            }
            let now = Instant::now();
            if now >= deadline {
                return Drain::TimedOut;
            }
            match self
                .done_rx
                .recv_timeout((deadline - now).min(DRAIN_POLL_INTERVAL))
            {
                Ok(()) | Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Drain::Finished,
            }
        }
    }
}

impl Drop for WorkManager {
    fn drop(&mut self) {
        if self.state == ManagerState::Accepting
            && let Err(e) = self.shutdown()
        {
            error!("Work manager teardown failed: {:#}", e);
        }
    }
}

fn spawn_workers(
    workers: usize,
    work_rx: &Receiver<WorkItem>,
    done_tx: &Sender<()>,
    factory: &Arc<WorkerFactory>,
    run: &Arc<RunState>,
    on_complete: Option<&CompletionCallback>,
) -> Result<Vec<JoinHandle<()>>> {
    (1..=workers)
        .map(|n| {
            let work_rx = work_rx.clone();
            let done_tx = done_tx.clone();
            let factory = Arc::clone(factory);
            let run = Arc::clone(run);
            let on_complete = on_complete.cloned();
            thread::Builder::new()
                .name(format!("index-worker-{n}"))
                .spawn(move || {
                    worker_loop(work_rx, &factory, &run, on_complete.as_ref());
                    drop(done_tx);
                })
                .context("spawn index worker")
        })
        .collect()
}

/// Pull items until the queue closes. Every outcome is accounted for in `run`.
fn worker_loop(
    work_rx: Receiver<WorkItem>,
    factory: &WorkerFactory,
    run: &RunState,
    on_complete: Option<&CompletionCallback>,
) {
    while let Ok(item) = work_rx.recv() {
        let path = item.path().to_path_buf();
        match run_task(factory, item) {
            Ok(outcome) => run.record_outcome(outcome),
            Err(e) => {
                error!("Task failed for {}: {:#}", path.display(), e);
                run.record_failure();
            }
        }
        if let Some(cb) = on_complete {
            cb();
        }
    }
}

/// Run one worker, turning a panic into an error so the thread survives.
fn run_task(factory: &WorkerFactory, item: WorkItem) -> Result<WorkOutcome> {
    panic::catch_unwind(AssertUnwindSafe(|| factory.new_worker(item).run()))
        .unwrap_or_else(|payload| Err(anyhow!("worker panicked: {}", panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
