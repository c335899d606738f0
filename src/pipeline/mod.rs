//! Indexing pipeline: crawl → work manager → workers → output writer.

pub mod crawl;
pub mod metrics;
pub mod work_manager;
pub mod worker;

pub use crawl::{CrawlFilter, Crawler};
pub use metrics::Metrics;
pub use work_manager::{CompletionCallback, ManagerOptions, ManagerState, RunState, WorkManager};
pub use worker::{WorkOutcome, Worker, WorkerFactory};
