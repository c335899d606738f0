//! Directory crawl: walk the input roots and submit each accepted file to the work manager.

use anyhow::{Result, bail};
use log::{debug, info, trace};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::WorkItem;
use crate::engine::tools::{extension_allowed, is_excluded, is_os_hidden_file, path_relative_to};
use crate::utils::config::RunDefaults;

use super::work_manager::WorkManager;

/// Which files a crawl submits and which directories it enters.
#[derive(Clone, Debug)]
pub struct CrawlFilter {
    /// Accepted extensions, no dot, compared case-insensitively.
    pub extensions: Vec<String>,
    /// Glob patterns matched against file names and full paths.
    pub exclude: Vec<String>,
}

impl CrawlFilter {
    pub fn new(extensions: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            extensions,
            exclude,
        }
    }

    /// Descend into (or consider) this entry at all.
    fn enter(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        let path = entry.path();
        !is_os_hidden_file(path) && !is_excluded(path, &self.exclude)
    }

    /// Submit this file.
    fn accepts(&self, path: &Path) -> bool {
        extension_allowed(path, &self.extensions)
    }
}

impl Default for CrawlFilter {
    fn default() -> Self {
        Self::new(
            vec![RunDefaults::EXTENSION.to_string()],
            Vec::new(),
        )
    }
}

/// Walks a fixed set of directories. Holds no state between crawls, so crawling twice
/// submits the same files twice.
pub struct Crawler<'a> {
    dirs: Vec<PathBuf>,
    recurse: bool,
    follow_links: bool,
    filter: CrawlFilter,
    manager: &'a WorkManager,
}

impl<'a> Crawler<'a> {
    /// Fails if `dirs` is empty or any entry is not a directory.
    pub fn new(dirs: Vec<PathBuf>, recurse: bool, manager: &'a WorkManager) -> Result<Self> {
        if dirs.is_empty() {
            bail!("no directories to crawl");
        }
        if let Some(bad) = dirs.iter().find(|d| !d.is_dir()) {
            bail!("not a directory: {}", bad.display());
        }
        Ok(Self {
            dirs,
            recurse,
            follow_links: false,
            filter: CrawlFilter::default(),
            manager,
        })
    }

    pub fn with_filter(mut self, filter: CrawlFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Walk every root and submit accepted files. Unreadable entries are counted as failures
    /// and skipped. Returns the number of items submitted.
    pub fn crawl(&self) -> Result<usize> {
        let mut submitted = 0_usize;
        for root in &self.dirs {
            if self.manager.cancel_requested() {
                info!("Crawl cancelled before {}", root.display());
                break;
            }
            trace!("Crawling directory {}", root.display());
            let n = self.crawl_root(root)?;
            trace!("Finished crawling {} ({} files)", root.display(), n);
            submitted += n;
        }
        debug!("Crawl submitted {} files", submitted);
        Ok(submitted)
    }

    fn crawl_root(&self, root: &Path) -> Result<usize> {
        let max_depth = if self.recurse { usize::MAX } else { 1 };
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.filter.enter(e));

        let mut count = 0_usize;
        for result in walker {
            if self.manager.cancel_requested() {
                break;
            }
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    let at = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    self.manager
                        .record_failure(&format!("Unable to read {}: {}", at, err));
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.filter.accepts(entry.path()) {
                continue;
            }
            let rel = path_relative_to(entry.path(), root).unwrap_or_else(|| entry.path().into());
            debug!("Found {} under {}", rel.display(), root.display());
            self.manager.submit(WorkItem::new(entry.into_path()))?;
            count += 1;
        }
        Ok(count)
    }
}
