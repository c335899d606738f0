//! Per-file unit of work: extract → tokenize → build record → write.

use anyhow::{Context, Result};
use log::{error, info, trace};
use std::sync::Arc;
use std::time::Instant;

use crate::engine::tools::companion_audio_name;
use crate::extract::{DocumentExtractor, Extractor, StandardAnalyzer, StopWords, Tokenizer};
use crate::metadata::{MetadataTable, relative_manuscript_path};
use crate::output::SynchronizedOutputWriter;
use crate::{IndexEntry, WorkItem};

/// What a successful task did. Failures travel as `Err` instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkOutcome {
    /// One record went through the writer.
    Written,
    /// Extractor found no text; nothing written.
    NoText,
    /// Metadata mode and no entry for this file; nothing written.
    NoMetadata,
}

/// Builds one [`Worker`] per work item. Holds everything workers share for the run: the
/// writer, extractor, tokenizer, stop words and optional metadata table.
pub struct WorkerFactory {
    writer: Arc<SynchronizedOutputWriter>,
    extractor: Box<dyn Extractor>,
    tokenizer: Box<dyn Tokenizer>,
    stop_words: StopWords,
    metadata: Option<MetadataTable>,
    min_token_length: usize,
}

impl WorkerFactory {
    /// Factory with the default extractor and analyzer and no metadata lookup.
    pub fn new(
        writer: Arc<SynchronizedOutputWriter>,
        stop_words: StopWords,
        min_token_length: usize,
    ) -> Self {
        Self {
            writer,
            extractor: Box::new(DocumentExtractor),
            tokenizer: Box::new(StandardAnalyzer),
            stop_words,
            metadata: None,
            min_token_length,
        }
    }

    /// Build metadata records from `table` instead of flat ones.
    pub fn with_metadata(mut self, table: MetadataTable) -> Self {
        self.metadata = Some(table);
        self
    }

    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    pub fn new_worker(&self, item: WorkItem) -> Worker<'_> {
        Worker {
            factory: self,
            item,
        }
    }

    /// Seal the shared writer. Called by the work manager once every worker is done.
    pub fn close(&self) -> Result<()> {
        self.writer.close()
    }
}

/// Processes exactly one work item.
pub struct Worker<'a> {
    factory: &'a WorkerFactory,
    item: WorkItem,
}

impl Worker<'_> {
    pub fn run(self) -> Result<WorkOutcome> {
        let f = self.factory;
        let path = self.item.path();
        info!("Processing source file {}", path.display());
        let start = Instant::now();

        let Some(text) = f
            .extractor
            .extract(path)
            .with_context(|| format!("extract text from {}", path.display()))?
        else {
            return Ok(WorkOutcome::NoText);
        };

        let tokens = f
            .tokenizer
            .tokenize(&text, f.min_token_length, &f.stop_words);
        let keywords = tokens.join(" ");

        let entry = match &f.metadata {
            Some(table) => match table.entry_for_manuscript(path) {
                Some(meta) => IndexEntry::with_metadata(path, meta, keywords, text)?,
                None => {
                    error!(
                        "No metadata entry for {} (key {:?}); skipping",
                        path.display(),
                        relative_manuscript_path(path)
                    );
                    return Ok(WorkOutcome::NoMetadata);
                }
            },
            None => IndexEntry::new(path, companion_audio_name(path), keywords)?.with_text(text),
        };

        f.writer.write(&entry)?;
        trace!("Indexed {} in {:?}", path.display(), start.elapsed());
        Ok(WorkOutcome::Written)
    }
}
