//! Work items handed from the crawler to the pool, and the records workers write.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::metadata::ManuscriptMeta;

/// One accepted file, queued for processing. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkItem {
    path: PathBuf,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Result record for one source file. Serialized camelCase into the JSON index; absent
/// metadata fields are omitted.
///
/// Only built after a successful extraction, so `keywords` always reflects real text.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    /// Source file reference: file name, or the metadata-relative path in metadata mode.
    pub pdf: String,
    /// Companion audio reference.
    pub audio: String,
    /// Space-delimited, deduplicated tokens.
    pub keywords: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passage: Option<String>,
    /// Raw extracted text (metadata mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    #[serde(skip)]
    source: PathBuf,
    /// Raw text kept off the JSON record; backends with full-text search still index it.
    #[serde(skip)]
    text: Option<String>,
}

impl IndexEntry {
    /// Flat record: file name, audio name derived from it, and tokens.
    pub fn new(source: &Path, audio: String, keywords: String) -> Result<Self> {
        check_source(source)?;
        let pdf = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            pdf,
            audio,
            keywords,
            category: None,
            sub_category: None,
            series_code: None,
            series_title: None,
            title: None,
            date: None,
            passage: None,
            contents: None,
            source: source.to_path_buf(),
            text: None,
        })
    }

    /// Metadata record: fields from the external lookup, plus tokens and raw text.
    pub fn with_metadata(
        source: &Path,
        meta: &ManuscriptMeta,
        keywords: String,
        contents: String,
    ) -> Result<Self> {
        check_source(source)?;
        if meta.pdf.trim().is_empty() {
            bail!("metadata entry for {} has no pdf path", source.display());
        }
        Ok(Self {
            pdf: meta.pdf.clone(),
            audio: meta.audio.clone(),
            keywords,
            category: Some(meta.category.clone()),
            sub_category: Some(meta.sub_category.clone()),
            series_code: Some(meta.series_code.clone()),
            series_title: Some(meta.series_title.clone()),
            title: non_empty(&meta.title),
            date: meta.date,
            passage: non_empty(&meta.passage),
            contents: Some(contents),
            source: source.to_path_buf(),
            text: None,
        })
    }

    /// Attach the extracted text without adding it to the serialized record.
    pub fn with_text(mut self, text: String) -> Self {
        self.text = Some(text);
        self
    }

    /// Full text for search backends: `contents` when present, otherwise the attached text.
    pub fn text(&self) -> Option<&str> {
        self.contents.as_deref().or(self.text.as_deref())
    }

    /// File the record was built from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source.display())
    }
}

fn check_source(source: &Path) -> Result<()> {
    if !source.is_file() {
        bail!("source file does not exist: {}", source.display());
    }
    Ok(())
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
