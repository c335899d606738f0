//! Text extraction and analysis: document → raw text → normalized tokens.

pub mod analyzer;
pub mod filter;

pub use analyzer::{StandardAnalyzer, StopWords, Tokenizer};
pub use filter::strip_static_patterns;

use anyhow::{Context, Result};
use log::warn;
use std::path::Path;

/// Turns a document file into raw text.
///
/// `Ok(None)` means the file holds no usable text; that is not an error. `Err` is a per-item
/// failure for the work manager to count.
pub trait Extractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<Option<String>>;
}

/// Default extractor: `.pdf` through `pdf-extract`, everything else read as UTF-8 text.
/// Output is normalized with [`normalize_text`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentExtractor;

impl Extractor for DocumentExtractor {
    fn extract(&self, path: &Path) -> Result<Option<String>> {
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        let raw = if is_pdf {
            pdf_extract::extract_text(path)
                .with_context(|| format!("extract pdf text from {}", path.display()))?
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("read text from {}", path.display()))?
        };
        let text = normalize_text(&raw);
        if text.is_empty() {
            warn!("No text extracted from file {}", path.display());
            return Ok(None);
        }
        Ok(Some(text))
    }
}

/// Drop static boilerplate, flatten line breaks and tabs to spaces, trim.
/// Returns an empty string when nothing but whitespace is left.
pub fn normalize_text(raw: &str) -> String {
    let filtered = strip_static_patterns(raw);
    let flat: String = filtered
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c => c,
        })
        .collect();
    flat.trim().to_string()
}
