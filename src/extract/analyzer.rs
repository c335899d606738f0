//! Tokenizer: word segmentation, lower-casing, stop words, length filter, deduplication.

use anyhow::{Context, Result};
use log::info;
use std::collections::HashSet;
use std::path::Path;

use crate::utils::config::MAX_TOKEN_LENGTH;

/// Classic English stop words, always in effect.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Case-insensitive stop-word set, built once per run and shared by every worker.
#[derive(Clone, Debug)]
pub struct StopWords {
    words: HashSet<String>,
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}

impl StopWords {
    /// Only the built-in English set.
    pub fn english() -> Self {
        Self {
            words: ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// English set plus one word per line from `path` (blank lines ignored).
    pub fn load(path: &Path) -> Result<Self> {
        info!("Initializing stop words from {}", path.display());
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read stop words file {}", path.display()))?;
        let mut stop_words = Self::english();
        stop_words.extend(s.lines());
        Ok(stop_words)
    }

    /// English set plus `path` when given.
    pub fn from_optional_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::english()),
        }
    }

    pub fn extend<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        for w in words {
            let w = w.trim();
            if !w.is_empty() {
                self.words.insert(w.to_lowercase());
            }
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Turns text into a deduplicated, order-preserving list of normalized tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str, min_token_length: usize, stop_words: &StopWords)
    -> Vec<String>;
}

/// Splits on anything that is not alphanumeric (apostrophes inside a word are kept),
/// lower-cases, drops stop words and tokens outside `[min_token_length, MAX_TOKEN_LENGTH]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardAnalyzer;

impl Tokenizer for StandardAnalyzer {
    fn tokenize(
        &self,
        text: &str,
        min_token_length: usize,
        stop_words: &StopWords,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut tokens = Vec::new();
        for word in text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’')) {
            let word = word.trim_matches(|c| c == '\'' || c == '’');
            if word.is_empty() {
                continue;
            }
            let token = word.to_lowercase();
            let len = token.chars().count();
            if len < min_token_length || len > MAX_TOKEN_LENGTH {
                continue;
            }
            if stop_words.contains(&token) {
                continue;
            }
            if seen.insert(token.clone()) {
                tokens.push(token);
            }
        }
        tokens
    }
}
