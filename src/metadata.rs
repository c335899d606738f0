//! External manuscript metadata: category → sub-category → series → sermon, keyed by the
//! manuscript's `pdf/...` relative path.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use log::{debug, info};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path};

/// Metadata for one manuscript, flattened from its category, sub-category and series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManuscriptMeta {
    pub category: String,
    pub sub_category: String,
    pub series_code: String,
    pub series_title: String,
    /// Relative manuscript path, e.g. `pdf/romans/rom01.pdf`.
    pub pdf: String,
    pub audio: String,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub passage: String,
}

#[derive(Debug, Deserialize)]
struct CategoryNode {
    #[serde(rename = "subCategories", default)]
    sub_categories: BTreeMap<String, SubCategoryNode>,
}

#[derive(Debug, Deserialize)]
struct SubCategoryNode {
    #[serde(rename = "seriesCollection", default)]
    series_collection: Vec<SeriesNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesNode {
    series_code: String,
    series_title: String,
    #[serde(default)]
    sermons: Vec<SermonNode>,
}

#[derive(Debug, Deserialize)]
struct SermonNode {
    pdf: Option<String>,
    #[serde(default)]
    audio: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    passage: Option<String>,
}

/// Lookup table built once per run from the metadata file and shared read-only by workers.
#[derive(Debug, Default)]
pub struct MetadataTable {
    entries: HashMap<String, ManuscriptMeta>,
}

impl MetadataTable {
    /// Load and flatten the metadata file. Duplicate manuscripts and bad dates are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read metadata file {}", path.display()))?;
        let table = Self::from_json(&s)
            .with_context(|| format!("parse metadata file {}", path.display()))?;
        info!(
            "Loaded external metadata file. Found {} entries with manuscripts.",
            table.len()
        );
        Ok(table)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let root: BTreeMap<String, CategoryNode> = serde_json::from_str(s)?;
        let mut entries = HashMap::new();
        for (category, node) in root {
            for (sub_category, sub) in node.sub_categories {
                debug!("processing subcategory {}", sub_category);
                for series in sub.series_collection {
                    for sermon in series.sermons {
                        let Some(pdf) = sermon.pdf else {
                            continue;
                        };
                        let date = match sermon.date.as_deref().unwrap_or("").trim() {
                            "" => None,
                            d => Some(
                                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                                    .with_context(|| format!("bad date '{d}' for {pdf}"))?,
                            ),
                        };
                        let meta = ManuscriptMeta {
                            category: category.clone(),
                            sub_category: sub_category.clone(),
                            series_code: series.series_code.clone(),
                            series_title: series.series_title.clone(),
                            pdf: pdf.clone(),
                            audio: sermon.audio.unwrap_or_default(),
                            title: sermon.title.unwrap_or_default(),
                            date,
                            passage: sermon.passage.unwrap_or_default(),
                        };
                        if entries.insert(pdf.clone(), meta).is_some() {
                            bail!("duplicate pdf entry: {pdf}");
                        }
                    }
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_for(&self, relative_path: &str) -> Option<&ManuscriptMeta> {
        self.entries.get(relative_path)
    }

    /// Resolve the lookup key for a manuscript on disk and fetch its entry.
    pub fn entry_for_manuscript(&self, manuscript: &Path) -> Option<&ManuscriptMeta> {
        relative_manuscript_path(manuscript).and_then(|rel| self.entry_for(&rel))
    }
}

/// Key for a manuscript: the path from its last `pdf` directory component onward, `/`-joined.
/// Only a whole component named `pdf` (case-insensitive) anchors the key, so `sermonpdf/` or
/// `pdfs/` do not. `None` when no ancestor directory matches.
pub fn relative_manuscript_path(manuscript: &Path) -> Option<String> {
    let parts: Vec<&str> = manuscript
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    // The file itself can't be the anchor; it needs at least one component after it.
    let dirs = &parts[..parts.len().saturating_sub(1)];
    let anchor = dirs.iter().rposition(|p| p.eq_ignore_ascii_case("pdf"))?;
    Some(parts[anchor..].join("/"))
}
