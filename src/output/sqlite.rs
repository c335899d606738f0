//! SQLite index backend: one row per record plus an FTS5 table for full-text queries.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::path::Path;

use crate::IndexEntry;
use crate::utils::config::DB_INSERT_BATCH_SIZE;

use super::OutputSink;

/// WAL tuning pragmas. Use after PRAGMA journal_mode = WAL.
pub(crate) const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        PRAGMA journal_size_limit = 67108864;
        "#;

/// Schema for the documents table and its full-text companion.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE documents (
    id INTEGER PRIMARY KEY,
    pdf TEXT NOT NULL,
    audio TEXT NOT NULL,
    keywords TEXT NOT NULL,
    category TEXT,
    sub_category TEXT,
    series_code TEXT,
    series_title TEXT,
    title TEXT,
    date TEXT,
    passage TEXT,
    contents TEXT
);
CREATE INDEX idx_documents_pdf ON documents(pdf);

CREATE VIRTUAL TABLE documents_fts USING fts5(
    title,
    keywords,
    contents,
    content = 'documents',
    content_rowid = 'id'
);
"#;

pub(crate) const INSERT_DOCUMENT_SQL: &str = "INSERT INTO documents \
     (pdf, audio, keywords, category, sub_category, series_code, series_title, title, date, passage, contents) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

pub(crate) const INSERT_FTS_SQL: &str =
    "INSERT INTO documents_fts (rowid, title, keywords, contents) VALUES (?1, ?2, ?3, ?4)";

/// Appends documents to a fresh index database. Inserts run inside a transaction that is
/// committed every [`DB_INSERT_BATCH_SIZE`] rows and on `finish`.
pub struct SqliteIndexSink {
    conn: Connection,
    pending: usize,
    written: usize,
}

impl SqliteIndexSink {
    /// Create the database at `path`. Refuses to touch an existing file.
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            bail!("index already exists: {}", path.display());
        }
        let conn = Connection::open(path).context("open index database")?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .context("enable WAL")?;
        conn.execute_batch(WAL_PRAGMAS).context("set WAL pragmas")?;
        conn.execute_batch(SCHEMA).context("create schema")?;
        conn.execute_batch("BEGIN").context("begin transaction")?;
        Ok(Self {
            conn,
            pending: 0,
            written: 0,
        })
    }

    /// Rows written so far (committed or pending).
    pub fn count(&self) -> usize {
        self.written
    }

    fn insert(&mut self, e: &IndexEntry) -> Result<()> {
        let date = e.date.map(|d| d.to_string());
        self.conn
            .prepare_cached(INSERT_DOCUMENT_SQL)
            .context("prepare insert")?
            .execute((
                e.pdf.as_str(),
                e.audio.as_str(),
                e.keywords.as_str(),
                e.category.as_deref(),
                e.sub_category.as_deref(),
                e.series_code.as_deref(),
                e.series_title.as_deref(),
                e.title.as_deref(),
                date.as_deref(),
                e.passage.as_deref(),
                e.text(),
            ))
            .context("insert document")?;
        let rowid = self.conn.last_insert_rowid();
        self.conn
            .prepare_cached(INSERT_FTS_SQL)
            .context("prepare fts insert")?
            .execute((
                rowid,
                e.title.as_deref(),
                e.keywords.as_str(),
                e.text(),
            ))
            .context("insert fts row")?;
        Ok(())
    }
}

impl OutputSink for SqliteIndexSink {
    fn write_entry(&mut self, entry: &IndexEntry) -> Result<()> {
        // Both inserts land or neither does.
        self.conn
            .execute_batch("SAVEPOINT entry")
            .context("begin entry savepoint")?;
        if let Err(e) = self.insert(entry) {
            let _ = self
                .conn
                .execute_batch("ROLLBACK TO entry; RELEASE entry");
            return Err(e.context(format!("index entry for {}", entry)));
        }
        self.conn
            .execute_batch("RELEASE entry")
            .context("release entry savepoint")?;
        self.pending += 1;
        self.written += 1;
        if self.pending >= DB_INSERT_BATCH_SIZE {
            self.conn
                .execute_batch("COMMIT; BEGIN")
                .context("commit batch")?;
            self.pending = 0;
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let Self { conn, .. } = *self;
        conn.execute_batch("COMMIT").context("commit index")?;
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            .context("WAL checkpoint")?;
        conn.close()
            .map_err(|(_, e)| e)
            .context("close index database")?;
        Ok(())
    }
}
