//! JSON-stream backend: one array of records, optionally gzip-compressed and pretty-printed.

use anyhow::{Context, Result, bail};
use chrono::Local;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::IndexEntry;
use crate::utils::config::{JSON_FILE_PREFIX, JSON_NAME_ATTEMPTS, JSON_TIMESTAMP_FORMAT};

use super::OutputSink;

enum Stream {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Stream {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        match self {
            Stream::Plain(w) => w.write_all(buf),
            Stream::Gzip(w) => w.write_all(buf),
        }
    }

    fn finish(self) -> std::io::Result<()> {
        let mut inner = match self {
            Stream::Plain(w) => w,
            Stream::Gzip(w) => w.finish()?,
        };
        inner.flush()?;
        inner.get_ref().sync_all()
    }
}

/// Writes `[rec, rec, ...]` to a new file. Each record is serialized in full before any byte
/// hits the stream, so a serialization error leaves the array intact.
pub struct JsonStreamSink {
    stream: Stream,
    pretty: bool,
    count: usize,
}

impl JsonStreamSink {
    /// Create `path` (must not exist) and open the array.
    pub fn create(path: &Path, compress: bool, pretty: bool) -> Result<Self> {
        let file =
            open_new(path).with_context(|| format!("create json index {}", path.display()))?;
        Self::start(file, compress, pretty)
    }

    /// Create a fresh timestamped index in `dir`. When that name is taken (two runs in the same
    /// second) a numbered name is used instead; an existing file is never touched.
    pub fn create_timestamped(
        dir: &Path,
        compress: bool,
        pretty: bool,
    ) -> Result<(Self, PathBuf)> {
        let stamp = Local::now().format(JSON_TIMESTAMP_FORMAT).to_string();
        for n in 0..JSON_NAME_ATTEMPTS {
            let path = numbered_file_name(dir, &stamp, n, compress);
            match open_new(&path) {
                Ok(file) => return Ok((Self::start(file, compress, pretty)?, path)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("create json index {}", path.display()));
                }
            }
        }
        bail!("no free json index name for {} in {}", stamp, dir.display())
    }

    fn start(file: File, compress: bool, pretty: bool) -> Result<Self> {
        let buf = BufWriter::new(file);
        let mut stream = if compress {
            Stream::Gzip(GzEncoder::new(buf, Compression::default()))
        } else {
            Stream::Plain(buf)
        };
        stream
            .write_all(if pretty { b"[\n" } else { b"[" })
            .context("open json array")?;
        Ok(Self {
            stream,
            pretty,
            count: 0,
        })
    }

    /// Records written so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl OutputSink for JsonStreamSink {
    fn write_entry(&mut self, entry: &IndexEntry) -> Result<()> {
        let body = if self.pretty {
            serde_json::to_vec_pretty(entry)
        } else {
            serde_json::to_vec(entry)
        }
        .with_context(|| format!("serialize index entry for {}", entry))?;
        let sep: &[u8] = match (self.count, self.pretty) {
            (0, _) => b"",
            (_, true) => b",\n",
            (_, false) => b",",
        };
        let mut chunk = Vec::with_capacity(sep.len() + body.len());
        chunk.extend_from_slice(sep);
        chunk.extend_from_slice(&body);
        self.stream
            .write_all(&chunk)
            .with_context(|| format!("write index entry for {}", entry))?;
        self.count += 1;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        let close: &[u8] = if self.pretty { b"\n]\n" } else { b"]" };
        self.stream.write_all(close).context("close json array")?;
        let this = *self;
        this.stream.finish().context("flush json index")?;
        Ok(())
    }
}

/// `<dir>/lunr-<YYYYmmddHHMMSS>.json` for `n == 0`, `lunr-<stamp>-<n>.json` after that.
/// `.gz` is appended when compressing.
fn numbered_file_name(dir: &Path, stamp: &str, n: usize, compress: bool) -> PathBuf {
    let mut name = match n {
        0 => format!("{JSON_FILE_PREFIX}-{stamp}.json"),
        n => format!("{JSON_FILE_PREFIX}-{stamp}-{n}.json"),
    };
    if compress {
        name.push_str(".gz");
    }
    dir.join(name)
}

fn open_new(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}
