use clap::Parser;
use docdex::engine::{Cli, build_opts};
use docdex::utils::docdex_toml::{DocdexToml, apply_file_to_opts};
use docdex::{IndexType, Opts, RunError, run_index};
use flate2::read::GzDecoder;
use rusqlite::Connection;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

// --- helpers ---

fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

fn text_opts(input: &Path, output: &Path) -> Opts {
    Opts {
        input_dirs: vec![input.to_path_buf()],
        output_dir: output.to_path_buf(),
        extensions: vec!["txt".to_string()],
        min_token_length: 4,
        workers: 3,
        ..Opts::default()
    }
}

/// The single json index a run left in `dir`.
fn only_index_file(dir: &Path) -> PathBuf {
    let files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("lunr-"))
        })
        .collect();
    assert_eq!(files.len(), 1, "expected one index file, found {files:?}");
    files.into_iter().next().unwrap()
}

fn read_records(path: &Path) -> Vec<Value> {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// --- run_index ---

#[test]
fn test_run_index_json() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(input.path(), "one.txt", b"Blessed are the merciful");
    write(input.path(), "two.txt", b"Blessed are the peacemakers");
    write(input.path(), "three.txt", b"Rejoice and be glad");
    write(input.path(), "skip.md", b"Not indexed");
    write(input.path(), "nested/four.txt", b"Not reached without recursion");

    let summary = run_index(&text_opts(input.path(), out.path())).unwrap();
    assert_eq!(summary.files_seen, 3);
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.written, 3);
    assert_eq!(summary.output, only_index_file(out.path()));

    let records = read_records(&summary.output);
    assert_eq!(records.len(), 3);
    let one = records.iter().find(|r| r["pdf"] == "one.txt").unwrap();
    assert_eq!(one["keywords"], "blessed merciful");
    assert_eq!(one["audio"], "one.mp3");
}

#[test]
fn test_run_index_recursive_sqlite() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(input.path(), "one.txt", b"Blessed are the merciful");
    write(input.path(), "nested/deeper/two.txt", b"Blessed are the peacemakers");

    let opts = Opts {
        recurse: true,
        index_type: IndexType::Sqlite,
        ..text_opts(input.path(), out.path())
    };
    let summary = run_index(&opts).unwrap();
    assert_eq!(summary.files_seen, 2);
    assert_eq!(summary.output, out.path().join("docdex-index.db"));

    let conn = Connection::open(&summary.output).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 2);
    // Stop words are dropped from keywords but the raw text stays searchable.
    let hits: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM documents_fts WHERE documents_fts MATCH 'are'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(hits, 2);

    // A second run must not overwrite the existing index.
    assert!(run_index(&opts).is_err());
}

#[test]
fn test_run_index_compressed_pretty_json() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(input.path(), "one.txt", b"Blessed are the merciful");

    let opts = Opts {
        compress: true,
        pretty: true,
        ..text_opts(input.path(), out.path())
    };
    let summary = run_index(&opts).unwrap();
    assert!(summary.output.to_str().unwrap().ends_with(".json.gz"));

    let mut s = String::new();
    GzDecoder::new(std::fs::File::open(&summary.output).unwrap())
        .read_to_string(&mut s)
        .unwrap();
    let records: Vec<Value> = serde_json::from_str(&s).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn test_run_index_reports_task_failures() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(input.path(), "good.txt", b"Blessed are the merciful");
    write(input.path(), "bad.txt", &[0xff, 0xfe, 0xfd]);

    let err = run_index(&text_opts(input.path(), out.path())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RunError>(),
        Some(RunError::TasksFailed { failures: 1 })
    ));
    // The artifact is still sealed and holds the good record.
    let records = read_records(&only_index_file(out.path()));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["pdf"], "good.txt");
}

#[test]
fn test_run_index_extra_stop_words() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let cfg = TempDir::new().unwrap();
    write(input.path(), "one.txt", b"Blessed are the merciful");
    let stop = write(cfg.path(), "stop.txt", b"blessed\n");

    let opts = Opts {
        stopwords: Some(stop),
        ..text_opts(input.path(), out.path())
    };
    let summary = run_index(&opts).unwrap();
    let records = read_records(&summary.output);
    assert_eq!(records[0]["keywords"], "merciful");
}

#[test]
fn test_run_index_empty_directory() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let summary = run_index(&text_opts(input.path(), out.path())).unwrap();
    assert_eq!(summary.files_seen, 0);
    assert!(read_records(&summary.output).is_empty());
}

#[test]
fn test_back_to_back_runs_keep_separate_indexes() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(input.path(), "one.txt", b"Blessed are the merciful");
    let opts = text_opts(input.path(), out.path());

    let first = run_index(&opts).unwrap();
    write(input.path(), "two.txt", b"Blessed are the peacemakers");
    let second = run_index(&opts).unwrap();

    assert_ne!(first.output, second.output);
    assert_eq!(read_records(&first.output).len(), 1);
    assert_eq!(read_records(&second.output).len(), 2);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 2);
}

// --- validation ---

#[test]
fn test_invalid_opts_fail_before_output_is_created() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let base = text_opts(input.path(), out.path());

    let cases = [
        Opts {
            input_dirs: Vec::new(),
            ..base.clone()
        },
        Opts {
            input_dirs: vec![input.path().join("missing")],
            ..base.clone()
        },
        Opts {
            output_dir: out.path().join("missing"),
            ..base.clone()
        },
        Opts {
            workers: 0,
            ..base.clone()
        },
        Opts {
            min_token_length: 0,
            ..base.clone()
        },
        Opts {
            metadata: Some(input.path().join("meta.json")),
            ..base.clone()
        },
    ];
    for opts in &cases {
        assert!(opts.validate().is_err());
        assert!(run_index(opts).is_err());
    }
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

// --- configuration ---

#[test]
fn test_cli_flags_build_opts() {
    let input = TempDir::new().unwrap();
    let dir = input.path().to_str().unwrap();
    let cli = Cli::try_parse_from([
        "docdex", "-i", dir, "-i", dir, "-w", "3", "-x", "sqlite", "-c", "-r", "-l", "3",
        "--timeout", "30", "-e", "txt",
    ])
    .unwrap();
    let opts = build_opts(&cli).unwrap();
    assert_eq!(opts.input_dirs.len(), 2);
    assert_eq!(opts.workers, 3);
    assert_eq!(opts.index_type, IndexType::Sqlite);
    assert!(opts.compress);
    assert!(opts.recurse);
    assert!(!opts.pretty);
    assert_eq!(opts.min_token_length, 3);
    assert_eq!(opts.shutdown_timeout, Duration::from_secs(30));
    assert_eq!(opts.extensions, vec!["txt".to_string()]);
}

#[test]
fn test_config_file_then_cli_overrides() {
    let cfg = TempDir::new().unwrap();
    let path = write(
        cfg.path(),
        "docdex.toml",
        br#"
[settings]
workers = 4
recurse = true
index_type = "sqlite"
extensions = ["pdf", "txt"]
timeout = 90
"#,
    );
    let cli = Cli::try_parse_from([
        "docdex",
        "--config",
        path.to_str().unwrap(),
        "-w",
        "2",
        "-i",
        cfg.path().to_str().unwrap(),
    ])
    .unwrap();
    let opts = build_opts(&cli).unwrap();
    assert_eq!(opts.workers, 2);
    assert!(opts.recurse);
    assert_eq!(opts.index_type, IndexType::Sqlite);
    assert_eq!(opts.extensions.len(), 2);
    assert_eq!(opts.shutdown_timeout, Duration::from_secs(90));
}

#[test]
fn test_config_file_rejects_unknown_keys() {
    assert!(DocdexToml::from_toml("[settings]\nthreads = 4\n").is_err());
    let file = DocdexToml::from_toml("[settings]\npretty = true\n").unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts);
    assert!(opts.pretty);
    assert_eq!(opts.workers, 10);
}

#[test]
fn test_missing_explicit_config_is_error() {
    let cfg = TempDir::new().unwrap();
    let missing = cfg.path().join("nope.toml");
    let cli = Cli::try_parse_from(["docdex", "--config", missing.to_str().unwrap()]).unwrap();
    assert!(build_opts(&cli).is_err());
}
