use docdex::extract::{
    DocumentExtractor, Extractor, StandardAnalyzer, StopWords, Tokenizer, normalize_text,
    strip_static_patterns,
};
use std::borrow::Cow;
use tempfile::TempDir;

fn tokens(text: &str, min: usize) -> Vec<String> {
    StandardAnalyzer.tokenize(text, min, &StopWords::english())
}

// --- tokenizer ---

#[test]
fn test_stop_words_removed() {
    assert_eq!(tokens("the the the test", 1), vec!["test"]);
}

#[test]
fn test_tokens_lowercased_and_deduplicated_in_order() {
    assert_eq!(
        tokens("Grace upon GRACE, mercy and grace", 1),
        vec!["grace", "upon", "mercy"]
    );
}

#[test]
fn test_min_length_filter() {
    assert_eq!(
        tokens("faith hope charity love", 5),
        vec!["faith", "charity"]
    );
}

#[test]
fn test_max_length_filter() {
    let long_ok = "a".repeat(255);
    let too_long = "b".repeat(256);
    let text = format!("{long_ok} {too_long}");
    assert_eq!(tokens(&text, 1), vec![long_ok]);
}

#[test]
fn test_punctuation_splits_and_apostrophes_kept() {
    assert_eq!(
        tokens("God's people--redeemed; (forever)!", 1),
        vec!["god's", "people", "redeemed", "forever"]
    );
}

#[test]
fn test_empty_text_gives_no_tokens() {
    assert!(tokens("", 1).is_empty());
    assert!(tokens("  \t ", 1).is_empty());
}

// --- stop words ---

#[test]
fn test_stop_words_file_extends_english_set() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stop.txt");
    std::fs::write(&path, "Verily\n\n  selah  \n").unwrap();

    let stop = StopWords::load(&path).unwrap();
    assert!(stop.contains("the"));
    assert!(stop.contains("verily"));
    assert!(stop.contains("SELAH"));
    assert_eq!(stop.len(), StopWords::english().len() + 2);

    let kept = StandardAnalyzer.tokenize("verily the psalm selah", 1, &stop);
    assert_eq!(kept, vec!["psalm"]);
}

#[test]
fn test_missing_stop_words_file_is_error() {
    let dir = TempDir::new().unwrap();
    assert!(StopWords::from_optional_file(Some(&dir.path().join("nope.txt"))).is_err());
    assert!(!StopWords::from_optional_file(None).unwrap().is_empty());
}

// --- normalization ---

#[test]
fn test_copyright_footer_removed() {
    let raw = "Sermon text here\nCOPYRIGHT © 2004 Some Church. All rights reserved.\nMore text";
    assert_eq!(normalize_text(raw), "Sermon text here  More text");
}

#[test]
fn test_strip_static_patterns_borrows_when_clean() {
    assert!(matches!(
        strip_static_patterns("nothing to strip"),
        Cow::Borrowed(_)
    ));
    assert!(matches!(
        strip_static_patterns("COPYRIGHT © 1999 x"),
        Cow::Owned(_)
    ));
}

#[test]
fn test_line_breaks_and_tabs_flattened() {
    assert_eq!(normalize_text("\r\n a\tb\nc \n"), "a b c");
}

// --- extractor ---

#[test]
fn test_document_extractor_reads_text_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "In the beginning\nwas the Word").unwrap();
    let text = DocumentExtractor.extract(&path).unwrap();
    assert_eq!(text.as_deref(), Some("In the beginning was the Word"));
}

#[test]
fn test_document_extractor_blank_file_is_no_text() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blank.txt");
    std::fs::write(&path, " \n\t\n").unwrap();
    assert_eq!(DocumentExtractor.extract(&path).unwrap(), None);
}

#[test]
fn test_document_extractor_errors_on_unreadable_input() {
    let dir = TempDir::new().unwrap();
    assert!(DocumentExtractor.extract(&dir.path().join("missing.txt")).is_err());

    let binary = dir.path().join("binary.txt");
    std::fs::write(&binary, [0xff, 0xfe, 0x00, 0xc3]).unwrap();
    assert!(DocumentExtractor.extract(&binary).is_err());
}
