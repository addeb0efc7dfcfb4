//! End-to-end pipeline tests over real files.

use std::fs;
use std::path::Path;

use ragprep::metadata::{FILE_TYPE, ROW_INDEX, SOURCE_ID};
use ragprep::{Chunk, Chunker, Config, Error, LoadError, Metadata, NoChunker, Pipeline, Source};
use serde_json::Value as Json;

fn config(size: usize, overlap: usize) -> Config {
    Config {
        chunk_size: size,
        chunk_overlap: overlap,
        tokenizer: "none".into(),
        ..Config::default()
    }
}

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn read_jsonl(path: &Path) -> Vec<Json> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn source_ids(chunks: &[Chunk]) -> Vec<String> {
    let mut ids: Vec<String> = chunks.iter().map(|c| c.metadata.source_id()).collect();
    ids.dedup();
    ids
}

// =============================================================================
// Directory → JSONL
// =============================================================================

#[test]
fn directory_to_jsonl() {
    let input = tempfile::tempdir().unwrap();
    write(input.path(), "a.txt", &"alpha ".repeat(50));
    write(input.path(), "nested/b.md", "# Title\n\nSome markdown body.");
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("chunks.jsonl");

    let pipeline = Pipeline::new(config(100, 10)).unwrap();
    let written = pipeline.prepare_to_jsonl(input.path(), &output).unwrap();

    let records = read_jsonl(&output);
    assert_eq!(records.len(), written);
    // a.txt is 300 chars: windows at 0, 90, 180, 270.
    assert_eq!(written, 5);

    for record in &records {
        let obj = record.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["chunk_id", "metadata", "text"]);
    }

    let types: Vec<_> = records
        .iter()
        .map(|r| r["metadata"][FILE_TYPE].as_str().unwrap())
        .collect();
    assert_eq!(types, ["text", "text", "text", "text", "markdown"]);
}

#[test]
fn include_and_exclude_patterns() {
    let input = tempfile::tempdir().unwrap();
    write(input.path(), "keep.txt", "keep me");
    write(input.path(), "notes.md", "markdown");
    write(input.path(), "scratch.tmp.txt", "temporary");

    let config = Config {
        include: vec!["*.txt".into()],
        exclude: vec!["*.tmp.txt".into()],
        ..config(100, 0)
    };
    let chunks: Vec<_> = Pipeline::new(config)
        .unwrap()
        .prepare(input.path())
        .unwrap()
        .collect();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "keep me");
}

#[test]
fn empty_directory_yields_nothing() {
    let input = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("empty.jsonl");

    let written = Pipeline::new(config(100, 0))
        .unwrap()
        .prepare_to_jsonl(input.path(), &output)
        .unwrap();

    assert_eq!(written, 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[test]
fn unsupported_files_are_skipped() {
    let input = tempfile::tempdir().unwrap();
    write(input.path(), "image.png", "not really a png");
    write(input.path(), "Makefile", "all:");

    let count = Pipeline::new(config(100, 0))
        .unwrap()
        .prepare(input.path())
        .unwrap()
        .count();
    assert_eq!(count, 0);
}

#[test]
fn csv_rows_become_documents() {
    let input = tempfile::tempdir().unwrap();
    write(input.path(), "people.csv", "name,city\nAda,London\nGrace,\n");

    let chunks: Vec<_> = Pipeline::new(config(1000, 0))
        .unwrap()
        .prepare(input.path().join("people.csv"))
        .unwrap()
        .collect();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "name: Ada\ncity: London");
    assert_eq!(chunks[1].text, "name: Grace");
    assert_eq!(chunks[1].metadata.get_i64(ROW_INDEX), Some(1));
    assert!(chunks[1].metadata.source_id().ends_with("people.csv_row_1"));
}

// =============================================================================
// Hooks and custom chunkers
// =============================================================================

#[test]
fn hooks_see_every_document() {
    let input = tempfile::tempdir().unwrap();
    write(input.path(), "one.txt", "first");
    write(input.path(), "two.txt", "second");

    let chunks: Vec<_> = Pipeline::new(config(100, 0))
        .unwrap()
        .with_hook(|meta, text| meta.with("length", text.len()))
        .with_hook(|meta, _| {
            let doubled = meta.get_i64("length").unwrap_or(0) * 2;
            meta.with("doubled", doubled)
        })
        .prepare(input.path())
        .unwrap()
        .collect();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].metadata.get_i64("length"), Some(5));
    assert_eq!(chunks[0].metadata.get_i64("doubled"), Some(10));
    assert_eq!(chunks[1].metadata.get_i64("doubled"), Some(12));
}

#[test]
fn custom_chunker_overrides_strategy() {
    struct Lines;
    impl Chunker for Lines {
        fn chunk<'a>(&'a self, text: &'a str, metadata: &'a Metadata) -> ragprep::Chunks<'a> {
            Box::new(text.lines().enumerate().map(move |(i, line)| {
                Chunk::new(line, metadata.clone(), Some(metadata.chunk_id(i)))
            }))
        }
    }

    let chunks: Vec<_> = Pipeline::new(config(1, 0))
        .unwrap()
        .with_chunker(Lines)
        .prepare(Source::Text("a\nb\nc".into()))
        .unwrap()
        .collect();
    let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["a", "b", "c"]);
}

#[test]
fn whole_documents_with_none_strategy() {
    let input = tempfile::tempdir().unwrap();
    write(input.path(), "a.txt", &"x".repeat(5000));
    write(input.path(), "b.txt", "short");

    let config = Config {
        chunk_strategy: "none".into(),
        ..Config::default()
    };
    let chunks: Vec<_> = Pipeline::new(config)
        .unwrap()
        .prepare(input.path())
        .unwrap()
        .collect();

    assert_eq!(chunks.len(), 2);
    assert_eq!(source_ids(&chunks).len(), 2);
    for chunk in &chunks {
        assert_eq!(chunk.chunk_id.as_deref(), chunk.metadata.get_str(SOURCE_ID));
    }
    let whole = NoChunker.chunk("x", &Metadata::new()).count();
    assert_eq!(whole, 1);
}

// =============================================================================
// Output format
// =============================================================================

#[test]
fn jsonl_keeps_non_ascii_unescaped() {
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("unicode.jsonl");

    Pipeline::new(config(100, 0))
        .unwrap()
        .prepare_to_jsonl(Source::Text("Hello 世界! Привет мир!".into()), &output)
        .unwrap();

    let raw = fs::read_to_string(&output).unwrap();
    assert!(raw.contains("世界"));
    assert!(raw.contains("Привет"));
    assert!(!raw.contains("\\u"));
    assert_eq!(raw.lines().count(), 1);
}

#[test]
fn unicode_windows_count_characters() {
    let text = "日本語".repeat(10);
    let chunks: Vec<_> = Pipeline::new(config(10, 0))
        .unwrap()
        .prepare(Source::Text(text))
        .unwrap()
        .collect();
    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().all(|c| c.len() == 10));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn missing_input_leaves_no_output() {
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("never.jsonl");

    let err = Pipeline::new(config(100, 0))
        .unwrap()
        .prepare_to_jsonl(Path::new("/no/such/input.txt"), &output)
        .unwrap_err();

    assert!(matches!(err, Error::Load(LoadError::NotFound(_))));
    assert!(!output.exists());
}

#[test]
fn invalid_size_rejected_up_front() {
    assert!(matches!(
        Pipeline::new(config(0, 0)),
        Err(Error::InvalidChunkSize(0))
    ));
    assert!(matches!(
        Pipeline::new(config(10, 10)),
        Err(Error::OverlapExceedsSize { .. })
    ));
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "ragprep.toml",
        "chunk_strategy = \"sentence\"\nchunk_size = 45\nchunk_overlap = 0\n",
    );

    let config = Config::from_toml_file(dir.path().join("ragprep.toml")).unwrap();
    assert_eq!(config.chunk_strategy, "sentence");
    assert_eq!(config.tokenizer, "cl100k_base");

    let chunks: Vec<_> = Pipeline::new(config)
        .unwrap()
        .prepare(Source::Text(
            "First sentence here. Second sentence here. Third one.".into(),
        ))
        .unwrap()
        .collect();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "First sentence here. Second sentence here.");
}
