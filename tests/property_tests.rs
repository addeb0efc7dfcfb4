//! Property-based tests for the chunking strategies.
//!
//! These tests verify that chunking strategies maintain key invariants:
//! - Coverage: character windows reconstruct the input
//! - Ordered: windows start strictly later than their predecessor
//! - Bounds: every window except the last is exactly `size` long
//! - Contiguity: `chunk_index` runs 0, 1, 2, ... in emission order

use proptest::prelude::*;
use ragprep::metadata::{CHUNK_INDEX, END_CHAR, START_CHAR};
use ragprep::{CharacterChunker, Chunk, Chunker, Metadata, SentenceChunker};

// =============================================================================
// Test Generators
// =============================================================================

/// Arbitrary text, including multibyte characters.
fn arbitrary_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("(.|\n){0,500}").unwrap()
}

/// Size with an overlap strictly below it.
fn size_and_overlap() -> impl Strategy<Value = (usize, usize)> {
    (1usize..200).prop_flat_map(|size| (Just(size), 0..size))
}

/// Text with sentence-like structure
fn sentence_like_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::string::string_regex("[A-Za-z]{2,15}").unwrap(), 1..60).prop_map(
        |words| {
            let mut result = String::new();
            for (i, word) in words.iter().enumerate() {
                result.push_str(word);
                match i % 7 {
                    3 => result.push_str("! "),
                    6 => result.push_str(".  "),
                    _ => result.push(' '),
                }
            }
            result
        },
    )
}

// =============================================================================
// Invariant Helpers
// =============================================================================

fn span(chunk: &Chunk) -> (usize, usize) {
    let start = chunk.metadata.get_i64(START_CHAR).unwrap() as usize;
    let end = chunk.metadata.get_i64(END_CHAR).unwrap() as usize;
    (start, end)
}

/// Rebuild the text from the non-overlapping suffix of each window.
fn reconstruct(chunks: &[Chunk]) -> String {
    let mut out = String::new();
    let mut covered = 0;
    for chunk in chunks {
        let (start, _) = span(chunk);
        out.extend(chunk.text.chars().skip(covered - start));
        covered = span(chunk).1;
    }
    out
}

fn indices_contiguous(chunks: &[Chunk]) -> bool {
    chunks
        .iter()
        .enumerate()
        .all(|(i, c)| c.metadata.get_i64(CHUNK_INDEX) == Some(i as i64))
}

// =============================================================================
// CharacterChunker Tests
// =============================================================================

proptest! {
    #[test]
    fn character_windows_reconstruct_input(text in arbitrary_text(), (size, overlap) in size_and_overlap()) {
        let chunker = CharacterChunker::new(size, overlap).unwrap();
        let chunks: Vec<_> = chunker.chunk(&text, &Metadata::new()).collect();
        prop_assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn character_windows_ordered(text in arbitrary_text(), (size, overlap) in size_and_overlap()) {
        let chunker = CharacterChunker::new(size, overlap).unwrap();
        let chunks: Vec<_> = chunker.chunk(&text, &Metadata::new()).collect();
        for pair in chunks.windows(2) {
            let (prev_start, prev_end) = span(&pair[0]);
            let (start, _) = span(&pair[1]);
            prop_assert!(start > prev_start);
            prop_assert_eq!(start, prev_end - overlap);
        }
    }

    #[test]
    fn character_windows_respect_size(text in arbitrary_text(), (size, overlap) in size_and_overlap()) {
        let chunker = CharacterChunker::new(size, overlap).unwrap();
        let chunks: Vec<_> = chunker.chunk(&text, &Metadata::new()).collect();

        for chunk in chunks.iter().take(chunks.len().saturating_sub(1)) {
            prop_assert_eq!(chunk.len(), size);
        }
        if let Some(last) = chunks.last() {
            prop_assert!(last.len() <= size);
            prop_assert_eq!(span(last).1, text.chars().count());
        }
    }

    #[test]
    fn character_text_matches_span(text in arbitrary_text(), (size, overlap) in size_and_overlap()) {
        let chars: Vec<char> = text.chars().collect();
        let chunker = CharacterChunker::new(size, overlap).unwrap();
        for chunk in chunker.chunk(&text, &Metadata::new()) {
            let (start, end) = span(&chunk);
            let expected: String = chars[start..end].iter().collect();
            prop_assert_eq!(chunk.text, expected);
        }
    }

    #[test]
    fn character_indices_contiguous(text in arbitrary_text(), (size, overlap) in size_and_overlap()) {
        let chunker = CharacterChunker::new(size, overlap).unwrap();
        let chunks: Vec<_> = chunker.chunk(&text, &Metadata::new()).collect();
        prop_assert!(indices_contiguous(&chunks));
    }
}

// =============================================================================
// SentenceChunker Tests
// =============================================================================

proptest! {
    #[test]
    fn sentence_indices_contiguous(text in sentence_like_text(), (size, overlap) in size_and_overlap()) {
        let chunker = SentenceChunker::new(size, overlap).unwrap();
        let chunks: Vec<_> = chunker.chunk(&text, &Metadata::new()).collect();
        prop_assert!(!chunks.is_empty());
        prop_assert!(indices_contiguous(&chunks));
    }

    #[test]
    fn sentence_chunks_keep_every_word(text in sentence_like_text(), (size, overlap) in size_and_overlap()) {
        let chunker = SentenceChunker::new(size, overlap).unwrap();
        let joined: String = chunker
            .chunk(&text, &Metadata::new())
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join(" ");
        for word in text.split_whitespace() {
            prop_assert!(joined.contains(word));
        }
    }

    #[test]
    fn sentence_chunks_never_start_mid_sentence(text in sentence_like_text(), size in 20usize..200) {
        let chunker = SentenceChunker::new(size, 0).unwrap();
        let sentences = ragprep::SentenceBoundaries::Punctuation.split(&text);
        for chunk in chunker.chunk(&text, &Metadata::new()) {
            prop_assert!(sentences.iter().any(|s| chunk.text.starts_with(s)));
        }
    }
}

// =============================================================================
// Consistency Tests
// =============================================================================

proptest! {
    #[test]
    fn chunking_is_deterministic(text in arbitrary_text(), (size, overlap) in size_and_overlap()) {
        let meta = Metadata::new().with("source_id", "doc-1");
        let chunker = CharacterChunker::new(size, overlap).unwrap();
        let first: Vec<_> = chunker.chunk(&text, &meta).collect();
        let second: Vec<_> = chunker.chunk(&text, &meta).collect();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn unicode_windows_never_split_chars() {
    let text = "Hello 世界! Привет мир! مرحبا بالعالم";
    let chunker = CharacterChunker::new(7, 2).unwrap();
    for chunk in chunker.chunk(text, &Metadata::new()) {
        assert!(chunk.len() <= 7);
        assert!(text.contains(&chunk.text));
    }
}
