//! Character-window chunking with overlap.
//!
//! The baseline strategy: split every N characters with M characters of overlap.
//!
//! ## How It Works
//!
//! ```text
//! size = 10, overlap = 3
//!
//! Document: "abcdefghijklmnopqrstuvwxyz"
//!
//! Chunk 0: "abcdefghij"   [0..10]
//! Chunk 1: "hijklmnopq"   [7..17]   <- starts at 10 - 3 = 7
//! Chunk 2: "opqrstuvwx"   [14..24]  <- starts at 17 - 3 = 14
//! Chunk 3: "vwxyz"        [21..26]  <- final chunk may be shorter
//! ```
//!
//! Offsets count Unicode scalar values, not bytes, so `"日本語"` is three
//! characters long and a window never cuts a multibyte sequence.
//!
//! ## Why Overlap?
//!
//! Without overlap, information at chunk boundaries is lost. If a key sentence
//! spans two chunks, neither chunk captures it fully:
//!
//! ```text
//! "The answer is 42"
//!         ↓
//! No overlap:  ["The answer i", "s 42"]  <- broken!
//! With overlap: ["The answer is", "answer is 42"] <- both have context
//! ```
//!
//! A common heuristic: 10-20% overlap (e.g., size=1000, overlap=200).

use std::ops::Range;

use crate::metadata::{Metadata, CHUNK_INDEX, END_CHAR, START_CHAR};
use crate::window::{self, Windows};
use crate::{Chunk, Chunker, Chunks, Result};

/// Character-window chunker with configurable overlap.
///
/// ## Example
///
/// ```rust
/// use ragprep::{CharacterChunker, Chunker, Metadata};
///
/// let chunker = CharacterChunker::new(100, 20).unwrap();
/// let text = "A".repeat(250);
/// let chunks: Vec<_> = chunker.chunk(&text, &Metadata::new()).collect();
///
/// // starts at 0, 80, 160; the third window reaches the end
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[0].len(), 100);
/// assert_eq!(chunks[1].metadata.get_i64("start_char"), Some(80));
/// ```
#[derive(Debug, Clone)]
pub struct CharacterChunker {
    size: usize,
    overlap: usize,
}

impl CharacterChunker {
    /// Create a new character-window chunker.
    ///
    /// # Arguments
    ///
    /// * `size` - Maximum chunk size in characters
    /// * `overlap` - Characters shared by adjacent chunks
    ///
    /// # Errors
    ///
    /// Fails if `size == 0` or `overlap >= size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        window::validate(size, overlap)?;
        Ok(Self { size, overlap })
    }

    /// Create a chunker with no overlap.
    ///
    /// # Errors
    ///
    /// Fails if `size == 0`.
    pub fn no_overlap(size: usize) -> Result<Self> {
        Self::new(size, 0)
    }

    /// Window size in characters.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Overlap in characters.
    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Chunker for CharacterChunker {
    fn chunk<'a>(&'a self, text: &'a str, metadata: &'a Metadata) -> Chunks<'a> {
        // Byte offset of every char, plus the end of the text.
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let n_chars = offsets.len() - 1;

        Box::new(
            Windows::new(n_chars, self.size, self.overlap)
                .enumerate()
                .map(move |(index, span)| {
                    let body = &text[offsets[span.start]..offsets[span.end]];
                    window_chunk(body, metadata, index, &span, (START_CHAR, END_CHAR))
                }),
        )
    }
}

/// Build a window chunk: copied metadata, index, span keys and indexed id.
pub(crate) fn window_chunk(
    text: impl Into<String>,
    base: &Metadata,
    index: usize,
    span: &Range<usize>,
    (start_key, end_key): (&str, &str),
) -> Chunk {
    let mut metadata = base.clone();
    metadata.insert(CHUNK_INDEX, index);
    metadata.insert(start_key, span.start);
    metadata.insert(end_key, span.end);
    Chunk::new(text, metadata, Some(base.chunk_id(index)))
}
