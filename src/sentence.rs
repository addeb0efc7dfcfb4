//! Sentence-aware chunking.
//!
//! Packs whole sentences into chunks of roughly `size` characters and carries
//! overlap as whole trailing sentences instead of mid-sentence characters.
//!
//! ## The Algorithm
//!
//! ```text
//! size = 40, overlap = 15
//!
//! sentences: [S0 (18)] [S1 (12)] [S2 (20)] [S3 (9)]
//!
//! buffer: S0 S1          (30)   + S2 would be 50 > 40 → flush "S0 S1"
//! overlap: S1 fits (12 <= 15), S0 would not
//! buffer: S1 S2          (32)   + S3 would be 41 > 40 → flush "S1 S2"
//! overlap: S2 (20) > 15 → none
//! buffer: S3                     end → flush "S3"
//! ```
//!
//! Sizes are character counts of the sentences; the joining spaces are not
//! counted. A sentence longer than `size` is emitted whole, so the bound is
//! best-effort for this strategy.
//!
//! ## Finding Sentences
//!
//! The default heuristic breaks after `.`, `!` or `?` followed by
//! whitespace. It does not know about abbreviations, decimals or quoted
//! punctuation:
//!
//! ```text
//! "Dr. Smith paid 3.50 dollars." → ["Dr.", "Smith paid 3.50 dollars."]
//! ```
//!
//! [`SentenceBoundaries::Unicode`] switches to Unicode Standard Annex #29
//! segmentation, which handles more of these cases at the cost of
//! predictability.

use unicode_segmentation::UnicodeSegmentation;

use crate::metadata::{Metadata, CHUNK_INDEX};
use crate::window;
use crate::{CharacterChunker, Chunk, Chunker, Chunks, Result};

/// How sentence boundaries are detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SentenceBoundaries {
    /// Break after `.`, `!` or `?` followed by whitespace.
    #[default]
    Punctuation,
    /// UAX #29 sentence segmentation.
    Unicode,
}

impl SentenceBoundaries {
    /// Split text into non-empty sentences.
    #[must_use]
    pub fn split(self, text: &str) -> Vec<&str> {
        match self {
            Self::Punctuation => split_on_terminators(text),
            Self::Unicode => text
                .split_sentence_bounds()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// Break after a terminator followed by whitespace; the whitespace run is dropped.
fn split_on_terminators(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            let mut resume = text.len();
            while let Some(&(j, next)) = chars.peek() {
                if next.is_whitespace() {
                    chars.next();
                } else {
                    resume = j;
                    break;
                }
            }
            sentences.push(&text[start..i]);
            start = resume;
            prev = None;
            continue;
        }
        prev = Some(c);
    }

    sentences.push(&text[start..]);
    sentences.retain(|s| !s.is_empty());
    sentences
}

/// Sentence-aware chunker.
///
/// ## Example
///
/// ```rust
/// use ragprep::{Chunker, Metadata, SentenceChunker};
///
/// let chunker = SentenceChunker::new(100, 10).unwrap();
/// let chunks: Vec<_> = chunker.chunk("One. Two. Three.", &Metadata::new()).collect();
///
/// assert_eq!(chunks.len(), 1);
/// assert_eq!(chunks[0].text, "One. Two. Three.");
/// ```
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    size: usize,
    overlap: usize,
    boundaries: SentenceBoundaries,
    fallback: CharacterChunker,
}

impl SentenceChunker {
    /// Create a sentence chunker using the punctuation heuristic.
    ///
    /// # Arguments
    ///
    /// * `size` - Target chunk size in characters
    /// * `overlap` - Maximum characters of whole sentences carried forward
    ///
    /// # Errors
    ///
    /// Fails if `size == 0` or `overlap >= size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        window::validate(size, overlap)?;
        Ok(Self {
            size,
            overlap,
            boundaries: SentenceBoundaries::default(),
            fallback: CharacterChunker::new(size, overlap)?,
        })
    }

    /// Use a different sentence boundary detector.
    #[must_use]
    pub fn with_boundaries(mut self, boundaries: SentenceBoundaries) -> Self {
        self.boundaries = boundaries;
        self
    }

    /// Target chunk size in characters.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Overlap budget in characters.
    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Chunker for SentenceChunker {
    fn chunk<'a>(&'a self, text: &'a str, metadata: &'a Metadata) -> Chunks<'a> {
        let sentences = self.boundaries.split(text);
        if sentences.is_empty() {
            return self.fallback.chunk(text, metadata);
        }

        Box::new(SentenceChunks {
            sentences: sentences.into_iter(),
            size: self.size,
            overlap: self.overlap,
            metadata,
            buffer: Vec::new(),
            buffered: 0,
            index: 0,
        })
    }
}

/// Lazy state of one [`SentenceChunker::chunk`] call.
struct SentenceChunks<'a> {
    sentences: std::vec::IntoIter<&'a str>,
    size: usize,
    overlap: usize,
    metadata: &'a Metadata,
    buffer: Vec<(&'a str, usize)>,
    buffered: usize,
    index: usize,
}

impl<'a> SentenceChunks<'a> {
    fn emit(&mut self, sentences: &[(&'a str, usize)]) -> Chunk {
        let text = sentences
            .iter()
            .map(|(s, _)| *s)
            .collect::<Vec<_>>()
            .join(" ");
        let mut metadata = self.metadata.clone();
        metadata.insert(CHUNK_INDEX, self.index);
        let chunk = Chunk::new(text, metadata, Some(self.metadata.chunk_id(self.index)));
        self.index += 1;
        chunk
    }

    /// Trailing sentences of `flushed` whose total length fits in the overlap.
    fn carry_over(&self, flushed: &[(&'a str, usize)]) -> Vec<(&'a str, usize)> {
        let mut total = 0;
        let keep = flushed
            .iter()
            .rev()
            .take_while(|(_, len)| {
                total += len;
                total <= self.overlap
            })
            .count();
        flushed[flushed.len() - keep..].to_vec()
    }
}

impl Iterator for SentenceChunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        // `while let` so the iterator borrow ends before `emit` needs `&mut self`.
        #[allow(clippy::while_let_on_iterator)]
        while let Some(sentence) = self.sentences.next() {
            let len = sentence.chars().count();
            if self.buffered + len <= self.size {
                self.buffer.push((sentence, len));
                self.buffered += len;
                continue;
            }

            let flushed = std::mem::take(&mut self.buffer);
            self.buffer = self.carry_over(&flushed);
            self.buffer.push((sentence, len));
            self.buffered = self.buffer.iter().map(|(_, n)| n).sum();

            if !flushed.is_empty() {
                return Some(self.emit(&flushed));
            }
        }

        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        self.buffered = 0;
        Some(self.emit(&rest))
    }
}
