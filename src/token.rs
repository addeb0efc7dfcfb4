//! Token-window chunking.
//!
//! The same sliding window as [`CharacterChunker`], measured in tokens:
//!
//! ```text
//! text   ──encode──▶ [t0 t1 t2 ... tn]
//! window             [t0 .. t49] [t40 .. t89] ...
//! chunk  ◀─decode──  "..."       "..."
//! ```
//!
//! Token windows line up with the budgets of embedding models, which count
//! tokens rather than characters.
//!
//! ## Fallback
//!
//! When no tokenizer is available the chunker behaves exactly like a
//! [`CharacterChunker`] with the same `size` and `overlap`. This never
//! surfaces as an error from [`Chunker::chunk`]; the strategy resolver is
//! the place that reports why the tokenizer is missing.

use crate::character::window_chunk;
use crate::metadata::{Metadata, END_TOKEN, START_TOKEN};
use crate::tokenizer::{probe, TokenizerAvailability, TokenizerChoice};
use crate::window::{self, Windows};
use crate::{CharacterChunker, Chunker, Chunks, Result};

/// Token-window chunker with a character-window fallback.
///
/// ## Example
///
/// ```rust
/// use ragprep::{Chunker, Metadata, TokenChunker};
/// use ragprep::tokenizer::TokenizerChoice;
///
/// // With tokenization disabled the character fallback is used.
/// let chunker = TokenChunker::new(5, 1, TokenizerChoice::Disabled).unwrap();
/// let chunks: Vec<_> = chunker.chunk("Test text", &Metadata::new()).collect();
/// assert!(!chunks.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct TokenChunker {
    size: usize,
    overlap: usize,
    tokenizer: TokenizerAvailability,
    fallback: CharacterChunker,
}

impl TokenChunker {
    /// Create a token chunker, loading the requested tokenizer.
    ///
    /// A tokenizer that fails to load is not an error here; it is recorded
    /// and every call uses the character fallback.
    ///
    /// # Errors
    ///
    /// Fails if `size == 0` or `overlap >= size`.
    pub fn new(size: usize, overlap: usize, tokenizer: TokenizerChoice) -> Result<Self> {
        Self::with_availability(size, overlap, probe(&tokenizer))
    }

    /// Create a token chunker from an already-probed tokenizer.
    ///
    /// # Errors
    ///
    /// Fails if `size == 0` or `overlap >= size`.
    pub fn with_availability(
        size: usize,
        overlap: usize,
        tokenizer: TokenizerAvailability,
    ) -> Result<Self> {
        window::validate(size, overlap)?;
        Ok(Self {
            size,
            overlap,
            tokenizer,
            fallback: CharacterChunker::new(size, overlap)?,
        })
    }

    /// Window size in tokens.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Overlap in tokens.
    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// The tokenizer state this chunker was built with.
    #[must_use]
    pub fn tokenizer(&self) -> &TokenizerAvailability {
        &self.tokenizer
    }

    /// Whether calls will fall back to character windows.
    #[must_use]
    pub fn uses_fallback(&self) -> bool {
        !self.tokenizer.is_ready()
    }
}

impl Chunker for TokenChunker {
    fn chunk<'a>(&'a self, text: &'a str, metadata: &'a Metadata) -> Chunks<'a> {
        let tokenizer = match &self.tokenizer {
            TokenizerAvailability::Ready(t) if !text.is_empty() => t,
            _ => return self.fallback.chunk(text, metadata),
        };

        let tokens = tokenizer.encode(text);
        Box::new(
            Windows::new(tokens.len(), self.size, self.overlap)
                .enumerate()
                .map(move |(index, span)| {
                    let body = tokenizer.decode(&tokens[span.clone()]);
                    window_chunk(body, metadata, index, &span, (START_TOKEN, END_TOKEN))
                }),
        )
    }
}
