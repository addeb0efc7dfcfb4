//! The Chunk type: a segment of text with its metadata and id.

use serde::{Deserialize, Serialize};

use crate::metadata::{Metadata, CHUNK_INDEX};

/// A segment of a document, ready to be embedded or indexed.
///
/// ## Identity
///
/// `chunk_id` is derived from the document's `source_id`:
///
/// ```rust
/// use ragprep::{CharacterChunker, Chunker, Metadata};
///
/// let meta = Metadata::new().with("source_id", "notes.txt");
/// let chunker = CharacterChunker::new(10, 0).unwrap();
/// let chunks: Vec<_> = chunker.chunk("abcdefghijklmno", &meta).collect();
///
/// assert_eq!(chunks[0].chunk_id.as_deref(), Some("notes.txt_chunk_0"));
/// assert_eq!(chunks[1].chunk_id.as_deref(), Some("notes.txt_chunk_1"));
/// ```
///
/// ## Serialization
///
/// Serializes to exactly three keys, which is the JSONL record format:
///
/// ```text
/// {"text": "...", "metadata": {...}, "chunk_id": "notes.txt_chunk_0"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text.
    pub text: String,
    /// Base document metadata plus chunker-added keys.
    #[serde(default)]
    pub metadata: Metadata,
    /// Identifier, unique within the source document.
    #[serde(default)]
    pub chunk_id: Option<String>,
}

impl Chunk {
    /// Create a new chunk.
    #[must_use]
    pub fn new(text: impl Into<String>, metadata: Metadata, chunk_id: Option<String>) -> Self {
        Self {
            text: text.into(),
            metadata,
            chunk_id,
        }
    }

    /// The length of this chunk in chars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether this chunk is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The `chunk_index` recorded by the chunker, if any.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.metadata
            .get_i64(CHUNK_INDEX)
            .and_then(|n| usize::try_from(n).ok())
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk {{ id: {}, len: {} }}",
            self.chunk_id.as_deref().unwrap_or("-"),
            self.len()
        )
    }
}
