//! Pass-through chunking: the whole document is one chunk.

use crate::metadata::Metadata;
use crate::{Chunk, Chunker, Chunks};

/// Emits the entire text as a single chunk.
///
/// The chunk id is the bare `source_id` rather than an indexed id, and no
/// positional keys are added. Empty input still yields one (empty) chunk.
///
/// ```rust
/// use ragprep::{Chunker, Metadata, NoChunker};
///
/// let meta = Metadata::new().with("source_id", "test");
/// let chunks: Vec<_> = NoChunker.chunk("whole document", &meta).collect();
///
/// assert_eq!(chunks.len(), 1);
/// assert_eq!(chunks[0].chunk_id.as_deref(), Some("test"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChunker;

impl Chunker for NoChunker {
    fn chunk<'a>(&'a self, text: &'a str, metadata: &'a Metadata) -> Chunks<'a> {
        let chunk = Chunk::new(text, metadata.clone(), Some(metadata.source_id()));
        Box::new(std::iter::once(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let meta = Metadata::new().with("source_id", "test").with("k", 1_i64);
        let chunks: Vec<_> = NoChunker.chunk("abc", &meta).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "abc");
        assert_eq!(chunks[0].metadata, meta);
    }

    #[test]
    fn test_empty_text_still_one_chunk() {
        let chunks: Vec<_> = NoChunker.chunk("", &Metadata::new()).collect();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_empty());
        assert_eq!(chunks[0].chunk_id.as_deref(), Some("doc"));
    }
}
