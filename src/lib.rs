//! # ragprep
//!
//! Document preparation for retrieval-augmented generation (RAG) pipelines:
//! load heterogeneous documents, split them into bounded, overlapping,
//! metadata-rich chunks, and write them out as JSONL.
//!
//! ## The Problem
//!
//! Embedding models and LLMs have context windows. Documents don't fit. They
//! need to be split into pieces small enough to embed and retrieve, each
//! carrying enough provenance to trace a hit back to its source.
//!
//! ```text
//! report.pdf ─┐
//! notes/*.md ─┼─▶ load ─▶ hooks ─▶ chunk ─▶ {"text", "metadata", "chunk_id"} per line
//! "raw text" ─┘
//! ```
//!
//! ## Chunking Strategies
//!
//! ### Character Windows (`"character"`)
//!
//! Split every N characters with M characters of overlap.
//!
//! ```text
//! Document: "The quick brown fox jumps over the lazy dog."
//! Size: 20, Overlap: 5
//!
//! Chunk 0: "The quick brown fox "  [0..20]
//! Chunk 1: " fox jumps over the "  [15..35]  <- overlap preserves "fox"
//! Chunk 2: " the lazy dog."        [30..44]
//! ```
//!
//! **When to use**: Homogeneous content, baselines.
//! **Weakness**: Ignores linguistic boundaries.
//!
//! ### Token Windows (`"token"`)
//!
//! The same windows measured in tokens of a BPE encoding (`cl100k_base` by
//! default), so chunks line up with embedding-model budgets. Falls back to
//! character windows when no tokenizer is available.
//!
//! ### Sentence Packing (`"sentence"`)
//!
//! Pack whole sentences up to the size budget; overlap is carried as whole
//! trailing sentences.
//!
//! **When to use**: Prose, articles, documentation.
//! **Weakness**: The boundary heuristic splits after abbreviations like "Dr.".
//!
//! ### Pass-Through (`"none"`)
//!
//! One chunk per document, for content that is already small.
//!
//! ## Quick Start
//!
//! ```rust
//! use ragprep::{CharacterChunker, Chunker, Metadata, SentenceChunker};
//!
//! let text = "The quick brown fox jumps over the lazy dog. \
//!             Pack my box with five dozen liquor jugs.";
//! let meta = Metadata::new().with("source_id", "pangrams");
//!
//! let chunker = CharacterChunker::new(50, 10).unwrap();
//! let chunks: Vec<_> = chunker.chunk(text, &meta).collect();
//! assert_eq!(chunks[0].chunk_id.as_deref(), Some("pangrams_chunk_0"));
//!
//! let chunker = SentenceChunker::new(50, 0).unwrap();
//! assert_eq!(chunker.chunk(text, &meta).count(), 2);
//! ```
//!
//! Strategies can also be chosen by name, including custom ones:
//!
//! ```rust
//! use ragprep::{register_default_strategy, resolve, Chunker, Metadata, NoChunker, StrategyParams};
//!
//! register_default_strategy("whole_document", || NoChunker);
//!
//! let chunker = resolve("whole_document", &StrategyParams::new(500, 50)).unwrap();
//! assert_eq!(chunker.chunk("tiny", &Metadata::new()).count(), 1);
//! ```
//!
//! ## End to End
//!
//! ```rust,no_run
//! use ragprep::{Config, Pipeline};
//!
//! let config = Config { chunk_strategy: "token".into(), chunk_size: 512, chunk_overlap: 64, ..Config::default() };
//! let written = Pipeline::new(config)?.prepare_to_jsonl("docs/", "chunks.jsonl")?;
//! println!("{written} chunks");
//! # Ok::<(), ragprep::Error>(())
//! ```
//!
//! ## Cargo Features
//!
//! | Feature    | Enables                          | Default |
//! |------------|----------------------------------|---------|
//! | `tiktoken` | BPE tokenizers for token windows | yes     |
//! | `pdf`      | PDF loading                      | yes     |
//! | `docx`     | DOCX loading                     | yes     |
//! | `html`     | HTML loading                     | yes     |

mod character;
mod chunk;
mod config;
mod error;
mod loader;
mod passthrough;
mod pipeline;
mod registry;
mod sentence;
mod sink;
mod token;
mod window;

pub mod metadata;
pub mod tokenizer;

pub use character::CharacterChunker;
pub use chunk::Chunk;
pub use config::Config;
pub use error::{BoxError, Error, LoadError, Result, TokenizerError, BUILTIN_STRATEGIES};
pub use loader::{
    CsvLoader, DirectoryLoader, Document, DocxLoader, HtmlLoader, Loader, LoaderRegistry,
    MarkdownLoader, PathFilter, PdfLoader, Source, StringLoader, TextLoader,
};
pub use metadata::{Metadata, Value};
pub use passthrough::NoChunker;
pub use pipeline::{Documents, MetadataHook, Pipeline};
pub use registry::{
    register_default_strategy, register_strategy, resolve, AnyChunker, ChunkerRegistry,
    StrategyKind, StrategyParams,
};
pub use sentence::{SentenceBoundaries, SentenceChunker};
pub use sink::{write_jsonl, JsonlSink, Sink, VecSink};
pub use token::TokenChunker;

/// Lazy sequence of chunks produced by one [`Chunker::chunk`] call.
///
/// Forward-only and finite; it borrows the text and metadata it was built from.
pub type Chunks<'a> = Box<dyn Iterator<Item = Chunk> + 'a>;

/// A text chunking strategy.
///
/// All chunkers implement this trait, enabling polymorphic usage:
///
/// ```rust
/// use ragprep::{CharacterChunker, Chunk, Chunker, Metadata, SentenceChunker};
///
/// fn chunk_document(chunker: &dyn Chunker, text: &str) -> Vec<Chunk> {
///     chunker.chunk(text, &Metadata::new()).collect()
/// }
///
/// let character = CharacterChunker::new(100, 20).unwrap();
/// let sentence = SentenceChunker::new(100, 20).unwrap();
///
/// let text = "Hello world. This is a test.";
/// let chunks1 = chunk_document(&character, text);
/// let chunks2 = chunk_document(&sentence, text);
/// ```
pub trait Chunker: Send + Sync {
    /// Split text into chunks.
    ///
    /// Every chunk gets its own copy of `metadata` plus whatever positional
    /// keys the strategy adds. Indices are zero-based and contiguous.
    fn chunk<'a>(&'a self, text: &'a str, metadata: &'a Metadata) -> Chunks<'a>;
}
