//! The load → hook → chunk → sink pipeline.
//!
//! ```text
//! Source ──▶ loader ──▶ Document ──▶ hooks ──▶ Chunker ──▶ Chunk ──▶ Sink
//!  dir/file/text        text+meta    meta'     strategy               JSONL
//! ```
//!
//! Everything is lazy: a directory is walked one file at a time, and each
//! document's chunks are produced as they are pulled.
//!
//! ```rust
//! use ragprep::{Config, Pipeline, Source};
//!
//! let config = Config { chunk_size: 10, chunk_overlap: 2, ..Config::default() };
//! let pipeline = Pipeline::new(config)
//!     .unwrap()
//!     .with_hook(|meta, text| meta.with("chars", text.chars().count()));
//!
//! let chunks: Vec<_> = pipeline
//!     .prepare(Source::Text("Some text to split up".into()))
//!     .unwrap()
//!     .collect();
//! assert_eq!(chunks[0].chunk_id.as_deref(), Some("string_input_chunk_0"));
//! assert_eq!(chunks[0].metadata.get_i64("chars"), Some(21));
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::loader::{
    Document, DirectoryLoader, Loader, LoaderRegistry, PathFilter, Source, StringLoader,
    TextLoader,
};
use crate::metadata::Metadata;
use crate::registry;
use crate::sink::{JsonlSink, Sink};
use crate::tokenizer::{Tokenizer, TokenizerChoice};
use crate::{Chunk, Chunker, Chunks, Config, Result};

/// A metadata hook: receives a document's metadata and text, returns new metadata.
pub type MetadataHook = Arc<dyn Fn(Metadata, &str) -> Metadata + Send + Sync>;

/// Lazily loaded, hook-processed documents.
pub type Documents<'a> = Box<dyn Iterator<Item = Document> + 'a>;

struct ChunkJob {
    chunker: Arc<dyn Chunker>,
    document: Document,
}

self_cell::self_cell!(
    /// One document together with the chunk iterator borrowing it.
    struct DocumentChunks {
        owner: ChunkJob,

        #[covariant]
        dependent: Chunks,
    }
);

impl DocumentChunks {
    fn start(chunker: Arc<dyn Chunker>, document: Document) -> Self {
        Self::new(ChunkJob { chunker, document }, |job| {
            job.chunker.chunk(&job.document.text, &job.document.metadata)
        })
    }
}

impl Iterator for DocumentChunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        self.with_dependent_mut(|_, chunks| chunks.next())
    }
}

/// Configured document preparation pipeline.
pub struct Pipeline {
    config: Config,
    chunker: Arc<dyn Chunker>,
    custom_chunker: bool,
    directory: DirectoryLoader,
    hooks: Vec<MetadataHook>,
}

impl Pipeline {
    /// Build a pipeline from configuration.
    ///
    /// The strategy and tokenizer are resolved here, once.
    ///
    /// # Errors
    ///
    /// Invalid size/overlap, an unknown strategy name, or a malformed
    /// include/exclude pattern.
    pub fn new(config: Config) -> Result<Self> {
        let chunker = registry::resolve(&config.chunk_strategy, &config.strategy_params())?;
        let filter = PathFilter::new(&config.include, &config.exclude)?;
        debug!(
            strategy = %config.chunk_strategy,
            size = config.chunk_size,
            overlap = config.chunk_overlap,
            tokenizer = %config.tokenizer,
            "pipeline configured"
        );
        Ok(Self {
            config,
            chunker: Arc::new(chunker),
            custom_chunker: false,
            directory: DirectoryLoader::new().with_filter(filter),
            hooks: Vec::new(),
        })
    }

    /// Use this chunker instead of the configured strategy.
    #[must_use]
    pub fn with_chunker<C: Chunker + 'static>(mut self, chunker: C) -> Self {
        self.chunker = Arc::new(chunker);
        self.custom_chunker = true;
        self
    }

    /// Use this tokenizer instead of loading the configured one.
    ///
    /// Has no effect on a chunker supplied through [`Pipeline::with_chunker`].
    ///
    /// # Errors
    ///
    /// Fails if the configured strategy no longer resolves.
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
        if !self.custom_chunker {
            let params = self
                .config
                .strategy_params()
                .with_tokenizer(TokenizerChoice::Instance(tokenizer));
            self.chunker = Arc::new(registry::resolve(&self.config.chunk_strategy, &params)?);
        }
        Ok(self)
    }

    /// Replace the extension → loader map.
    #[must_use]
    pub fn with_loaders(mut self, loaders: LoaderRegistry) -> Self {
        self.directory = self.directory.with_loaders(loaders);
        self
    }

    /// Append a metadata hook; hooks run in the order they were added.
    #[must_use]
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(Metadata, &str) -> Metadata + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// The configuration this pipeline was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The chunker in use.
    #[must_use]
    pub fn chunker(&self) -> &dyn Chunker {
        self.chunker.as_ref()
    }

    /// Load `source` and run the hooks over each document.
    ///
    /// # Errors
    ///
    /// A missing or unreadable file, or a directory that does not exist.
    /// Individual files inside a directory that fail to load are skipped.
    pub fn documents(&self, source: impl Into<Source>) -> Result<Documents<'_>> {
        self.load_source(source.into())
    }

    /// Load and chunk `source`.
    ///
    /// # Errors
    ///
    /// As [`Pipeline::documents`].
    pub fn prepare(&self, source: impl Into<Source>) -> Result<Chunks<'_>> {
        self.chunk_source(source.into())
    }

    /// Chunk `source` into `sink`, returning the number of chunks written.
    ///
    /// # Errors
    ///
    /// Loading errors, or the first write/commit failure from the sink.
    pub fn run<S: Sink + ?Sized>(&self, source: impl Into<Source>, sink: &mut S) -> Result<usize> {
        let chunks = self.prepare(source)?;
        drain(chunks, sink)
    }

    /// Chunk `source` into a JSONL file.
    ///
    /// The file only appears once every chunk has been written; a failed
    /// run leaves no output behind.
    ///
    /// # Errors
    ///
    /// As [`Pipeline::run`].
    pub fn prepare_to_jsonl(
        &self,
        source: impl Into<Source>,
        output: impl AsRef<Path>,
    ) -> Result<usize> {
        let chunks = self.prepare(source)?;
        let mut sink = JsonlSink::create(output)?;
        drain(chunks, &mut sink)
    }

    fn load_source(&self, source: Source) -> Result<Documents<'_>> {
        let loaded: Documents<'_> = match source {
            Source::Directory(root) => Box::new(self.directory.walk(&root)?),
            Source::File(path) => Box::new(self.load_file(&path)?.into_iter()),
            Source::Text(text) => Box::new(std::iter::once(StringLoader.document(text))),
        };
        Ok(Box::new(loaded.map(move |doc| self.apply_hooks(doc))))
    }

    fn chunk_source(&self, source: Source) -> Result<Chunks<'_>> {
        let documents = self.load_source(source)?;
        Ok(Box::new(documents.flat_map(move |doc| {
            debug!(
                source_id = %doc.metadata.source_id(),
                chars = doc.text.len(),
                "chunking document"
            );
            DocumentChunks::start(Arc::clone(&self.chunker), doc)
        })))
    }

    fn load_file(&self, path: &Path) -> Result<Vec<Document>> {
        match self.directory.loaders().get_for_path(path) {
            Some(loader) => loader.load(path),
            None => TextLoader.load(path),
        }
    }

    fn apply_hooks(&self, mut doc: Document) -> Document {
        for hook in &self.hooks {
            doc.metadata = hook(doc.metadata, &doc.text);
        }
        doc
    }
}

fn drain<S: Sink + ?Sized>(chunks: impl Iterator<Item = Chunk>, sink: &mut S) -> Result<usize> {
    let mut written = 0;
    for chunk in chunks {
        sink.write(&chunk)?;
        written += 1;
    }
    sink.finish()?;
    info!(chunks = written, "pipeline finished");
    Ok(written)
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("custom_chunker", &self.custom_chunker)
            .field("directory", &self.directory)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
