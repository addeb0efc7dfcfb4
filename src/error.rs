//! Error types for ragprep.

use std::path::PathBuf;

/// Names accepted by the strategy resolver without a registry lookup.
pub const BUILTIN_STRATEGIES: [&str; 4] = ["character", "token", "sentence", "none"];

/// Boxed cause carried by configuration errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while preparing documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid chunk size (must be > 0).
    #[error("invalid chunk size: {0} (must be > 0)")]
    InvalidChunkSize(usize),

    /// Overlap is not strictly smaller than the chunk size.
    #[error("overlap {overlap} must be smaller than chunk size {size}")]
    OverlapExceedsSize {
        /// The chunk size.
        size: usize,
        /// The overlap that was too large.
        overlap: usize,
    },

    /// A strategy name that is neither built in nor registered.
    #[error(
        "unknown chunking strategy '{name}'. Supported: 'character', 'token', 'sentence', \
         'none', or a registered custom strategy. Error: {cause}"
    )]
    UnknownStrategy {
        /// The name that failed to resolve.
        name: String,
        /// Why resolution failed.
        #[source]
        cause: BoxError,
    },

    /// Tokenizer could not be loaded.
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    /// A source document could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Serialization failure while writing chunks.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure outside of loading (sinks, config files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why a tokenizer backend could not be provided.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    /// The crate was built without any tokenization backend.
    #[error("tokenizer backend unavailable for '{name}': rebuild with the 'tiktoken' feature")]
    BackendUnavailable {
        /// The encoding that was requested.
        name: String,
    },

    /// The backend exists but does not know this encoding.
    #[error("failed to load tokenizer '{name}': {reason}")]
    UnknownEncoding {
        /// The encoding that was requested.
        name: String,
        /// Backend-specific detail.
        reason: String,
    },
}

/// Errors raised by document loaders.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The source path does not exist.
    #[error("source not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A directory loader was pointed at something that is not a directory.
    #[error("source must be a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The format needs a backend that was compiled out.
    #[error("{format} loading requires the '{feature}' feature")]
    MissingBackend {
        /// Human-readable format name.
        format: &'static str,
        /// Cargo feature that enables it.
        feature: &'static str,
    },

    /// The file was read but its content could not be parsed.
    #[error("failed to parse {format} file {}: {reason}", path.display())]
    Parse {
        /// Human-readable format name.
        format: &'static str,
        /// File being parsed.
        path: PathBuf,
        /// Parser detail.
        reason: String,
    },

    /// An include/exclude pattern is not a valid glob.
    #[error("invalid file pattern '{pattern}': {reason}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Parser detail.
        reason: String,
    },
}

/// Result type for ragprep operations.
pub type Result<T> = std::result::Result<T, Error>;
