//! Pipeline configuration.
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! chunk_strategy = "sentence"
//! chunk_size = 800
//! exclude = ["*.log", "drafts/*"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::registry::StrategyParams;
use crate::tokenizer::{TokenizerChoice, DEFAULT_ENCODING};
use crate::{window, Result};

/// Configuration for [`crate::Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Strategy name: a built-in or a registered custom strategy.
    #[serde(default = "default_chunk_strategy")]
    pub chunk_strategy: String,

    /// Chunk size (characters or tokens, depending on the strategy).
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between adjacent chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Tokenizer encoding; `"none"` disables tokenization.
    #[serde(default = "default_tokenizer")]
    pub tokenizer: String,

    /// Directory include patterns; empty means everything.
    #[serde(default)]
    pub include: Vec<String>,

    /// Directory exclude patterns.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Print a configuration summary.
    #[serde(default)]
    pub verbose: bool,
}

fn default_chunk_strategy() -> String {
    "character".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_tokenizer() -> String {
    DEFAULT_ENCODING.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_strategy: default_chunk_strategy(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            tokenizer: default_tokenizer(),
            include: Vec::new(),
            exclude: Vec::new(),
            verbose: false,
        }
    }
}

impl Config {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Config`] on malformed TOML or mistyped fields.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check the size/overlap pair.
    ///
    /// The strategy name is checked when the pipeline resolves it.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidChunkSize`] or [`crate::Error::OverlapExceedsSize`].
    pub fn validate(&self) -> Result<()> {
        window::validate(self.chunk_size, self.chunk_overlap)
    }

    /// The tokenizer this configuration asks for.
    #[must_use]
    pub fn tokenizer_choice(&self) -> TokenizerChoice {
        TokenizerChoice::named(self.tokenizer.as_str())
    }

    /// Parameters for the strategy resolver.
    #[must_use]
    pub fn strategy_params(&self) -> StrategyParams {
        StrategyParams::new(self.chunk_size, self.chunk_overlap)
            .with_tokenizer(self.tokenizer_choice())
    }
}
