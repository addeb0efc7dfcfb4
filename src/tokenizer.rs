//! Tokenizer adapter for token-window chunking.
//!
//! Embedding models and LLMs budget context in tokens, not characters. The
//! [`Tokenizer`] trait is the encode/decode contract the token chunker needs;
//! the bundled backend wraps tiktoken BPE encodings (`tiktoken` feature).
//!
//! Backend availability is probed once, up front:
//!
//! ```rust
//! use ragprep::tokenizer::{probe, TokenizerAvailability, TokenizerChoice};
//!
//! match probe(&TokenizerChoice::named("no_such_encoding")) {
//!     TokenizerAvailability::Ready(_) => unreachable!(),
//!     TokenizerAvailability::Disabled => unreachable!(),
//!     TokenizerAvailability::Unavailable(err) => println!("falling back: {err}"),
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::TokenizerError;

/// Token id type.
pub type TokenId = u32;

/// Encoding loaded when none is named.
pub const DEFAULT_ENCODING: &str = "cl100k_base";

/// Name that disables tokenization (case-insensitive).
pub const DISABLED: &str = "none";

/// Encodings the tiktoken backend can build.
pub const KNOWN_ENCODINGS: [&str; 5] = [
    "cl100k_base",
    "o200k_base",
    "p50k_base",
    "p50k_edit",
    "r50k_base",
];

/// Encode/decode contract over a subword tokenization backend.
///
/// Implementations must be pure functions of their input so a single
/// instance can be shared across threads.
pub trait Tokenizer: Send + Sync {
    /// Encode text into token ids.
    fn encode(&self, text: &str) -> Vec<TokenId>;

    /// Decode token ids back into text.
    ///
    /// A slice may end inside a multibyte character; such bytes decode to
    /// U+FFFD rather than failing.
    fn decode(&self, tokens: &[TokenId]) -> String;

    /// Name of the encoding, for diagnostics.
    fn name(&self) -> &str {
        "custom"
    }
}

/// How a caller asks for a tokenizer.
#[derive(Clone, Default)]
pub enum TokenizerChoice {
    /// Load the default encoding.
    #[default]
    Default,
    /// Load an encoding by name.
    Named(String),
    /// Use this instance.
    Instance(Arc<dyn Tokenizer>),
    /// No tokenization; token chunking falls back to characters.
    Disabled,
}

impl TokenizerChoice {
    /// A named encoding, or [`TokenizerChoice::Disabled`] for the `"none"` sentinel.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.eq_ignore_ascii_case(DISABLED) {
            Self::Disabled
        } else {
            Self::Named(name)
        }
    }

    /// Interpret an optional name the way the config file and CLI do.
    #[must_use]
    pub fn from_option(name: Option<&str>) -> Self {
        name.map_or(Self::Disabled, Self::named)
    }
}

impl fmt::Debug for TokenizerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Instance(t) => f.debug_tuple("Instance").field(&t.name()).finish(),
            Self::Disabled => f.write_str("Disabled"),
        }
    }
}

/// Outcome of probing for a tokenizer.
#[derive(Clone)]
pub enum TokenizerAvailability {
    /// A backend is loaded and usable.
    Ready(Arc<dyn Tokenizer>),
    /// Tokenization was turned off on purpose.
    Disabled,
    /// A tokenizer was requested but could not be provided.
    Unavailable(TokenizerError),
}

impl TokenizerAvailability {
    /// The loaded tokenizer, if any.
    #[must_use]
    pub fn tokenizer(&self) -> Option<&Arc<dyn Tokenizer>> {
        match self {
            Self::Ready(t) => Some(t),
            Self::Disabled | Self::Unavailable(_) => None,
        }
    }

    /// Whether a tokenizer is loaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl fmt::Debug for TokenizerAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(t) => f.debug_tuple("Ready").field(&t.name()).finish(),
            Self::Disabled => f.write_str("Disabled"),
            Self::Unavailable(e) => f.debug_tuple("Unavailable").field(e).finish(),
        }
    }
}

/// Resolve a [`TokenizerChoice`] without failing.
#[must_use]
pub fn probe(choice: &TokenizerChoice) -> TokenizerAvailability {
    let name = match choice {
        TokenizerChoice::Instance(t) => return TokenizerAvailability::Ready(Arc::clone(t)),
        TokenizerChoice::Disabled => return TokenizerAvailability::Disabled,
        TokenizerChoice::Default => DEFAULT_ENCODING,
        TokenizerChoice::Named(name) => name.as_str(),
    };
    match load(name) {
        Ok(t) => TokenizerAvailability::Ready(t),
        Err(e) => TokenizerAvailability::Unavailable(e),
    }
}

/// Load a tokenizer by encoding name.
///
/// # Errors
///
/// [`TokenizerError::BackendUnavailable`] when built without the `tiktoken`
/// feature, [`TokenizerError::UnknownEncoding`] when the name is not one of
/// [`KNOWN_ENCODINGS`] or the encoding fails to build.
pub fn load(name: &str) -> Result<Arc<dyn Tokenizer>, TokenizerError> {
    #[cfg(feature = "tiktoken")]
    {
        let tokenizer = TiktokenTokenizer::from_name(name)?;
        Ok(Arc::new(tokenizer))
    }

    #[cfg(not(feature = "tiktoken"))]
    {
        Err(TokenizerError::BackendUnavailable {
            name: name.to_string(),
        })
    }
}

#[cfg(feature = "tiktoken")]
pub use self::tiktoken::TiktokenTokenizer;

#[cfg(feature = "tiktoken")]
mod tiktoken {
    use tiktoken_rs::CoreBPE;

    use super::{TokenId, Tokenizer, KNOWN_ENCODINGS};
    use crate::TokenizerError;

    /// Tokenizer backed by a tiktoken BPE encoding.
    pub struct TiktokenTokenizer {
        name: String,
        bpe: CoreBPE,
    }

    impl TiktokenTokenizer {
        /// Build one of the [`KNOWN_ENCODINGS`].
        ///
        /// # Errors
        ///
        /// [`TokenizerError::UnknownEncoding`] if the name is unknown or the
        /// encoding cannot be constructed.
        pub fn from_name(name: &str) -> Result<Self, TokenizerError> {
            let built = match name {
                "cl100k_base" => tiktoken_rs::cl100k_base(),
                "o200k_base" => tiktoken_rs::o200k_base(),
                "p50k_base" => tiktoken_rs::p50k_base(),
                "p50k_edit" => tiktoken_rs::p50k_edit(),
                "r50k_base" => tiktoken_rs::r50k_base(),
                _ => {
                    return Err(TokenizerError::UnknownEncoding {
                        name: name.to_string(),
                        reason: format!("expected one of {}", KNOWN_ENCODINGS.join(", ")),
                    })
                }
            };
            let bpe = built.map_err(|e| TokenizerError::UnknownEncoding {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
            Ok(Self {
                name: name.to_string(),
                bpe,
            })
        }
    }

    impl Tokenizer for TiktokenTokenizer {
        fn encode(&self, text: &str) -> Vec<TokenId> {
            self.bpe.encode_with_special_tokens(text)
        }

        fn decode(&self, tokens: &[TokenId]) -> String {
            let bytes: Vec<u8> = self
                .bpe
                ._decode_native_and_split(tokens.to_vec())
                .flatten()
                .collect();
            String::from_utf8_lossy(&bytes).into_owned()
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    impl std::fmt::Debug for TiktokenTokenizer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("TiktokenTokenizer")
                .field("name", &self.name)
                .finish()
        }
    }
}
