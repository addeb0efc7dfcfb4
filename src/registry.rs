//! Strategy resolution: turn a configured name into a ready chunker.
//!
//! ## Resolution Order
//!
//! ```text
//! "Sentence" ──lowercase──▶ built-in?  yes ─▶ SentenceChunker::new(size, overlap)
//!                                      no
//!                                      ▼
//!                            registry lookup ─▶ factory(size, overlap)
//!                                                 │ rejected
//!                                                 ▼
//!                                               factory()
//!                                                 │ missing / failed
//!                                                 ▼
//!                                      Error::UnknownStrategy (lists built-ins)
//! ```
//!
//! Custom strategies are registered up front, either on an explicit
//! [`ChunkerRegistry`] or on the process-wide one via [`register_strategy`].
//!
//! ```rust
//! use ragprep::{Chunker, ChunkerRegistry, Metadata, NoChunker, StrategyParams};
//!
//! let mut registry = ChunkerRegistry::new();
//! registry.register_default("whole", || NoChunker);
//!
//! let chunker = registry.resolve("whole", &StrategyParams::default()).unwrap();
//! assert_eq!(chunker.chunk("abc", &Metadata::new()).count(), 1);
//!
//! let err = registry.resolve("bogus_xyz", &StrategyParams::default()).unwrap_err();
//! assert!(err.to_string().contains("'sentence'"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::{BoxError, BUILTIN_STRATEGIES};
use crate::metadata::Metadata;
use crate::tokenizer::{probe, TokenizerAvailability, TokenizerChoice};
use crate::{
    CharacterChunker, Chunker, Chunks, Error, NoChunker, Result, SentenceChunker, TokenChunker,
};

/// Parameters shared by every strategy the resolver builds.
#[derive(Debug, Clone)]
pub struct StrategyParams {
    /// Window size (characters, tokens, or a sentence-packing target).
    pub size: usize,
    /// Overlap between adjacent chunks, in the same unit as `size`.
    pub overlap: usize,
    /// Tokenizer for the token strategy.
    pub tokenizer: TokenizerChoice,
}

impl StrategyParams {
    /// Parameters with the default tokenizer.
    #[must_use]
    pub fn new(size: usize, overlap: usize) -> Self {
        Self {
            size,
            overlap,
            tokenizer: TokenizerChoice::Default,
        }
    }

    /// Set the tokenizer.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: TokenizerChoice) -> Self {
        self.tokenizer = tokenizer;
        self
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

/// The built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Character windows.
    Character,
    /// Token windows.
    Token,
    /// Sentence packing.
    Sentence,
    /// Whole document.
    None,
}

impl StrategyKind {
    /// All built-ins, in documentation order.
    pub const ALL: [Self; 4] = [Self::Character, Self::Token, Self::Sentence, Self::None];

    /// The configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Token => "token",
            Self::Sentence => "sentence",
            Self::None => "none",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    /// Case-insensitive match on the built-in names.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("expected one of {}", BUILTIN_STRATEGIES.join(", ")))
    }
}

/// A resolved chunker: one of the built-ins or a registered custom strategy.
pub enum AnyChunker {
    /// Built-in character windows.
    Character(CharacterChunker),
    /// Built-in token windows.
    Token(TokenChunker),
    /// Built-in sentence packing.
    Sentence(SentenceChunker),
    /// Built-in pass-through.
    None(NoChunker),
    /// A registered strategy.
    Custom(Box<dyn Chunker>),
}

impl AnyChunker {
    /// Which built-in this is, if any.
    #[must_use]
    pub fn kind(&self) -> Option<StrategyKind> {
        match self {
            Self::Character(_) => Some(StrategyKind::Character),
            Self::Token(_) => Some(StrategyKind::Token),
            Self::Sentence(_) => Some(StrategyKind::Sentence),
            Self::None(_) => Some(StrategyKind::None),
            Self::Custom(_) => None,
        }
    }
}

impl Chunker for AnyChunker {
    fn chunk<'a>(&'a self, text: &'a str, metadata: &'a Metadata) -> Chunks<'a> {
        match self {
            Self::Character(c) => c.chunk(text, metadata),
            Self::Token(c) => c.chunk(text, metadata),
            Self::Sentence(c) => c.chunk(text, metadata),
            Self::None(c) => c.chunk(text, metadata),
            Self::Custom(c) => c.chunk(text, metadata),
        }
    }
}

impl fmt::Debug for AnyChunker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(c) => f.debug_tuple("Character").field(c).finish(),
            Self::Token(c) => f.debug_tuple("Token").field(c).finish(),
            Self::Sentence(c) => f.debug_tuple("Sentence").field(c).finish(),
            Self::None(c) => f.debug_tuple("None").field(c).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

type SizedFactory = Arc<dyn Fn(usize, usize) -> std::result::Result<Box<dyn Chunker>, BoxError> + Send + Sync>;
type BareFactory = Arc<dyn Fn() -> Box<dyn Chunker> + Send + Sync>;

#[derive(Clone, Default)]
struct Registration {
    sized: Option<SizedFactory>,
    bare: Option<BareFactory>,
}

/// Registry of custom chunking strategies.
///
/// A name may have a sized constructor, a parameterless one, or both. The
/// sized constructor is tried first; if it rejects `size`/`overlap`, the
/// parameterless one is used.
#[derive(Clone, Default)]
pub struct ChunkerRegistry {
    strategies: HashMap<String, Registration>,
}

impl ChunkerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor taking `(size, overlap)`.
    ///
    /// Names are matched exactly. Built-in names always win over registrations.
    pub fn register<C, E, F>(&mut self, name: &str, factory: F)
    where
        C: Chunker + 'static,
        E: Into<BoxError>,
        F: Fn(usize, usize) -> std::result::Result<C, E> + Send + Sync + 'static,
    {
        let factory: SizedFactory = Arc::new(move |size, overlap| {
            factory(size, overlap)
                .map(|c| Box::new(c) as Box<dyn Chunker>)
                .map_err(Into::into)
        });
        self.strategies.entry(name.to_string()).or_default().sized = Some(factory);
    }

    /// Register a parameterless constructor.
    pub fn register_default<C, F>(&mut self, name: &str, factory: F)
    where
        C: Chunker + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let factory: BareFactory = Arc::new(move || Box::new(factory()) as Box<dyn Chunker>);
        self.strategies.entry(name.to_string()).or_default().bare = Some(factory);
    }

    /// Whether a custom strategy is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Registered custom names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the strategy called `name`.
    ///
    /// # Errors
    ///
    /// Built-ins fail with [`Error::InvalidChunkSize`] or
    /// [`Error::OverlapExceedsSize`] on bad parameters. Anything else that
    /// cannot be built fails with [`Error::UnknownStrategy`].
    pub fn resolve(&self, name: &str, params: &StrategyParams) -> Result<AnyChunker> {
        match name.parse::<StrategyKind>() {
            Ok(kind) => build_builtin(kind, params),
            Err(_) => self.resolve_custom(name, params).map(AnyChunker::Custom),
        }
    }

    fn resolve_custom(&self, name: &str, params: &StrategyParams) -> Result<Box<dyn Chunker>> {
        build_custom(name, self.strategies.get(name), params)
    }
}

fn build_custom(
    name: &str,
    registration: Option<&Registration>,
    params: &StrategyParams,
) -> Result<Box<dyn Chunker>> {
    let unknown = |cause: BoxError| Error::UnknownStrategy {
        name: name.to_string(),
        cause,
    };

    let registration =
        registration.ok_or_else(|| unknown("no strategy registered under that name".into()))?;

    let rejected = match &registration.sized {
        Some(factory) => match factory(params.size, params.overlap) {
            Ok(chunker) => return Ok(chunker),
            Err(e) => Some(e),
        },
        None => None,
    };

    if let Some(factory) = &registration.bare {
        if let Some(e) = &rejected {
            debug!(strategy = name, error = %e, "sized constructor rejected, using default");
        }
        return Ok(factory());
    }

    Err(unknown(
        rejected.unwrap_or_else(|| "registration has no constructor".into()),
    ))
}

impl fmt::Debug for ChunkerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkerRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}

fn build_builtin(kind: StrategyKind, params: &StrategyParams) -> Result<AnyChunker> {
    let StrategyParams { size, overlap, .. } = *params;
    Ok(match kind {
        StrategyKind::Character => AnyChunker::Character(CharacterChunker::new(size, overlap)?),
        StrategyKind::Sentence => AnyChunker::Sentence(SentenceChunker::new(size, overlap)?),
        StrategyKind::None => AnyChunker::None(NoChunker),
        StrategyKind::Token => {
            let availability = probe(&params.tokenizer);
            match &availability {
                TokenizerAvailability::Unavailable(e) => warn!(
                    error = %e,
                    "tokenizer unavailable; token chunking falls back to character windows"
                ),
                TokenizerAvailability::Disabled => {
                    debug!("tokenization disabled; token chunking uses character windows");
                }
                TokenizerAvailability::Ready(t) => debug!(tokenizer = t.name(), "tokenizer loaded"),
            }
            AnyChunker::Token(TokenChunker::with_availability(size, overlap, availability)?)
        }
    })
}

fn global() -> &'static RwLock<ChunkerRegistry> {
    static GLOBAL: OnceLock<RwLock<ChunkerRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(ChunkerRegistry::new()))
}

/// Register a sized constructor on the process-wide registry.
pub fn register_strategy<C, E, F>(name: &str, factory: F)
where
    C: Chunker + 'static,
    E: Into<BoxError>,
    F: Fn(usize, usize) -> std::result::Result<C, E> + Send + Sync + 'static,
{
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, factory);
}

/// Register a parameterless constructor on the process-wide registry.
pub fn register_default_strategy<C, F>(name: &str, factory: F)
where
    C: Chunker + 'static,
    F: Fn() -> C + Send + Sync + 'static,
{
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register_default(name, factory);
}

/// Resolve against the process-wide registry.
///
/// # Errors
///
/// See [`ChunkerRegistry::resolve`].
pub fn resolve(name: &str, params: &StrategyParams) -> Result<AnyChunker> {
    if let Ok(kind) = name.parse::<StrategyKind>() {
        return build_builtin(kind, params);
    }
    // Factories run without the lock held so they may register strategies themselves.
    let registration = global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .strategies
        .get(name)
        .cloned();
    build_custom(name, registration.as_ref(), params).map(AnyChunker::Custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(CharacterChunker);

    impl Fixed {
        fn new(size: usize) -> Result<Self> {
            CharacterChunker::new(size, 0).map(Self)
        }
    }

    impl Chunker for Fixed {
        fn chunk<'a>(&'a self, text: &'a str, metadata: &'a Metadata) -> Chunks<'a> {
            self.0.chunk(text, metadata)
        }
    }

    #[test]
    fn test_builtins_case_insensitive() {
        let params = StrategyParams::new(100, 10);
        let registry = ChunkerRegistry::new();
        for (name, kind) in [
            ("character", StrategyKind::Character),
            ("TOKEN", StrategyKind::Token),
            ("Sentence", StrategyKind::Sentence),
            ("none", StrategyKind::None),
        ] {
            assert_eq!(registry.resolve(name, &params).unwrap().kind(), Some(kind));
        }
    }

    #[test]
    fn test_unknown_lists_builtins() {
        let err = ChunkerRegistry::new()
            .resolve("bogus_xyz", &StrategyParams::default())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bogus_xyz"));
        for name in BUILTIN_STRATEGIES {
            assert!(msg.contains(name), "{msg}");
        }
        assert!(msg.contains("no strategy registered"));
    }

    #[test]
    fn test_sized_factory_used_first() {
        let mut registry = ChunkerRegistry::new();
        registry.register("fixed", |size, _overlap| Fixed::new(size));
        registry.register_default("fixed", || Fixed::new(1).unwrap());

        let chunker = registry.resolve("fixed", &StrategyParams::new(3, 0)).unwrap();
        assert!(chunker.kind().is_none());
        assert_eq!(chunker.chunk("abcdef", &Metadata::new()).count(), 2);
    }

    #[test]
    fn test_rejected_sized_falls_back_to_default() {
        let mut registry = ChunkerRegistry::new();
        registry.register("fixed", |_size, _overlap| {
            Err::<Fixed, _>("sizes not supported")
        });
        registry.register_default("fixed", || Fixed::new(1).unwrap());

        let chunker = registry.resolve("fixed", &StrategyParams::new(3, 0)).unwrap();
        assert_eq!(chunker.chunk("abcdef", &Metadata::new()).count(), 6);
    }

    #[test]
    fn test_rejected_without_default_reports_cause() {
        let mut registry = ChunkerRegistry::new();
        registry.register("picky", |_size, _overlap| Err::<Fixed, _>("sizes not supported"));

        let err = registry
            .resolve("picky", &StrategyParams::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownStrategy { .. }));
        assert!(err.to_string().contains("sizes not supported"));
    }

    #[test]
    fn test_builtin_validation_errors_pass_through() {
        let err = ChunkerRegistry::new()
            .resolve("character", &StrategyParams::new(10, 10))
            .unwrap_err();
        assert!(matches!(err, Error::OverlapExceedsSize { .. }));
    }

    #[test]
    fn test_token_with_unavailable_tokenizer_resolves() {
        let params = StrategyParams::new(5, 1)
            .with_tokenizer(TokenizerChoice::named("invalid_tokenizer_name_xyz"));
        let chunker = ChunkerRegistry::new().resolve("token", &params).unwrap();
        match &chunker {
            AnyChunker::Token(t) => assert!(t.uses_fallback()),
            other => panic!("expected token chunker, got {other:?}"),
        }
        assert!(chunker.chunk("Test text", &Metadata::new()).count() >= 1);
    }

    #[test]
    fn test_global_registry() {
        register_default_strategy("global_test_whole", || NoChunker);
        let chunker = resolve("global_test_whole", &StrategyParams::default()).unwrap();
        assert_eq!(chunker.chunk("abc", &Metadata::new()).count(), 1);
    }

    #[test]
    fn test_global_factory_may_register() {
        register_strategy("global_test_outer", |size, _overlap| {
            register_default_strategy("global_test_inner", || NoChunker);
            Fixed::new(size)
        });
        assert!(resolve("global_test_outer", &StrategyParams::new(4, 0)).is_ok());
        assert!(resolve("global_test_inner", &StrategyParams::default()).is_ok());
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = ChunkerRegistry::new();
        registry.register_default("b", || NoChunker);
        registry.register_default("a", || NoChunker);
        assert_eq!(registry.names(), ["a", "b"]);
        assert!(registry.contains("a"));
    }
}
