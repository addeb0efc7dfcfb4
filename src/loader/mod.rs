//! Document loaders: turn files, directories and raw strings into text.
//!
//! Every loader produces [`Document`]s carrying provenance metadata. The
//! chunkers only read `source_id` from it; everything else passes through
//! into the chunk records.
//!
//! | Extension              | Loader             | `file_type`  |
//! |------------------------|--------------------|--------------|
//! | `.txt`                 | [`TextLoader`]     | `text`       |
//! | `.md`, `.markdown`     | [`MarkdownLoader`] | `markdown`   |
//! | `.pdf`                 | [`PdfLoader`]      | `pdf`        |
//! | `.docx`                | [`DocxLoader`]     | `docx`       |
//! | `.html`, `.htm`        | [`HtmlLoader`]     | `html`       |
//! | `.csv`                 | [`CsvLoader`]      | `csv`        |
//!
//! PDF, DOCX and HTML need the `pdf`, `docx` and `html` features; without
//! them the loaders fail with [`LoadError::MissingBackend`].

mod csv;
mod directory;
mod docx;
mod html;
mod pdf;
mod text;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use self::csv::CsvLoader;
pub use self::directory::{DirectoryLoader, PathFilter};
pub use self::docx::DocxLoader;
pub use self::html::HtmlLoader;
pub use self::pdf::PdfLoader;
pub use self::text::{MarkdownLoader, StringLoader, TextLoader};

use crate::metadata::{Metadata, FILE_NAME, FILE_TYPE, SOURCE_ID, SOURCE_PATH};
use crate::{LoadError, Result};

/// A loaded document: normalized text plus provenance metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Extracted text.
    pub text: String,
    /// Provenance metadata (`source_id`, `file_type`, ...).
    pub metadata: Metadata,
}

impl Document {
    /// Create a document.
    #[must_use]
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// Loads documents from a file.
pub trait Loader: Send + Sync {
    /// Load every document contained in `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Load`] if the file is missing, unreadable or
    /// cannot be parsed.
    fn load(&self, path: &Path) -> Result<Vec<Document>>;
}

/// Metadata shared by all file loaders.
pub(crate) fn file_metadata(path: &Path, file_type: &str) -> Metadata {
    let path_str = path.display().to_string();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Metadata::new()
        .with(SOURCE_ID, path_str.clone())
        .with(SOURCE_PATH, path_str)
        .with(FILE_TYPE, file_type)
        .with(FILE_NAME, file_name)
}

/// Read a file, mapping a missing path to [`LoadError::NotFound`].
pub(crate) fn read_bytes(path: &Path) -> std::result::Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Read a file as UTF-8, replacing invalid sequences.
pub(crate) fn read_text(path: &Path) -> std::result::Result<String, LoadError> {
    let bytes = read_bytes(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Extension → loader map.
///
/// Extensions are matched case-insensitively, with or without the leading dot.
#[derive(Clone)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn Loader>>,
}

impl LoaderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
        }
    }

    /// Create a registry with the built-in loaders.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("txt", TextLoader);
        registry.register("md", MarkdownLoader);
        registry.register("markdown", MarkdownLoader);
        registry.register("pdf", PdfLoader);
        registry.register("docx", DocxLoader);
        registry.register("html", HtmlLoader);
        registry.register("htm", HtmlLoader);
        registry.register("csv", CsvLoader);
        registry
    }

    /// Register a loader for an extension, replacing any previous one.
    pub fn register<L: Loader + 'static>(&mut self, extension: &str, loader: L) {
        self.loaders
            .insert(normalize_extension(extension), Arc::new(loader));
    }

    /// Loader registered for an extension.
    #[must_use]
    pub fn get(&self, extension: &str) -> Option<Arc<dyn Loader>> {
        self.loaders.get(&normalize_extension(extension)).cloned()
    }

    /// Loader for a path, by its extension.
    #[must_use]
    pub fn get_for_path(&self, path: &Path) -> Option<Arc<dyn Loader>> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.get(ext))
    }

    /// Registered extensions, sorted.
    #[must_use]
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.loaders.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

/// What a pipeline input refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A directory, walked recursively.
    Directory(PathBuf),
    /// A single file.
    File(PathBuf),
    /// Raw text.
    Text(String),
}

impl Source {
    /// Classify an input string.
    ///
    /// An existing directory is a directory. A path that does not exist and
    /// has no extension is treated as raw text. Anything else is a file,
    /// even if it does not exist yet (loading then fails with
    /// [`LoadError::NotFound`]).
    ///
    /// ```rust
    /// use ragprep::Source;
    ///
    /// assert!(matches!(Source::detect("Hello world"), Source::Text(_)));
    /// assert!(matches!(Source::detect("missing.pdf"), Source::File(_)));
    /// ```
    #[must_use]
    pub fn detect(input: &str) -> Self {
        let path = Path::new(input);
        if path.is_dir() {
            Self::Directory(path.to_path_buf())
        } else if !path.exists() && path.extension().map_or(true, |ext| ext.is_empty()) {
            Self::Text(input.to_string())
        } else {
            Self::File(path.to_path_buf())
        }
    }
}

impl From<&str> for Source {
    fn from(input: &str) -> Self {
        Self::detect(input)
    }
}

impl From<String> for Source {
    fn from(input: String) -> Self {
        Self::detect(&input)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        if path.is_dir() {
            Self::Directory(path.to_path_buf())
        } else {
            Self::File(path.to_path_buf())
        }
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::from(path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SOURCE_TYPE;

    #[test]
    fn test_detect() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        assert_eq!(
            Source::detect(dir.path().to_str().unwrap()),
            Source::Directory(dir.path().to_path_buf())
        );
        assert_eq!(Source::detect(file.to_str().unwrap()), Source::File(file));
        assert_eq!(
            Source::detect("just some words"),
            Source::Text("just some words".into())
        );
        assert!(matches!(Source::detect("nope.txt"), Source::File(_)));
        assert!(matches!(Source::detect("A sentence."), Source::Text(_)));
    }

    #[test]
    fn test_registry_extension_normalization() {
        let registry = LoaderRegistry::with_defaults();
        assert!(registry.get(".TXT").is_some());
        assert!(registry.get("htm").is_some());
        assert!(registry.get("json").is_none());
        assert!(registry.get_for_path(Path::new("dir/Notes.MD")).is_some());
        assert!(registry.get_for_path(Path::new("Makefile")).is_none());
    }

    #[test]
    fn test_register_custom() {
        struct Upper;
        impl Loader for Upper {
            fn load(&self, path: &Path) -> Result<Vec<Document>> {
                let text = read_text(path)?.to_uppercase();
                Ok(vec![Document::new(text, file_metadata(path, "upper"))])
            }
        }

        let mut registry = LoaderRegistry::new();
        registry.register(".Shout", Upper);
        assert_eq!(registry.extensions(), ["shout"]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.shout");
        std::fs::write(&path, "hey").unwrap();
        let docs = registry.get_for_path(&path).unwrap().load(&path).unwrap();
        assert_eq!(docs[0].text, "HEY");
        assert!(!docs[0].metadata.contains_key(SOURCE_TYPE));
    }

    #[test]
    fn test_file_metadata() {
        let meta = file_metadata(Path::new("docs/a.txt"), "text");
        assert_eq!(meta.get_str(SOURCE_ID), Some("docs/a.txt"));
        assert_eq!(meta.get_str(FILE_NAME), Some("a.txt"));
        assert_eq!(meta.get_str(FILE_TYPE), Some("text"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = read_bytes(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
