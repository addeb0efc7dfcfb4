//! Plain text, Markdown and in-memory strings.

use std::path::Path;

use super::{file_metadata, read_text, Document, Loader};
use crate::metadata::{Metadata, SOURCE_ID, SOURCE_TYPE};
use crate::Result;

/// `source_id` given to raw string input.
pub const STRING_SOURCE_ID: &str = "string_input";

/// Loads a UTF-8 text file. Invalid sequences are replaced, not rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

impl Loader for TextLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let text = read_text(path)?;
        Ok(vec![Document::new(text, file_metadata(path, "text"))])
    }
}

/// Loads a Markdown file verbatim; markup is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownLoader;

impl Loader for MarkdownLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let text = read_text(path)?;
        Ok(vec![Document::new(text, file_metadata(path, "markdown"))])
    }
}

/// Wraps a raw string as a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringLoader;

impl StringLoader {
    /// The document for `text`.
    #[must_use]
    pub fn document(&self, text: impl Into<String>) -> Document {
        let metadata = Metadata::new()
            .with(SOURCE_ID, STRING_SOURCE_ID)
            .with(SOURCE_TYPE, "string");
        Document::new(text, metadata)
    }
}

impl Loader for StringLoader {
    /// Treats the path itself as the text.
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        Ok(vec![self.document(path.to_string_lossy())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FILE_TYPE, SOURCE_PATH};
    use crate::{Error, LoadError};

    #[test]
    fn test_text_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Hello, world!\nSecond line.").unwrap();

        let docs = TextLoader.load(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "Hello, world!\nSecond line.");
        assert_eq!(docs[0].metadata.get_str(FILE_TYPE), Some("text"));
        assert_eq!(
            docs[0].metadata.get_str(SOURCE_PATH),
            Some(path.display().to_string().as_str())
        );
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, b"ok \xff end").unwrap();

        let docs = TextLoader.load(&path).unwrap();
        assert!(docs[0].text.starts_with("ok "));
        assert!(docs[0].text.ends_with(" end"));
    }

    #[test]
    fn test_markdown_keeps_markup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readme.md");
        std::fs::write(&path, "# Title\n\nBody.").unwrap();

        let docs = MarkdownLoader.load(&path).unwrap();
        assert_eq!(docs[0].text, "# Title\n\nBody.");
        assert_eq!(docs[0].metadata.get_str(FILE_TYPE), Some("markdown"));
    }

    #[test]
    fn test_missing_file() {
        let err = TextLoader.load(Path::new("/no/such/file.txt")).unwrap_err();
        assert!(matches!(err, Error::Load(LoadError::NotFound(_))));
    }

    #[test]
    fn test_string_loader() {
        let doc = StringLoader.document("This is a test string.");
        assert_eq!(doc.text, "This is a test string.");
        assert_eq!(doc.metadata.source_id(), "string_input");
        assert_eq!(doc.metadata.get_str(SOURCE_TYPE), Some("string"));
    }
}
