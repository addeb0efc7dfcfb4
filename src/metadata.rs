//! Document and chunk metadata.
//!
//! Loaders attach provenance (`source_id`, `file_type`, ...), hooks add
//! whatever they like, and chunkers add positional keys. Values are a small
//! closed set so the map stays serializable without dynamic typing:
//!
//! ```text
//! { "source_id": "notes.md", "file_type": "markdown",
//!   "chunk_index": 3, "start_char": 2400, "end_char": 3400 }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Stable id of the source document. Read by chunkers to build chunk ids.
pub const SOURCE_ID: &str = "source_id";
/// Path of the file the document came from.
pub const SOURCE_PATH: &str = "source_path";
/// Kind of non-file source (e.g. `"string"`).
pub const SOURCE_TYPE: &str = "source_type";
/// Loader format tag (`"text"`, `"markdown"`, `"pdf"`, ...).
pub const FILE_TYPE: &str = "file_type";
/// File name without directories.
pub const FILE_NAME: &str = "file_name";
/// Page count reported by the PDF loader.
pub const NUM_PAGES: &str = "num_pages";
/// Zero-based CSV row.
pub const ROW_INDEX: &str = "row_index";
/// CSV header names.
pub const CSV_COLUMNS: &str = "csv_columns";
/// Zero-based position of a chunk within its document.
pub const CHUNK_INDEX: &str = "chunk_index";
/// First char offset covered by a character-window chunk.
pub const START_CHAR: &str = "start_char";
/// Exclusive end char offset of a character-window chunk.
pub const END_CHAR: &str = "end_char";
/// First token offset covered by a token-window chunk.
pub const START_TOKEN: &str = "start_token";
/// Exclusive end token offset of a token-window chunk.
pub const END_TOKEN: &str = "end_token";

/// Placeholder used when a document carries no `source_id`.
pub const DEFAULT_SOURCE_ID: &str = "doc";

/// A metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer (offsets, counts, indices).
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Free-form string.
    String(String),
    /// List of strings (e.g. CSV columns).
    StringList(Vec<String>),
}

impl Value {
    /// The string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer content, if this is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::StringList(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::StringList(items)
    }
}

/// Insertion-ordered metadata map.
///
/// Cloning is a deep copy, so every chunk owns its metadata outright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(IndexMap<String, Value>);

impl Metadata {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Look up an integer value.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Remove a key, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Whether the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The document's `source_id`, or [`DEFAULT_SOURCE_ID`].
    ///
    /// Non-string ids are rendered with `Display`.
    #[must_use]
    pub fn source_id(&self) -> String {
        match self.get(SOURCE_ID) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => DEFAULT_SOURCE_ID.to_string(),
        }
    }

    /// Indexed chunk id: `"{source_id}_chunk_{index}"`.
    #[must_use]
    pub fn chunk_id(&self, index: usize) -> String {
        format!("{}_chunk_{index}", self.source_id())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_default() {
        assert_eq!(Metadata::new().source_id(), "doc");
        assert_eq!(Metadata::new().chunk_id(2), "doc_chunk_2");
    }

    #[test]
    fn test_non_string_source_id() {
        let meta = Metadata::new().with(SOURCE_ID, 42_i64);
        assert_eq!(meta.source_id(), "42");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let meta = Metadata::new().with("b", 1_i64).with("a", 2_i64).with("c", 3_i64);
        let keys: Vec<&str> = meta.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_serializes_untagged() {
        let meta = Metadata::new()
            .with("name", "x")
            .with("n", 3_usize)
            .with("ok", true)
            .with("cols", vec!["a".to_string(), "b".to_string()]);
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"name":"x","n":3,"ok":true,"cols":["a","b"]}"#);

        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
