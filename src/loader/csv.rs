//! CSV rows as documents.

use std::path::Path;

use super::{file_metadata, read_text, Document, Loader};
use crate::metadata::{CSV_COLUMNS, ROW_INDEX, SOURCE_ID};
use crate::{LoadError, Result};

/// Loads a CSV file with a header row, one document per data row.
///
/// Each row becomes `"column: value"` lines for its non-empty values. The
/// `source_id` is `"{path}_row_{i}"` so chunk ids stay unique per row.
///
/// ```text
/// name,age        →   doc 0: "name: Ada\nage: 36"
/// Ada,36              doc 1: "name: Bob"
/// Bob,
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvLoader;

impl Loader for CsvLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let parse_error = |e: ::csv::Error| LoadError::Parse {
            format: "CSV",
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let source = read_text(path)?;
        let mut reader = ::csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(source.as_bytes());
        let columns: Vec<String> = reader
            .headers()
            .map_err(parse_error)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut documents = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(parse_error)?;
            let text = columns
                .iter()
                .zip(record.iter())
                .filter(|(_, value)| !value.is_empty())
                .map(|(column, value)| format!("{column}: {value}"))
                .collect::<Vec<_>>()
                .join("\n");

            let metadata = file_metadata(path, "csv")
                .with(SOURCE_ID, format!("{}_row_{row}", path.display()))
                .with(ROW_INDEX, row)
                .with(CSV_COLUMNS, columns.clone());
            documents.push(Document::new(text, metadata));
        }

        tracing::debug!(path = %path.display(), rows = documents.len(), "loaded csv");
        Ok(documents)
    }
}
