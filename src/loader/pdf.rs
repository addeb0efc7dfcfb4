//! PDF text extraction.

use std::path::Path;

use super::{Document, Loader};
use crate::Result;

/// Loads the text layer of a PDF.
///
/// Pages are joined with blank lines and the page count is recorded as
/// `num_pages`. Scanned PDFs without a text layer load as empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl Loader for PdfLoader {
    #[cfg(feature = "pdf")]
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        use super::{file_metadata, read_bytes};
        use crate::metadata::NUM_PAGES;
        use crate::LoadError;

        tracing::debug!(path = %path.display(), "extracting pdf");
        let bytes = read_bytes(path)?;
        let parse_error = |reason: String| LoadError::Parse {
            format: "PDF",
            path: path.to_path_buf(),
            reason,
        };
        // pdf-extract panics on some malformed fonts and encodings.
        let raw = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
            .map_err(|panic| parse_error(panic_message(panic.as_ref())))?
            .map_err(|e| parse_error(e.to_string()))?;

        let pages = split_pages(&raw);
        let metadata = file_metadata(path, "pdf").with(NUM_PAGES, pages.len());
        Ok(vec![Document::new(pages.join("\n\n"), metadata)])
    }

    #[cfg(not(feature = "pdf"))]
    fn load(&self, _path: &Path) -> Result<Vec<Document>> {
        Err(crate::LoadError::MissingBackend {
            format: "PDF",
            feature: "pdf",
        }
        .into())
    }
}

#[cfg(feature = "pdf")]
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format!("extractor panicked: {detail}")
}

/// pdf-extract separates pages with form feeds; a trailing one leaves an empty tail.
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
fn split_pages(raw: &str) -> Vec<&str> {
    let mut pages: Vec<&str> = raw.split('\x0C').map(str::trim).collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.is_empty()) {
        pages.pop();
    }
    pages
}
