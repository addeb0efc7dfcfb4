//! DOCX paragraph extraction.
//!
//! A `.docx` file is a zip archive; the body lives in `word/document.xml`.
//! Each top-level `<w:p>` becomes one paragraph and paragraphs are joined
//! with blank lines. Paragraphs inside tables and text boxes are skipped.

use std::path::Path;

use super::{Document, Loader};
use crate::Result;

/// Loads the body paragraphs of a Word document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxLoader;

impl Loader for DocxLoader {
    #[cfg(feature = "docx")]
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        use std::io::Read;

        use super::{file_metadata, read_bytes};
        use crate::LoadError;

        let parse_error = |reason: String| LoadError::Parse {
            format: "DOCX",
            path: path.to_path_buf(),
            reason,
        };

        let bytes = read_bytes(path)?;
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
            .map_err(|e| parse_error(e.to_string()))?;
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| parse_error(e.to_string()))?
            .read_to_string(&mut xml)
            .map_err(|e| parse_error(e.to_string()))?;

        let paragraphs = paragraphs(&xml).map_err(parse_error)?;
        Ok(vec![Document::new(
            paragraphs.join("\n\n"),
            file_metadata(path, "docx"),
        )])
    }

    #[cfg(not(feature = "docx"))]
    fn load(&self, _path: &Path) -> Result<Vec<Document>> {
        Err(crate::LoadError::MissingBackend {
            format: "DOCX",
            feature: "docx",
        }
        .into())
    }
}

/// Body paragraphs of a WordprocessingML document, in order.
#[cfg(feature = "docx")]
fn paragraphs(xml: &str) -> std::result::Result<Vec<String>, String> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut table_depth = 0usize;
    // Text boxes nest whole paragraphs inside a run; only depth 1 is body text.
    let mut paragraph_depth = 0usize;

    loop {
        let outermost = paragraph_depth == 1;
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" => {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 && table_depth == 0 {
                        current = Some(String::new());
                    }
                }
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if paragraph_depth == 0 && table_depth == 0 => {
                    paragraphs.push(String::new());
                }
                b"w:tab" if outermost => push_to(&mut current, "\t"),
                b"w:br" | b"w:cr" if outermost => push_to(&mut current, "\n"),
                _ => {}
            },
            Event::Text(t) if in_text && outermost => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                push_to(&mut current, &text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                b"w:p" => {
                    if outermost {
                        if let Some(p) = current.take() {
                            paragraphs.push(p);
                        }
                    }
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(feature = "docx")]
fn push_to(current: &mut Option<String>, text: &str) {
    if let Some(p) = current {
        p.push_str(text);
    }
}
