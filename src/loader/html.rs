//! HTML text extraction.

use std::path::Path;

use super::{Document, Loader};
use crate::Result;

/// Elements whose text never reaches the document.
#[cfg_attr(not(feature = "html"), allow(dead_code))]
const DROP_TAGS: &[&str] = &["script", "style"];

/// Loads the visible text of an HTML page.
///
/// Every text node outside `<script>` and `<style>` is trimmed; empty ones
/// are dropped and the rest joined with newlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLoader;

impl Loader for HtmlLoader {
    #[cfg(feature = "html")]
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let source = super::read_text(path)?;
        Ok(vec![Document::new(
            visible_text(&source),
            super::file_metadata(path, "html"),
        )])
    }

    #[cfg(not(feature = "html"))]
    fn load(&self, _path: &Path) -> Result<Vec<Document>> {
        Err(crate::LoadError::MissingBackend {
            format: "HTML",
            feature: "html",
        }
        .into())
    }
}

#[cfg(feature = "html")]
fn visible_text(source: &str) -> String {
    let document = scraper::Html::parse_document(source);
    let mut lines = Vec::new();
    collect(document.root_element(), &mut lines);
    lines.join("\n")
}

#[cfg(feature = "html")]
fn collect<'a>(element: scraper::ElementRef<'a>, lines: &mut Vec<&'a str>) {
    use scraper::{ElementRef, Node};

    for child in element.children() {
        match child.value() {
            Node::Element(el) if DROP_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect(child, lines);
                }
            }
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed);
                }
            }
            _ => {}
        }
    }
}
