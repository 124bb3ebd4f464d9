//! First-pages plain-text rendering of PDF bytes.
//!
//! Only the leading pages are rendered; DOIs conventionally sit on the first
//! or second page.

use lopdf::Document;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur while rendering document text.
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    /// Bytes are not a readable PDF
    #[error("cannot parse document: {reason}\n  Suggestion: Check that the file is a valid, unencrypted PDF")]
    Unparsable {
        /// Parser failure
        reason: String,
    },

    /// PDF parsed but text could not be extracted
    #[error("cannot extract text from pages {pages:?}: {reason}")]
    TextExtraction {
        /// Page numbers that were requested
        pages: Vec<u32>,
        /// Extraction failure
        reason: String,
    },
}

/// Renders the first pages of a document to plain text.
pub trait PageTextSource: Send + Sync {
    /// Returns the concatenated text of at most `max_pages` leading pages.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the bytes cannot be parsed or rendered.
    fn first_pages_text(&self, document: &[u8], max_pages: usize) -> Result<String, DocumentError>;
}

/// [`PageTextSource`] backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfPageText;

impl LopdfPageText {
    /// Creates a new lopdf text source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PageTextSource for LopdfPageText {
    #[tracing::instrument(skip(self, document), fields(document_len = document.len()))]
    fn first_pages_text(&self, document: &[u8], max_pages: usize) -> Result<String, DocumentError> {
        if max_pages == 0 {
            return Ok(String::new());
        }

        let parsed = Document::load_mem(document).map_err(|e| DocumentError::Unparsable {
            reason: e.to_string(),
        })?;

        let page_numbers: Vec<u32> = parsed.get_pages().keys().copied().take(max_pages).collect();
        if page_numbers.is_empty() {
            debug!("document has no pages");
            return Ok(String::new());
        }
        trace!(pages = ?page_numbers, "extracting page text");

        parsed
            .extract_text(&page_numbers)
            .map_err(|e| DocumentError::TextExtraction {
                pages: page_numbers,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// Minimal valid PDF with one page per entry; empty entries get no content stream.
    fn text_pdf(pages: &[&str]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{Object, ObjectId, Stream, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id: ObjectId = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids: Vec<Object> = Vec::new();
        for text in pages {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
            };
            if !text.is_empty() {
                let content = Content {
                    operations: vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 12.into()]),
                        Operation::new("Td", vec![72.into(), 700.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ],
                };
                let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
                page.set("Contents", content_id);
            }
            page_ids.push(doc.add_object(page).into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids,
                "Count" => i64::try_from(pages.len()).unwrap(),
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }

    #[test]
    fn test_garbage_bytes_are_unparsable() {
        let result = LopdfPageText::new().first_pages_text(b"definitely not a pdf", 2);
        assert!(matches!(result, Err(DocumentError::Unparsable { .. })));
    }

    #[test]
    fn test_empty_bytes_are_unparsable() {
        assert!(LopdfPageText::new().first_pages_text(&[], 2).is_err());
    }

    #[test]
    fn test_zero_pages_requested_returns_empty() {
        let text = LopdfPageText::new().first_pages_text(b"ignored", 0).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_pages_without_content_yield_no_doi() {
        let pdf = text_pdf(&["", "", ""]);
        let text = LopdfPageText::new()
            .first_pages_text(&pdf, 2)
            .unwrap_or_default();
        assert!(crate::identifier::scan_text_for_doi(&text).is_none());
    }

    #[test]
    fn test_doi_on_second_page_is_found() {
        let pdf = text_pdf(&["Intro", "DOI: 10.1234/abc.def.", "See 10.9999/late"]);
        let text = LopdfPageText::new().first_pages_text(&pdf, 2).unwrap();
        assert!(text.contains("Intro"));
        assert!(!text.contains("10.9999"));

        let doi = crate::identifier::scan_text_for_doi(&text).unwrap();
        assert_eq!(doi.as_str(), "10.1234/abc.def");
    }

    #[test]
    fn test_doi_beyond_page_limit_is_ignored() {
        let pdf = text_pdf(&["Intro", "Methods", "DOI: 10.9999/late"]);
        let text = LopdfPageText::new().first_pages_text(&pdf, 2).unwrap();
        assert!(crate::identifier::scan_text_for_doi(&text).is_none());

        let all = LopdfPageText::new().first_pages_text(&pdf, 3).unwrap();
        assert_eq!(
            crate::identifier::scan_text_for_doi(&all).unwrap().as_str(),
            "10.9999/late"
        );
    }
}
