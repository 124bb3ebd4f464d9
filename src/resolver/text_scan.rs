//! Fallback that finds a DOI in the leading pages of the document text.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::document::PageTextSource;
use crate::error::CollaboratorError;
use crate::identifier::{Doi, scan_text_for_doi};

use super::{DoiSource, ResolveContext, ResolveStrategy};

/// Scans the first `max_pages` pages for the first DOI-shaped substring.
///
/// A document that cannot be parsed counts as "not found".
pub struct TextScanStrategy {
    pages: Arc<dyn PageTextSource>,
    max_pages: usize,
}

impl TextScanStrategy {
    /// Creates a text-scan strategy over `pages`.
    #[must_use]
    pub fn new(pages: Arc<dyn PageTextSource>, max_pages: usize) -> Self {
        Self { pages, max_pages }
    }
}

impl std::fmt::Debug for TextScanStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextScanStrategy")
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ResolveStrategy for TextScanStrategy {
    fn name(&self) -> &'static str {
        "text-scan"
    }

    fn source(&self) -> DoiSource {
        DoiSource::TextScan
    }

    #[tracing::instrument(skip(self, ctx), fields(strategy = "text-scan", max_pages = self.max_pages))]
    async fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<Doi>, CollaboratorError> {
        if ctx.document.is_empty() {
            debug!("no document bytes to scan");
            return Ok(None);
        }

        // PDF parsing is CPU-bound.
        let pages = Arc::clone(&self.pages);
        let document = ctx.document.to_vec();
        let max_pages = self.max_pages;
        let rendered = tokio::task::spawn_blocking(move || pages.first_pages_text(&document, max_pages))
            .await
            .map_err(|e| CollaboratorError::setup("text-scan", format!("text rendering task failed: {e}")))?;

        match rendered {
            Ok(text) => Ok(scan_text_for_doi(&text)),
            Err(error) => {
                debug!(error = %error, "document text unavailable; treating as not found");
                Ok(None)
            }
        }
    }
}
