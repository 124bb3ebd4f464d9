//! Document structure extraction through a GROBID service.
//!
//! The PDF is posted to `processFulltextDocument` and the returned TEI header
//! is mapped to a [`BibliographicRecord`] by [`tei::parse_tei`].

mod tei;

pub use tei::{TeiError, parse_tei};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::error::CollaboratorError;
use crate::http_client::{HttpTimeouts, build_http_client, join_url};
use crate::record::BibliographicRecord;

/// Public GROBID instance used when no URL is configured.
pub const DEFAULT_GROBID_URL: &str = "https://kermitt2-grobid.hf.space";

const FULLTEXT_PATH: &str = "api/processFulltextDocument";
const SERVICE: &str = "grobid";

/// Extracts bibliographic fields and the abstract from raw document bytes.
#[async_trait]
pub trait StructureExtractor: Send + Sync {
    /// Returns the extracted record.
    ///
    /// An `Ok` record may still lack an abstract; the caller decides whether
    /// that is fatal.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the service fails or answers with
    /// something unparsable.
    async fn extract(&self, document: &[u8], filename: &str) -> Result<BibliographicRecord, CollaboratorError>;
}

/// [`StructureExtractor`] backed by a GROBID HTTP service.
pub struct GrobidExtractor {
    client: Client,
    base_url: String,
}

impl GrobidExtractor {
    /// Creates an extractor against a custom GROBID base URL.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Setup`] if the HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: build_http_client(SERVICE, timeouts)?,
            base_url: base_url.into(),
        })
    }
}

impl std::fmt::Debug for GrobidExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrobidExtractor")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StructureExtractor for GrobidExtractor {
    #[tracing::instrument(skip(self, document), fields(service = "grobid", document_len = document.len()))]
    async fn extract(&self, document: &[u8], filename: &str) -> Result<BibliographicRecord, CollaboratorError> {
        let url = join_url(&self.base_url, FULLTEXT_PATH);
        let part = Part::bytes(document.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| CollaboratorError::setup(SERVICE, e))?;
        let form = Form::new().part("input", part);

        debug!(api_url = %url, "Posting document to GROBID");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "GROBID request failed");
                CollaboratorError::transport(SERVICE, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "GROBID returned an error status");
            return Err(CollaboratorError::status(SERVICE, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CollaboratorError::transport(SERVICE, e))?;
        let record = parse_tei(&body).map_err(|e| {
            warn!(error = %e, "GROBID returned unparsable TEI");
            CollaboratorError::invalid_response(SERVICE, e)
        })?;

        debug!(
            title = ?record.title,
            authors = record.authors.len(),
            journal = ?record.journal,
            pub_date = ?record.pub_date,
            doi = ?record.doi,
            abstract_len = record.abstract_text.as_deref().map_or(0, str::len),
            "GROBID extraction finished"
        );
        Ok(record)
    }
}
