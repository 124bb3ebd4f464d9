//! Bibliographic registry capabilities.
//!
//! Two independent capabilities are consumed by the pipeline: lookup of
//! authoritative metadata for a known DOI, and search-by-title returning the
//! top DOI. [`crate::crossref::CrossrefClient`] implements both.

use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::identifier::Doi;
use crate::record::BibliographicRecord;

/// Looks up authoritative metadata for a DOI.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    /// Returns the registry's record for `doi`.
    ///
    /// The returned record never carries an abstract.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] on transport failure, non-success status
    /// or a malformed response.
    async fn lookup(&self, doi: &Doi) -> Result<BibliographicRecord, CollaboratorError>;
}

/// Searches the registry by title.
#[async_trait]
pub trait TitleSearch: Send + Sync {
    /// Returns the identifier of the top result, if any.
    ///
    /// The returned string is whatever the registry reports; callers validate it.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] on transport failure, non-success status
    /// or a malformed response.
    async fn search_title(&self, title: &str, rows: u32) -> Result<Option<String>, CollaboratorError>;
}
