//! Crossref registry client - metadata lookup by DOI and DOI search by title.
//!
//! The [`CrossrefClient`] calls the Crossref REST API. Lookup maps the `works`
//! message into a [`BibliographicRecord`]; title search returns the `DOI` of
//! the top hit. Crossref abstracts are never used.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::CollaboratorError;
use crate::http_client::{HttpTimeouts, build_http_client, join_url};
use crate::identifier::Doi;
use crate::record::BibliographicRecord;
use crate::registry::{RegistryLookup, TitleSearch};

/// Default Crossref API base URL.
pub const DEFAULT_CROSSREF_URL: &str = "https://api.crossref.org";

const SERVICE: &str = "crossref";

// ==================== Crossref API Response Types ====================

/// Top-level response for `/works/{doi}`.
#[derive(Debug, Deserialize)]
pub(crate) struct CrossrefResponse {
    pub status: String,
    pub message: CrossrefMessage,
}

/// Top-level response for `/works?query...`.
#[derive(Debug, Deserialize)]
pub(crate) struct CrossrefSearchResponse {
    pub status: String,
    pub message: CrossrefSearchMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CrossrefSearchMessage {
    #[serde(default)]
    pub items: Vec<CrossrefMessage>,
}

/// A single work.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct CrossrefMessage {
    #[serde(rename = "DOI")]
    pub doi: Option<String>,
    pub title: Option<Vec<String>>,
    pub author: Option<Vec<CrossrefAuthor>>,
    pub container_title: Option<Vec<String>>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub page: Option<String>,
    pub subject: Option<Vec<String>>,
    pub published_print: Option<CrossrefDate>,
    pub published_online: Option<CrossrefDate>,
    pub issued: Option<CrossrefDate>,
}

/// An author entry from the Crossref response.
#[derive(Debug, Deserialize)]
pub(crate) struct CrossrefAuthor {
    pub given: Option<String>,
    pub family: Option<String>,
}

/// A date entry from the Crossref response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct CrossrefDate {
    pub date_parts: Option<Vec<Vec<Option<i32>>>>,
}

// ==================== CrossrefClient ====================

/// Crossref REST API client.
///
/// # Polite Pool
///
/// All requests include a `mailto` query parameter to access Crossref's
/// polite pool, which provides higher rate limits.
pub struct CrossrefClient {
    client: Client,
    base_url: String,
    mailto: String,
}

impl CrossrefClient {
    /// Creates a client for the public Crossref API.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Setup`] if `mailto` contains control
    /// characters or the HTTP client cannot be built.
    #[tracing::instrument(skip_all, fields(mailto))]
    pub fn new(mailto: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, CollaboratorError> {
        Self::with_base_url(mailto, DEFAULT_CROSSREF_URL, timeouts)
    }

    /// Creates a client against a custom base URL (mirrors, wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`CrossrefClient::new`].
    #[tracing::instrument(skip_all, fields(mailto, base_url))]
    pub fn with_base_url(
        mailto: impl Into<String>,
        base_url: impl Into<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, CollaboratorError> {
        let mailto = mailto.into();
        if mailto.chars().any(|c| c == '\n' || c == '\r' || c == '\0') {
            return Err(CollaboratorError::setup(
                SERVICE,
                "mailto contains invalid control characters",
            ));
        }
        let client = build_http_client(SERVICE, timeouts)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            mailto,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CollaboratorError> {
        debug!(api_url = %url, "Calling Crossref API");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Crossref API request failed");
            CollaboratorError::transport(SERVICE, e)
        })?;

        if let Some(limit) = response.headers().get("x-rate-limit-limit") {
            debug!(rate_limit = ?limit, "Crossref rate limit");
        }

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Crossref API error");
            return Err(CollaboratorError::status(SERVICE, status.as_u16()));
        }

        response.json::<T>().await.map_err(|e| {
            warn!(error = %e, "Failed to parse Crossref response JSON");
            CollaboratorError::invalid_response(SERVICE, format!("unexpected Crossref response format: {e}"))
        })
    }
}

impl std::fmt::Debug for CrossrefClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossrefClient")
            .field("base_url", &self.base_url)
            .field("mailto", &self.mailto)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RegistryLookup for CrossrefClient {
    #[tracing::instrument(skip(self), fields(service = "crossref", doi = %doi))]
    async fn lookup(&self, doi: &Doi) -> Result<BibliographicRecord, CollaboratorError> {
        let url = format!(
            "{}?mailto={}",
            join_url(&self.base_url, &format!("works/{}", urlencoding::encode(doi.as_str()))),
            urlencoding::encode(&self.mailto)
        );

        let body: CrossrefResponse = self.get_json(&url).await?;
        if !body.status.eq_ignore_ascii_case("ok") {
            warn!(status = %body.status, "Crossref response status was not ok");
            return Err(CollaboratorError::invalid_response(
                SERVICE,
                format!("unexpected Crossref response status '{}'", body.status),
            ));
        }

        Ok(record_from_message(&body.message))
    }
}

#[async_trait]
impl TitleSearch for CrossrefClient {
    #[tracing::instrument(skip(self), fields(service = "crossref"))]
    async fn search_title(&self, title: &str, rows: u32) -> Result<Option<String>, CollaboratorError> {
        let url = format!(
            "{}?query.title={}&rows={}&mailto={}",
            join_url(&self.base_url, "works"),
            urlencoding::encode(title),
            rows,
            urlencoding::encode(&self.mailto)
        );

        let body: CrossrefSearchResponse = self.get_json(&url).await?;
        if !body.status.eq_ignore_ascii_case("ok") {
            warn!(status = %body.status, "Crossref search status was not ok");
            return Err(CollaboratorError::invalid_response(
                SERVICE,
                format!("unexpected Crossref response status '{}'", body.status),
            ));
        }

        let doi = body
            .message
            .items
            .into_iter()
            .next()
            .and_then(|item| item.doi)
            .map(|doi| doi.trim().to_string())
            .filter(|doi| !doi.is_empty());
        debug!(found = ?doi, "Crossref title search finished");
        Ok(doi)
    }
}

// ==================== Extraction Helpers ====================

/// Maps a Crossref work into a record. The abstract is always left empty.
fn record_from_message(message: &CrossrefMessage) -> BibliographicRecord {
    BibliographicRecord {
        title: first_text(message.title.as_deref()),
        authors: format_authors(message.author.as_deref().unwrap_or(&[])),
        journal: first_text(message.container_title.as_deref()),
        volume: non_empty(message.volume.as_deref()),
        issue: non_empty(message.issue.as_deref()),
        pages: non_empty(message.page.as_deref()),
        doi: non_empty(message.doi.as_deref()),
        pub_date: format_date(message.published_print.as_ref())
            .or_else(|| format_date(message.published_online.as_ref()))
            .or_else(|| format_date(message.issued.as_ref())),
        keywords: message
            .subject
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter_map(|s| clean(s))
            .collect(),
        abstract_text: None,
    }
}

fn clean(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.and_then(clean)
}

fn first_text(values: Option<&[String]>) -> Option<String> {
    values.and_then(|v| v.first()).and_then(|v| clean(v))
}

/// Formats authors as "given family", dropping entries with neither part.
fn format_authors(authors: &[CrossrefAuthor]) -> Vec<String> {
    authors
        .iter()
        .filter_map(|a| {
            let name = format!(
                "{} {}",
                a.given.as_deref().unwrap_or("").trim(),
                a.family.as_deref().unwrap_or("").trim()
            );
            clean(&name)
        })
        .collect()
}

/// Joins the first `date-parts` entry with `-` (e.g. `2024-6-15`).
fn format_date(date: Option<&CrossrefDate>) -> Option<String> {
    let parts = date?.date_parts.as_ref()?.first()?;
    let joined = parts
        .iter()
        .map_while(|p| p.map(|n| n.to_string()))
        .collect::<Vec<_>>()
        .join("-");
    clean(&joined)
}
