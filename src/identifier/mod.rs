//! DOI validation, classification, and detection in free text.
//!
//! A complete DOI matches `10.<4-9 digits>/<suffix>` where the suffix holds no
//! whitespace, quotes or angle brackets. A bare `10.<digits>` is a
//! prefix-only identifier and counts as missing.

mod error;

pub use error::DoiError;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Anchored pattern for a complete DOI.
#[allow(clippy::expect_used)]
static FULL_DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^10\.\d{4,9}/[^\s"<>]+$"#).expect("full DOI regex is valid") // Static pattern, safe to panic
});

/// Anchored pattern for a registrant prefix with no suffix.
#[allow(clippy::expect_used)]
static PREFIX_ONLY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^10\.\d{4,9}$").expect("prefix-only DOI regex is valid") // Static pattern, safe to panic
});

/// Unanchored pattern used to find a DOI inside document text.
#[allow(clippy::expect_used)]
static TEXT_DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)10\.\d{4,9}/[^\s"<>]+"#).expect("text DOI regex is valid") // Static pattern, safe to panic
});

/// Characters stripped from the end of a DOI found in running text.
const TRAILING_PUNCTUATION: [char; 3] = ['.', ';', ','];

/// A validated, complete DOI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Doi(String);

impl Doi {
    /// Validates `input` as a complete DOI.
    ///
    /// Surrounding whitespace is trimmed; nothing else is rewritten, so parsing
    /// an already-valid DOI returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DoiError`] describing why the value is absent, prefix-only or
    /// malformed.
    pub fn parse(input: &str) -> Result<Self, DoiError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DoiError::Absent);
        }
        if FULL_DOI_PATTERN.is_match(trimmed) {
            return Ok(Self(trimmed.to_string()));
        }
        if PREFIX_ONLY_PATTERN.is_match(trimmed) {
            return Err(DoiError::prefix_only(trimmed));
        }
        if !trimmed.starts_with("10.") {
            return Err(DoiError::malformed(trimmed, "DOI must start with '10.'"));
        }
        Err(DoiError::malformed(
            trimmed,
            "expected 4-9 registrant digits followed by '/' and a suffix",
        ))
    }

    /// Returns the DOI string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `https://doi.org/` URL for this DOI.
    #[must_use]
    pub fn url(&self) -> String {
        format!("https://doi.org/{}", self.0)
    }
}

impl fmt::Display for Doi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Doi {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Doi {
    type Error = DoiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Doi> for String {
    fn from(doi: Doi) -> Self {
        doi.0
    }
}

/// Classification of an extracted DOI candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoiStatus {
    /// Complete DOI; no fallback needed.
    Valid(Doi),
    /// No candidate, or a blank one.
    Absent,
    /// `10.<digits>` with nothing after it.
    PrefixOnly(String),
    /// Anything else that is not a DOI.
    Malformed(String),
}

impl DoiStatus {
    /// Returns the valid DOI, if any.
    #[must_use]
    pub fn valid(&self) -> Option<&Doi> {
        match self {
            Self::Valid(doi) => Some(doi),
            _ => None,
        }
    }

    /// Diagnostic label for why fallback resolution is needed.
    #[must_use]
    pub fn fallback_reason(&self) -> Option<&'static str> {
        match self {
            Self::Valid(_) => None,
            Self::Absent => Some("absent"),
            Self::PrefixOnly(_) => Some("prefix-only"),
            Self::Malformed(_) => Some("malformed"),
        }
    }
}

/// Classifies a DOI candidate reported by the document extractor.
#[must_use]
pub fn classify_candidate(candidate: Option<&str>) -> DoiStatus {
    let Some(candidate) = candidate else {
        return DoiStatus::Absent;
    };
    match Doi::parse(candidate) {
        Ok(doi) => DoiStatus::Valid(doi),
        Err(DoiError::Absent) => DoiStatus::Absent,
        Err(DoiError::PrefixOnly { doi }) => DoiStatus::PrefixOnly(doi),
        Err(DoiError::Malformed { doi, .. }) => DoiStatus::Malformed(doi),
    }
}

/// Finds the first DOI in `text`.
///
/// First match wins; DOIs carry no checksum so nothing further is verified.
/// Trailing `.`, `;` and `,` picked up from the surrounding sentence are
/// stripped.
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
#[must_use]
pub fn scan_text_for_doi(text: &str) -> Option<Doi> {
    let found = TEXT_DOI_PATTERN.find(text)?;
    trace!(raw = %found.as_str(), "found DOI candidate in text");
    let cleaned = found.as_str().trim().trim_end_matches(TRAILING_PUNCTUATION);
    match Doi::parse(cleaned) {
        Ok(doi) => {
            debug!(doi = %doi, "DOI found in text");
            Some(doi)
        }
        Err(e) => {
            debug!(candidate = %cleaned, error = %e, "DOI candidate rejected after cleanup");
            None
        }
    }
}
