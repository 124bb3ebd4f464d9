//! Error types for DOI validation.

use thiserror::Error;

/// Errors that can occur while validating a DOI candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DoiError {
    /// No candidate was supplied, or it was blank
    #[error("no DOI supplied\n  Suggestion: Fallback resolution will search the document text and registry")]
    Absent,

    /// Candidate has a registrant prefix but no suffix
    #[error(
        "incomplete DOI '{doi}': missing suffix after '/'\n  Suggestion: A complete DOI looks like 10.1234/example"
    )]
    PrefixOnly {
        /// The prefix-only value
        doi: String,
    },

    /// Candidate does not follow DOI syntax at all
    #[error("invalid DOI '{doi}': {reason}\n  Suggestion: A complete DOI looks like 10.1234/example")]
    Malformed {
        /// The rejected value
        doi: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl DoiError {
    /// Creates a `PrefixOnly` error.
    #[must_use]
    pub fn prefix_only(doi: &str) -> Self {
        Self::PrefixOnly {
            doi: doi.to_string(),
        }
    }

    /// Creates a `Malformed` error.
    #[must_use]
    pub fn malformed(doi: &str, reason: &str) -> Self {
        Self::Malformed {
            doi: doi.to_string(),
            reason: reason.to_string(),
        }
    }
}
