//! Fatal pipeline errors.
//!
//! Only the extraction step can abort a run. Every other failure is absorbed
//! at its step and degrades the result instead.

use thiserror::Error;

use crate::error::CollaboratorError;

/// Errors that abort a pipeline run.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// The document structure extractor failed or timed out
    #[error("document structure extraction failed for '{filename}'")]
    ExtractionFailed {
        /// Name of the processed document
        filename: String,
        /// Underlying collaborator failure
        #[source]
        source: CollaboratorError,
    },

    /// Extraction succeeded but produced no abstract
    #[error(
        "no abstract could be extracted from '{filename}'\n  Why: translation and summary need the abstract\n  Suggestion: Check that the PDF is a text-based scholarly article, not a scanned image"
    )]
    MissingAbstract {
        /// Name of the processed document
        filename: String,
    },
}

impl PipelineError {
    /// Creates an `ExtractionFailed` error.
    #[must_use]
    pub fn extraction_failed(filename: &str, source: CollaboratorError) -> Self {
        Self::ExtractionFailed {
            filename: filename.to_string(),
            source,
        }
    }

    /// Creates a `MissingAbstract` error.
    #[must_use]
    pub fn missing_abstract(filename: &str) -> Self {
        Self::MissingAbstract {
            filename: filename.to_string(),
        }
    }
}
