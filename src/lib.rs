//! Summarize Papers Core Library
//!
//! This library turns a scholarly PDF into a single consistent bibliographic
//! record with a translated abstract and a one-line summary.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`record`] - Bibliographic record types shared by every stage
//! - [`identifier`] - DOI validation, classification and text scanning
//! - [`resolver`] - Ordered DOI fallback strategies (text scan, title search)
//! - [`registry`] - Registry lookup and title-search capabilities
//! - [`merge`] - Field-level precedence merge of registry and extracted records
//! - [`pipeline`] - Orchestrator that sequences extraction, resolution, enrichment and transforms
//! - [`grobid`] - Document structure extraction client (TEI)
//! - [`crossref`] - Registry lookup and title search client
//! - [`transform`] - Translation and summarization capabilities
//! - [`document`] - First-pages PDF text rendering
//! - [`output`] - Human-readable and JSON rendering of the final record

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crossref;
pub mod document;
pub mod error;
pub mod grobid;
pub mod http_client;
pub mod identifier;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod transform;
mod user_agent;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use crossref::CrossrefClient;
pub use document::{DocumentError, LopdfPageText, PageTextSource};
pub use error::CollaboratorError;
pub use grobid::{GrobidExtractor, StructureExtractor};
pub use identifier::{Doi, DoiError, DoiStatus, classify_candidate, scan_text_for_doi};
pub use merge::{FieldValue, first_non_empty, merge};
pub use output::{render_json, render_readable};
pub use http_client::HttpTimeouts;
pub use pipeline::{
    Collaborators, DoiSource, PaperDigest, Pipeline, PipelineError, PipelineOutcome,
    PipelineSettings, PipelineStage, build_default_pipeline,
};
pub use record::{BibliographicRecord, MergedRecord};
pub use registry::{RegistryLookup, TitleSearch};
pub use resolver::{
    IdentifierResolver, ResolveContext, ResolveStrategy, ResolvedDoi, TextScanStrategy,
    TitleSearchStrategy,
};
pub use transform::{HfSummarizer, HfTranslator, Summarizer, Translator, TranslatorSettings};
