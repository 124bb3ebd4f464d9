//! Pipeline orchestrator.
//!
//! One run moves through
//! `Extracting -> ValidatingId -> [ResolvingId] -> Enriching -> Transforming -> Done`.
//! Only extraction can abort the run. Every later failure is logged and
//! replaced by an empty result, and each collaborator is called at most once.
//!
//! # Example
//!
//! ```no_run
//! use summarize_core::{PipelineSettings, build_default_pipeline, render_readable};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = build_default_pipeline(&PipelineSettings::default())?;
//! let pdf = std::fs::read("paper.pdf")?;
//! let outcome = pipeline.run(&pdf, "paper.pdf").await?;
//! println!("{}", render_readable(&outcome.digest));
//! # Ok(())
//! # }
//! ```

mod error;
mod settings;

pub use error::PipelineError;
pub use settings::{DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_CROSSREF_MAILTO, PipelineSettings};

pub use crate::resolver::DoiSource;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::crossref::CrossrefClient;
use crate::document::LopdfPageText;
use crate::error::{CollaboratorError, with_timeout};
use crate::grobid::{GrobidExtractor, StructureExtractor};
use crate::identifier::{Doi, DoiStatus, classify_candidate};
use crate::merge::merge;
use crate::record::{BibliographicRecord, MergedRecord};
use crate::registry::RegistryLookup;
use crate::resolver::{
    IdentifierResolver, ResolveContext, ResolvedDoi, TextScanStrategy, TitleSearchStrategy,
};
use crate::transform::{HfSummarizer, HfTranslator, Summarizer, Translator, TranslatorSettings};

/// States a run passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStage {
    Extracting,
    ValidatingId,
    ResolvingId,
    Enriching,
    Transforming,
    Done,
    Aborted,
}

impl PipelineStage {
    /// Short progress label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Extracting => "Extracting document structure",
            Self::ValidatingId => "Validating DOI",
            Self::ResolvingId => "Resolving missing DOI",
            Self::Enriching => "Enriching from registry",
            Self::Transforming => "Translating and summarizing",
            Self::Done => "Done",
            Self::Aborted => "Aborted",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final record handed to the formatter.
///
/// `record.doi` is the identifier established by the run, not whatever either
/// source reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaperDigest {
    #[serde(flatten)]
    pub record: MergedRecord,
    /// Abstract in the target language; empty when translation was skipped or failed.
    pub abstract_translated: String,
    /// One-line summary; empty when summarization was skipped or failed.
    pub summary: String,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutcome {
    pub digest: PaperDigest,
    /// Stages visited, in order.
    pub stages: Vec<PipelineStage>,
    /// Where the final DOI came from; `None` when no DOI was established.
    pub doi_source: Option<DoiSource>,
}

/// Collaborators a [`Pipeline`] drives.
pub struct Collaborators {
    pub extractor: Arc<dyn StructureExtractor>,
    pub registry: Arc<dyn RegistryLookup>,
    pub translator: Arc<dyn Translator>,
    pub summarizer: Arc<dyn Summarizer>,
}

type StageObserver = Box<dyn Fn(PipelineStage) + Send + Sync>;

/// Sequences extraction, DOI resolution, enrichment and text transforms.
pub struct Pipeline {
    collaborators: Collaborators,
    resolver: IdentifierResolver,
    call_timeout: Duration,
    observer: Option<StageObserver>,
}

impl Pipeline {
    /// Creates a pipeline. `call_timeout` bounds every collaborator call.
    #[must_use]
    pub fn new(collaborators: Collaborators, resolver: IdentifierResolver, call_timeout: Duration) -> Self {
        Self {
            collaborators,
            resolver,
            call_timeout,
            observer: None,
        }
    }

    /// Registers a callback invoked on every stage transition.
    #[must_use]
    pub fn with_stage_observer(mut self, observer: impl Fn(PipelineStage) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn enter(&self, stages: &mut Vec<PipelineStage>, stage: PipelineStage) {
        debug!(stage = ?stage, "entering pipeline stage");
        stages.push(stage);
        if let Some(observer) = &self.observer {
            observer(stage);
        }
    }

    /// Runs the pipeline over one document.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when extraction fails or yields no abstract.
    /// No other collaborator is called in that case.
    #[tracing::instrument(skip(self, document), fields(document_len = document.len()))]
    pub async fn run(&self, document: &[u8], filename: &str) -> Result<PipelineOutcome, PipelineError> {
        let mut stages = Vec::new();

        self.enter(&mut stages, PipelineStage::Extracting);
        let mut extracted = self.extract(document, filename).await.inspect_err(|error| {
            warn!(stage = ?PipelineStage::Aborted, error = %error, "pipeline aborted");
            if let Some(observer) = &self.observer {
                observer(PipelineStage::Aborted);
            }
        })?;

        self.enter(&mut stages, PipelineStage::ValidatingId);
        let status = classify_candidate(extracted.doi.as_deref());
        debug!(candidate = ?extracted.doi, reason = ?status.fallback_reason(), "classified extracted DOI");
        let resolved = match status {
            DoiStatus::Valid(doi) => Some(ResolvedDoi {
                doi,
                source: DoiSource::Extracted,
            }),
            invalid => {
                self.enter(&mut stages, PipelineStage::ResolvingId);
                let ctx = ResolveContext::new(extracted.doi.as_deref(), extracted.title.as_deref(), document);
                self.resolver.resolve_fallbacks(&ctx, &invalid).await
            }
        };
        // The working identifier replaces whatever the extractor reported.
        extracted.doi = resolved.as_ref().map(|r| r.doi.to_string());

        self.enter(&mut stages, PipelineStage::Enriching);
        let registry_record = match &resolved {
            Some(resolved) => self.enrich(&resolved.doi).await,
            None => {
                debug!("no DOI available; skipping registry lookup");
                BibliographicRecord::default()
            }
        };
        let mut record = merge(&registry_record, &extracted);
        record.doi.clone_from(&extracted.doi);

        self.enter(&mut stages, PipelineStage::Transforming);
        let abstract_translated = self.translate(record.abstract_en.as_deref().unwrap_or_default()).await;
        let summary = self.summarize(&abstract_translated).await;

        self.enter(&mut stages, PipelineStage::Done);
        info!(doi = ?record.doi, title = ?record.title, "pipeline finished");
        Ok(PipelineOutcome {
            digest: PaperDigest {
                record,
                abstract_translated,
                summary,
            },
            stages,
            doi_source: resolved.map(|r| r.source),
        })
    }

    async fn extract(&self, document: &[u8], filename: &str) -> Result<BibliographicRecord, PipelineError> {
        let extracted = with_timeout(
            "grobid",
            self.call_timeout,
            self.collaborators.extractor.extract(document, filename),
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "structure extractor call failed");
            PipelineError::extraction_failed(filename, e)
        })?;

        if !extracted.has_abstract() {
            return Err(PipelineError::missing_abstract(filename));
        }
        debug!(
            title = ?extracted.title,
            doi = ?extracted.doi,
            abstract_len = extracted.abstract_text.as_deref().map_or(0, str::len),
            "structure extracted"
        );
        Ok(extracted)
    }

    async fn enrich(&self, doi: &Doi) -> BibliographicRecord {
        match with_timeout("crossref", self.call_timeout, self.collaborators.registry.lookup(doi)).await {
            Ok(record) => {
                debug!(doi = %doi, title = ?record.title, "registry metadata found");
                record
            }
            Err(error) => {
                warn!(doi = %doi, error = %error, "registry lookup failed; using extracted metadata only");
                BibliographicRecord::default()
            }
        }
    }

    async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            debug!("empty abstract; skipping translation");
            return String::new();
        }
        absorb(
            "translation",
            with_timeout("translate", self.call_timeout, self.collaborators.translator.translate(text)).await,
        )
    }

    async fn summarize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            debug!("empty translation; skipping summary");
            return String::new();
        }
        absorb(
            "summary",
            with_timeout("summarize", self.call_timeout, self.collaborators.summarizer.summarize(text)).await,
        )
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("resolver", &self.resolver)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

fn absorb(step: &str, result: Result<String, CollaboratorError>) -> String {
    result.unwrap_or_else(|error| {
        warn!(step, error = %error, "text transform failed; leaving it empty");
        String::new()
    })
}

/// Wires the HTTP collaborators described by `settings`.
///
/// Fallback order is text scan, then title search.
///
/// # Errors
///
/// Returns [`CollaboratorError::Setup`] if any HTTP client cannot be built.
pub fn build_default_pipeline(settings: &PipelineSettings) -> Result<Pipeline, CollaboratorError> {
    let crossref = Arc::new(CrossrefClient::with_base_url(
        settings.crossref_mailto.clone(),
        settings.crossref_url.clone(),
        settings.http,
    )?);

    let mut resolver = IdentifierResolver::new(settings.call_timeout);
    resolver.register(Box::new(TextScanStrategy::new(
        Arc::new(LopdfPageText::new()),
        settings.text_scan_pages,
    )));
    resolver.register(Box::new(TitleSearchStrategy::new(crossref.clone())));

    let translator = HfTranslator::new(
        TranslatorSettings {
            url: settings.translate_url.clone(),
            token: settings.hf_token.clone(),
            source_lang: settings.source_lang.clone(),
            target_lang: settings.target_lang.clone(),
            max_input_chars: settings.translate_max_chars,
        },
        settings.http,
    )?;
    let summarizer = HfSummarizer::new(settings.summarize_url.clone(), settings.hf_token.clone(), settings.http)?;

    let collaborators = Collaborators {
        extractor: Arc::new(GrobidExtractor::with_base_url(settings.grobid_url.clone(), settings.http)?),
        registry: crossref,
        translator: Arc::new(translator),
        summarizer: Arc::new(summarizer),
    };
    Ok(Pipeline::new(collaborators, resolver, settings.call_timeout))
}
