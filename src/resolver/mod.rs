//! DOI resolution with ordered fallback strategies.
//!
//! A candidate that is already a complete DOI is returned unchanged. Anything
//! else (absent, prefix-only, malformed) runs the registered fallbacks in
//! registration order, stopping at the first one that yields a DOI.
//!
//! # Architecture
//!
//! - [`ResolveStrategy`] - Async trait each fallback implements
//! - [`IdentifierResolver`] - Ordered strategy collection with the resolution loop
//! - [`TextScanStrategy`] - Scans the first pages of the document text
//! - [`TitleSearchStrategy`] - Asks the registry for the top DOI by title
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use summarize_core::resolver::{IdentifierResolver, ResolveContext, TextScanStrategy};
//! use summarize_core::LopdfPageText;
//!
//! # async fn example(pdf: Vec<u8>) {
//! let mut resolver = IdentifierResolver::new(Duration::from_secs(30));
//! resolver.register(Box::new(TextScanStrategy::new(Arc::new(LopdfPageText::new()), 2)));
//!
//! let ctx = ResolveContext::new(Some("10.1000"), None, &pdf);
//! if let Some(resolved) = resolver.resolve(&ctx).await {
//!     println!("{} via {:?}", resolved.doi, resolved.source);
//! }
//! # }
//! ```

mod text_scan;
mod title_search;

pub use text_scan::TextScanStrategy;
pub use title_search::TitleSearchStrategy;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CollaboratorError, with_timeout};
use crate::identifier::{Doi, DoiStatus, classify_candidate};

/// Number of leading pages inspected by the text-scan fallback.
pub const DEFAULT_TEXT_SCAN_PAGES: usize = 2;

/// Number of title-search results requested.
pub const TITLE_SEARCH_ROWS: u32 = 1;

/// Where the final DOI came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DoiSource {
    /// The document extractor reported a complete DOI.
    Extracted,
    /// Found in the leading pages of the document text.
    TextScan,
    /// Top hit of a registry title search.
    TitleSearch,
}

/// A DOI together with the step that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDoi {
    pub doi: Doi,
    pub source: DoiSource,
}

/// Inputs available to every strategy.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// DOI candidate reported by the extractor, unvalidated.
    pub candidate: Option<&'a str>,
    /// Extracted title, if any.
    pub title: Option<&'a str>,
    /// Raw document bytes.
    pub document: &'a [u8],
}

impl<'a> ResolveContext<'a> {
    /// Creates a resolution context.
    #[must_use]
    pub fn new(candidate: Option<&'a str>, title: Option<&'a str>, document: &'a [u8]) -> Self {
        Self {
            candidate,
            title,
            document,
        }
    }

    /// Returns the title when it is present and not blank.
    #[must_use]
    pub fn usable_title(&self) -> Option<&'a str> {
        self.title.map(str::trim).filter(|t| !t.is_empty())
    }
}

/// A single fallback step.
///
/// # Object Safety
///
/// Uses `async_trait` so strategies can be stored as `Box<dyn ResolveStrategy>`.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    /// Short name used in logs (e.g. "text-scan").
    fn name(&self) -> &'static str;

    /// Source label attached to a DOI found by this strategy.
    fn source(&self) -> DoiSource;

    /// Attempts to find a complete DOI.
    ///
    /// `Ok(None)` means "not found" and lets the next strategy run.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] if a backing service fails. The resolver
    /// logs it and moves on.
    async fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<Doi>, CollaboratorError>;
}

/// Ordered collection of fallback strategies.
pub struct IdentifierResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
    call_timeout: Duration,
}

impl IdentifierResolver {
    /// Creates an empty resolver; each strategy call is bounded by `call_timeout`.
    #[must_use]
    pub fn new(call_timeout: Duration) -> Self {
        Self {
            strategies: Vec::new(),
            call_timeout,
        }
    }

    /// Appends a strategy. Strategies run in registration order.
    pub fn register(&mut self, strategy: Box<dyn ResolveStrategy>) {
        debug!(strategy = strategy.name(), "registered DOI fallback strategy");
        self.strategies.push(strategy);
    }

    /// Names of the registered strategies, in evaluation order.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolves a DOI: the candidate if it is complete, otherwise the first
    /// fallback hit.
    pub async fn resolve(&self, ctx: &ResolveContext<'_>) -> Option<ResolvedDoi> {
        let status = classify_candidate(ctx.candidate);
        if let DoiStatus::Valid(doi) = status {
            debug!(doi = %doi, "extracted DOI is complete");
            return Some(ResolvedDoi {
                doi,
                source: DoiSource::Extracted,
            });
        }
        self.resolve_fallbacks(ctx, &status).await
    }

    /// Runs the fallback strategies only.
    ///
    /// Strategy errors and timeouts are logged and treated as "not found".
    #[tracing::instrument(skip(self, ctx, status), fields(reason = status.fallback_reason().unwrap_or("none")))]
    pub async fn resolve_fallbacks(
        &self,
        ctx: &ResolveContext<'_>,
        status: &DoiStatus,
    ) -> Option<ResolvedDoi> {
        info!(
            reason = status.fallback_reason().unwrap_or("none"),
            "DOI missing or incomplete; trying fallbacks"
        );

        for strategy in &self.strategies {
            let name = strategy.name();
            debug!(strategy = name, "trying DOI fallback");

            match with_timeout(name, self.call_timeout, strategy.resolve(ctx)).await {
                Ok(Some(doi)) => {
                    info!(strategy = name, doi = %doi, "DOI resolved by fallback");
                    return Some(ResolvedDoi {
                        doi,
                        source: strategy.source(),
                    });
                }
                Ok(None) => {
                    debug!(strategy = name, "fallback found no DOI");
                }
                Err(error) => {
                    warn!(strategy = name, error = %error, "DOI fallback failed, trying next");
                }
            }
        }

        info!("no DOI found; continuing without one");
        None
    }
}

impl Default for IdentifierResolver {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::pipeline::DEFAULT_CALL_TIMEOUT_SECS))
    }
}

impl std::fmt::Debug for IdentifierResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierResolver")
            .field("strategies", &self.strategy_names())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;

    /// Strategy returning a fixed answer and recording its invocation.
    struct Fixed {
        name: &'static str,
        answer: Result<Option<&'static str>, ()>,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl ResolveStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn source(&self) -> DoiSource {
            DoiSource::TitleSearch
        }

        async fn resolve(&self, _ctx: &ResolveContext<'_>) -> Result<Option<Doi>, CollaboratorError> {
            self.calls.lock().unwrap().push(self.name);
            match self.answer {
                Ok(Some(doi)) => Ok(Some(Doi::parse(doi).unwrap())),
                Ok(None) => Ok(None),
                Err(()) => Err(CollaboratorError::transport(self.name, "boom")),
            }
        }
    }

    struct Slow;

    #[async_trait]
    impl ResolveStrategy for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn source(&self) -> DoiSource {
            DoiSource::TextScan
        }

        async fn resolve(&self, _ctx: &ResolveContext<'_>) -> Result<Option<Doi>, CollaboratorError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Some(Doi::parse("10.9999/slow").unwrap()))
        }
    }

    fn resolver_with(
        answers: &[(&'static str, Result<Option<&'static str>, ()>)],
    ) -> (IdentifierResolver, Arc<Mutex<Vec<&'static str>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut resolver = IdentifierResolver::new(Duration::from_secs(5));
        for (name, answer) in answers {
            resolver.register(Box::new(Fixed {
                name: *name,
                answer: *answer,
                calls: Arc::clone(&calls),
            }));
        }
        (resolver, calls)
    }

    #[tokio::test]
    async fn test_valid_candidate_returned_unchanged_without_fallbacks() {
        let (resolver, calls) = resolver_with(&[("a", Ok(Some("10.2000/other")))]);
        let ctx = ResolveContext::new(Some("10.1000/xyz123"), Some("T"), b"");
        let resolved = resolver.resolve(&ctx).await.unwrap();
        assert_eq!(resolved.doi.as_str(), "10.1000/xyz123");
        assert_eq!(resolved.source, DoiSource::Extracted);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prefix_only_runs_fallbacks_in_order_and_short_circuits() {
        let (resolver, calls) = resolver_with(&[
            ("first", Ok(None)),
            ("second", Ok(Some("10.2000/found"))),
            ("third", Ok(Some("10.3000/never"))),
        ]);
        let ctx = ResolveContext::new(Some("10.1000"), Some("T"), b"");
        let resolved = resolver.resolve(&ctx).await.unwrap();
        assert_eq!(resolved.doi.as_str(), "10.2000/found");
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_prefix_only_never_returned() {
        let (resolver, _calls) = resolver_with(&[("only", Ok(None))]);
        let ctx = ResolveContext::new(Some("10.1000"), None, b"");
        assert!(resolver.resolve(&ctx).await.is_none());
    }

    #[tokio::test]
    async fn test_strategy_error_is_absorbed() {
        let (resolver, calls) = resolver_with(&[("broken", Err(())), ("ok", Ok(Some("10.2000/x")))]);
        let ctx = ResolveContext::new(None, None, b"");
        let resolved = resolver.resolve(&ctx).await.unwrap();
        assert_eq!(resolved.doi.as_str(), "10.2000/x");
        assert_eq!(*calls.lock().unwrap(), vec!["broken", "ok"]);
    }

    #[tokio::test]
    async fn test_strategy_timeout_is_absorbed() {
        let mut resolver = IdentifierResolver::new(Duration::from_millis(20));
        resolver.register(Box::new(Slow));
        let ctx = ResolveContext::new(None, None, b"");
        assert!(resolver.resolve(&ctx).await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_candidate_triggers_fallbacks() {
        let (resolver, calls) = resolver_with(&[("only", Ok(Some("10.2000/y")))]);
        let ctx = ResolveContext::new(Some("abc"), None, b"");
        assert_eq!(resolver.resolve(&ctx).await.unwrap().doi.as_str(), "10.2000/y");
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_usable_title_ignores_blank() {
        assert_eq!(ResolveContext::new(None, Some("  "), b"").usable_title(), None);
        assert_eq!(
            ResolveContext::new(None, Some(" Deep Nets "), b"").usable_title(),
            Some("Deep Nets")
        );
    }

    #[test]
    fn test_strategy_names_in_registration_order() {
        let (resolver, _) = resolver_with(&[("a", Ok(None)), ("b", Ok(None))]);
        assert_eq!(resolver.strategy_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_doi_source_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&DoiSource::TitleSearch).unwrap(),
            "\"title-search\""
        );
    }
}
