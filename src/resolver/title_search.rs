//! Fallback that asks the registry for the top DOI matching the title.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::CollaboratorError;
use crate::identifier::Doi;
use crate::registry::TitleSearch;

use super::{DoiSource, ResolveContext, ResolveStrategy, TITLE_SEARCH_ROWS};

/// Searches the registry by the extracted title.
///
/// Skipped when the title is absent or blank. A result that is not a complete
/// DOI is discarded.
pub struct TitleSearchStrategy {
    search: Arc<dyn TitleSearch>,
}

impl TitleSearchStrategy {
    /// Creates a title-search strategy backed by `search`.
    #[must_use]
    pub fn new(search: Arc<dyn TitleSearch>) -> Self {
        Self { search }
    }
}

impl std::fmt::Debug for TitleSearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleSearchStrategy").finish_non_exhaustive()
    }
}

#[async_trait]
impl ResolveStrategy for TitleSearchStrategy {
    fn name(&self) -> &'static str {
        "title-search"
    }

    fn source(&self) -> DoiSource {
        DoiSource::TitleSearch
    }

    #[tracing::instrument(skip(self, ctx), fields(strategy = "title-search"))]
    async fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<Doi>, CollaboratorError> {
        let Some(title) = ctx.usable_title() else {
            debug!("no title available for search");
            return Ok(None);
        };

        let Some(raw) = self.search.search_title(title, TITLE_SEARCH_ROWS).await? else {
            return Ok(None);
        };

        match Doi::parse(&raw) {
            Ok(doi) => Ok(Some(doi)),
            Err(error) => {
                debug!(candidate = %raw, error = %error, "title search returned an unusable DOI");
                Ok(None)
            }
        }
    }
}
