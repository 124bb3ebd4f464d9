//! Shared User-Agent string for outbound HTTP clients.
//!
//! Single source for the UA format so every service sees the same
//! identification (RFC 9308). The contact channel for Crossref is the
//! polite-pool `mailto`, so no project URL is advertised here.

/// Default User-Agent for collaborator requests (no per-service name in header).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("summarize-papers/{version} (research-tool)")
}
