//! Settings used to wire the default collaborators.

use std::time::Duration;

use crate::crossref::DEFAULT_CROSSREF_URL;
use crate::grobid::DEFAULT_GROBID_URL;
use crate::http_client::HttpTimeouts;
use crate::resolver::DEFAULT_TEXT_SCAN_PAGES;
use crate::transform::{
    DEFAULT_SOURCE_LANG, DEFAULT_SUMMARIZE_URL, DEFAULT_TARGET_LANG, DEFAULT_TRANSLATE_MAX_CHARS,
    DEFAULT_TRANSLATE_URL,
};

/// Upper bound for any single collaborator call.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 120;

/// Contact address for the Crossref polite pool when none is configured.
pub const DEFAULT_CROSSREF_MAILTO: &str = "summarize-papers@example.com";

/// Service endpoints and limits for one pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub grobid_url: String,
    pub crossref_url: String,
    pub crossref_mailto: String,
    pub translate_url: String,
    pub summarize_url: String,
    /// Bearer token for the inference endpoints.
    pub hf_token: Option<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub http: HttpTimeouts,
    /// Bound applied around every collaborator call.
    pub call_timeout: Duration,
    /// Pages inspected by the text-scan fallback.
    pub text_scan_pages: usize,
    /// Characters of abstract sent for translation.
    pub translate_max_chars: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            grobid_url: DEFAULT_GROBID_URL.to_string(),
            crossref_url: DEFAULT_CROSSREF_URL.to_string(),
            crossref_mailto: DEFAULT_CROSSREF_MAILTO.to_string(),
            translate_url: DEFAULT_TRANSLATE_URL.to_string(),
            summarize_url: DEFAULT_SUMMARIZE_URL.to_string(),
            hf_token: None,
            source_lang: DEFAULT_SOURCE_LANG.to_string(),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            http: HttpTimeouts::default(),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
            text_scan_pages: DEFAULT_TEXT_SCAN_PAGES,
            translate_max_chars: DEFAULT_TRANSLATE_MAX_CHARS,
        }
    }
}
