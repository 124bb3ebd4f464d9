//! Translation and summarization capabilities.
//!
//! The pipeline only sees the [`Translator`] and [`Summarizer`] traits. The
//! bundled implementations call Hugging Face style inference endpoints that
//! accept `{"inputs", "parameters"}` and answer with a one-element array.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::CollaboratorError;
use crate::http_client::{HttpTimeouts, build_http_client};

/// Default translation endpoint (NLLB-200 distilled).
pub const DEFAULT_TRANSLATE_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/nllb-200-distilled-600M";
/// Default summarization endpoint (Korean T5).
pub const DEFAULT_SUMMARIZE_URL: &str =
    "https://api-inference.huggingface.co/models/lcw99/t5-base-korean-text-summary";
/// Source language of extracted abstracts.
pub const DEFAULT_SOURCE_LANG: &str = "eng_Latn";
/// Language the abstract is translated into.
pub const DEFAULT_TARGET_LANG: &str = "kor_Hang";
/// Generation bound passed to the translation model.
pub const TRANSLATE_MAX_LENGTH: u32 = 1024;
/// Characters of abstract sent for translation.
pub const DEFAULT_TRANSLATE_MAX_CHARS: usize = 4000;
/// Instruction prefix expected by T5 summarization models.
pub const SUMMARY_PREFIX: &str = "summarize: ";
/// Generation bound for the one-line summary.
pub const SUMMARY_MAX_LENGTH: u32 = 100;
/// Beam width for summary generation.
pub const SUMMARY_NUM_BEAMS: u32 = 4;

/// Translates text into the configured target language.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Returns the translated text.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the backing service fails.
    async fn translate(&self, text: &str) -> Result<String, CollaboratorError>;
}

/// Produces a short summary of text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Returns a bounded-length summary.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the backing service fails.
    async fn summarize(&self, text: &str) -> Result<String, CollaboratorError>;
}

/// Returns at most `max_chars` characters of `text`, cut on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Shared POST-and-decode logic for inference endpoints.
struct InferenceEndpoint {
    service: &'static str,
    client: Client,
    url: String,
    token: Option<String>,
}

impl InferenceEndpoint {
    fn new(
        service: &'static str,
        url: String,
        token: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, CollaboratorError> {
        Ok(Self {
            service,
            client: build_http_client(service, timeouts)?,
            url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    async fn post<T: DeserializeOwned>(&self, body: &serde_json::Value) -> Result<T, CollaboratorError> {
        let mut request = self.client.post(&self.url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!(service = self.service, error = %e, "inference request failed");
            CollaboratorError::transport(self.service, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(service = self.service, status = status.as_u16(), "inference endpoint error");
            return Err(CollaboratorError::status(self.service, status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CollaboratorError::invalid_response(self.service, e))
    }
}

#[derive(Debug, Deserialize)]
struct TranslationOutput {
    translation_text: String,
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

fn first_output<T>(service: &str, outputs: Vec<T>) -> Result<T, CollaboratorError> {
    outputs
        .into_iter()
        .next()
        .ok_or_else(|| CollaboratorError::invalid_response(service, "empty output array"))
}

/// Settings for [`HfTranslator`].
#[derive(Debug, Clone)]
pub struct TranslatorSettings {
    pub url: String,
    pub token: Option<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub max_input_chars: usize,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_TRANSLATE_URL.to_string(),
            token: None,
            source_lang: DEFAULT_SOURCE_LANG.to_string(),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            max_input_chars: DEFAULT_TRANSLATE_MAX_CHARS,
        }
    }
}

/// [`Translator`] backed by a translation inference endpoint.
pub struct HfTranslator {
    endpoint: InferenceEndpoint,
    settings: TranslatorSettings,
}

impl HfTranslator {
    /// Creates a translator.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Setup`] if the HTTP client cannot be built.
    pub fn new(settings: TranslatorSettings, timeouts: HttpTimeouts) -> Result<Self, CollaboratorError> {
        let endpoint = InferenceEndpoint::new("translate", settings.url.clone(), settings.token.clone(), timeouts)?;
        Ok(Self { endpoint, settings })
    }
}

impl std::fmt::Debug for HfTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTranslator")
            .field("url", &self.settings.url)
            .field("source_lang", &self.settings.source_lang)
            .field("target_lang", &self.settings.target_lang)
            .field("has_token", &self.settings.token.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Translator for HfTranslator {
    #[tracing::instrument(skip(self, text), fields(service = "translate", text_len = text.len()))]
    async fn translate(&self, text: &str) -> Result<String, CollaboratorError> {
        let input = truncate_chars(text.trim(), self.settings.max_input_chars);
        if input.len() < text.trim().len() {
            debug!(max_chars = self.settings.max_input_chars, "translation input truncated");
        }

        let body = json!({
            "inputs": input,
            "parameters": {
                "src_lang": self.settings.source_lang,
                "tgt_lang": self.settings.target_lang,
                "max_length": TRANSLATE_MAX_LENGTH,
            }
        });
        let outputs: Vec<TranslationOutput> = self.endpoint.post(&body).await?;
        let translated = first_output("translate", outputs)?.translation_text.trim().to_string();
        debug!(preview = %truncate_chars(&translated, 100), "translation finished");
        Ok(translated)
    }
}

/// [`Summarizer`] backed by a T5-style summarization endpoint.
pub struct HfSummarizer {
    endpoint: InferenceEndpoint,
}

impl HfSummarizer {
    /// Creates a summarizer.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Setup`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, token: Option<String>, timeouts: HttpTimeouts) -> Result<Self, CollaboratorError> {
        Ok(Self {
            endpoint: InferenceEndpoint::new("summarize", url.into(), token, timeouts)?,
        })
    }
}

impl std::fmt::Debug for HfSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfSummarizer")
            .field("url", &self.endpoint.url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Summarizer for HfSummarizer {
    #[tracing::instrument(skip(self, text), fields(service = "summarize", text_len = text.len()))]
    async fn summarize(&self, text: &str) -> Result<String, CollaboratorError> {
        let body = json!({
            "inputs": format!("{SUMMARY_PREFIX}{text}"),
            "parameters": {
                "max_length": SUMMARY_MAX_LENGTH,
                "num_beams": SUMMARY_NUM_BEAMS,
                "early_stopping": true,
            }
        });
        let outputs: Vec<SummaryOutput> = self.endpoint.post(&body).await?;
        Ok(first_output("summarize", outputs)?.summary_text.trim().to_string())
    }
}
