//! Single-shot narration translation via `generateContent`.
//!
//! [`GeminiTranslator`] adapts message text into the requested narration
//! language (Devanagari Hindi, Latin-script Hinglish, or fluent English) and
//! returns the completion verbatim. Input is truncated to a bounded prefix
//! before the prompt is built.

use async_trait::async_trait;
use thiserror::Error;

use crate::chat::Language;
use crate::config::{gemini_api_key, CredentialError, GeminiConfig};

use super::prompt;
use super::wire::{Content, GenerateContentRequest, GenerateContentResponse};

/// Maximum number of source characters embedded in a translation prompt.
pub const TRANSLATION_INPUT_CHARS: usize = 2000;

// ---------------------------------------------------------------------------
// TranslationError
// ---------------------------------------------------------------------------

/// Errors that can occur during narration translation.
///
/// Non-fatal by design — the speech pipeline falls back to the original text
/// (see [`super::FallbackTranslator`]).
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The required API credential is missing.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("translation request timed out")]
    Timeout,

    /// The remote endpoint rejected the request.
    #[error("translation request rejected (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse translation response: {0}")]
    Parse(String),

    /// The model returned a response with no usable text content.
    #[error("translation returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for TranslationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslationError::Timeout
        } else {
            TranslationError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Translator trait
// ---------------------------------------------------------------------------

/// Async trait for narration translation backends.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate/adapt `text` into `language`.
    async fn translate(&self, text: &str, language: Language)
        -> Result<String, TranslationError>;
}

// ---------------------------------------------------------------------------
// GeminiTranslator
// ---------------------------------------------------------------------------

/// Calls the chat model's non-streaming `generateContent` endpoint with the
/// per-language translation rules.
pub struct GeminiTranslator {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiTranslator {
    /// Build a translator from application config.
    pub fn from_config(config: &GeminiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Translator for GeminiTranslator {
    async fn translate(
        &self,
        text: &str,
        language: Language,
    ) -> Result<String, TranslationError> {
        let api_key = gemini_api_key()?;

        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt::translation_prompt(
                text,
                language,
                TRANSLATION_INPUT_CHARS,
            ))],
            system_instruction: None,
            generation_config: None,
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, self.config.chat_model, api_key
        );

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(TranslationError::Rejected { status, detail });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Parse(e.to_string()))?;

        let translated = body
            .text()
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        if translated.is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        Ok(translated)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_builds_without_panic() {
        let _translator = GeminiTranslator::from_config(&GeminiConfig::default());
    }

    /// GeminiTranslator must be usable as `Arc<dyn Translator>`.
    #[test]
    fn translator_is_object_safe() {
        let translator: Box<dyn Translator> =
            Box::new(GeminiTranslator::from_config(&GeminiConfig::default()));
        drop(translator);
    }
}
