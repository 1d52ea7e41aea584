//! Scene illustration via the image model's `predict` endpoint.
//!
//! [`GeminiIllustrator`] turns response text into a bounded scene prompt,
//! requests a fixed number of JPEG images at a fixed aspect ratio, and
//! returns them as displayable `data:` URIs. A response with no images is an
//! empty list, not an error — only transport/remote failures surface as
//! [`GenerationError`].

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{gemini_api_key, CredentialError, GeminiConfig, IllustrationConfig};

use super::prompt;
use super::wire::{ImageInstance, ImageParameters, PredictRequest, PredictResponse};

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Errors that can occur during illustration generation.
///
/// Callers must leave the message's prior images unchanged and surface a
/// notice; the conversation itself is unaffected.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The required API credential is missing.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("illustration request timed out")]
    Timeout,

    /// The remote endpoint rejected the request.
    #[error("illustration request rejected (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse illustration response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Illustrator trait
// ---------------------------------------------------------------------------

/// Async trait for illustration backends.
#[async_trait]
pub trait Illustrator: Send + Sync {
    /// Generate illustrations for `text`, returned as image data URIs.
    ///
    /// An empty vec means the remote call succeeded but produced no images.
    async fn generate(&self, text: &str) -> Result<Vec<String>, GenerationError>;
}

// ---------------------------------------------------------------------------
// GeminiIllustrator
// ---------------------------------------------------------------------------

/// Calls the configured image model's `predict` endpoint.
pub struct GeminiIllustrator {
    client: reqwest::Client,
    gemini: GeminiConfig,
    illustration: IllustrationConfig,
}

impl GeminiIllustrator {
    /// Build an illustrator from application config.
    pub fn from_config(gemini: &GeminiConfig, illustration: &IllustrationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(gemini.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            gemini: gemini.clone(),
            illustration: illustration.clone(),
        }
    }
}

#[async_trait]
impl Illustrator for GeminiIllustrator {
    async fn generate(&self, text: &str) -> Result<Vec<String>, GenerationError> {
        let api_key = gemini_api_key()?;

        let request = PredictRequest {
            instances: vec![ImageInstance {
                prompt: prompt::illustration_prompt(text, self.illustration.scene_chars),
            }],
            parameters: ImageParameters {
                sample_count: self.illustration.image_count,
                aspect_ratio: self.illustration.aspect_ratio.clone(),
                output_mime_type: "image/jpeg".into(),
            },
        };

        let url = format!(
            "{}/models/{}:predict?key={}",
            self.gemini.base_url, self.gemini.image_model, api_key
        );

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Rejected { status, detail });
        }

        let predict: PredictResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        Ok(data_uris(predict))
    }
}

/// Convert returned base64 payloads into `data:image/jpeg;base64,…` URIs.
///
/// Predictions without a payload are skipped; no predictions at all is an
/// empty list.
fn data_uris(response: PredictResponse) -> Vec<String> {
    response
        .predictions
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.bytes_base64_encoded)
        .map(|b64| format!("data:image/jpeg;base64,{b64}"))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_become_jpeg_data_uris() {
        let response: PredictResponse = serde_json::from_str(
            r#"{ "predictions": [
                { "bytesBase64Encoded": "AAAA" },
                { "bytesBase64Encoded": "BBBB" }
            ]}"#,
        )
        .unwrap();

        let uris = data_uris(response);
        assert_eq!(
            uris,
            vec![
                "data:image/jpeg;base64,AAAA".to_string(),
                "data:image/jpeg;base64,BBBB".to_string(),
            ]
        );
    }

    /// No images reported by the remote call is not an error.
    #[test]
    fn missing_predictions_yield_an_empty_list() {
        let response: PredictResponse = serde_json::from_str("{}").unwrap();
        assert!(data_uris(response).is_empty());

        let response: PredictResponse =
            serde_json::from_str(r#"{ "predictions": [] }"#).unwrap();
        assert!(data_uris(response).is_empty());
    }

    #[test]
    fn predictions_without_payload_are_skipped() {
        let response: PredictResponse = serde_json::from_str(
            r#"{ "predictions": [ {}, { "bytesBase64Encoded": "CCCC" } ] }"#,
        )
        .unwrap();

        let uris = data_uris(response);
        assert_eq!(uris, vec!["data:image/jpeg;base64,CCCC".to_string()]);
    }

    /// GeminiIllustrator must be usable as `Arc<dyn Illustrator>`.
    #[test]
    fn illustrator_is_object_safe() {
        let illustrator: std::sync::Arc<dyn Illustrator> =
            std::sync::Arc::new(GeminiIllustrator::from_config(
                &GeminiConfig::default(),
                &IllustrationConfig::default(),
            ));
        drop(illustrator);
    }
}
