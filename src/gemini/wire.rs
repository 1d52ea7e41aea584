//! Serde types for the Generative Language API wire format.
//!
//! Covers the two endpoints VEDIQ talks to: `generateContent` /
//! `streamGenerateContent` (chat + translation) and `predict`
//! (illustrations). Response types are deliberately lenient — streamed
//! chunks occasionally omit parts or carry only `finishReason`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// generateContent — request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    /// `"user"` or `"model"`.
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new("user", text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new("model", text)
    }

    fn new(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// System instruction content — role-less on the wire.
#[derive(Debug, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

impl SystemInstruction {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}

// ---------------------------------------------------------------------------
// generateContent — response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default, rename = "promptFeedback")]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromptFeedback {
    #[serde(default, rename = "blockReason")]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts, if any.
    ///
    /// Returns `None` for keep-alive chunks that carry no text.
    pub fn text(&self) -> Option<String> {
        let parts = self
            .candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?;

        let text: String = parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .concat();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ---------------------------------------------------------------------------
// predict — request / response (image generation)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<ImageInstance>,
    pub parameters: ImageParameters,
}

#[derive(Debug, Serialize)]
pub struct ImageInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageParameters {
    pub sample_count: u32,
    pub aspect_ratio: String,
    pub output_mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Option<Vec<Prediction>>,
}

#[derive(Debug, Deserialize)]
pub struct Prediction {
    #[serde(default, rename = "bytesBase64Encoded")]
    pub bytes_base64_encoded: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_concatenates_first_candidate_parts() {
        let json = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "Hari " }, { "text": "Om" }], "role": "model" },
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text().as_deref(), Some("Hari Om"));
    }

    #[test]
    fn response_without_text_yields_none() {
        // Keep-alive / final chunks may carry only a finishReason.
        let json = r#"{ "candidates": [{ "finishReason": "STOP" }] }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(resp.text().is_none());

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.text().is_none());
    }

    #[test]
    fn block_reason_is_decoded() {
        let json = r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.prompt_feedback.and_then(|f| f.block_reason).as_deref(),
            Some("SAFETY")
        );
    }

    #[test]
    fn request_serialises_history_in_order() {
        let req = GenerateContentRequest {
            contents: vec![Content::user("q1"), Content::model("a1"), Content::user("q2")],
            system_instruction: Some(SystemInstruction::new("persona")),
            generation_config: Some(GenerationConfig { temperature: 0.7 }),
        };
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "q2");
        assert_eq!(json["system_instruction"]["parts"][0]["text"], "persona");
        assert_eq!(json["generation_config"]["temperature"], 0.7);
    }

    #[test]
    fn image_parameters_use_camel_case() {
        let req = PredictRequest {
            instances: vec![ImageInstance {
                prompt: "a scene".into(),
            }],
            parameters: ImageParameters {
                sample_count: 3,
                aspect_ratio: "16:9".into(),
                output_mime_type: "image/jpeg".into(),
            },
        };
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["parameters"]["sampleCount"], 3);
        assert_eq!(json["parameters"]["aspectRatio"], "16:9");
        assert_eq!(json["parameters"]["outputMimeType"], "image/jpeg");
    }

    #[test]
    fn predict_response_decodes_payloads() {
        let json = r#"{ "predictions": [{ "bytesBase64Encoded": "aGVsbG8=" }, {}] }"#;
        let resp: PredictResponse = serde_json::from_str(json).unwrap();
        let preds = resp.predictions.unwrap();
        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0].bytes_base64_encoded.as_deref(), Some("aGVsbG8="));
        assert!(preds[1].bytes_base64_encoded.is_none());
    }
}
