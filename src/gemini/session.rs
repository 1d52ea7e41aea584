//! Streamed chat session over `streamGenerateContent`.
//!
//! [`GeminiChat`] keeps the prior turns of the conversation and forwards each
//! user query — wrapped in the hidden context block — to the remote model,
//! yielding reply fragments over a `tokio::sync::mpsc` channel as they arrive
//! on the SSE response body.
//!
//! # Session semantics
//!
//! * Lazily initialised: the credential is resolved on the first send, not at
//!   construction. A missing `GEMINI_API_KEY` is a [`SessionError`] and is
//!   never retried.
//! * Prior turns persist across sends until [`ReplyStreamer::reset`] clears
//!   them; a turn is committed to the history only after its stream finishes
//!   cleanly.
//! * A mid-flight failure surfaces a [`StreamError`] **after** the last
//!   successfully delivered fragment; fragments already yielded stay
//!   delivered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::chat::{ResponseMode, SourceText};
use crate::config::{gemini_api_key, CredentialError, GeminiConfig};

use super::prompt;
use super::wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, SystemInstruction,
};

// ---------------------------------------------------------------------------
// SessionError / StreamError
// ---------------------------------------------------------------------------

/// The remote session could not be created or the send could not start.
///
/// Surfaced to the caller before any fragment is yielded; the turn is
/// aborted.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The required API credential is missing.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// HTTP transport or connection error before the stream opened.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The remote endpoint rejected the request outright.
    #[error("chat request rejected (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },
}

impl From<reqwest::Error> for SessionError {
    fn from(e: reqwest::Error) -> Self {
        SessionError::Request(e.to_string())
    }
}

/// The stream failed after it had started.
///
/// Any fragments already yielded remain delivered; this error arrives as the
/// final item on the fragment channel.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The response body failed mid-flight.
    #[error("stream transport failed: {0}")]
    Transport(String),

    /// A chunk could not be decoded as a response payload.
    #[error("failed to decode stream chunk: {0}")]
    Decode(String),

    /// The remote model blocked the prompt.
    #[error("request blocked by the remote model: {0}")]
    Blocked(String),
}

// ---------------------------------------------------------------------------
// ReplyStreamer trait
// ---------------------------------------------------------------------------

/// Async trait for the streamed chat backend.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn ReplyStreamer>`.
///
/// `stream_reply` returns a lazy, single-pass, finite sequence of text
/// fragments; the receiver closes after the last fragment (or after the
/// terminal `Err` item).
#[async_trait]
pub trait ReplyStreamer: Send + Sync {
    /// Start a turn for `(query, source, mode)` and return its fragment
    /// channel.
    async fn stream_reply(
        &self,
        query: &str,
        source: SourceText,
        mode: ResponseMode,
    ) -> Result<mpsc::Receiver<Result<String, StreamError>>, SessionError>;

    /// Drop all prior turns; the next send starts a fresh session.
    async fn reset(&self);
}

// ---------------------------------------------------------------------------
// SSE framing
// ---------------------------------------------------------------------------

/// Extract the JSON payload from one SSE line, if it carries one.
pub(crate) fn parse_sse_data(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    line.strip_prefix("data:").map(str::trim_start)
}

/// Decode one SSE payload into an optional text fragment.
///
/// Keep-alive chunks (no candidates, no text) decode to `Ok(None)`.
pub(crate) fn fragment_from_payload(payload: &str) -> Result<Option<String>, StreamError> {
    let chunk: GenerateContentResponse =
        serde_json::from_str(payload).map_err(|e| StreamError::Decode(e.to_string()))?;

    if let Some(reason) = chunk.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone()) {
        return Err(StreamError::Blocked(reason));
    }

    Ok(chunk.text())
}

// ---------------------------------------------------------------------------
// GeminiChat
// ---------------------------------------------------------------------------

/// Stateful chat session backed by `streamGenerateContent`.
///
/// The conversation history lives behind a mutex shared with the pump task,
/// so a turn in flight and a later `reset` never race on it.
pub struct GeminiChat {
    client: reqwest::Client,
    config: GeminiConfig,
    history: Arc<Mutex<Vec<Content>>>,
    initialized: AtomicBool,
}

impl GeminiChat {
    /// Build a chat session from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is the last-resort fallback if
    /// the builder fails (should never happen in practice).
    pub fn from_config(config: &GeminiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            history: Arc::new(Mutex::new(Vec::new())),
            initialized: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ReplyStreamer for GeminiChat {
    async fn stream_reply(
        &self,
        query: &str,
        source: SourceText,
        mode: ResponseMode,
    ) -> Result<mpsc::Receiver<Result<String, StreamError>>, SessionError> {
        // Lazy session initialisation — the credential is the only session
        // state the remote side needs.
        let api_key = gemini_api_key()?;
        if !self.initialized.swap(true, Ordering::SeqCst) {
            log::info!("chat session created (model {})", self.config.chat_model);
        }

        let user_turn = Content::user(prompt::context_prompt(query, source, mode));

        let contents = {
            let history = self.history.lock().unwrap();
            let mut contents = history.clone();
            contents.push(user_turn.clone());
            contents
        };

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(SystemInstruction::new(prompt::SYSTEM_INSTRUCTION)),
            generation_config: Some(GenerationConfig {
                temperature: self.config.temperature,
            }),
        };

        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.config.base_url, self.config.chat_model, api_key
        );

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(SessionError::Rejected { status, detail });
        }

        let (tx, rx) = mpsc::channel::<Result<String, StreamError>>(32);
        let history = Arc::clone(&self.history);

        // Pump task: drain SSE chunks, forward fragments in order, commit the
        // turn to the history only on clean exhaustion.
        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut buffer = String::new();
            let mut full_reply = String::new();

            while let Some(chunk) = body.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(Err(StreamError::Transport(e.to_string()))).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                // Process complete SSE lines from the buffer.
                while let Some(line_end) = buffer.find('\n') {
                    let line: String = buffer.drain(..=line_end).collect();

                    let Some(payload) = parse_sse_data(&line) else {
                        continue;
                    };

                    match fragment_from_payload(payload) {
                        Ok(Some(fragment)) => {
                            full_reply.push_str(&fragment);
                            if tx.send(Ok(fragment)).await.is_err() {
                                // Receiver dropped — nobody is listening.
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            return;
                        }
                    }
                }
            }

            let mut history = history.lock().unwrap();
            history.push(user_turn);
            history.push(Content::model(full_reply));
        });

        Ok(rx)
    }

    async fn reset(&self) {
        self.history.lock().unwrap().clear();
        self.initialized.store(false, Ordering::SeqCst);
        log::info!("chat session reset — history cleared");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
