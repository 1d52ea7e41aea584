//! Remote Gemini clients for VEDIQ.
//!
//! This module provides:
//! * [`ReplyStreamer`] — async trait for the streamed chat session.
//! * [`GeminiChat`] — stateful chat session over `streamGenerateContent`.
//! * [`Illustrator`] / [`GeminiIllustrator`] — scene illustration via the
//!   image model's `predict` endpoint.
//! * [`Translator`] / [`GeminiTranslator`] — single-shot narration
//!   translation via `generateContent`.
//! * [`FallbackTranslator`] — wraps any translator; returns the original
//!   text on failure.
//! * [`prompt`] — the system instruction and all prompt builders.
//! * [`wire`] — serde types for the Generative Language API.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use vediq::chat::{ResponseMode, SourceText};
//! use vediq::config::AppConfig;
//! use vediq::gemini::{GeminiChat, ReplyStreamer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let chat = GeminiChat::from_config(&config.gemini);
//!
//!     let mut rx = chat
//!         .stream_reply(
//!             "What is dharma according to the Gita?",
//!             SourceText::BhagavadGita,
//!             ResponseMode::GeneralWisdom,
//!         )
//!         .await
//!         .unwrap();
//!
//!     while let Some(fragment) = rx.recv().await {
//!         print!("{}", fragment.unwrap());
//!     }
//! }
//! ```

pub mod fallback;
pub mod illustrator;
pub mod prompt;
pub mod session;
pub mod translator;
pub mod wire;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use fallback::FallbackTranslator;
pub use illustrator::{GeminiIllustrator, GenerationError, Illustrator};
pub use session::{GeminiChat, ReplyStreamer, SessionError, StreamError};
pub use translator::{GeminiTranslator, TranslationError, Translator};
