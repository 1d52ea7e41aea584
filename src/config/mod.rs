//! Configuration module for VEDIQ.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, the `GEMINI_API_KEY`
//! credential lookup, and TOML persistence via `AppConfig::load` /
//! `AppConfig::save`.

pub mod credential;
pub mod paths;
pub mod settings;

pub use credential::{gemini_api_key, CredentialError};
pub use paths::AppPaths;
pub use settings::{AppConfig, GeminiConfig, IllustrationConfig, SpeechConfig};
