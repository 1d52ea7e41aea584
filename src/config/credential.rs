//! Gemini API credential lookup.
//!
//! The key is read from the `GEMINI_API_KEY` environment variable **at call
//! time**, never cached. A missing key is a hard failure for every remote
//! call path — the error embeds into each remote error enum via `#[from]`
//! so callers surface it the same way as any other remote failure.

use thiserror::Error;

/// Name of the environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// The required API credential is missing or unusable.
///
/// Not recoverable without operator intervention — no retries are attempted.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CredentialError {
    /// `GEMINI_API_KEY` is not set in the process environment.
    #[error("{API_KEY_VAR} environment variable is missing")]
    Missing,

    /// `GEMINI_API_KEY` is set but empty.
    #[error("{API_KEY_VAR} environment variable is empty")]
    Empty,
}

/// Read the Gemini API key from the process environment.
pub fn gemini_api_key() -> Result<String, CredentialError> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if key.trim().is_empty() => Err(CredentialError::Empty),
        Ok(key) => Ok(key),
        Err(_) => Err(CredentialError::Missing),
    }
}

/// Serialises tests that mutate the process environment.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
