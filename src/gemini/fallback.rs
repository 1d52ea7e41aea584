//! Fallback translator — wraps any [`Translator`] and returns the original
//! text on error.
//!
//! When the underlying translation call fails for any reason (`Credential`,
//! `Request`, `Timeout`, `Rejected`, `Parse`, `EmptyResponse`)
//! [`FallbackTranslator`] silently returns the untranslated input instead of
//! propagating the error. Narration therefore proceeds with the literal text
//! rather than blocking or crashing the conversation.

use async_trait::async_trait;

use crate::chat::Language;

use super::translator::{TranslationError, Translator};

// ---------------------------------------------------------------------------
// FallbackTranslator
// ---------------------------------------------------------------------------

/// A transparent wrapper around any [`Translator`] that never returns an
/// error — on failure it returns the input unchanged.
///
/// # Example
/// ```rust
/// use vediq::config::AppConfig;
/// use vediq::gemini::{FallbackTranslator, GeminiTranslator};
///
/// let inner = GeminiTranslator::from_config(&AppConfig::default().gemini);
/// let translator = FallbackTranslator::new(inner);
/// // `translator` now implements Translator and is safe to use even when
/// // the remote endpoint is unavailable.
/// ```
pub struct FallbackTranslator<T: Translator> {
    inner: T,
}

impl<T: Translator> FallbackTranslator<T> {
    /// Wrap `inner` with fallback behaviour.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Return a reference to the wrapped translator.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Translator + Send + Sync> Translator for FallbackTranslator<T> {
    /// Attempt translation; return `text` unchanged if any error occurs.
    ///
    /// This implementation **never** returns `Err(_)`.
    async fn translate(
        &self,
        text: &str,
        language: Language,
    ) -> Result<String, TranslationError> {
        match self.inner.translate(text, language).await {
            Ok(translated) => Ok(translated),
            Err(e) => {
                log::warn!(
                    "translation to {} failed ({e}) — narrating original text (len={})",
                    language.label(),
                    text.len()
                );
                Ok(text.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
