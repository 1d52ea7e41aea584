//! Narration pipeline — reads one assistant message aloud.
//!
//! [`SpeechPipeline`] owns the process-wide reading indicator: at most one
//! message narrates at a time, a second request for the same message toggles
//! narration off, and a request for a different message cancels the current
//! one first.
//!
//! # Narration flow
//!
//! ```text
//! read(id, language)
//!   ├─ id is currently reading     → stop, clear indicator, done (toggle)
//!   ├─ something else is reading   → stop it
//!   ├─ translation required?
//!   │    ├─ cached                 → use cached adaptation
//!   │    └─ miss                   → translate (original text on failure),
//!   │                                cache under the language name
//!   ├─ strip markdown, detect script, pick voice
//!   └─ speak; the end callback clears the indicator
//! ```

use std::sync::{Arc, Mutex};

use crate::chat::{Language, SharedChatState};
use crate::gemini::Translator;

use super::script::{contains_devanagari, strip_markdown, translation_required};
use super::synth::{SpeechError, Synthesizer};
use super::voice::select_voice;

// ---------------------------------------------------------------------------
// SpeechPipeline
// ---------------------------------------------------------------------------

/// Drives narration of assistant messages over a [`Synthesizer`] backend.
pub struct SpeechPipeline {
    state: SharedChatState,
    translator: Arc<dyn Translator>,
    synth: Arc<dyn Synthesizer>,
    currently_reading: Arc<Mutex<Option<String>>>,
}

impl SpeechPipeline {
    /// Create a pipeline and wire the backend's end-of-utterance callback to
    /// the reading indicator.
    pub fn new(
        state: SharedChatState,
        translator: Arc<dyn Translator>,
        synth: Arc<dyn Synthesizer>,
    ) -> Self {
        let currently_reading = Arc::new(Mutex::new(None::<String>));

        let indicator = Arc::clone(&currently_reading);
        if let Err(e) = synth.set_end_callback(Box::new(move || {
            *indicator.lock().unwrap() = None;
        })) {
            log::warn!("could not install utterance-end callback: {e}");
        }

        Self {
            state,
            translator,
            synth,
            currently_reading,
        }
    }

    /// Id of the message being narrated right now, if any.
    pub fn currently_reading(&self) -> Option<String> {
        self.currently_reading.lock().unwrap().clone()
    }

    /// Stop narration and clear the reading indicator.
    pub fn stop(&self) -> Result<(), SpeechError> {
        self.currently_reading.lock().unwrap().take();
        self.synth.stop()
    }

    /// Narrate the message with `message_id` in `language`.
    ///
    /// Re-requesting the message currently being read toggles narration off.
    /// Unknown ids and empty messages are no-ops.
    pub async fn read(&self, message_id: &str, language: Language) -> Result<(), SpeechError> {
        // One narration process-wide: stop whatever is playing. If it was
        // this very message, that's the toggle-off.
        let was_reading_this = {
            let mut reading = self.currently_reading.lock().unwrap();
            let same = reading.as_deref() == Some(message_id);
            reading.take();
            same
        };
        self.synth.stop()?;
        if was_reading_this {
            return Ok(());
        }

        let (text, cached) = {
            let st = self.state.lock().unwrap();
            let Some(msg) = st.message(message_id) else {
                log::warn!("read: unknown message id {message_id}");
                return Ok(());
            };
            (
                msg.text.clone(),
                msg.translations.get(language.label()).cloned(),
            )
        };
        if text.trim().is_empty() {
            return Ok(());
        }

        let narration = if translation_required(language, &text) {
            match cached {
                Some(adapted) => adapted,
                None => match self.adapt(message_id, &text, language).await {
                    Some(adapted) => adapted,
                    // Message vanished mid-translation (conversation reset).
                    None => return Ok(()),
                },
            }
        } else {
            text
        };

        let script = strip_markdown(&narration);
        let has_devanagari = contains_devanagari(&narration);

        let voices = match self.synth.voices() {
            Ok(voices) => voices,
            Err(e) => {
                log::warn!("voice enumeration failed ({e}), using default voice");
                Vec::new()
            }
        };
        let voice = select_voice(&voices, has_devanagari).cloned();

        *self.currently_reading.lock().unwrap() = Some(message_id.to_string());
        if let Err(e) = self.synth.speak(&script, voice.as_ref()) {
            self.currently_reading.lock().unwrap().take();
            return Err(e);
        }
        Ok(())
    }

    /// Translate `text` for narration and cache the result on the message.
    ///
    /// A failed translation adapts to the original text, which is cached like
    /// any other result so the failure is not retried per narration. Returns
    /// `None` when the message no longer exists.
    async fn adapt(&self, message_id: &str, text: &str, language: Language) -> Option<String> {
        {
            let mut st = self.state.lock().unwrap();
            st.message_mut(message_id)?.is_translating_audio = true;
        }

        let adapted = match self.translator.translate(text, language).await {
            Ok(adapted) => adapted,
            Err(e) => {
                log::warn!(
                    "narration translation to {} failed ({e}), using original text",
                    language.label()
                );
                text.to_string()
            }
        };

        let mut st = self.state.lock().unwrap();
        let msg = st.message_mut(message_id)?;
        msg.is_translating_audio = false;
        msg.translations
            .insert(language.label().to_string(), adapted.clone());
        Some(adapted)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
