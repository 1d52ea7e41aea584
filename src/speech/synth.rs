//! Speech synthesis backends.
//!
//! [`Synthesizer`] is the seam between the narration pipeline and whatever
//! produces audio. Two backends ship:
//!
//! * [`SilentSynthesizer`] — always available; logs the narration instead of
//!   speaking it. The default on headless builds.
//! * [`SystemSynthesizer`] — the platform voice stack via the `tts` crate,
//!   behind the `system-tts` cargo feature.

use std::sync::Mutex;

use thiserror::Error;

use super::voice::VoiceInfo;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors from a speech backend.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The backend could not be initialised.
    #[error("speech backend could not be initialised: {0}")]
    Init(String),

    /// A backend call failed.
    #[error("speech backend failed: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// Synthesizer trait
// ---------------------------------------------------------------------------

/// Narration end callback, invoked when an utterance finishes on its own.
pub type EndCallback = Box<dyn FnMut() + Send + 'static>;

/// Abstraction over a speech backend.
///
/// Starting a new utterance always cancels the current one (`speak` with
/// interrupt semantics). Implementors must be `Send + Sync` so the pipeline
/// can hold them as `Arc<dyn Synthesizer>`.
pub trait Synthesizer: Send + Sync {
    /// Voices available right now.
    ///
    /// Queried per narration, never cached by callers: platform voice stacks
    /// populate asynchronously and an early empty answer must not stick.
    fn voices(&self) -> Result<Vec<VoiceInfo>, SpeechError>;

    /// Speak `text`, cancelling any utterance in progress.
    ///
    /// `voice = None` uses the backend default.
    fn speak(&self, text: &str, voice: Option<&VoiceInfo>) -> Result<(), SpeechError>;

    /// Stop the current utterance, if any.
    fn stop(&self) -> Result<(), SpeechError>;

    /// Install the callback invoked when an utterance ends naturally.
    ///
    /// Backends without utterance callbacks accept and ignore this; the
    /// caller's reading indicator is then cleared only by the next explicit
    /// stop or speak.
    fn set_end_callback(&self, callback: EndCallback) -> Result<(), SpeechError>;
}

// ---------------------------------------------------------------------------
// SilentSynthesizer
// ---------------------------------------------------------------------------

/// No-audio backend: logs each narration and completes it immediately.
#[derive(Default)]
pub struct SilentSynthesizer {
    on_end: Mutex<Option<EndCallback>>,
}

impl SilentSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Synthesizer for SilentSynthesizer {
    fn voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        Ok(Vec::new())
    }

    fn speak(&self, text: &str, voice: Option<&VoiceInfo>) -> Result<(), SpeechError> {
        let preview: String = text.chars().take(80).collect();
        match voice {
            Some(v) => log::info!("narration ({}): {preview}", v.language),
            None => log::info!("narration (default voice): {preview}"),
        }

        // Zero-duration utterance: it ends as soon as it starts.
        if let Some(cb) = self.on_end.lock().unwrap().as_mut() {
            cb();
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    fn set_end_callback(&self, callback: EndCallback) -> Result<(), SpeechError> {
        *self.on_end.lock().unwrap() = Some(callback);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SystemSynthesizer (feature = "system-tts")
// ---------------------------------------------------------------------------

/// Platform voice stack via the `tts` crate.
///
/// Narration rate is scaled below the platform's normal rate (contemplative
/// content reads better slightly slow); pitch stays neutral.
#[cfg(feature = "system-tts")]
pub struct SystemSynthesizer {
    tts: Mutex<tts::Tts>,
}

#[cfg(feature = "system-tts")]
impl SystemSynthesizer {
    /// Initialise the platform backend and apply the configured rate scale.
    pub fn new(config: &crate::config::SpeechConfig) -> Result<Self, SpeechError> {
        let mut tts = tts::Tts::default().map_err(|e| SpeechError::Init(e.to_string()))?;
        let features = tts.supported_features();

        if features.rate {
            let rate = tts.normal_rate() * config.rate_scale;
            tts.set_rate(rate)
                .map_err(|e| SpeechError::Init(e.to_string()))?;
        }
        if features.pitch {
            let pitch = tts.normal_pitch();
            tts.set_pitch(pitch)
                .map_err(|e| SpeechError::Init(e.to_string()))?;
        }

        Ok(Self {
            tts: Mutex::new(tts),
        })
    }
}

#[cfg(feature = "system-tts")]
impl Synthesizer for SystemSynthesizer {
    fn voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        let tts = self.tts.lock().unwrap();
        let voices = tts
            .voices()
            .map_err(|e| SpeechError::Backend(e.to_string()))?;
        Ok(voices
            .into_iter()
            .map(|v| VoiceInfo::new(v.id(), v.language().to_string()))
            .collect())
    }

    fn speak(&self, text: &str, voice: Option<&VoiceInfo>) -> Result<(), SpeechError> {
        let mut tts = self.tts.lock().unwrap();

        if let Some(wanted) = voice {
            let available = tts
                .voices()
                .map_err(|e| SpeechError::Backend(e.to_string()))?;
            if let Some(v) = available.iter().find(|v| v.id() == wanted.id) {
                tts.set_voice(v)
                    .map_err(|e| SpeechError::Backend(e.to_string()))?;
            } else {
                log::warn!("voice {} no longer available, using default", wanted.id);
            }
        }

        tts.speak(text, true)
            .map_err(|e| SpeechError::Backend(e.to_string()))?;
        Ok(())
    }

    fn stop(&self) -> Result<(), SpeechError> {
        let mut tts = self.tts.lock().unwrap();
        tts.stop().map_err(|e| SpeechError::Backend(e.to_string()))?;
        Ok(())
    }

    fn set_end_callback(&self, mut callback: EndCallback) -> Result<(), SpeechError> {
        let mut tts = self.tts.lock().unwrap();
        if !tts.supported_features().utterance_callbacks {
            log::debug!("platform voice stack has no utterance callbacks");
            return Ok(());
        }
        tts.on_utterance_end(Some(Box::new(move |_| callback())))
            .map_err(|e| SpeechError::Backend(e.to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
