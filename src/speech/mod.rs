//! Speech narration for assistant messages.
//!
//! The flow is: decide whether the requested narration language needs a
//! translation round-trip ([`script`]), adapt the text if so (via the
//! translation client, results cached per message and language), strip
//! markdown, pick a voice matching the text's script ([`voice`]), and hand
//! the prepared text to a [`Synthesizer`] backend ([`synth`]).
//! [`SpeechPipeline`] orchestrates all of it and enforces the
//! one-narration-at-a-time rule.

pub mod pipeline;
pub mod script;
pub mod synth;
pub mod voice;

pub use pipeline::SpeechPipeline;
pub use script::{contains_devanagari, strip_markdown, translation_required};
pub use synth::{EndCallback, SilentSynthesizer, SpeechError, Synthesizer};
pub use voice::{select_voice, VoiceInfo};

#[cfg(feature = "system-tts")]
pub use synth::SystemSynthesizer;
