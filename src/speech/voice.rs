//! Voice selection for narration.
//!
//! Pure preference-order matching over whatever voices the synthesizer
//! reports. Selection is driven by the script of the narration text, not by
//! the requested language: Hinglish narrates Latin text through an
//! Indian-English voice, Devanagari output always goes to a Hindi voice.

/// One voice as reported by a [`super::Synthesizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Backend-specific identifier, passed back verbatim to select the voice.
    pub id: String,
    /// BCP 47 language tag, e.g. `hi-IN` or `en-GB`.
    pub language: String,
}

impl VoiceInfo {
    pub fn new(id: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            language: language.into(),
        }
    }
}

/// Pick the best voice for the (already prepared) narration text.
///
/// Devanagari text prefers an exact `hi-IN` voice, then any `hi*` voice.
/// Latin text prefers `en-IN`, then `hi-IN` (Indian voices handle Hinglish
/// best). Either way the last resort is any `en*` voice; `None` means no
/// suitable voice was found and the synthesizer default applies. Matching is
/// case-insensitive.
pub fn select_voice(voices: &[VoiceInfo], has_devanagari: bool) -> Option<&VoiceInfo> {
    let preferred = if has_devanagari {
        exact(voices, "hi-IN").or_else(|| prefix(voices, "hi"))
    } else {
        exact(voices, "en-IN").or_else(|| exact(voices, "hi-IN"))
    };

    preferred.or_else(|| prefix(voices, "en"))
}

fn exact<'a>(voices: &'a [VoiceInfo], tag: &str) -> Option<&'a VoiceInfo> {
    voices.iter().find(|v| v.language.eq_ignore_ascii_case(tag))
}

fn prefix<'a>(voices: &'a [VoiceInfo], tag: &str) -> Option<&'a VoiceInfo> {
    voices.iter().find(|v| {
        v.language
            .get(..tag.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(tag))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
