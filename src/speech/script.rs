//! Script detection and narration-text preparation.
//!
//! Narration routing hinges on one script property of the text: whether it
//! contains Devanagari. Combined with the requested narration language this
//! decides both voice selection and whether a translation round-trip is
//! needed first.

use crate::chat::Language;

/// True if `text` contains at least one Devanagari code point
/// (U+0900..=U+097F).
pub fn contains_devanagari(text: &str) -> bool {
    text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c))
}

/// Whether narrating `text` in `language` needs a translation round-trip.
///
/// * Hindi over Latin-script text: yes (the voice would mangle English).
/// * Hinglish: always (the adaptation itself is the point).
/// * English over Devanagari text: yes (back-translation).
/// * Everything else narrates the text as-is.
pub fn translation_required(language: Language, text: &str) -> bool {
    match language {
        Language::Hinglish => true,
        Language::Hindi => !contains_devanagari(text),
        Language::English => contains_devanagari(text),
    }
}

/// Strip markdown decoration characters (`*`, `_`, `#`, `` ` ``) so the voice
/// does not read them aloud. Inter-word whitespace is left untouched.
pub fn strip_markdown(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '_' | '#' | '`'))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_devanagari_anywhere_in_the_text() {
        assert!(contains_devanagari("धर्म"));
        assert!(contains_devanagari("The Gita says: कर्मण्येवाधिकारस्ते"));
        assert!(!contains_devanagari("karmanye vadhikaraste"));
        assert!(!contains_devanagari(""));
    }

    #[test]
    fn danda_counts_as_devanagari() {
        // U+0964 DEVANAGARI DANDA sits inside the block.
        assert!(contains_devanagari("।"));
    }

    #[test]
    fn hindi_over_latin_text_requires_translation() {
        assert!(translation_required(Language::Hindi, "dharma is duty"));
        assert!(!translation_required(Language::Hindi, "धर्म ही कर्तव्य है"));
    }

    #[test]
    fn hinglish_always_requires_translation() {
        assert!(translation_required(Language::Hinglish, "dharma is duty"));
        assert!(translation_required(Language::Hinglish, "धर्म ही कर्तव्य है"));
    }

    #[test]
    fn english_requires_translation_only_for_devanagari() {
        assert!(translation_required(Language::English, "श्लोक: कर्मण्येवाधिकारस्ते"));
        assert!(!translation_required(Language::English, "dharma is duty"));
    }

    #[test]
    fn markdown_decoration_is_stripped() {
        assert_eq!(
            strip_markdown("**Dharma** is _duty_ # `karma`"),
            "Dharma is duty  karma"
        );
        assert_eq!(strip_markdown("plain text"), "plain text");
    }

    #[test]
    fn stripping_preserves_devanagari() {
        assert_eq!(strip_markdown("*धर्म*"), "धर्म");
    }
}
