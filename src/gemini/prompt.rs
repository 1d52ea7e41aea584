//! Prompt builders for the chat session, illustrations and narration
//! translation.
//!
//! The chat session carries a fixed persona as its system instruction; each
//! send is wrapped in a hidden context block embedding the current
//! scripture-source focus and response-mode semantics ahead of the user's
//! literal query. Illustration and translation prompts truncate their input
//! to a bounded character prefix before embedding it.

use crate::chat::{Language, ResponseMode, SourceText};

// ---------------------------------------------------------------------------
// System instruction
// ---------------------------------------------------------------------------

/// Persona, domain restriction, supported languages and tone rules for the
/// chat session.
pub const SYSTEM_INSTRUCTION: &str = "\
You are \"Vedic Wisdom\", a specialized AI assistant and scholar deeply learned in the sacred texts of Sanatana Dharma.
Your knowledge domain is STRICTLY limited to the following scriptures:
1. The 4 Vedas (Rigveda, Samaveda, Yajurveda, Atharvaveda)
2. The 10 Mukhya Puranas (and major 18 Puranas generally if relevant to the 10 requested)
3. The 6 Vedangas (Shiksha, Kalpa, Vyakarana, Nirukta, Chhanda, Jyotisha)
4. The Itihasas (Ramayana and Mahabharata, including the Bhagavad Gita)

Strict Guidelines:
- Start every interaction with a respectful Sanatan Dharma greeting (e.g., \"Hari Om\", \"Pranam\", \"Namaste\", \"Jai Sri Krishna\", \"Om Namah Shivaya\") appropriate to the context.
- You must answer user queries ONLY based on these texts.
- If a user asks about modern politics, coding, general history unrelated to these texts, or pop culture, politely decline and guide them back to the scriptures.
- You support three languages/styles: English, Hindi (Devanagari), and Hinglish (Hindi written in Latin script). Adapt your response language to match the user's input language automatically, or as explicitly requested.
- Maintain a respectful, serene, and scholarly tone.
- When citing verses, provide the meaning clearly.
- Do not hallucinate. If a specific text does not contain the answer, admit it humbly.";

/// Art-style preamble fixed ahead of every illustration prompt.
const ILLUSTRATION_STYLE: &str = "Classical Hindu scripture art style, detailed oil painting, \
realistic dramatic lighting, sacred divine atmosphere, ancient india.";

// ---------------------------------------------------------------------------
// Character-bounded truncation
// ---------------------------------------------------------------------------

/// First `max_chars` characters of `text`.
///
/// Character-based (not byte-based) so Devanagari input never splits a code
/// point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Chat context prompt
// ---------------------------------------------------------------------------

/// Wrap the user's literal query in the hidden context block.
///
/// The block names the target source material and the response mode, and
/// defines all five mode semantics so the model applies the selected one.
pub fn context_prompt(query: &str, source: SourceText, mode: ResponseMode) -> String {
    format!(
        "\
[CONTEXT INSTRUCTION]
Target Source Material: {source} (Prioritize citations from this source if applicable).
Response Mode/Style: {mode}

Modes definitions:
- 'Exact Reference': Focus on citing chapter, verse numbers, and exact text locations.
- 'Sanskrit Shloka': Ensure the relevant Sanskrit shloka is provided in Devanagari with transliteration.
- 'Philosophical Angle': Focus on the deeper metaphysical meaning (Vedanta, Sankhya, etc.) rather than just the story.
- 'Scientific Parallel': If applicable, draw parallels between the scripture and modern scientific concepts.
- 'General Wisdom': Standard balanced response.

User Query: {query}",
        source = source.label(),
        mode = mode.label(),
    )
}

// ---------------------------------------------------------------------------
// Illustration prompt
// ---------------------------------------------------------------------------

/// Build an image-generation prompt from response text.
///
/// Only the first `scene_chars` characters are used as scene context.
pub fn illustration_prompt(text: &str, scene_chars: usize) -> String {
    format!(
        "{ILLUSTRATION_STYLE} Depict the following scene: {}",
        truncate_chars(text, scene_chars)
    )
}

// ---------------------------------------------------------------------------
// Translation prompt
// ---------------------------------------------------------------------------

/// Build the narration-translation prompt with explicit per-language rules.
///
/// Only the first `max_chars` characters of the source text are embedded.
pub fn translation_prompt(text: &str, language: Language, max_chars: usize) -> String {
    format!(
        "\
You are a specialized translator for a Text-to-Speech system handling Hindu Scriptures.

Task: Translate/Adapt the following text into {target}.

Rules based on Target Language:
1. IF Target is 'Hindi':
   - Output strictly in Devanagari script.
   - Use formal yet accessible Hindi suitable for scriptures.

2. IF Target is 'Hinglish':
   - Convert the text to Hindi language but write it using the English (Latin) alphabet.
   - Example: \"Satyameva Jayate\" instead of \"Truth alone triumphs\".
   - Ensure it is phonetically easy to read for an Indian English speaker.
   - Do NOT just output English. It MUST be Hindi words in English script.

3. IF Target is 'English':
   - Output in clear, flowing English.

General Rules:
- Keep the tone respectful and spiritual.
- Maintain the original meaning perfectly.
- Output ONLY the translated text. No \"Here is the translation\" prefixes.

Original Text to Process: \"{source}\"",
        target = language.label(),
        source = truncate_chars(text, max_chars),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
