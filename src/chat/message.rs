//! Conversation data model and shared state.
//!
//! [`Message`] is mutated in place while its reply streams in; all other
//! fields are per-message flags owned by the illustration and narration
//! flows. [`ChatState`] is the single source of truth the UI renders from,
//! shared as [`SharedChatState`] (`Arc<Mutex<ChatState>>`) — cheap to clone
//! and safe to share across tasks. Do **not** hold the lock across `.await`
//! points.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Typed by the person chatting.
    User,
    /// Produced by the remote model.
    Assistant,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single conversation turn.
///
/// User messages are immutable after creation. Assistant messages are created
/// empty with `is_streaming = true`, grow append-only as fragments arrive,
/// and are sealed by clearing the flag. Messages are destroyed only by a full
/// conversation reset.
#[derive(Debug, Clone)]
pub struct Message {
    /// Unique, time-derived identifier (millisecond timestamp string).
    pub id: String,
    /// Message author.
    pub role: Role,
    /// Text content — append-only while streaming.
    pub text: String,
    /// True while fragments are still being appended.
    pub is_streaming: bool,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Generated illustration data URIs.
    ///
    /// `None` until an illustration run completes; `Some(vec![])` when the
    /// remote call succeeded but reported no images.
    pub images: Option<Vec<String>>,
    /// True while an illustration request for this message is in flight.
    pub is_generating_images: bool,
    /// Narration translation cache, keyed by target-language name.
    ///
    /// Populated lazily, never invalidated, never shared across messages.
    pub translations: HashMap<String, String>,
    /// True while a narration translation for this message is in flight.
    pub is_translating_audio: bool,
}

impl Message {
    /// Create a user message with the given id and text.
    pub fn user(id: String, text: String) -> Self {
        Self::new(id, Role::User, text, false)
    }

    /// Create an empty assistant message in the streaming state.
    pub fn assistant_placeholder(id: String) -> Self {
        Self::new(id, Role::Assistant, String::new(), true)
    }

    fn new(id: String, role: Role, text: String, is_streaming: bool) -> Self {
        Self {
            id,
            role,
            text,
            is_streaming,
            timestamp: Utc::now(),
            images: None,
            is_generating_images: false,
            translations: HashMap::new(),
            is_translating_audio: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// Scripture-source focus — narrows which texts are prioritised in citations.
///
/// Process-wide UI selection; read at send time, not stored on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceText {
    #[default]
    AllScriptures,
    BhagavadGita,
    Rigveda,
    Yajurveda,
    Samaveda,
    Atharvaveda,
    Ramayana,
    Mahabharata,
    Puranas,
    Upanishads,
}

impl SourceText {
    /// The display name embedded in the hidden context prompt.
    pub fn label(&self) -> &'static str {
        match self {
            SourceText::AllScriptures => "All Scriptures",
            SourceText::BhagavadGita => "Bhagavad Gita",
            SourceText::Rigveda => "Rigveda",
            SourceText::Yajurveda => "Yajurveda",
            SourceText::Samaveda => "Samaveda",
            SourceText::Atharvaveda => "Atharvaveda",
            SourceText::Ramayana => "Ramayana",
            SourceText::Mahabharata => "Mahabharata",
            SourceText::Puranas => "Puranas",
            SourceText::Upanishads => "Upanishads",
        }
    }

    /// All selectable values, in menu order.
    pub fn all() -> &'static [SourceText] {
        &[
            SourceText::AllScriptures,
            SourceText::BhagavadGita,
            SourceText::Rigveda,
            SourceText::Yajurveda,
            SourceText::Samaveda,
            SourceText::Atharvaveda,
            SourceText::Ramayana,
            SourceText::Mahabharata,
            SourceText::Puranas,
            SourceText::Upanishads,
        ]
    }

    /// Parse a display name (case-insensitive) back into a selector.
    pub fn parse(name: &str) -> Option<SourceText> {
        Self::all()
            .iter()
            .copied()
            .find(|s| s.label().eq_ignore_ascii_case(name.trim()))
    }
}

/// Response mode — the assistant's answer style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Standard balanced response.
    #[default]
    GeneralWisdom,
    /// Cite chapter, verse numbers and exact text locations.
    ExactReference,
    /// Provide the relevant shloka in Devanagari with transliteration.
    SanskritShloka,
    /// Focus on the deeper metaphysical meaning.
    PhilosophicalAngle,
    /// Draw parallels to modern scientific concepts.
    ScientificParallel,
}

impl ResponseMode {
    /// The display name embedded in the hidden context prompt.
    pub fn label(&self) -> &'static str {
        match self {
            ResponseMode::GeneralWisdom => "General Wisdom",
            ResponseMode::ExactReference => "Exact Reference",
            ResponseMode::SanskritShloka => "Sanskrit Shloka",
            ResponseMode::PhilosophicalAngle => "Philosophical Angle",
            ResponseMode::ScientificParallel => "Scientific Parallel",
        }
    }

    /// All selectable values, in menu order.
    pub fn all() -> &'static [ResponseMode] {
        &[
            ResponseMode::GeneralWisdom,
            ResponseMode::ExactReference,
            ResponseMode::SanskritShloka,
            ResponseMode::PhilosophicalAngle,
            ResponseMode::ScientificParallel,
        ]
    }

    /// Parse a display name (case-insensitive) back into a selector.
    pub fn parse(name: &str) -> Option<ResponseMode> {
        Self::all()
            .iter()
            .copied()
            .find(|m| m.label().eq_ignore_ascii_case(name.trim()))
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Narration target language.
///
/// The display name doubles as the key in [`Message::translations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// Fluent English.
    English,
    /// Hindi written in Devanagari script.
    Hindi,
    /// Hindi words written in Latin letters, phonetically readable.
    Hinglish,
}

impl Language {
    /// Display name, also the translation-cache key.
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Hinglish => "Hinglish",
        }
    }

    /// Parse a display name (case-insensitive).
    pub fn parse(name: &str) -> Option<Language> {
        match name.trim().to_ascii_lowercase().as_str() {
            "english" => Some(Language::English),
            "hindi" => Some(Language::Hindi),
            "hinglish" => Some(Language::Hinglish),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ChatState
// ---------------------------------------------------------------------------

/// Ordered conversation state — the single source of truth for the UI.
///
/// Append-only except for a full reset. At most one assistant message has
/// `is_streaming` set at any time (single in-flight turn).
#[derive(Debug, Default)]
pub struct ChatState {
    /// Ordered message sequence.
    pub messages: Vec<Message>,
    /// True between send and stream completion/failure.
    pub is_loading: bool,
    /// User-facing error from the last failed turn; cleared on the next send.
    pub error: Option<String>,
}

impl ChatState {
    /// Find a message by id.
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Find a message by id, mutably.
    pub fn message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// Number of messages currently in the streaming state.
    pub fn streaming_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_streaming).count()
    }
}

/// Thread-safe handle to [`ChatState`].
///
/// Cheap to clone (`Arc` clone). Lock for a short critical section only.
pub type SharedChatState = Arc<Mutex<ChatState>>;

/// Construct a new [`SharedChatState`] wrapping an empty conversation.
pub fn new_shared_state() -> SharedChatState {
    Arc::new(Mutex::new(ChatState::default()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
