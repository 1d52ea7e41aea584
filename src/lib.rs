//! VEDIQ — scripture-grounded conversation with streaming replies,
//! illustration, and narration.
//!
//! The crate is organised around four modules:
//!
//! * [`config`] — TOML settings persistence and the API credential.
//! * [`chat`] — conversation state, selectors, and the controller that
//!   applies streamed reply fragments.
//! * [`gemini`] — remote model clients: streamed chat, illustration,
//!   and narration translation (with its never-failing fallback wrapper).
//! * [`speech`] — narration: script detection, translation routing, voice
//!   selection, and the synthesizer backends.

pub mod chat;
pub mod config;
pub mod gemini;
pub mod speech;
