//! Conversation state and controller for VEDIQ.
//!
//! This module provides:
//! * [`Message`] / [`Role`] — a single conversation turn and its per-message
//!   flags (streaming, illustration, narration translation cache).
//! * [`ChatState`] / [`SharedChatState`] — ordered message list plus the
//!   loading / error flags, shared behind `Arc<Mutex<…>>`.
//! * [`SourceText`] / [`ResponseMode`] / [`Language`] — the process-wide
//!   selector values.
//! * [`ConversationController`] — appends turns and applies streamed
//!   fragments in order.

pub mod controller;
pub mod message;

pub use controller::ConversationController;
pub use message::{
    new_shared_state, ChatState, Language, Message, Role, ResponseMode, SharedChatState,
    SourceText,
};
