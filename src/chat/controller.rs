//! Conversation controller — drives a turn from send to stream completion.
//!
//! [`ConversationController`] owns the [`SharedChatState`] and the two
//! process-wide selectors, and holds the remote clients behind trait objects.
//!
//! # Turn flow
//!
//! ```text
//! send(text)
//!   ├─ blank or already loading        → no-op
//!   ├─ append user msg + empty streaming assistant msg, loading = true
//!   ├─ stream_reply(query, source, mode)
//!   │    ├─ SessionError → seal assistant, loading = false, error set
//!   │    └─ fragment channel
//!   │         ├─ Ok(fragment)  → append to assistant text (in yield order)
//!   │         ├─ Err(stream)   → partial text kept, error set, loading = false
//!   │         └─ exhausted     → seal assistant, loading = false
//!   └─ done
//! ```
//!
//! Illustration runs independently after a turn completes and mutates only
//! its message's fields.

use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::gemini::{GenerationError, Illustrator, ReplyStreamer};

use super::message::{Message, ResponseMode, SharedChatState, SourceText};

/// User-facing error shown when a turn fails, tone-consistent with the
/// assistant persona. Raw error detail goes to the log only.
pub const TURN_ERROR_NOTICE: &str =
    "Hari Om. I encountered a momentary disturbance. Please try asking again.";

// ---------------------------------------------------------------------------
// ConversationController
// ---------------------------------------------------------------------------

/// Appends turns to the conversation and applies streamed fragments.
///
/// Created at app start (and after every [`reset`](Self::reset) the remote
/// session is lazily re-created on the next send); torn down at app teardown.
pub struct ConversationController {
    state: SharedChatState,
    streamer: Arc<dyn ReplyStreamer>,
    illustrator: Arc<dyn Illustrator>,
    source: Mutex<SourceText>,
    mode: Mutex<ResponseMode>,
}

impl ConversationController {
    /// Create a controller over `state` with the given remote clients.
    pub fn new(
        state: SharedChatState,
        streamer: Arc<dyn ReplyStreamer>,
        illustrator: Arc<dyn Illustrator>,
    ) -> Self {
        Self {
            state,
            streamer,
            illustrator,
            source: Mutex::new(SourceText::default()),
            mode: Mutex::new(ResponseMode::default()),
        }
    }

    /// Clone of the shared conversation state handle.
    pub fn state(&self) -> SharedChatState {
        Arc::clone(&self.state)
    }

    // -----------------------------------------------------------------------
    // Selectors
    // -----------------------------------------------------------------------

    /// Current scripture-source focus.
    pub fn source(&self) -> SourceText {
        *self.source.lock().unwrap()
    }

    /// Current response mode.
    pub fn mode(&self) -> ResponseMode {
        *self.mode.lock().unwrap()
    }

    /// Change the scripture-source focus (read at send time).
    pub fn set_source(&self, source: SourceText) {
        *self.source.lock().unwrap() = source;
    }

    /// Change the response mode (read at send time).
    pub fn set_mode(&self, mode: ResponseMode) {
        *self.mode.lock().unwrap() = mode;
    }

    // -----------------------------------------------------------------------
    // send
    // -----------------------------------------------------------------------

    /// Send a user query and stream the assistant's reply into the state.
    ///
    /// No-op when `text` is blank/whitespace-only or a turn is already in
    /// flight. Failures never roll back partially streamed text; they set
    /// the user-facing error and clear the loading flag.
    pub async fn send(&self, text: &str) {
        let query = text.trim();
        if query.is_empty() {
            return;
        }

        let assistant_id = {
            let mut st = self.state.lock().unwrap();
            if st.is_loading {
                log::debug!("send ignored — a turn is already in flight");
                return;
            }

            // Time-derived ids, assistant offset by one like the message pair
            // it belongs to.
            let millis = Utc::now().timestamp_millis();
            let user_id = millis.to_string();
            let assistant_id = (millis + 1).to_string();

            st.messages.push(Message::user(user_id, query.to_string()));
            st.messages
                .push(Message::assistant_placeholder(assistant_id.clone()));
            st.is_loading = true;
            st.error = None;
            assistant_id
        };

        let (source, mode) = (self.source(), self.mode());

        let mut fragments = match self.streamer.stream_reply(query, source, mode).await {
            Ok(rx) => rx,
            Err(e) => {
                log::error!("chat session failed: {e}");
                self.fail_turn(&assistant_id);
                return;
            }
        };

        while let Some(item) = fragments.recv().await {
            match item {
                Ok(fragment) => {
                    let mut st = self.state.lock().unwrap();
                    if let Some(msg) = st.message_mut(&assistant_id) {
                        msg.text.push_str(&fragment);
                    }
                }
                Err(e) => {
                    log::error!("reply stream failed mid-flight: {e}");
                    self.fail_turn(&assistant_id);
                    return;
                }
            }
        }

        // Stream exhausted — seal the assistant message.
        let mut st = self.state.lock().unwrap();
        if let Some(msg) = st.message_mut(&assistant_id) {
            msg.is_streaming = false;
        }
        st.is_loading = false;
    }

    /// Seal the assistant message and surface the turn error.
    ///
    /// Partially streamed text is left as-is; sealing keeps the single
    /// in-flight-turn invariant for the next send.
    fn fail_turn(&self, assistant_id: &str) {
        let mut st = self.state.lock().unwrap();
        if let Some(msg) = st.message_mut(assistant_id) {
            msg.is_streaming = false;
        }
        st.is_loading = false;
        st.error = Some(TURN_ERROR_NOTICE.to_string());
    }

    // -----------------------------------------------------------------------
    // reset
    // -----------------------------------------------------------------------

    /// Clear the slate: all messages, flags and errors, plus the remote
    /// session's prior turns. Selectors return to their defaults.
    pub async fn reset(&self) {
        self.streamer.reset().await;

        let mut st = self.state.lock().unwrap();
        st.messages.clear();
        st.is_loading = false;
        st.error = None;
        drop(st);

        self.set_source(SourceText::default());
        self.set_mode(ResponseMode::default());
        log::info!("conversation reset");
    }

    // -----------------------------------------------------------------------
    // illustrate
    // -----------------------------------------------------------------------

    /// Generate illustrations for the given message.
    ///
    /// Sets the message's `is_generating_images` flag for the duration of the
    /// remote call. On failure the message's prior images are left untouched
    /// and the error is returned for the UI to surface as a notice — the
    /// conversation itself is unaffected.
    pub async fn illustrate(&self, message_id: &str) -> Result<usize, GenerationError> {
        let text = {
            let mut st = self.state.lock().unwrap();
            let Some(msg) = st.message_mut(message_id) else {
                log::warn!("illustrate: unknown message id {message_id}");
                return Ok(0);
            };
            msg.is_generating_images = true;
            msg.text.clone()
        };

        let result = self.illustrator.generate(&text).await;

        let mut st = self.state.lock().unwrap();
        let Some(msg) = st.message_mut(message_id) else {
            // Conversation was reset while the request was in flight.
            return Ok(0);
        };
        msg.is_generating_images = false;

        match result {
            Ok(images) => {
                let count = images.len();
                msg.images = Some(images);
                Ok(count)
            }
            Err(e) => {
                log::error!("illustration failed: {e}");
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::{new_shared_state, Role};
    use crate::gemini::{SessionError, StreamError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Scripted fragment sequence for the mock streamer.
    #[derive(Clone)]
    enum Item {
        Fragment(&'static str),
        Fail,
    }

    /// Mock streamer that replays a scripted sequence and counts calls.
    struct ScriptedStreamer {
        items: Vec<Item>,
        fail_session: bool,
        sessions: AtomicUsize,
        resets: AtomicUsize,
    }

    impl ScriptedStreamer {
        fn ok(items: Vec<Item>) -> Self {
            Self {
                items,
                fail_session: false,
                sessions: AtomicUsize::new(0),
                resets: AtomicUsize::new(0),
            }
        }

        fn failing_session() -> Self {
            Self {
                items: Vec::new(),
                fail_session: true,
                sessions: AtomicUsize::new(0),
                resets: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReplyStreamer for ScriptedStreamer {
        async fn stream_reply(
            &self,
            _query: &str,
            _source: SourceText,
            _mode: ResponseMode,
        ) -> Result<mpsc::Receiver<Result<String, StreamError>>, SessionError> {
            if self.fail_session {
                return Err(SessionError::Request("connection refused".into()));
            }
            self.sessions.fetch_add(1, Ordering::SeqCst);

            let (tx, rx) = mpsc::channel(8);
            let items = self.items.clone();
            tokio::spawn(async move {
                for item in items {
                    let out = match item {
                        Item::Fragment(f) => Ok(f.to_string()),
                        Item::Fail => Err(StreamError::Transport("reset by peer".into())),
                    };
                    if tx.send(out).await.is_err() {
                        return;
                    }
                }
            });
            Ok(rx)
        }

        async fn reset(&self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Mock illustrator that returns a fixed image list.
    struct OkIllustrator(Vec<String>);

    #[async_trait]
    impl Illustrator for OkIllustrator {
        async fn generate(&self, _text: &str) -> Result<Vec<String>, GenerationError> {
            Ok(self.0.clone())
        }
    }

    /// Mock illustrator that always fails.
    struct FailIllustrator;

    #[async_trait]
    impl Illustrator for FailIllustrator {
        async fn generate(&self, _text: &str) -> Result<Vec<String>, GenerationError> {
            Err(GenerationError::Timeout)
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn controller_with(
        streamer: Arc<ScriptedStreamer>,
        illustrator: Arc<dyn Illustrator>,
    ) -> ConversationController {
        ConversationController::new(new_shared_state(), streamer, illustrator)
    }

    fn fragments(items: &[&'static str]) -> Vec<Item> {
        items.iter().copied().map(Item::Fragment).collect()
    }

    // -----------------------------------------------------------------------
    // send
    // -----------------------------------------------------------------------

    /// A non-blank send appends exactly one user and one assistant message,
    /// in that order.
    #[tokio::test]
    async fn send_appends_user_then_assistant() {
        let streamer = Arc::new(ScriptedStreamer::ok(fragments(&["Hari ", "Om"])));
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(OkIllustrator(vec![])));

        ctl.send("What is dharma?").await;

        let st = ctl.state();
        let st = st.lock().unwrap();
        assert_eq!(st.messages.len(), 2);
        assert_eq!(st.messages[0].role, Role::User);
        assert_eq!(st.messages[0].text, "What is dharma?");
        assert_eq!(st.messages[1].role, Role::Assistant);
        assert!(!st.is_loading);
        assert!(st.error.is_none());
    }

    /// The assistant's final text equals the concatenation of all fragments
    /// in yield order.
    #[tokio::test]
    async fn fragments_concatenate_in_yield_order() {
        let streamer = Arc::new(ScriptedStreamer::ok(fragments(&[
            "Pranam. ", "Dharma ", "is ", "the ", "eternal ", "law.",
        ])));
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(OkIllustrator(vec![])));

        ctl.send("explain").await;

        let st = ctl.state();
        let st = st.lock().unwrap();
        assert_eq!(st.messages[1].text, "Pranam. Dharma is the eternal law.");
        assert!(!st.messages[1].is_streaming, "assistant must be sealed");
    }

    /// Blank and whitespace-only input must not change the message list.
    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let streamer = Arc::new(ScriptedStreamer::ok(fragments(&["unused"])));
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(OkIllustrator(vec![])));

        ctl.send("").await;
        ctl.send("   \n\t ").await;

        assert_eq!(ctl.state().lock().unwrap().messages.len(), 0);
        assert_eq!(streamer.sessions.load(Ordering::SeqCst), 0);
    }

    /// send while a turn is in flight is a no-op: the list length is
    /// unchanged.
    #[tokio::test]
    async fn send_while_loading_is_a_no_op() {
        let streamer = Arc::new(ScriptedStreamer::ok(fragments(&["x"])));
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(OkIllustrator(vec![])));

        ctl.state().lock().unwrap().is_loading = true;
        ctl.send("second turn").await;

        assert_eq!(ctl.state().lock().unwrap().messages.len(), 0);
        assert_eq!(streamer.sessions.load(Ordering::SeqCst), 0);
    }

    /// A session failure aborts the turn: error set, loading cleared, the
    /// empty assistant message sealed.
    #[tokio::test]
    async fn session_failure_surfaces_the_turn_error() {
        let streamer = Arc::new(ScriptedStreamer::failing_session());
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(OkIllustrator(vec![])));

        ctl.send("hello").await;

        let st = ctl.state();
        let st = st.lock().unwrap();
        assert_eq!(st.messages.len(), 2);
        assert!(!st.is_loading);
        assert_eq!(st.error.as_deref(), Some(TURN_ERROR_NOTICE));
        assert!(!st.messages[1].is_streaming);
        assert_eq!(st.streaming_count(), 0);
    }

    /// A mid-stream failure keeps the partial text (no rollback) and surfaces
    /// the error after the last delivered fragment.
    #[tokio::test]
    async fn midstream_failure_keeps_partial_text() {
        let streamer = Arc::new(ScriptedStreamer::ok(vec![
            Item::Fragment("Namaste. The Gita "),
            Item::Fragment("teaches "),
            Item::Fail,
        ]));
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(OkIllustrator(vec![])));

        ctl.send("hello").await;

        let st = ctl.state();
        let st = st.lock().unwrap();
        assert_eq!(st.messages[1].text, "Namaste. The Gita teaches ");
        assert!(!st.is_loading);
        assert_eq!(st.error.as_deref(), Some(TURN_ERROR_NOTICE));
        assert!(!st.messages[1].is_streaming);
    }

    /// A failed turn must not block the next send.
    #[tokio::test]
    async fn next_send_works_after_a_failed_turn() {
        let streamer = Arc::new(ScriptedStreamer::ok(vec![Item::Fail]));
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(OkIllustrator(vec![])));

        ctl.send("first").await;
        ctl.send("second").await;

        let st = ctl.state();
        let st = st.lock().unwrap();
        assert_eq!(st.messages.len(), 4);
        assert_eq!(st.streaming_count(), 0);
    }

    // -----------------------------------------------------------------------
    // reset
    // -----------------------------------------------------------------------

    /// After reset the state is empty and the next send creates a fresh
    /// remote session.
    #[tokio::test]
    async fn reset_clears_state_and_reinitialises_the_session() {
        let streamer = Arc::new(ScriptedStreamer::ok(fragments(&["Om"])));
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(OkIllustrator(vec![])));

        ctl.set_source(SourceText::Ramayana);
        ctl.set_mode(ResponseMode::ExactReference);
        ctl.send("first").await;
        ctl.reset().await;

        {
            let st = ctl.state();
            let st = st.lock().unwrap();
            assert!(st.messages.is_empty());
            assert!(!st.is_loading);
            assert!(st.error.is_none());
        }
        assert_eq!(streamer.resets.load(Ordering::SeqCst), 1);
        assert_eq!(ctl.source(), SourceText::AllScriptures);
        assert_eq!(ctl.mode(), ResponseMode::GeneralWisdom);

        ctl.send("after reset").await;
        assert_eq!(streamer.sessions.load(Ordering::SeqCst), 2);
    }

    // -----------------------------------------------------------------------
    // illustrate
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn illustrate_stores_data_uris_and_clears_the_flag() {
        let streamer = Arc::new(ScriptedStreamer::ok(fragments(&["A scene"])));
        let uris = vec!["data:image/jpeg;base64,AAAA".to_string()];
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(OkIllustrator(uris.clone())));

        ctl.send("show me").await;
        let id = ctl.state().lock().unwrap().messages[1].id.clone();

        let count = ctl.illustrate(&id).await.unwrap();

        assert_eq!(count, 1);
        let st = ctl.state();
        let st = st.lock().unwrap();
        let msg = st.message(&id).unwrap();
        assert_eq!(msg.images.as_deref(), Some(uris.as_slice()));
        assert!(!msg.is_generating_images);
    }

    /// An empty image list from the remote call is stored as such — success,
    /// not an error.
    #[tokio::test]
    async fn illustrate_with_no_images_is_not_an_error() {
        let streamer = Arc::new(ScriptedStreamer::ok(fragments(&["A scene"])));
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(OkIllustrator(vec![])));

        ctl.send("show me").await;
        let id = ctl.state().lock().unwrap().messages[1].id.clone();

        let count = ctl.illustrate(&id).await.unwrap();

        assert_eq!(count, 0);
        let st = ctl.state();
        let st = st.lock().unwrap();
        let images = st.message(&id).unwrap().images.as_deref();
        assert_eq!(images.map(<[String]>::len), Some(0));
    }

    /// A failed illustration leaves prior state untouched and clears the
    /// per-message flag; the conversation is unaffected.
    #[tokio::test]
    async fn illustrate_failure_leaves_prior_state_unchanged() {
        let streamer = Arc::new(ScriptedStreamer::ok(fragments(&["A scene"])));
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(FailIllustrator));

        ctl.send("show me").await;
        let id = ctl.state().lock().unwrap().messages[1].id.clone();

        let result = ctl.illustrate(&id).await;

        assert!(matches!(result, Err(GenerationError::Timeout)));
        let st = ctl.state();
        let st = st.lock().unwrap();
        let msg = st.message(&id).unwrap();
        assert!(msg.images.is_none(), "prior (absent) images must be kept");
        assert!(!msg.is_generating_images);
        assert!(st.error.is_none(), "conversation error is not touched");
    }

    #[tokio::test]
    async fn illustrate_unknown_message_is_a_no_op() {
        let streamer = Arc::new(ScriptedStreamer::ok(fragments(&["x"])));
        let ctl = controller_with(Arc::clone(&streamer), Arc::new(OkIllustrator(vec![])));

        let count = ctl.illustrate("no-such-id").await.unwrap();
        assert_eq!(count, 0);
    }
}
