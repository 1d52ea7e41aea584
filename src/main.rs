//! VEDIQ command-line client.
//!
//! A line-oriented front end over the library: plain input is sent as a
//! query and the reply streams to stdout as it arrives; slash commands drive
//! the selectors, narration, illustration and reset.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use tokio::io::AsyncBufReadExt;

use vediq::chat::{ConversationController, Language, ResponseMode, Role, SharedChatState, SourceText};
use vediq::config::AppConfig;
use vediq::gemini::{FallbackTranslator, GeminiChat, GeminiIllustrator, GeminiTranslator};
use vediq::speech::{SilentSynthesizer, SpeechPipeline, Synthesizer};

#[cfg(feature = "system-tts")]
use vediq::speech::SystemSynthesizer;

/// Starter queries shown on a fresh conversation.
const SUGGESTIONS: &[&str] = &[
    "What is dharma according to the Gita?",
    "Explain the concept of Karma.",
    "Meaning of a specific shloka?",
];

const HELP: &str = "\
commands:
  /source [name]        show or set the scripture focus
  /mode [name]          show or set the response mode
  /read <n> [language]  narrate message n (again to stop); language: English, Hindi, Hinglish
  /illustrate <n>       generate illustrations for message n
  /reset                start a new conversation
  /help                 this text
  /quit                 exit
anything else is sent as a question.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    log::info!(
        "starting vediq (chat model {}, image model {})",
        config.gemini.chat_model,
        config.gemini.image_model
    );

    let state = vediq::chat::new_shared_state();
    let streamer = Arc::new(GeminiChat::from_config(&config.gemini));
    let illustrator = Arc::new(GeminiIllustrator::from_config(
        &config.gemini,
        &config.illustration,
    ));
    let controller = ConversationController::new(Arc::clone(&state), streamer, illustrator);

    let translator = Arc::new(FallbackTranslator::new(GeminiTranslator::from_config(
        &config.gemini,
    )));
    let synth = build_synthesizer(&config);
    let pipeline = SpeechPipeline::new(Arc::clone(&state), translator, synth);

    let default_language =
        Language::parse(&config.speech.default_language).unwrap_or(Language::English);

    println!("Vedic Wisdom — ask, and the scriptures answer.");
    println!("Try one of:");
    for suggestion in SUGGESTIONS {
        println!("  • {suggestion}");
    }
    println!("(/help for commands)\n");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.splitn(2, char::is_whitespace);
            let verb = parts.next().unwrap_or_default();
            let rest = parts.next().unwrap_or("").trim();

            match verb {
                "quit" | "exit" => break,
                "help" => println!("{HELP}"),
                "reset" => {
                    let _ = pipeline.stop();
                    controller.reset().await;
                    println!("conversation cleared");
                }
                "source" => {
                    if rest.is_empty() {
                        println!("source: {}", controller.source().label());
                        for s in SourceText::all() {
                            println!("  {}", s.label());
                        }
                    } else if let Some(source) = SourceText::parse(rest) {
                        controller.set_source(source);
                        println!("source set to {}", source.label());
                    } else {
                        println!("unknown source: {rest}");
                    }
                }
                "mode" => {
                    if rest.is_empty() {
                        println!("mode: {}", controller.mode().label());
                        for m in ResponseMode::all() {
                            println!("  {}", m.label());
                        }
                    } else if let Some(mode) = ResponseMode::parse(rest) {
                        controller.set_mode(mode);
                        println!("mode set to {}", mode.label());
                    } else {
                        println!("unknown mode: {rest}");
                    }
                }
                "read" => {
                    let mut args = rest.split_whitespace();
                    let Some(id) = args.next().and_then(|n| assistant_id(&state, n)) else {
                        println!("usage: /read <n> [language] (n = assistant message number)");
                        continue;
                    };
                    let language = args
                        .next()
                        .and_then(Language::parse)
                        .unwrap_or(default_language);
                    if let Err(e) = pipeline.read(&id, language).await {
                        println!("narration failed: {e}");
                    }
                }
                "illustrate" => {
                    let Some(id) = assistant_id(&state, rest) else {
                        println!("usage: /illustrate <n> (n = assistant message number)");
                        continue;
                    };
                    println!("generating illustrations…");
                    match controller.illustrate(&id).await {
                        Ok(0) => println!("no images were generated"),
                        Ok(n) => {
                            println!("{n} illustration(s) attached to the message");
                            let images = state
                                .lock()
                                .unwrap()
                                .message(&id)
                                .and_then(|m| m.images.clone())
                                .unwrap_or_default();
                            for path in save_illustrations(&id, &images) {
                                println!("  saved {}", path.display());
                            }
                        }
                        Err(e) => {
                            log::error!("illustration failed: {e}");
                            println!("could not generate illustrations right now");
                        }
                    }
                }
                _ => println!("unknown command /{verb} (/help for commands)"),
            }
            continue;
        }

        run_turn(&controller, &state, &line).await;
    }

    let _ = pipeline.stop();
    Ok(())
}

/// Pick the speech backend. The platform voice stack is opt-in via the
/// `system-tts` feature; without it narration is logged, not spoken.
#[cfg(feature = "system-tts")]
fn build_synthesizer(config: &AppConfig) -> Arc<dyn Synthesizer> {
    match SystemSynthesizer::new(&config.speech) {
        Ok(synth) => Arc::new(synth),
        Err(e) => {
            log::warn!("platform speech unavailable ({e}), narration will be logged");
            Arc::new(SilentSynthesizer::new())
        }
    }
}

#[cfg(not(feature = "system-tts"))]
fn build_synthesizer(_config: &AppConfig) -> Arc<dyn Synthesizer> {
    Arc::new(SilentSynthesizer::new())
}

/// Decode illustration data URIs and write them as JPEG files under the
/// system temp directory, returning the paths that were written.
fn save_illustrations(message_id: &str, images: &[String]) -> Vec<PathBuf> {
    let dir = std::env::temp_dir();
    let mut saved = Vec::new();

    for (i, uri) in images.iter().enumerate() {
        let Some(b64) = uri.strip_prefix("data:image/jpeg;base64,") else {
            continue;
        };
        let bytes = match base64::engine::general_purpose::STANDARD.decode(b64) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("illustration {i} carried invalid base64: {e}");
                continue;
            }
        };
        let path = dir.join(format!("vediq-{message_id}-{i}.jpg"));
        match std::fs::write(&path, bytes) {
            Ok(()) => saved.push(path),
            Err(e) => log::warn!("could not save illustration {i}: {e}"),
        }
    }
    saved
}

/// Resolve "the n-th assistant message" (1-based) to its id.
fn assistant_id(state: &SharedChatState, index: &str) -> Option<String> {
    let n: usize = index.trim().parse().ok()?;
    let st = state.lock().unwrap();
    st.messages
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .nth(n.checked_sub(1)?)
        .map(|m| m.id.clone())
}

/// Send one query and print the reply as it streams in.
async fn run_turn(controller: &ConversationController, state: &SharedChatState, text: &str) {
    let send = controller.send(text);
    tokio::pin!(send);

    let mut printed = 0usize;
    let mut ticker = tokio::time::interval(Duration::from_millis(50));

    loop {
        tokio::select! {
            _ = &mut send => break,
            _ = ticker.tick() => {
                printed = print_reply_delta(state, printed);
            }
        }
    }
    print_reply_delta(state, printed);
    println!();

    let error = state.lock().unwrap().error.clone();
    if let Some(error) = error {
        println!("{error}");
    }
}

/// Print any assistant text that arrived since the last call; returns the new
/// printed byte offset. Fragments are UTF-8 strings, so the offset always
/// lands on a character boundary.
fn print_reply_delta(state: &SharedChatState, printed: usize) -> usize {
    let st = state.lock().unwrap();
    let Some(msg) = st.messages.last() else {
        return printed;
    };
    if msg.role != Role::Assistant || msg.text.len() <= printed {
        return printed;
    }
    print!("{}", &msg.text[printed..]);
    let _ = std::io::stdout().flush();
    msg.text.len()
}
