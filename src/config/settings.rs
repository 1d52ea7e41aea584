//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// GeminiConfig
// ---------------------------------------------------------------------------

/// Settings for the remote Gemini endpoints (chat, images, translation).
///
/// The API key is deliberately **not** part of the config file — it is read
/// from the `GEMINI_API_KEY` environment variable at call time (see
/// [`super::credential`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL of the Generative Language API.
    pub base_url: String,
    /// Model used for the streamed chat session and translation calls.
    pub chat_model: String,
    /// Model used for illustration generation.
    pub image_model: String,
    /// Sampling temperature for the chat session (0.0 – 1.0).
    pub temperature: f32,
    /// Maximum seconds to wait for a single HTTP request before timing out.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            chat_model: "gemini-2.5-flash".into(),
            image_model: "imagen-4.0-generate-001".into(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// IllustrationConfig
// ---------------------------------------------------------------------------

/// Settings for scene illustration requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IllustrationConfig {
    /// Number of images requested per illustration call.
    pub image_count: u32,
    /// Aspect ratio string sent to the image model.
    pub aspect_ratio: String,
    /// Maximum number of characters of response text used as scene context.
    pub scene_chars: usize,
}

impl Default for IllustrationConfig {
    fn default() -> Self {
        Self {
            image_count: 3,
            aspect_ratio: "16:9".into(),
            scene_chars: 800,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the narration subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Speech rate as a multiple of the synthesizer's normal rate.
    pub rate_scale: f32,
    /// Default narration language name (`English`, `Hindi`, `Hinglish`).
    pub default_language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate_scale: 0.9,
            default_language: "English".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use vediq::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote Gemini endpoint settings.
    pub gemini: GeminiConfig,
    /// Illustration request settings.
    pub illustration: IllustrationConfig,
    /// Narration settings.
    pub speech: SpeechConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.gemini.base_url, loaded.gemini.base_url);
        assert_eq!(original.gemini.chat_model, loaded.gemini.chat_model);
        assert_eq!(original.gemini.image_model, loaded.gemini.image_model);
        assert_eq!(original.gemini.temperature, loaded.gemini.temperature);
        assert_eq!(original.gemini.timeout_secs, loaded.gemini.timeout_secs);

        assert_eq!(original.illustration.image_count, loaded.illustration.image_count);
        assert_eq!(original.illustration.aspect_ratio, loaded.illustration.aspect_ratio);
        assert_eq!(original.illustration.scene_chars, loaded.illustration.scene_chars);

        assert_eq!(original.speech.rate_scale, loaded.speech.rate_scale);
        assert_eq!(original.speech.default_language, loaded.speech.default_language);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.gemini.chat_model, default.gemini.chat_model);
        assert_eq!(config.illustration.image_count, default.illustration.image_count);
        assert_eq!(config.speech.default_language, default.speech.default_language);
    }

    /// Verify default values match the external interface contract.
    #[test]
    fn default_values_match_contract() {
        let cfg = AppConfig::default();

        assert_eq!(
            cfg.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(cfg.gemini.chat_model, "gemini-2.5-flash");
        assert_eq!(cfg.gemini.image_model, "imagen-4.0-generate-001");
        assert_eq!(cfg.gemini.temperature, 0.7);
        assert_eq!(cfg.illustration.image_count, 3);
        assert_eq!(cfg.illustration.aspect_ratio, "16:9");
        assert_eq!(cfg.illustration.scene_chars, 800);
        assert_eq!(cfg.speech.rate_scale, 0.9);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.gemini.chat_model = "gemini-2.5-pro".into();
        cfg.gemini.temperature = 0.2;
        cfg.gemini.timeout_secs = 120;
        cfg.illustration.image_count = 1;
        cfg.illustration.aspect_ratio = "1:1".into();
        cfg.speech.default_language = "Hindi".into();

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.gemini.chat_model, "gemini-2.5-pro");
        assert_eq!(loaded.gemini.temperature, 0.2);
        assert_eq!(loaded.gemini.timeout_secs, 120);
        assert_eq!(loaded.illustration.image_count, 1);
        assert_eq!(loaded.illustration.aspect_ratio, "1:1");
        assert_eq!(loaded.speech.default_language, "Hindi");
    }
}
