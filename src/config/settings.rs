//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variable that overrides [`RecipeApiConfig::api_key`].
pub const API_KEY_ENV: &str = "VOICE_CHEF_API_KEY";

// ---------------------------------------------------------------------------
// Languages
// ---------------------------------------------------------------------------

/// Language tags offered by the language selector, with display names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en-US", "English (US)"),
    ("es-ES", "Español"),
    ("fr-FR", "Français"),
    ("de-DE", "Deutsch"),
    ("it-IT", "Italiano"),
    ("ja-JP", "日本語"),
    ("ko-KR", "한국어"),
    ("zh-CN", "中文 (简体)"),
];

/// Display name for a supported language tag.
///
/// ```
/// use voice_chef::config::language_name;
///
/// assert_eq!(language_name("fr-FR"), Some("Français"));
/// assert_eq!(language_name("xx-XX"), None);
/// ```
pub fn language_name(tag: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(tag))
        .map(|(_, name)| *name)
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-recognition session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// BCP-47 language tag handed to the recognizer (e.g. `"en-US"`).
    pub language: String,
    /// Unexpected ends tolerated before the session gives up.
    pub max_retries: u32,
    /// Delay before restarting after an unexpected end, in milliseconds.
    pub restart_delay_ms: u64,
    /// How long a native start may hang before the guard forces `Inactive`.
    pub start_timeout_ms: u64,
    /// How long a native stop may hang before the guard forces `Inactive`.
    pub stop_timeout_ms: u64,
    /// Delay between the stop and the re-creation of the recognizer on reset.
    pub reset_delay_ms: u64,
    /// Keep the recognizer running across pauses in speech.
    pub continuous: bool,
    /// Deliver in-progress hypotheses as well as final transcripts.
    pub interim_results: bool,
    /// Alternatives requested per result.
    pub max_alternatives: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".into(),
            max_retries: 3,
            restart_delay_ms: 500,
            start_timeout_ms: 3_000,
            stop_timeout_ms: 3_000,
            reset_delay_ms: 500,
            continuous: true,
            interim_results: true,
            max_alternatives: 1,
        }
    }
}

/// [`SpeechConfig`] delays converted to [`Duration`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechTimings {
    pub restart_delay: Duration,
    pub start_timeout: Duration,
    pub stop_timeout: Duration,
    pub reset_delay: Duration,
}

impl Default for SpeechTimings {
    fn default() -> Self {
        SpeechConfig::default().timings()
    }
}

impl SpeechConfig {
    pub fn timings(&self) -> SpeechTimings {
        SpeechTimings {
            restart_delay: Duration::from_millis(self.restart_delay_ms),
            start_timeout: Duration::from_millis(self.start_timeout_ms),
            stop_timeout: Duration::from_millis(self.stop_timeout_ms),
            reset_delay: Duration::from_millis(self.reset_delay_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// SynthesisConfig
// ---------------------------------------------------------------------------

/// Voice parameters for spoken responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Language tag of the synthesised voice.
    pub language: String,
    /// Speaking rate (1.0 = normal).
    pub rate: f32,
    /// Voice pitch (1.0 = normal).
    pub pitch: f32,
    /// Output volume (0.0 – 1.0).
    pub volume: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            language: "en-US".into(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// RecipeApiConfig
// ---------------------------------------------------------------------------

/// Connection settings for the Spoonacular recipe API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeApiConfig {
    /// Base URL of the API (no trailing slash).
    pub base_url: String,
    /// API key; `None` until the user enters one.
    pub api_key: Option<String>,
    /// Number of recipes requested per search.
    pub result_count: u32,
    /// Maximum seconds to wait for a response.
    pub timeout_secs: u64,
    /// `1` maximises used ingredients, `2` minimises missing ones.
    pub ranking: u8,
    /// Ignore pantry staples such as salt, water and oil.
    pub ignore_pantry: bool,
}

impl Default for RecipeApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.spoonacular.com".into(),
            api_key: None,
            result_count: 5,
            timeout_secs: 10,
            ranking: 1,
            ignore_pantry: true,
        }
    }
}

// ---------------------------------------------------------------------------
// ControllerConfig
// ---------------------------------------------------------------------------

/// Throttling applied by the microphone control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Minimum milliseconds between two accepted listen toggles.
    pub toggle_debounce_ms: u64,
    /// Minimum milliseconds between two microphone permission probes.
    pub permission_probe_throttle_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            toggle_debounce_ms: 300,
            permission_probe_throttle_ms: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// CookingConfig
// ---------------------------------------------------------------------------

/// Step-by-step guidance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookingConfig {
    /// Pause between the recipe introduction and reading step 1.
    pub first_step_delay_ms: u64,
    /// Upper bound for the countdown when the user adds minutes.
    pub timer_max_secs: u32,
}

impl Default for CookingConfig {
    fn default() -> Self {
        Self {
            first_step_delay_ms: 3_000,
            timer_max_secs: 3_600,
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
/// use voice_chef::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Recognition session settings.
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Spoken response settings.
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Recipe API settings.
    #[serde(default)]
    pub recipe_api: RecipeApiConfig,
    /// Microphone control settings.
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Cooking guidance settings.
    #[serde(default)]
    pub cooking: CookingConfig,
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

    /// Apply environment overrides ([`API_KEY_ENV`]).
    pub fn apply_env(&mut self) {
        self.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
    }

    fn apply_api_key_override(&mut self, value: Option<String>) {
        if let Some(key) = value.map(|v| v.trim().to_string()) {
            if !key.is_empty() {
                self.recipe_api.api_key = Some(key);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
