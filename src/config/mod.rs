//! Configuration module for the voice cooking assistant.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for the platform config directory, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    language_name, AppConfig, ControllerConfig, CookingConfig, RecipeApiConfig, SpeechConfig,
    SpeechTimings, SynthesisConfig, API_KEY_ENV, SUPPORTED_LANGUAGES,
};
