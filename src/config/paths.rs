//! Where voice-chef keeps its files, resolved with the `dirs` crate.
//!
//!   Windows: %APPDATA%\voice-chef\settings.toml
//!   macOS:   ~/Library/Application Support/voice-chef/settings.toml
//!   Linux:   ~/.config/voice-chef/settings.toml

use std::path::{Path, PathBuf};

const APP_DIR: &str = "voice-chef";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// `<platform config dir>/voice-chef`.
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
}

impl AppPaths {
    /// Paths under the platform config directory, or under `./voice-chef`
    /// when the platform has none.
    pub fn new() -> Self {
        Self::under(dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Paths under an explicit base directory.
    pub fn under(base: impl AsRef<Path>) -> Self {
        let config_dir = base.as_ref().join(APP_DIR);
        Self {
            settings_file: config_dir.join(SETTINGS_FILE),
            config_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
