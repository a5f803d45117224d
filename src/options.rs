//! Application options with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::OptionsError;

const OPTIONS_FILE: &str = "options.ron";

/// Top-level application options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppOptions {
    pub window: WindowOptions,
    pub chat: ChatOptions,
    pub assets: AssetOptions,
    pub debug: DebugOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowOptions {
    /// Window width in logical pixels.
    pub width: f32,
    /// Window height in logical pixels.
    pub height: f32,
    pub title: String,
}

/// Generative-language endpoint settings for the chat panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: f32,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Base URL, without the `/models/...` suffix.
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetOptions {
    /// Directory holding the planet textures.
    pub dir: PathBuf,
    /// Fetch missing textures from their public URLs.
    pub download_missing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugOptions {
    /// Filter directive such as "info" or "debug,orbital_view=trace".
    pub log_level: String,
    /// Directory for the JSON log file in debug builds.
    pub log_dir: Option<PathBuf>,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            title: "Orbital View".to_string(),
        }
    }
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            api_key_env: "API_KEY".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            download_missing: true,
        }
    }
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// `<platform config dir>/orbital-view`, or the working directory when the
/// platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("orbital-view"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl AppOptions {
    /// Load options from the given directory, or write the defaults there.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, OptionsError> {
        let path = config_dir.join(OPTIONS_FILE);

        if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(OptionsError::Read)?;
            let options: AppOptions = ron::from_str(&contents).map_err(OptionsError::Parse)?;
            info!(path = %path.display(), "loaded options");
            Ok(options)
        } else {
            let options = AppOptions::default();
            options.save(config_dir)?;
            info!(path = %path.display(), "created default options");
            Ok(options)
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), OptionsError> {
        std::fs::create_dir_all(config_dir).map_err(OptionsError::Write)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(OptionsError::Serialize)?;

        std::fs::write(config_dir.join(OPTIONS_FILE), serialized).map_err(OptionsError::Write)?;
        Ok(())
    }
}
