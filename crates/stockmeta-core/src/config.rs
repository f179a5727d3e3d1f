//! Configuration module
//!
//! [`AppConfig`] holds process configuration resolved from the environment
//! (service URLs, model identifiers, on-disk locations). [`Settings`] is the
//! operator-editable document persisted as JSON (credentials, last folder).

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_EVERYPIXEL_URL: &str = "https://api.everypixel.com";
const DEFAULT_VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
const DEFAULT_TEXT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_FFMPEG: &str = "ffmpeg";
const APP_DIR_NAME: &str = ".stock_metadata_gen";

/// Process configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Process-owned directory holding settings, vocabulary and thumbnail cache
    pub home_dir: PathBuf,
    pub groq_base_url: String,
    pub everypixel_base_url: String,
    pub vision_model: String,
    pub text_model: String,
    pub ffmpeg_path: String,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let home_dir = match env::var("STOCKMETA_HOME") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .ok_or_else(|| {
                    AppError::Config("Could not determine the user home directory".to_string())
                })?
                .join(APP_DIR_NAME),
        };

        let config = Self {
            home_dir,
            groq_base_url: env_or("STOCKMETA_GROQ_URL", DEFAULT_GROQ_URL),
            everypixel_base_url: env_or("STOCKMETA_EVERYPIXEL_URL", DEFAULT_EVERYPIXEL_URL),
            vision_model: env_or("STOCKMETA_VISION_MODEL", DEFAULT_VISION_MODEL),
            text_model: env_or("STOCKMETA_TEXT_MODEL", DEFAULT_TEXT_MODEL),
            ffmpeg_path: env_or("STOCKMETA_FFMPEG", DEFAULT_FFMPEG),
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration rooted at an explicit directory, with default service endpoints
    pub fn with_home(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            groq_base_url: DEFAULT_GROQ_URL.to_string(),
            everypixel_base_url: DEFAULT_EVERYPIXEL_URL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            ffmpeg_path: DEFAULT_FFMPEG.to_string(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("groq base url", &self.groq_base_url),
            ("everypixel base url", &self.everypixel_base_url),
            ("vision model", &self.vision_model),
            ("text model", &self.text_model),
            ("ffmpeg path", &self.ffmpeg_path),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    pub fn thumbnail_dir(&self) -> PathBuf {
        self.home_dir.join("thumbs")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.home_dir.join("settings.json")
    }

    pub fn vocabulary_path(&self) -> PathBuf {
        self.home_dir.join("istock_learned.json")
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Operator settings persisted as one JSON document
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub groq_api_key: String,
    pub everypixels_id: String,
    pub everypixels_secret: String,
    /// Last folder opened by the operator
    pub save_dir: String,
}

impl Settings {
    pub fn has_groq_key(&self) -> bool {
        !self.groq_api_key.trim().is_empty()
    }

    /// Both halves of the tagging credential must be present
    pub fn tagging_credentials(&self) -> Option<(&str, &str)> {
        let id = self.everypixels_id.trim();
        let secret = self.everypixels_secret.trim();
        if id.is_empty() || secret.is_empty() {
            None
        } else {
            Some((id, secret))
        }
    }

    pub fn last_folder(&self) -> Option<PathBuf> {
        let dir = self.save_dir.trim();
        (!dir.is_empty()).then(|| PathBuf::from(dir))
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("groq_api_key", &redact(&self.groq_api_key))
            .field("everypixels_id", &redact(&self.everypixels_id))
            .field("everypixels_secret", &redact(&self.everypixels_secret))
            .field("save_dir", &self.save_dir)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
