// src/config.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientError, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` means "scrape it from the chat page".
    pub csrf_token: Option<String>,
    pub session_id: Option<String>,
    pub sound_on: bool,
    pub export_dir: PathBuf,
    pub course_catalog_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            csrf_token: None,
            session_id: None,
            sound_on: true,
            export_dir: PathBuf::from("exports"),
            course_catalog_delay: Duration::from_millis(1000),
        }
    }
}

impl ClientConfig {
    /// Read `CHATBOT_*` variables, loading a `.env` file first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(url) = get("CHATBOT_BASE_URL") {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ClientError::Config(format!(
                    "CHATBOT_BASE_URL must be an http(s) url, got {url}"
                )));
            }
            config.base_url = url.trim_end_matches('/').to_string();
        }
        config.csrf_token = get("CHATBOT_CSRF_TOKEN");
        config.session_id = get("CHATBOT_SESSION_ID");
        if let Some(flag) = get("CHATBOT_SOUND") {
            config.sound_on = parse_flag(&flag).ok_or_else(|| {
                ClientError::Config(format!("CHATBOT_SOUND: expected on/off, got {flag}"))
            })?;
        }
        if let Some(dir) = get("CHATBOT_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }
        if let Some(ms) = get("CHATBOT_COURSE_DELAY_MS") {
            let ms: u64 = ms.parse().map_err(|_| {
                ClientError::Config(format!("CHATBOT_COURSE_DELAY_MS: not a number: {ms}"))
            })?;
            config.course_catalog_delay = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
