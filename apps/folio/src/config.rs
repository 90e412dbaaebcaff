use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::chat::session::LlmSettings;
use crate::llm_client::DEFAULT_API_BASE;

/// Application configuration loaded from environment variables.
/// Nothing is required: without an API key the site runs with chat disabled.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    /// Resume document override. Falls back to the embedded copy.
    pub resume_path: Option<PathBuf>,
    pub assets_dir: PathBuf,
    pub fetch_timeout_secs: u64,
    /// Chat widgets unused for this long are evicted.
    pub chat_idle_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Config {
            gemini_api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")),
            gemini_api_base: non_empty("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            resume_path: non_empty("RESUME_PATH").map(PathBuf::from),
            assets_dir: PathBuf::from(non_empty("ASSETS_DIR").unwrap_or_else(|| "assets".into())),
            fetch_timeout_secs: non_empty("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u64>()
                .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?,
            chat_idle_ttl_secs: non_empty("CHAT_IDLE_TTL_SECS")
                .unwrap_or_else(|| "1800".to_string())
                .parse::<u64>()
                .context("CHAT_IDLE_TTL_SECS must be a whole number of seconds")?,
            port: non_empty("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            api_key: self.gemini_api_key.clone(),
            api_base: self.gemini_api_base.clone(),
        }
    }
}
