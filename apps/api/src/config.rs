use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{LlmConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};

/// Application configuration loaded from environment variables.
/// The AI key is optional; without it extraction runs heuristics only.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: optional_env("AI_API_KEY"),
            llm_api_url: optional_env("AI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            llm_timeout_secs: match optional_env("AI_TIMEOUT_SECS") {
                Some(raw) => raw
                    .parse::<u64>()
                    .context("AI_TIMEOUT_SECS must be a whole number of seconds")?,
                None => DEFAULT_TIMEOUT_SECS,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.llm_api_key.clone(),
            api_url: self.llm_api_url.clone(),
            timeout: Duration::from_secs(self.llm_timeout_secs),
        }
    }
}

/// Unset and blank variables both read as `None`.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_carries_settings() {
        let config = Config {
            llm_api_key: Some("sk-test".into()),
            llm_api_url: "http://localhost:9000/v1/chat/completions".into(),
            llm_timeout_secs: 5,
            port: 8080,
            rust_log: "info".into(),
        };
        let llm = config.llm_config();
        assert!(llm.is_configured());
        assert_eq!(llm.api_url, "http://localhost:9000/v1/chat/completions");
        assert_eq!(llm.timeout, Duration::from_secs(5));
    }
}
