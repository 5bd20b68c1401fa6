use std::fmt;
use std::time::Duration;

use cw_ai::gemini::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use cw_core::error::{AppError, CONFIG_ERROR};

/// Checked in order; the first non-blank value wins.
pub const API_KEY_VARS: [&str; 3] = ["CLAUSEWISE_API_KEY", "GEMINI_API_KEY", "API_KEY"];
pub const MODEL_VAR: &str = "CLAUSEWISE_MODEL";
pub const BASE_URL_VAR: &str = "CLAUSEWISE_BASE_URL";
pub const TIMEOUT_VAR: &str = "CLAUSEWISE_TIMEOUT_SECS";

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|k| non_blank(lookup(k)))
            .ok_or_else(|| {
                AppError::new(CONFIG_ERROR, "Model API key is missing")
                    .with_details(format!("set one of {}", API_KEY_VARS.join(", ")))
            })?;

        let model = non_blank(lookup(MODEL_VAR)).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url =
            non_blank(lookup(BASE_URL_VAR)).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = match non_blank(lookup(TIMEOUT_VAR)) {
            None => None,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(AppError::new(CONFIG_ERROR, "Invalid request timeout")
                        .with_details(format!("{TIMEOUT_VAR}={raw}")))
                }
            },
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout,
        })
    }

    pub fn client(&self) -> Result<GeminiClient, AppError> {
        let client = GeminiClient::new(&self.base_url, &self.api_key)?;
        Ok(match self.timeout {
            Some(t) => client.with_timeout(t),
            None => client,
        })
    }
}
