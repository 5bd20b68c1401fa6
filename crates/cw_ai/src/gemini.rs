use std::fmt;
use std::time::Duration;

use cw_core::error::{AppError, CONFIG_ERROR, TRANSPORT_ERROR};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const API_VERSION: &str = "v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Endpoint and credential for the hosted model API.
///
/// Constructed explicitly and passed to the backend; there is no process-wide client.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    timeout: Option<Duration>,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn valid_port(port: &str) -> bool {
    matches!(port.parse::<u32>(), Ok(p) if (1..=65535).contains(&p))
}

fn valid_authority(authority: &str) -> bool {
    if authority.is_empty() || authority.contains(['@', '/', '?', '#', ' ']) {
        return false;
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && valid_port(port),
        None => true,
    }
}

impl GeminiClient {
    /// Create a client. The base URL must be `https://<host>[:port]` (no path), or a loopback
    /// `http://127.0.0.1[:port]` for local emulators.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        let authority = if let Some(rest) = base_url.strip_prefix("https://") {
            Some(rest)
        } else if let Some(rest) = base_url.strip_prefix("http://") {
            // Plain http only to loopback.
            let host = rest.rsplit_once(':').map(|(h, _)| h).unwrap_or(rest);
            (host == "127.0.0.1").then_some(rest)
        } else {
            None
        };

        if !authority.is_some_and(valid_authority) {
            return Err(AppError::new(CONFIG_ERROR, "Model API base URL is not allowed")
                .with_details(format!("base_url={base_url}")));
        }

        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AppError::new(CONFIG_ERROR, "Model API key is missing"));
        }

        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            timeout: None,
        })
    }

    /// Impose an overall deadline on each model call. No deadline by default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn generate_content_url(&self, model: &str) -> String {
        format!(
            "{}/{API_VERSION}/models/{}:generateContent",
            self.base_url,
            model.trim_start_matches("models/")
        )
    }

    pub(crate) fn post(&self, url: &str) -> ureq::Request {
        let req = ureq::post(url)
            .set(API_KEY_HEADER, &self.api_key)
            .set("Content-Type", "application/json");
        match self.timeout {
            Some(t) => req.timeout(t),
            None => req,
        }
    }

    /// Check that the endpoint is reachable and accepts the credential.
    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/{API_VERSION}/models?pageSize=1", self.base_url);
        let resp = ureq::get(&url)
            .set(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout.unwrap_or(HEALTH_TIMEOUT))
            .call();

        match resp {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, _)) => Err(AppError::new(
                TRANSPORT_ERROR,
                "Model API health check failed",
            )
            .with_details(format!("status={status}"))
            .with_retryable(status == 429 || status >= 500)),
            Err(e) => Err(AppError::new(TRANSPORT_ERROR, "Failed to reach the model API")
                .with_details(e.to_string())
                .with_retryable(true)),
        }
    }
}
