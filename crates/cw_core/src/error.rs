use serde::{Deserialize, Serialize};
use std::fmt;

/// Local file could not be turned into an upload payload.
pub const INGESTION_ERROR: &str = "INGESTION_ERROR";
/// Caller violated a precondition (missing comparison file, busy session, ...).
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
/// Network or model endpoint failure.
pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
/// The model call succeeded but produced no text.
pub const EMPTY_RESPONSE: &str = "EMPTY_RESPONSE";
/// The returned text does not conform to the analysis schema.
pub const DECODE_ERROR: &str = "DECODE_ERROR";
/// Missing or unusable configuration (credential, endpoint).
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";

/// Single structured error shape used across the core, the model client and the shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn ingestion(message: impl Into<String>) -> Self {
        Self::new(INGESTION_ERROR, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(VALIDATION_ERROR, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(DECODE_ERROR, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
