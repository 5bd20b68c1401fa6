use cw_core::domain::ChatRole;
use cw_core::error::AppError;
use serde::Serialize;
use serde_json::Value;

pub mod gemini_llm;

/// Inline document bytes attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One content part: either an attached document or instruction text.
///
/// Serializes as `{"inlineData": {...}}` or `{"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    InlineData(InlineData),
    Text(String),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData(InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        })
    }

    pub fn is_inline_data(&self) -> bool {
        matches!(self, Part::InlineData(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(t) => Some(t),
            Part::InlineData(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub role: ChatRole,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationConfig {
    /// `application/json` asks the model for structured output.
    pub response_mime_type: Option<String>,
    pub response_schema: Option<Value>,
    pub thinking_budget: Option<u32>,
}

/// Provider-neutral model call: ordered conversation contents plus configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRequest {
    pub contents: Vec<Content>,
    pub system_instruction: Option<String>,
    pub generation: GenerationConfig,
}

impl ModelRequest {
    /// All parts across all contents, in order.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.contents.iter().flat_map(|c| c.parts.iter())
    }
}

/// A hosted model the analysis and chat clients can talk to.
///
/// Implementations return the generated text. A reply without any text is returned as an empty
/// string; classifying that as `EMPTY_RESPONSE` is the caller's job. Transport failures map to
/// `TRANSPORT_ERROR`.
pub trait ModelBackend {
    fn generate(&self, model: &str, request: &ModelRequest) -> Result<String, AppError>;
}
