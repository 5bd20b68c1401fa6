use cw_core::error::{AppError, TRANSPORT_ERROR};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Content, ModelBackend, ModelRequest, Part};
use crate::gemini::GeminiClient;

// Provider error bodies can be long; keep only the head in error details.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// `ModelBackend` over the Gemini REST `generateContent` call.
#[derive(Debug, Clone)]
pub struct GeminiLlm {
    client: GeminiClient,
}

impl GeminiLlm {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: [Part; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig<'a>>,
}

/// Encode a provider-neutral request as the `generateContent` JSON body.
pub fn encode_request_body(request: &ModelRequest) -> Result<Value, AppError> {
    let g = &request.generation;
    let generation_config = if g.response_mime_type.is_some()
        || g.response_schema.is_some()
        || g.thinking_budget.is_some()
    {
        Some(WireGenerationConfig {
            response_mime_type: g.response_mime_type.as_deref(),
            response_schema: g.response_schema.as_ref(),
            thinking_config: g.thinking_budget.map(|thinking_budget| ThinkingConfig {
                thinking_budget,
            }),
        })
    } else {
        None
    };

    let body = GenerateContentBody {
        contents: &request.contents,
        system_instruction: request.system_instruction.as_ref().map(|text| SystemInstruction {
            parts: [Part::text(text.clone())],
        }),
        generation_config,
    };

    serde_json::to_value(body).map_err(|e| {
        AppError::new(TRANSPORT_ERROR, "Failed to encode model request").with_details(e.to_string())
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WirePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
    #[serde(default)]
    prompt_feedback: Option<WirePromptFeedback>,
}

/// Extract the answer text from a `generateContent` response body.
///
/// Text parts of the first candidate are concatenated; thought summaries are skipped. A response
/// without candidates or text yields an empty string.
pub fn decode_response_body(body: &str) -> Result<String, AppError> {
    let resp: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        AppError::new(TRANSPORT_ERROR, "Malformed model API response").with_details(e.to_string())
    })?;

    if let Some(reason) = resp
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        tracing::warn!(block_reason = reason, "model refused the prompt");
    }

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Ok(String::new());
    };
    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            tracing::warn!(finish_reason = reason, "model stopped early");
        }
    }

    Ok(candidate
        .content
        .unwrap_or_default()
        .parts
        .into_iter()
        .filter(|p| !p.thought)
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .concat())
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

impl ModelBackend for GeminiLlm {
    fn generate(&self, model: &str, request: &ModelRequest) -> Result<String, AppError> {
        let url = self.client.generate_content_url(model);
        let body = encode_request_body(request)?;

        tracing::debug!(model, parts = request.parts().count(), "calling generateContent");
        let resp = self.client.post(&url).send_json(body);

        match resp {
            Ok(r) => {
                let text = r.into_string().map_err(|e| {
                    AppError::new(TRANSPORT_ERROR, "Failed to read model API response")
                        .with_details(e.to_string())
                        .with_retryable(true)
                })?;
                decode_response_body(&text)
            }
            Err(ureq::Error::Status(status, r)) => {
                let body = r.into_string().unwrap_or_default();
                Err(AppError::new(TRANSPORT_ERROR, "Model API request failed")
                    .with_details(format!(
                        "status={status}; body={}",
                        truncate_chars(&body, MAX_ERROR_BODY_CHARS)
                    ))
                    .with_retryable(status == 429 || status >= 500))
            }
            Err(e) => Err(AppError::new(TRANSPORT_ERROR, "Failed to call the model API")
                .with_details(e.to_string())
                .with_retryable(true)),
        }
    }
}
