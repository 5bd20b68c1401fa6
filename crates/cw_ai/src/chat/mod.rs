use cw_core::domain::{ChatRole, ChatTurn, ContractAnalysis, Obligation, Risk};
use cw_core::error::{AppError, VALIDATION_ERROR};
use serde::Serialize;

use crate::guardrails::require_text;
use crate::llm::{Content, GenerationConfig, ModelBackend, ModelRequest, Part};
use crate::request::prompts::chat_system_instruction;

pub const CHAT_FALLBACK_TEXT: &str =
    "I apologize, but I encountered an error responding to your request.";

/// The slice of an analysis the assistant answers from.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatContext {
    pub summary: String,
    pub risks: Vec<Risk>,
    pub obligations: Vec<Obligation>,
    pub missing: Vec<String>,
}

impl ChatContext {
    pub fn from_analysis(analysis: &ContractAnalysis) -> Self {
        Self {
            summary: analysis.summary.clone(),
            risks: analysis.risks.clone(),
            obligations: analysis.obligations.clone(),
            missing: analysis.missing_clauses.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self).map_err(|e| {
            AppError::new(VALIDATION_ERROR, "Failed to serialize chat context")
                .with_details(e.to_string())
        })
    }
}

fn turn_content(role: ChatRole, text: &str) -> Content {
    Content {
        role,
        parts: vec![Part::text(text)],
    }
}

/// Prior turns in order, then the new question as a trailing user turn.
pub fn build_chat_request(
    history: &[ChatTurn],
    question: &str,
    context: &ChatContext,
) -> Result<ModelRequest, AppError> {
    let context_json = context.to_json()?;

    let mut contents: Vec<Content> = history
        .iter()
        .map(|t| turn_content(t.role, &t.text))
        .collect();
    contents.push(turn_content(ChatRole::User, question));

    Ok(ModelRequest {
        contents,
        system_instruction: Some(chat_system_instruction(&context_json)),
        generation: GenerationConfig::default(),
    })
}

/// Answer a follow-up question about the current analysis.
///
/// Never fails: any error is logged and replaced with `CHAT_FALLBACK_TEXT`.
pub fn ask_follow_up(
    backend: &dyn ModelBackend,
    model: &str,
    history: &[ChatTurn],
    question: &str,
    context: &ChatContext,
) -> String {
    let answer = build_chat_request(history, question, context)
        .and_then(|req| backend.generate(model, &req))
        .and_then(|raw| require_text(&raw).map(str::to_string));

    match answer {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(code = %e.code, message = %e.message, "follow-up question failed");
            CHAT_FALLBACK_TEXT.to_string()
        }
    }
}
