use cw_core::error::{AppError, EMPTY_RESPONSE};

/// Reject a model reply that carries no text.
pub fn require_text(output: &str) -> Result<&str, AppError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(AppError::new(EMPTY_RESPONSE, "No analysis generated"));
    }
    Ok(trimmed)
}

/// Remove one markdown code fence wrapped around the whole reply, if present.
///
/// Structured output normally arrives bare; some model versions still wrap it in
/// ```` ```json ... ``` ````. Anything else is returned untouched.
pub fn strip_code_fence(output: &str) -> &str {
    let trimmed = output.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line.
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim().contains(char::is_whitespace) => inner.trim(),
        _ => trimmed,
    }
}
