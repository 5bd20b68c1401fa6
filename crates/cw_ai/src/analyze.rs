use cw_core::domain::{AnalysisMode, ContractAnalysis, UploadedFile};
use cw_core::error::AppError;
use cw_core::validate::decode_analysis;

use crate::guardrails::{require_text, strip_code_fence};
use crate::llm::ModelBackend;
use crate::request::{build_analysis_request, AnalysisRequest};

/// Send a built request and decode the reply into a validated analysis.
///
/// One call, no retries. Transport failures pass through unchanged.
pub fn invoke_analysis(
    backend: &dyn ModelBackend,
    model: &str,
    request: &AnalysisRequest,
) -> Result<ContractAnalysis, AppError> {
    tracing::info!(
        model,
        mode = request.mode.as_str(),
        attachments = request.inline_part_count(),
        "requesting contract analysis"
    );

    let raw = backend.generate(model, &request.model_request).map_err(|e| {
        tracing::warn!(code = %e.code, "analysis call failed");
        e
    })?;
    // A fence with nothing inside is as empty as no text at all.
    let text = require_text(strip_code_fence(&raw))?;

    let analysis = decode_analysis(text).map_err(|e| {
        tracing::warn!(code = %e.code, details = ?e.details, "analysis reply rejected");
        e
    })?;

    tracing::info!(
        risk_score = analysis.risk_score,
        risks = analysis.risks.len(),
        "contract analysis decoded"
    );
    Ok(analysis)
}

pub fn analyze_contract(
    backend: &dyn ModelBackend,
    model: &str,
    primary: &UploadedFile,
    comparison: Option<&UploadedFile>,
    mode: AnalysisMode,
    user_query: &str,
) -> Result<ContractAnalysis, AppError> {
    let request = build_analysis_request(primary, comparison, mode, user_query)?;
    invoke_analysis(backend, model, &request)
}
