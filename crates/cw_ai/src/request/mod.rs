use cw_core::domain::{AnalysisMode, ChatRole, UploadedFile};
use cw_core::error::AppError;
use cw_core::ingest::is_accepted_media_type;
use sha2::{Digest, Sha256};

use crate::llm::{Content, GenerationConfig, ModelRequest, Part};
use crate::schema::analysis_response_schema;

pub mod prompts;

pub use prompts::{InstructionBlock, DEFAULT_USER_QUERY};

pub const RESPONSE_MIME_TYPE: &str = "application/json";
pub const THINKING_BUDGET: u32 = 2048;

/// A fully assembled analysis call, ready for `invoke_analysis`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    pub model_request: ModelRequest,
    /// sha256 of the instruction text; logged instead of the prompt itself.
    pub instruction_sha256: String,
}

impl AnalysisRequest {
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.model_request.parts()
    }

    pub fn inline_part_count(&self) -> usize {
        self.parts().filter(|p| p.is_inline_data()).count()
    }

    pub fn instruction_text(&self) -> Option<&str> {
        self.parts().filter_map(Part::as_text).last()
    }
}

fn check_upload(file: &UploadedFile, role: &str) -> Result<(), AppError> {
    if file.data.trim().is_empty() {
        return Err(AppError::validation(format!("The {role} file is empty"))
            .with_details(format!("name={}", file.name)));
    }
    if !is_accepted_media_type(&file.mime_type) {
        return Err(AppError::validation(format!("The {role} file type is not supported"))
            .with_details(format!("name={}; mime_type={}", file.name, file.mime_type)));
    }
    Ok(())
}

/// Assemble the model request for one analysis.
///
/// Parts are ordered primary document, comparison document (COMPARE only), instruction text.
/// A comparison file supplied for another mode is ignored.
pub fn build_analysis_request(
    primary: &UploadedFile,
    comparison: Option<&UploadedFile>,
    mode: AnalysisMode,
    user_query: &str,
) -> Result<AnalysisRequest, AppError> {
    check_upload(primary, "contract")?;

    let comparison = match mode {
        AnalysisMode::Compare => {
            let file = comparison.ok_or_else(|| {
                AppError::validation("Compare mode requires a second contract file")
            })?;
            check_upload(file, "comparison")?;
            Some(file)
        }
        AnalysisMode::Audit | AnalysisMode::Rewrite | AnalysisMode::Explain => {
            if comparison.is_some() {
                tracing::debug!(mode = mode.as_str(), "ignoring comparison file outside compare mode");
            }
            None
        }
    };

    let block = prompts::instruction_block(mode);
    let instruction = prompts::analysis_prompt(&block, user_query);
    let instruction_sha256 = hex::encode(Sha256::digest(instruction.as_bytes()));

    let mut parts = vec![Part::inline(&primary.mime_type, &primary.data)];
    if let Some(file) = comparison {
        parts.push(Part::inline(&file.mime_type, &file.data));
    }
    parts.push(Part::text(instruction));

    tracing::debug!(
        mode = mode.as_str(),
        parts = parts.len(),
        instruction_sha256 = %instruction_sha256,
        "analysis request built"
    );

    Ok(AnalysisRequest {
        mode,
        model_request: ModelRequest {
            contents: vec![Content {
                role: ChatRole::User,
                parts,
            }],
            system_instruction: None,
            generation: GenerationConfig {
                response_mime_type: Some(RESPONSE_MIME_TYPE.to_string()),
                response_schema: Some(analysis_response_schema()),
                thinking_budget: Some(THINKING_BUDGET),
            },
        },
        instruction_sha256,
    })
}
