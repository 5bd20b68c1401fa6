use cw_core::domain::{AnalysisMode, ChatTurn, ContractAnalysis, UploadedFile};
use cw_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::analyze::invoke_analysis;
use crate::chat::{ask_follow_up, ChatContext};
use crate::llm::ModelBackend;
use crate::request::{build_analysis_request, AnalysisRequest};

/// Shown whenever an analysis fails, whatever the cause.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Please upload a valid contract file (PDF or image).";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppState {
    #[default]
    Idle,
    Analyzing,
    Results,
    Error,
}

/// Which uploaded slot to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSlot {
    Contract,
    Comparison,
}

/// In-memory state of one analysis session.
///
/// Holds at most one analysis in flight and one chat answer pending. Results are replaced
/// wholesale on each successful analysis; nothing outlives the session.
#[derive(Debug, Default)]
pub struct Session {
    mode: AnalysisMode,
    contract: Option<UploadedFile>,
    comparison: Option<UploadedFile>,
    user_query: String,
    state: AppState,
    analysis: Option<ContractAnalysis>,
    error_message: Option<String>,
    last_error: Option<AppError>,
    chat: Vec<ChatTurn>,
    answer_pending: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn contract_file(&self) -> Option<&UploadedFile> {
        self.contract.as_ref()
    }

    pub fn comparison_file(&self) -> Option<&UploadedFile> {
        self.comparison.as_ref()
    }

    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    pub fn analysis(&self) -> Option<&ContractAnalysis> {
        self.analysis.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Underlying cause of the last failed analysis, for diagnostics.
    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub fn chat_history(&self) -> &[ChatTurn] {
        &self.chat
    }

    pub fn is_answer_pending(&self) -> bool {
        self.answer_pending
    }

    /// Switch mode. Leaving COMPARE drops the comparison file.
    pub fn set_mode(&mut self, mode: AnalysisMode) {
        if mode != AnalysisMode::Compare && self.comparison.take().is_some() {
            tracing::debug!(mode = mode.as_str(), "comparison file cleared");
        }
        self.mode = mode;
    }

    pub fn set_contract_file(&mut self, file: UploadedFile) {
        self.contract = Some(file);
    }

    pub fn set_comparison_file(&mut self, file: UploadedFile) -> Result<(), AppError> {
        if self.mode != AnalysisMode::Compare {
            return Err(AppError::validation(
                "A comparison file can only be added in compare mode",
            )
            .with_details(format!("mode={}", self.mode.as_str())));
        }
        self.comparison = Some(file);
        Ok(())
    }

    pub fn remove_file(&mut self, slot: FileSlot) {
        match slot {
            FileSlot::Contract => self.contract = None,
            FileSlot::Comparison => self.comparison = None,
        }
    }

    pub fn set_user_query(&mut self, query: impl Into<String>) {
        self.user_query = query.into();
    }

    /// True when the inputs required by the current mode are present.
    pub fn can_submit(&self) -> bool {
        self.contract.is_some()
            && (self.mode != AnalysisMode::Compare || self.comparison.is_some())
            && self.state != AppState::Analyzing
    }

    /// Build the request for the current inputs and enter `ANALYZING`.
    ///
    /// Rejected while another analysis is outstanding. Any other failure moves the session to
    /// `ERROR`.
    pub fn begin_analysis(&mut self) -> Result<AnalysisRequest, AppError> {
        if self.state == AppState::Analyzing {
            return Err(AppError::validation("An analysis is already in progress"));
        }

        let built = match self.contract.as_ref() {
            Some(primary) => build_analysis_request(
                primary,
                self.comparison.as_ref(),
                self.mode,
                &self.user_query,
            ),
            None => Err(AppError::validation("No contract file selected")),
        };

        match built {
            Ok(request) => {
                self.state = AppState::Analyzing;
                self.error_message = None;
                self.last_error = None;
                Ok(request)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Record the outcome of the analysis started by `begin_analysis`.
    ///
    /// Rejected unless an analysis is outstanding.
    pub fn finish_analysis(
        &mut self,
        outcome: Result<ContractAnalysis, AppError>,
    ) -> Result<(), AppError> {
        if self.state != AppState::Analyzing {
            return Err(AppError::validation("No analysis in progress")
                .with_details(format!("state={:?}", self.state)));
        }
        self.settle_analysis(outcome);
        Ok(())
    }

    fn settle_analysis(&mut self, outcome: Result<ContractAnalysis, AppError>) {
        match outcome {
            Ok(analysis) => {
                self.analysis = Some(analysis);
                self.chat.clear();
                self.answer_pending = false;
                self.error_message = None;
                self.state = AppState::Results;
            }
            Err(e) => self.fail(&e),
        }
    }

    pub fn run_analysis(&mut self, backend: &dyn ModelBackend, model: &str) -> AppState {
        // On rejection `begin_analysis` has already recorded the state.
        let Ok(request) = self.begin_analysis() else {
            return self.state;
        };
        let outcome = invoke_analysis(backend, model, &request);
        self.settle_analysis(outcome);
        self.state
    }

    fn fail(&mut self, err: &AppError) {
        tracing::warn!(code = %err.code, message = %err.message, "analysis failed");
        self.analysis = None;
        self.chat.clear();
        self.answer_pending = false;
        self.error_message = Some(ANALYSIS_FAILED_MESSAGE.to_string());
        self.last_error = Some(err.clone());
        self.state = AppState::Error;
    }

    /// Append the user's question and return the context to answer it from.
    pub fn begin_question(&mut self, question: &str) -> Result<ChatContext, AppError> {
        let Some(analysis) = self.analysis.as_ref() else {
            return Err(AppError::validation("No analysis to ask about"));
        };
        if self.answer_pending {
            return Err(AppError::validation("Still answering the previous question"));
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::validation("Question is empty"));
        }

        let context = ChatContext::from_analysis(analysis);
        self.chat.push(ChatTurn::user(question));
        self.answer_pending = true;
        Ok(context)
    }

    /// Append the answer to the question started by `begin_question`.
    pub fn finish_question(&mut self, answer: String) -> Result<(), AppError> {
        if !self.answer_pending {
            return Err(AppError::validation("No question is waiting for an answer"));
        }
        self.chat.push(ChatTurn::model(answer));
        self.answer_pending = false;
        Ok(())
    }

    /// Ask a follow-up question and return the model turn that was appended.
    pub fn ask(
        &mut self,
        backend: &dyn ModelBackend,
        model: &str,
        question: &str,
    ) -> Result<&ChatTurn, AppError> {
        let context = self.begin_question(question)?;
        let (last, prior) = match self.chat.split_last() {
            Some(split) => split,
            None => return Err(AppError::validation("Question is empty")),
        };
        let answer = ask_follow_up(backend, model, prior, &last.text, &context);
        self.finish_question(answer)?;
        self.chat
            .last()
            .ok_or_else(|| AppError::validation("Chat history is empty"))
    }

    /// Back to a fresh AUDIT session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
