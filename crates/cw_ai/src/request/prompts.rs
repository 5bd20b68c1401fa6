use cw_core::domain::AnalysisMode;

pub const DEFAULT_USER_QUERY: &str = "Perform the analysis as defined by the mode.";

/// Mode-specific task block placed between the auditor preamble and the user query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionBlock {
    pub mode: AnalysisMode,
    pub title: &'static str,
    pub tasks: &'static str,
}

pub fn instruction_block(mode: AnalysisMode) -> InstructionBlock {
    match mode {
        AnalysisMode::Audit => InstructionBlock {
            mode,
            title: "RISK AUDIT (STANDARD)",
            tasks: r#"Tasks:
1) Extract the clause list with clause numbers.
2) Classify each risky clause as HIGH, MEDIUM or LOW and list it in "risks" with its clause reference.
3) Derive an aggregate "riskScore" from 0 to 100 based on the severity of the clauses.
4) Extract financial obligations (payments, penalties, renewal costs) into "financialTerms".
5) Extract dates, deadlines and responsible parties into "obligations", in timeline order.
6) Run a compliance checklist into "complianceChecks": data privacy, IP rights, termination, liability.
7) Classify the contract type into "documentType"."#,
        },
        AnalysisMode::Compare => InstructionBlock {
            mode,
            title: "COMPARE VERSIONS",
            tasks: r#"Inputs:
1) The first attachment is the baseline: the original or reference contract.
2) The second attachment is the revision: the new or redlined version.

Tasks:
1) Read BOTH attachments completely.
2) Fill "versionComparison" with the changes between them:
   - ADDED: clauses present only in the second attachment.
   - REMOVED: clauses present only in the first attachment.
   - MODIFIED: clauses whose meaning changed. Ignore formatting-only changes.
3) For each change give its "impact" and a "negotiationTip".
4) In "comparisonAnalysis", state whether the revision is more or less favorable overall.
5) Fill the standard fields (risks, obligations, financial terms) from the second attachment."#,
        },
        AnalysisMode::Rewrite => InstructionBlock {
            mode,
            title: "REWRITE / AUTO-FIX",
            tasks: r#"Tasks:
1) Find the 3-5 most biased, unclear or risky clauses.
2) Focus on "autoFixes": for each clause give a balanced, legally sound "fixedText" using standard industry terms.
3) In "explanation", say why the original was a problem and why the rewrite is better.
4) The remaining fields are secondary; fill them briefly."#,
        },
        AnalysisMode::Explain => InstructionBlock {
            mode,
            title: "EXPLAIN IN SIMPLE ENGLISH",
            tasks: r#"Tasks:
1) Simplify the contract logic end to end.
2) Write "summary" as a plain-English guide to this contract.
3) Use simple, non-legalistic language in "risks" and "obligations".
4) Answer the user query directly and in plain language in "comparisonAnalysis"."#,
        },
    }
}

/// Substitute the default sentence for a blank query.
pub fn effective_user_query(user_query: &str) -> &str {
    let trimmed = user_query.trim();
    if trimmed.is_empty() {
        DEFAULT_USER_QUERY
    } else {
        trimmed
    }
}

pub fn analysis_prompt(block: &InstructionBlock, user_query: &str) -> String {
    let title = block.title;
    let tasks = block.tasks;
    let query = effective_user_query(user_query);
    format!(
        r#"You are an expert contract auditor.
Analyze the attached contract document(s) rigorously. The attachments are PDF or image files; read and understand them completely.

Mode: {title}

{tasks}

User query / specific instructions:
"{query}"

Output:
- Return a single valid JSON object matching the response schema.
- Populate every list (risks, obligations, financial terms, ...) whenever the document contains matching data.
"#
    )
}

pub fn chat_system_instruction(context_json: &str) -> String {
    format!(
        r#"You are a contract analysis assistant. Answer the user's questions using the contract analysis context below.

Context:
{context_json}

Rules:
1) If the user asks to rewrite a clause, give a legally safer, balanced version in plain English first and then as formal legal text.
2) Keep answers concise and helpful.
"#
    )
}
