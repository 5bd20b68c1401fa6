use cw_ai::llm::Part;
use cw_ai::request::{build_analysis_request, DEFAULT_USER_QUERY, THINKING_BUDGET};
use cw_core::domain::{AnalysisMode, UploadedFile};
use pretty_assertions::assert_eq;

fn pdf(name: &str, data: &str) -> UploadedFile {
    UploadedFile {
        data: data.to_string(),
        mime_type: "application/pdf".to_string(),
        name: name.to_string(),
    }
}

#[test]
fn single_file_modes_send_one_attachment_and_one_instruction() {
    let primary = pdf("nda.pdf", "JVBERi0xLjc=");
    for mode in [AnalysisMode::Audit, AnalysisMode::Rewrite, AnalysisMode::Explain] {
        let req = build_analysis_request(&primary, None, mode, "").expect("build");
        let parts: Vec<&Part> = req.parts().collect();
        assert_eq!(parts.len(), 2, "mode {}", mode.as_str());
        assert!(parts[0].is_inline_data());
        assert!(parts[1].as_text().is_some());
        assert_eq!(req.inline_part_count(), 1);
    }
}

#[test]
fn compare_sends_both_attachments_in_order() {
    let base = pdf("v1.pdf", "AAAA");
    let revision = pdf("v2.pdf", "BBBB");
    let req = build_analysis_request(&base, Some(&revision), AnalysisMode::Compare, "")
        .expect("build");

    let parts: Vec<&Part> = req.parts().collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(*parts[0], Part::inline("application/pdf", "AAAA"));
    assert_eq!(*parts[1], Part::inline("application/pdf", "BBBB"));

    let text = req.instruction_text().expect("instruction");
    assert!(text.contains("first attachment"));
    assert!(text.contains("second attachment"));
    assert!(text.contains("versionComparison"));
}

#[test]
fn compare_without_second_file_is_a_validation_error() {
    let primary = pdf("v1.pdf", "AAAA");
    let err = build_analysis_request(&primary, None, AnalysisMode::Compare, "").unwrap_err();
    assert_eq!(err.code, "VALIDATION_ERROR");
}

#[test]
fn comparison_file_is_ignored_outside_compare() {
    let primary = pdf("v1.pdf", "AAAA");
    let other = pdf("v2.pdf", "BBBB");
    let req = build_analysis_request(&primary, Some(&other), AnalysisMode::Audit, "").expect("build");
    assert_eq!(req.inline_part_count(), 1);
}

#[test]
fn blank_query_is_replaced_by_the_default_sentence() {
    let primary = pdf("nda.pdf", "AAAA");
    for query in ["", "   ", "\n\t"] {
        let req = build_analysis_request(&primary, None, AnalysisMode::Audit, query).expect("build");
        let text = req.instruction_text().expect("instruction");
        assert!(text.contains(DEFAULT_USER_QUERY));
        assert!(!text.contains("\"\""));
    }

    let req = build_analysis_request(
        &primary,
        None,
        AnalysisMode::Explain,
        "What happens if I terminate early?",
    )
    .expect("build");
    let text = req.instruction_text().expect("instruction");
    assert!(text.contains("\"What happens if I terminate early?\""));
    assert!(!text.contains(DEFAULT_USER_QUERY));
}

#[test]
fn each_mode_gets_its_own_instruction_block() {
    let primary = pdf("nda.pdf", "AAAA");
    let other = pdf("v2.pdf", "BBBB");
    let cases = [
        (AnalysisMode::Audit, "complianceChecks"),
        (AnalysisMode::Compare, "negotiationTip"),
        (AnalysisMode::Rewrite, "autoFixes"),
        (AnalysisMode::Explain, "plain-English"),
    ];
    for (mode, marker) in cases {
        let req = build_analysis_request(&primary, Some(&other), mode, "").expect("build");
        let text = req.instruction_text().expect("instruction");
        assert!(text.contains(marker), "mode {} missing {marker}", mode.as_str());
    }
}

#[test]
fn generation_config_requests_structured_json() {
    let primary = pdf("nda.pdf", "AAAA");
    let req = build_analysis_request(&primary, None, AnalysisMode::Audit, "").expect("build");
    let g = &req.model_request.generation;

    assert_eq!(g.response_mime_type.as_deref(), Some("application/json"));
    assert_eq!(g.thinking_budget, Some(THINKING_BUDGET));
    let schema = g.response_schema.as_ref().expect("schema");
    assert_eq!(schema["type"], "OBJECT");
    assert_eq!(schema["properties"]["riskScore"]["type"], "INTEGER");
    assert_eq!(schema["required"].as_array().map(|r| r.len()), Some(11));
    assert_eq!(req.instruction_sha256.len(), 64);
}

#[test]
fn rejects_empty_payloads_and_unsupported_types() {
    let empty = pdf("empty.pdf", "");
    let err = build_analysis_request(&empty, None, AnalysisMode::Audit, "").unwrap_err();
    assert_eq!(err.code, "VALIDATION_ERROR");

    let doc = UploadedFile {
        data: "AAAA".to_string(),
        mime_type: "application/msword".to_string(),
        name: "contract.doc".to_string(),
    };
    let err = build_analysis_request(&doc, None, AnalysisMode::Audit, "").unwrap_err();
    assert_eq!(err.code, "VALIDATION_ERROR");

    let primary = pdf("v1.pdf", "AAAA");
    let err = build_analysis_request(&primary, Some(&empty), AnalysisMode::Compare, "").unwrap_err();
    assert_eq!(err.code, "VALIDATION_ERROR");
}

#[test]
fn explain_answers_any_query_in_the_narrative_field() {
    let primary = pdf("lease.pdf", "AAAA");
    let req = build_analysis_request(&primary, None, AnalysisMode::Explain, "Can I sublet?")
        .expect("build");
    let text = req.instruction_text().expect("instruction");
    assert!(text.contains("Answer the user query directly"));
    assert!(!text.contains("asks about specific clauses"));
}
