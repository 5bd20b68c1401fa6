use cw_ai::chat::{build_chat_request, ChatContext};
use cw_ai::llm::gemini_llm::{decode_response_body, encode_request_body};
use cw_ai::request::build_analysis_request;
use cw_core::domain::{AnalysisMode, ChatTurn, UploadedFile};
use cw_core::validate::decode_analysis;
use pretty_assertions::assert_eq;
use serde_json::json;

fn pdf(data: &str) -> UploadedFile {
    UploadedFile {
        data: data.to_string(),
        mime_type: "application/pdf".to_string(),
        name: "contract.pdf".to_string(),
    }
}

#[test]
fn analysis_body_matches_generate_content_shape() {
    let req = build_analysis_request(&pdf("AAAA"), Some(&pdf("BBBB")), AnalysisMode::Compare, "")
        .expect("build");
    let body = encode_request_body(&req.model_request).expect("encode");

    let parts = body["contents"][0]["parts"].as_array().expect("parts");
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(parts.len(), 3);
    assert_eq!(
        parts[0],
        json!({ "inlineData": { "mimeType": "application/pdf", "data": "AAAA" } })
    );
    assert_eq!(parts[1]["inlineData"]["data"], "BBBB");
    assert!(parts[2]["text"].is_string());

    let config = &body["generationConfig"];
    assert_eq!(config["responseMimeType"], "application/json");
    assert_eq!(config["thinkingConfig"], json!({ "thinkingBudget": 2048 }));
    assert_eq!(config["responseSchema"]["type"], "OBJECT");
    assert!(body.get("systemInstruction").is_none());
}

#[test]
fn chat_body_carries_system_instruction_and_roles() {
    let analysis = decode_analysis(include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../cw_core/tests/fixtures/analysis_minimal.json"
    )))
    .expect("fixture");
    let history = vec![ChatTurn::user("Hi"), ChatTurn::model("Hello.")];
    let req = build_chat_request(&history, "Any penalties?", &ChatContext::from_analysis(&analysis))
        .expect("request");
    let body = encode_request_body(&req).expect("encode");

    assert_eq!(body["contents"][1], json!({ "role": "model", "parts": [{ "text": "Hello." }] }));
    assert_eq!(body["contents"][2]["parts"][0]["text"], "Any penalties?");
    assert!(body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .is_some_and(|t| t.contains("Short mutual NDA")));
    assert!(body.get("generationConfig").is_none());
}

#[test]
fn response_text_skips_thoughts_and_joins_parts() {
    let body = json!({
        "candidates": [{
            "content": { "role": "model", "parts": [
                { "text": "thinking...", "thought": true },
                { "text": "{\"a\":" },
                { "text": "1}" }
            ]},
            "finishReason": "STOP"
        }],
        "usageMetadata": { "totalTokenCount": 10 }
    });
    assert_eq!(decode_response_body(&body.to_string()).expect("decode"), "{\"a\":1}");
}

#[test]
fn response_without_candidates_is_empty_text() {
    let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
    assert_eq!(decode_response_body(&body.to_string()).expect("decode"), "");
    assert_eq!(decode_response_body("{}").expect("decode"), "");
}

#[test]
fn malformed_envelope_is_transport_error() {
    let err = decode_response_body("<html>bad gateway</html>").unwrap_err();
    assert_eq!(err.code, "TRANSPORT_ERROR");
}
