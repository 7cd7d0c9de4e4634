use super::*;
use crate::config::HttpTimeouts;
use serde_json::json;

#[test]
fn request_carries_prompt_and_fixed_settings() {
    let value = serde_json::to_value(build_request("generate five questions")).unwrap();
    assert_eq!(value["contents"][0]["role"], "user");
    assert_eq!(value["contents"][0]["parts"][0]["text"], "generate five questions");
    assert_eq!(value["generationConfig"]["topK"], 40);
    assert_eq!(value["generationConfig"]["maxOutputTokens"], 8192);
    assert_eq!(value["generationConfig"]["responseMimeType"], "text/plain");
    let settings = value["safetySettings"].as_array().unwrap();
    assert_eq!(settings.len(), 4);
    assert!(settings.iter().all(|s| s["threshold"] == "BLOCK_MEDIUM_AND_ABOVE"));
}

#[test]
fn parse_joins_text_parts() {
    let body = json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "[{\"question\":" }, { "text": "\"Q\"}]" }] },
            "finishReason": "STOP"
        }]
    })
    .to_string();
    assert_eq!(parse_response(&body).unwrap(), r#"[{"question":"Q"}]"#);
}

#[test]
fn parse_blocked_prompt_is_empty_response() {
    let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
    let err = parse_response(&body).unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse(reason) if reason.contains("SAFETY")));
}

#[test]
fn parse_candidate_without_text_reports_finish_reason() {
    let body = json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] }).to_string();
    let err = parse_response(&body).unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse(reason) if reason == "MAX_TOKENS"));
}

#[test]
fn parse_invalid_json_errors() {
    assert!(matches!(parse_response("nope"), Err(LlmError::ApiParse(_))));
}

#[test]
fn endpoint_includes_model() {
    let cfg = LlmConfig::from_parts(Some("k"), Some("gemini-x"), None, HttpTimeouts::default()).unwrap();
    let client = GeminiClient::new(cfg).unwrap();
    assert_eq!(client.model(), "gemini-x");
    assert_eq!(
        client.endpoint(),
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-x:generateContent"
    );
}
