use super::*;

#[test]
fn missing_key_errors() {
    let err = LlmConfig::from_parts(None, None, None, HttpTimeouts::default()).unwrap_err();
    assert!(err.to_string().contains("GEMINI_API_KEY"));
}

#[test]
fn blank_key_errors() {
    assert!(LlmConfig::from_parts(Some("  "), None, None, HttpTimeouts::default()).is_err());
}

#[test]
fn defaults_applied() {
    let cfg = LlmConfig::from_parts(Some("key"), None, None, HttpTimeouts::default()).unwrap();
    assert_eq!(cfg.api_key, "key");
    assert_eq!(cfg.model, DEFAULT_GEMINI_MODEL);
    assert_eq!(cfg.base_url, DEFAULT_GEMINI_BASE_URL);
}

#[test]
fn overrides_applied() {
    let timeouts = HttpTimeouts { request_secs: 5, connect_secs: 1 };
    let cfg =
        LlmConfig::from_parts(Some("key"), Some("gemini-1.5-pro"), Some("https://proxy.test/v1/"), timeouts).unwrap();
    assert_eq!(cfg.model, "gemini-1.5-pro");
    assert_eq!(cfg.base_url, "https://proxy.test/v1");
    assert_eq!(cfg.timeouts, timeouts);
}
