use super::*;
use axum::http::HeaderValue;
use axum::http::header::COOKIE;
use std::time::Duration;

fn config(publishable: Option<&str>, secret: Option<&str>) -> IdentityConfig {
    IdentityConfig {
        publishable_key: publishable.map(str::to_owned),
        secret_key: secret.map(str::to_owned),
        mock_state_path: None,
        mock_load_delay: Duration::ZERO,
        ..IdentityConfig::default()
    }
}

// =============================================================================
// select_mode
// =============================================================================

#[test]
fn absent_key_selects_mock() {
    assert_eq!(select_mode(None), ProviderMode::Mock);
}

#[test]
fn sentinel_key_selects_mock() {
    assert_eq!(select_mode(Some(MOCK_IDENTITY_SENTINEL)), ProviderMode::Mock);
}

#[test]
fn live_key_selects_clerk() {
    assert_eq!(select_mode(Some("pk_live_Y2xlcmsuZXhhbXBsZS5jb20k")), ProviderMode::Clerk);
}

// =============================================================================
// AuthFacade::from_config
// =============================================================================

#[tokio::test]
async fn facade_reports_mock_semantics_for_absent_key() {
    let facade = AuthFacade::from_config(&config(None, Some("sk_test_ignored")));
    assert_eq!(facade.mode(), ProviderMode::Mock);

    let state = facade.sign_in().await.unwrap();
    assert_eq!(state.user_id.as_deref(), Some(mock::MOCK_USER_ID));
}

#[tokio::test]
async fn facade_reports_mock_semantics_for_sentinel_key() {
    let facade = AuthFacade::from_config(&config(Some(MOCK_IDENTITY_SENTINEL), None));
    assert_eq!(facade.mode(), ProviderMode::Mock);
    assert!(facade.sign_out().await.is_ok());
}

#[test]
fn facade_falls_back_to_mock_without_secret() {
    let facade = AuthFacade::from_config(&config(Some("pk_live_abc"), None));
    assert_eq!(facade.mode(), ProviderMode::Mock);
}

#[test]
fn facade_falls_back_to_mock_without_jwt_key() {
    let facade = AuthFacade::from_config(&config(Some("pk_live_abc"), Some("sk_live_def")));
    assert_eq!(facade.mode(), ProviderMode::Mock);
}

#[test]
fn facade_uses_clerk_when_fully_configured() {
    let cfg = IdentityConfig {
        jwt_key: Some(include_str!("testdata/signing_key.pub.pem").to_owned()),
        ..config(Some("pk_live_abc"), Some("sk_live_def"))
    };
    let facade = AuthFacade::from_config(&cfg);
    assert_eq!(facade.mode(), ProviderMode::Clerk);
}

// =============================================================================
// Credentials::from_headers
// =============================================================================

#[test]
fn credentials_from_bearer() {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer sess_abc"));
    assert_eq!(Credentials::from_headers(&headers).session_token.as_deref(), Some("sess_abc"));
}

#[test]
fn credentials_from_session_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_static("theme=dark; __session=sess_cookie"));
    assert_eq!(Credentials::from_headers(&headers).session_token.as_deref(), Some("sess_cookie"));
}

#[test]
fn bearer_wins_over_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer sess_header"));
    headers.insert(COOKIE, HeaderValue::from_static("__session=sess_cookie"));
    assert_eq!(Credentials::from_headers(&headers).session_token.as_deref(), Some("sess_header"));
}

#[test]
fn no_credentials_when_headers_empty() {
    assert_eq!(Credentials::from_headers(&HeaderMap::new()), Credentials::default());
}

#[test]
fn non_bearer_authorization_is_ignored() {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
    assert!(Credentials::from_headers(&headers).session_token.is_none());
}

// =============================================================================
// AuthState
// =============================================================================

#[test]
fn auth_state_serializes_camel_case() {
    let value = serde_json::to_value(AuthState::signed_out()).unwrap();
    assert_eq!(value["isSignedIn"], false);
    assert_eq!(value["isLoaded"], true);
    assert!(value["userId"].is_null());
    assert!(value["user"].is_null());
}

#[test]
fn signed_in_copies_user_id() {
    let state = AuthState::signed_in(mock::mock_user("u-1"));
    assert!(state.is_signed_in);
    assert_eq!(state.user_id.as_deref(), Some("u-1"));
}

#[test]
fn unsupported_error_names_provider() {
    let msg = IdentityError::Unsupported(ProviderMode::Clerk).to_string();
    assert!(msg.contains("clerk"));
}
