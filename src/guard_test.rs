use std::time::Duration;

use super::*;
use crate::identity::mock::{MOCK_USER_ID, mock_user};
use crate::routes::test_support::send;
use crate::state::test_helpers::{test_app_state, test_app_state_with};

#[test]
fn not_loaded_is_loading() {
    let state = AuthState { is_loaded: false, ..AuthState::signed_in(mock_user(MOCK_USER_ID)) };
    assert_eq!(decide(&state), GuardDecision::Loading);
}

#[test]
fn signed_out_redirects_to_sign_in() {
    assert_eq!(decide(&AuthState::signed_out()), GuardDecision::Redirect("/signin"));
}

#[test]
fn signed_in_is_admitted() {
    assert_eq!(decide(&AuthState::signed_in(mock_user(MOCK_USER_ID))), GuardDecision::Admit);
}

#[tokio::test]
async fn guarded_route_holds_while_loading() {
    let state = test_app_state_with(Duration::from_secs(60), false, None);
    state.auth.sign_in().await.unwrap();

    let res = send(&state, "GET", "/api/interviews", None).await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.headers.get(RETRY_AFTER).unwrap(), "1");
    assert_eq!(res.body["status"], "loading");
}

#[tokio::test]
async fn guarded_route_redirects_signed_out_caller() {
    let state = test_app_state(false);
    let res = send(&state, "GET", "/api/interviews", None).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.headers.get("location").unwrap(), SIGN_IN_PATH);
}

#[tokio::test]
async fn guarded_route_admits_signed_in_caller() {
    let state = test_app_state(false);
    state.auth.sign_in().await.unwrap();
    let res = send(&state, "GET", "/api/interviews", None).await;
    assert_eq!(res.status, StatusCode::OK);
}
