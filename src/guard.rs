//! Route guard: admit, hold, or redirect based on the auth state.
//!
//! `decide` is the whole policy. `SignedIn` applies it as an extractor so a
//! protected handler only runs for a loaded, signed-in caller.

use axum::Json;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::StatusCode;
use axum::http::header::RETRY_AFTER;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};

use crate::identity::{AuthState, Credentials, UserRecord};
use crate::state::AppState;

/// Where signed-out callers are sent.
pub const SIGN_IN_PATH: &str = "/signin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Provider has not finished loading.
    Loading,
    Redirect(&'static str),
    Admit,
}

/// Apply the guard policy. The same rule holds in every provider mode.
#[must_use]
pub fn decide(state: &AuthState) -> GuardDecision {
    if !state.is_loaded {
        GuardDecision::Loading
    } else if !state.is_signed_in {
        GuardDecision::Redirect(SIGN_IN_PATH)
    } else {
        GuardDecision::Admit
    }
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// Authenticated caller. Use as a handler parameter to require sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user_id: String,
    pub user: Option<UserRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    Loading,
    Redirect(&'static str),
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Loading => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(RETRY_AFTER, "1")],
                Json(serde_json::json!({ "status": "loading" })),
            )
                .into_response(),
            Self::Redirect(to) => Redirect::to(to).into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for SignedIn
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let auth = app_state
            .auth
            .resolve(&Credentials::from_headers(&parts.headers))
            .await;

        match decide(&auth) {
            GuardDecision::Loading => Err(GuardRejection::Loading),
            GuardDecision::Redirect(to) => Err(GuardRejection::Redirect(to)),
            GuardDecision::Admit => match auth.user_id {
                Some(user_id) => Ok(Self { user_id, user: auth.user }),
                None => Err(GuardRejection::Redirect(SIGN_IN_PATH)),
            },
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
