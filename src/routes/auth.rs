//! Auth routes: state snapshot plus mock sign-in / sign-out.
//!
//! The real provider owns its own sign-in UI, so the two mutating routes
//! answer 404 there.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Redirect;
use tracing::error;

use crate::identity::{AuthState, Credentials, IdentityError};
use crate::services::users::ensure_user;
use crate::state::AppState;

pub(crate) fn identity_error_to_status(err: IdentityError) -> StatusCode {
    match err {
        IdentityError::Unsupported(_) => StatusCode::NOT_FOUND,
        e => {
            error!(error = %e, "auth operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn ensure_record(state: &AppState, auth: &AuthState) {
    if let Some(user) = &auth.user {
        ensure_user(&state.data, user).await;
    }
}

/// `GET /api/auth/state`
pub async fn state(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthState> {
    let auth = state.auth.resolve(&Credentials::from_headers(&headers)).await;
    if auth.is_signed_in {
        ensure_record(&state, &auth).await;
    }
    Json(auth)
}

/// `POST /api/auth/sign-in`
pub async fn sign_in(State(state): State<AppState>) -> Result<Json<AuthState>, StatusCode> {
    let auth = state.auth.sign_in().await.map_err(identity_error_to_status)?;
    ensure_record(&state, &auth).await;
    Ok(Json(auth))
}

/// `POST /api/auth/sign-out`: 303 back to the landing page.
pub async fn sign_out(State(state): State<AppState>) -> Result<Redirect, StatusCode> {
    state.auth.sign_out().await.map_err(identity_error_to_status)?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
