//! User profile routes.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::guard::SignedIn;
use crate::model::User;
use crate::services::users::ensure_user;
use crate::state::AppState;

/// `GET /api/users/me`: stored record for the caller, created on first read.
pub async fn me(State(state): State<AppState>, caller: SignedIn) -> Result<Json<User>, StatusCode> {
    if let Some(user) = state.data.get_user(&caller.user_id).await {
        return Ok(Json(user));
    }

    let Some(identity) = &caller.user else {
        return Err(StatusCode::NOT_FOUND);
    };
    if !ensure_user(&state.data, identity).await {
        return Err(StatusCode::NOT_FOUND);
    }
    state
        .data
        .get_user(&caller.user_id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
