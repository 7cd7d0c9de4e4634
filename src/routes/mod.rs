//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Auth endpoints are open; everything under `/api/users` and
//! `/api/interviews` takes a `SignedIn` extractor and so sits behind the
//! route guard.

pub mod auth;
pub mod interviews;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/auth/state", get(auth::state))
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/users/me", get(users::me))
        .route("/api/interviews", get(interviews::list).post(interviews::create))
        .route("/api/interviews/{id}", get(interviews::get).patch(interviews::update))
        .route(
            "/api/interviews/{id}/answers",
            get(interviews::list_answers).post(interviews::save_answer),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
