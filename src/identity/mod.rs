//! Identity: who is making the request, behind one provider-neutral shape.
//!
//! DESIGN
//! ======
//! `IdentityProvider` has two implementations: the hosted provider
//! (`clerk`) and a process-local stand-in (`mock`). `AuthFacade` picks one
//! exactly once from configuration and every caller sees the same
//! `AuthState` regardless of which backs it.
//!
//! ERROR HANDLING
//! ==============
//! Provider availability is checked when the façade is built. If the hosted
//! provider is selected but cannot be constructed, the façade falls back to
//! the mock provider with a warning. Per-request resolution never fails: a
//! request whose credentials cannot be verified is simply signed out.

pub mod clerk;
pub mod mock;

use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{IdentityConfig, MOCK_IDENTITY_SENTINEL, is_placeholder};

/// Cookie the hosted provider's frontend SDK stores the session under.
pub const SESSION_COOKIE_NAME: &str = "__session";

// =============================================================================
// TYPES
// =============================================================================

/// Normalized identity profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub image_url: Option<String>,
    pub primary_email: Option<String>,
}

/// Authentication snapshot reported by every provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_signed_in: bool,
    pub is_loaded: bool,
    pub user_id: Option<String>,
    pub user: Option<UserRecord>,
}

impl AuthState {
    /// Loaded and anonymous.
    #[must_use]
    pub fn signed_out() -> Self {
        Self { is_signed_in: false, is_loaded: true, user_id: None, user: None }
    }

    #[must_use]
    pub fn signed_in(user: UserRecord) -> Self {
        Self { is_signed_in: true, is_loaded: true, user_id: Some(user.id.clone()), user: Some(user) }
    }
}

/// Raw request credentials handed to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub session_token: Option<String>,
}

impl Credentials {
    /// Read a bearer token, falling back to the session cookie.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned);

        let session_token = bearer.or_else(|| {
            CookieJar::from_headers(headers)
                .get(SESSION_COOKIE_NAME)
                .map(|c| c.value().to_owned())
                .filter(|v| !v.is_empty())
        });

        Self { session_token }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    Mock,
    Clerk,
}

impl ProviderMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Clerk => "clerk",
        }
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("operation not supported by the {0} identity provider")]
    Unsupported(ProviderMode),
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error("failed to persist mock auth state: {0}")]
    Persist(#[from] std::io::Error),
    #[error("identity api request failed: {0}")]
    ApiRequest(String),
    #[error("identity api error: status {status}")]
    ApiResponse { status: u16, body: String },
    #[error("identity api response parse failed: {0}")]
    ApiParse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("invalid session token key: {0}")]
    JwtKey(String),
    #[error("invalid session token: {0}")]
    InvalidToken(String),
}

// =============================================================================
// PROVIDER TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    fn mode(&self) -> ProviderMode;

    /// Resolve the caller's authentication state. Never fails.
    async fn resolve(&self, credentials: &Credentials) -> AuthState;

    /// Start a session without an external sign-in flow.
    ///
    /// # Errors
    ///
    /// Providers with a hosted sign-in flow return [`IdentityError::Unsupported`].
    async fn sign_in(&self) -> Result<AuthState, IdentityError> {
        Err(IdentityError::Unsupported(self.mode()))
    }

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Providers with a hosted sign-out flow return [`IdentityError::Unsupported`].
    async fn sign_out(&self) -> Result<AuthState, IdentityError> {
        Err(IdentityError::Unsupported(self.mode()))
    }
}

/// Pick a provider from the configured publishable key.
#[must_use]
pub fn select_mode(publishable_key: Option<&str>) -> ProviderMode {
    if is_placeholder(publishable_key, MOCK_IDENTITY_SENTINEL) { ProviderMode::Mock } else { ProviderMode::Clerk }
}

// =============================================================================
// FAÇADE
// =============================================================================

/// Provider-neutral entry point held in `AppState`.
#[derive(Clone)]
pub struct AuthFacade {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthFacade {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Select and build the provider for this process.
    #[must_use]
    pub fn from_config(config: &IdentityConfig) -> Self {
        match select_mode(config.publishable_key.as_deref()) {
            ProviderMode::Mock => {
                warn!("identity publishable key absent or placeholder, using mock identity provider");
                Self::mock(config)
            }
            ProviderMode::Clerk => match clerk::ClerkIdentity::new(config) {
                Ok(provider) => {
                    info!(api_url = %config.api_url, "using clerk identity provider");
                    Self::new(Arc::new(provider))
                }
                Err(e) => {
                    warn!(error = %e, "clerk identity provider unavailable, falling back to mock");
                    Self::mock(config)
                }
            },
        }
    }

    fn mock(config: &IdentityConfig) -> Self {
        Self::new(Arc::new(mock::MockIdentity::new(config.mock_state_path.clone(), config.mock_load_delay)))
    }

    #[must_use]
    pub fn mode(&self) -> ProviderMode {
        self.provider.mode()
    }

    pub async fn resolve(&self, credentials: &Credentials) -> AuthState {
        self.provider.resolve(credentials).await
    }

    /// # Errors
    ///
    /// See [`IdentityProvider::sign_in`].
    pub async fn sign_in(&self) -> Result<AuthState, IdentityError> {
        self.provider.sign_in().await
    }

    /// # Errors
    ///
    /// See [`IdentityProvider::sign_out`].
    pub async fn sign_out(&self) -> Result<AuthState, IdentityError> {
        self.provider.sign_out().await
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
