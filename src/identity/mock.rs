//! Mock identity provider: one local user, no network.
//!
//! The signed-in flag survives restarts through a small JSON file
//! (`{"isSignedIn": bool}`) read once at construction. `isLoaded` stays
//! false for a short fixed delay after construction to mimic a hosted
//! provider's initial round-trip.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{info, warn};

use super::{AuthState, Credentials, IdentityError, IdentityProvider, ProviderMode, UserRecord};

/// Fixed id assigned on every mock sign-in.
pub const MOCK_USER_ID: &str = "dev-mock-user-id";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedAuth {
    is_signed_in: bool,
}

#[derive(Debug, Clone)]
struct MockSession {
    signed_in: bool,
    user_id: Option<String>,
}

impl MockSession {
    fn new(signed_in: bool) -> Self {
        Self { signed_in, user_id: signed_in.then(|| MOCK_USER_ID.to_string()) }
    }
}

pub struct MockIdentity {
    state_path: Option<PathBuf>,
    ready_at: Instant,
    session: RwLock<MockSession>,
}

impl MockIdentity {
    /// Build the provider, restoring the persisted flag if `state_path` is set.
    /// Defaults to signed out when nothing usable is stored.
    #[must_use]
    pub fn new(state_path: Option<PathBuf>, load_delay: Duration) -> Self {
        let signed_in = state_path.as_deref().is_some_and(load_persisted);
        Self { state_path, ready_at: Instant::now() + load_delay, session: RwLock::new(MockSession::new(signed_in)) }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        Instant::now() >= self.ready_at
    }

    async fn snapshot(&self) -> AuthState {
        let session = self.session.read().await;
        AuthState {
            is_signed_in: session.signed_in,
            is_loaded: self.is_loaded(),
            user_id: session.user_id.clone(),
            user: session.user_id.as_deref().map(mock_user),
        }
    }

    async fn set_signed_in(&self, signed_in: bool) -> Result<AuthState, IdentityError> {
        {
            let mut session = self.session.write().await;
            self.persist(signed_in).await?;
            *session = MockSession::new(signed_in);
        }
        Ok(self.snapshot().await)
    }

    async fn persist(&self, signed_in: bool) -> Result<(), IdentityError> {
        let Some(path) = &self.state_path else {
            return Ok(());
        };
        let body = serde_json::to_vec(&PersistedAuth { is_signed_in: signed_in }).map_err(std::io::Error::from)?;
        tokio::fs::write(path, body).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentity {
    fn mode(&self) -> ProviderMode {
        ProviderMode::Mock
    }

    async fn resolve(&self, _credentials: &Credentials) -> AuthState {
        self.snapshot().await
    }

    async fn sign_in(&self) -> Result<AuthState, IdentityError> {
        let state = self.set_signed_in(true).await?;
        info!(user_id = MOCK_USER_ID, "mock sign in");
        Ok(state)
    }

    async fn sign_out(&self) -> Result<AuthState, IdentityError> {
        let state = self.set_signed_in(false).await?;
        info!("mock sign out");
        Ok(state)
    }
}

/// Profile reported for the mock user.
#[must_use]
pub fn mock_user(user_id: &str) -> UserRecord {
    UserRecord {
        id: user_id.to_string(),
        full_name: Some("Development User".into()),
        first_name: Some("Development".into()),
        image_url: Some(String::new()),
        primary_email: Some("dev@example.com".into()),
    }
}

fn load_persisted(path: &Path) -> bool {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return false,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "mock auth state unreadable, starting signed out");
            return false;
        }
    };
    match serde_json::from_str::<PersistedAuth>(&raw) {
        Ok(persisted) => persisted.is_signed_in,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "mock auth state malformed, starting signed out");
            false
        }
    }
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
