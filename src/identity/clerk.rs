//! Hosted identity provider backed by Clerk.
//!
//! DESIGN
//! ======
//! The request carries a session token (RS256 JWT) from the `__session`
//! cookie or a bearer header. The token is verified locally against the
//! instance's PEM public key. Only then are the verified `sid` / `sub`
//! claims used against the Backend API: the session must still be active
//! and belong to `sub`, and that user's profile is fetched and normalized.
//!
//! ERROR HANDLING
//! ==============
//! `resolve` never fails. Bad tokens log at `debug`, API failures at
//! `error`, and both resolve as signed out.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use tracing::{debug, error};

use super::{AuthState, Credentials, IdentityError, IdentityProvider, ProviderMode, UserRecord};
use crate::config::IdentityConfig;

/// Clock skew tolerated on `exp` / `nbf`.
const LEEWAY_SECS: u64 = 5;

// =============================================================================
// CLIENT
// =============================================================================

pub struct ClerkIdentity {
    http: reqwest::Client,
    api_url: String,
    secret_key: String,
    jwt_key: DecodingKey,
    authorized_parties: Vec<String>,
}

impl ClerkIdentity {
    /// # Errors
    ///
    /// Returns an error if the secret or JWT key is missing, the key is not a
    /// valid RSA PEM, or the HTTP client fails to build.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let secret_key = config
            .secret_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(IdentityError::MissingConfig("CLERK_SECRET_KEY"))?;
        let pem = config
            .jwt_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(IdentityError::MissingConfig("CLERK_JWT_KEY"))?;
        let jwt_key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| IdentityError::JwtKey(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| IdentityError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            secret_key,
            jwt_key,
            authorized_parties: config.authorized_parties.clone(),
        })
    }

    /// Check signature, expiry and authorized party of a session token.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidToken`] when any check fails.
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, IdentityError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = LEEWAY_SECS;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        let claims = decode::<SessionClaims>(token, &self.jwt_key, &validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?
            .claims;

        if !is_authorized_party(&self.authorized_parties, claims.azp.as_deref()) {
            return Err(IdentityError::InvalidToken(format!("unauthorized party {:?}", claims.azp)));
        }
        Ok(claims)
    }

    /// Confirm the verified session is still active for `sub`, then fetch the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or answers with an unexpected body.
    pub async fn load_user(&self, claims: &SessionClaims) -> Result<Option<UserRecord>, IdentityError> {
        if !is_valid_path_id(&claims.sid) || !is_valid_path_id(&claims.sub) {
            debug!("rejecting claims with malformed ids");
            return Ok(None);
        }

        let Some(body) = self.get(&format!("sessions/{}", claims.sid)).await? else {
            return Ok(None);
        };
        let session = parse_session(&body)?;
        if session.status != "active" {
            debug!(status = %session.status, "session not active");
            return Ok(None);
        }
        if session.user_id != claims.sub {
            debug!("session belongs to a different user");
            return Ok(None);
        }

        let Some(body) = self.get(&format!("users/{}", claims.sub)).await? else {
            return Ok(None);
        };
        parse_user(&body).map(Some)
    }

    /// GET a Backend API resource. `Ok(None)` on 404.
    async fn get(&self, path: &str) -> Result<Option<String>, IdentityError> {
        let response = self
            .http
            .get(format!("{}/{path}", self.api_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| IdentityError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| IdentityError::ApiRequest(e.to_string()))?;

        match status {
            200 => Ok(Some(text)),
            404 => Ok(None),
            _ => Err(IdentityError::ApiResponse { status, body: text }),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for ClerkIdentity {
    fn mode(&self) -> ProviderMode {
        ProviderMode::Clerk
    }

    async fn resolve(&self, credentials: &Credentials) -> AuthState {
        let Some(token) = credentials.session_token.as_deref() else {
            return AuthState::signed_out();
        };
        let claims = match self.verify_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "rejecting session token");
                return AuthState::signed_out();
            }
        };

        match self.load_user(&claims).await {
            Ok(Some(user)) => AuthState::signed_in(user),
            Ok(None) => AuthState::signed_out(),
            Err(e) => {
                error!(error = %e, "session lookup failed");
                AuthState::signed_out()
            }
        }
    }
}

/// Backend API ids are opaque ASCII tokens; anything else never reaches the URL.
pub(crate) fn is_valid_path_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 128 && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// No configured parties accepts any token. Otherwise a present `azp` must be listed.
pub(crate) fn is_authorized_party(allowed: &[String], azp: Option<&str>) -> bool {
    match azp {
        Some(azp) if !allowed.is_empty() => allowed.iter().any(|p| p == azp),
        _ => true,
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Verified session token claims.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub sid: String,
    #[serde(default)]
    pub azp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSession {
    pub(crate) user_id: String,
    pub(crate) status: String,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
    primary_email_address_id: Option<String>,
    #[serde(default)]
    email_addresses: Vec<ApiEmail>,
}

#[derive(Debug, Deserialize)]
struct ApiEmail {
    id: String,
    email_address: String,
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_session(json: &str) -> Result<ApiSession, IdentityError> {
    serde_json::from_str(json).map_err(|e| IdentityError::ApiParse(e.to_string()))
}

pub(crate) fn parse_user(json: &str) -> Result<UserRecord, IdentityError> {
    let api: ApiUser = serde_json::from_str(json).map_err(|e| IdentityError::ApiParse(e.to_string()))?;

    let first_name = api.first_name.filter(|s| !s.is_empty());
    let last_name = api.last_name.filter(|s| !s.is_empty());
    let full_name = match (&first_name, &last_name) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (Some(name), None) | (None, Some(name)) => Some(name.clone()),
        (None, None) => None,
    };

    let primary_email = api
        .primary_email_address_id
        .as_deref()
        .and_then(|primary| api.email_addresses.iter().find(|e| e.id == primary))
        .or_else(|| api.email_addresses.first())
        .map(|e| e.email_address.clone());

    Ok(UserRecord { id: api.id, full_name, first_name, image_url: api.image_url, primary_email })
}

#[cfg(test)]
#[path = "clerk_test.rs"]
mod tests;
