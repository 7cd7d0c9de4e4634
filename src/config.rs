//! Process configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every backend choice (identity provider, document store) is derived once
//! here at startup and never re-evaluated. Absent or placeholder credentials
//! select the in-process mock implementations. Parsing helpers take raw
//! `Option<&str>` values so they can be tested without touching the process
//! environment.

use std::path::PathBuf;
use std::time::Duration;

/// Placeholder publishable key that forces the mock identity provider.
pub const MOCK_IDENTITY_SENTINEL: &str = "pk_test_mock_clerk_key_12345";
/// Placeholder database API key that forces the mock data store.
pub const MOCK_STORE_SENTINEL: &str = "mock_firebase_api_key_12345";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CLERK_API_URL: &str = "https://api.clerk.com/v1";
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_DATABASE_ID: &str = "(default)";
pub const DEFAULT_MOCK_AUTH_STATE_PATH: &str = ".mock-auth.json";
pub const DEFAULT_MOCK_AUTH_LOAD_DELAY_MS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// TYPES
// =============================================================================

/// Outbound HTTP timeouts shared by every external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Identity provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Public key of the hosted identity provider. Absent or sentinel means mock.
    pub publishable_key: Option<String>,
    /// Backend API secret, required to verify sessions against the real provider.
    pub secret_key: Option<String>,
    /// PEM public key that session tokens are signed with (RS256).
    pub jwt_key: Option<String>,
    /// Allowed `azp` origins. Empty accepts any.
    pub authorized_parties: Vec<String>,
    pub api_url: String,
    /// Where the mock provider persists `{"isSignedIn": bool}`. `None` keeps it in memory.
    pub mock_state_path: Option<PathBuf>,
    pub mock_load_delay: Duration,
    pub timeouts: HttpTimeouts,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            publishable_key: None,
            secret_key: None,
            jwt_key: None,
            authorized_parties: Vec::new(),
            api_url: DEFAULT_CLERK_API_URL.to_string(),
            mock_state_path: Some(PathBuf::from(DEFAULT_MOCK_AUTH_STATE_PATH)),
            mock_load_delay: Duration::from_millis(DEFAULT_MOCK_AUTH_LOAD_DELAY_MS),
            timeouts: HttpTimeouts::default(),
        }
    }
}

/// Document store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Database API key. Absent or sentinel means mock.
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub database_id: String,
    pub base_url: String,
    /// When true the mock store keeps writes in memory instead of discarding them.
    pub mock_persist_writes: bool,
    pub timeouts: HttpTimeouts,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project_id: None,
            database_id: DEFAULT_FIRESTORE_DATABASE_ID.to_string(),
            base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
            mock_persist_writes: false,
            timeouts: HttpTimeouts::default(),
        }
    }
}

/// Top-level process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub identity: IdentityConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// Never fails: malformed values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let timeouts = HttpTimeouts {
            request_secs: env_parse("EXTERNAL_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("EXTERNAL_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        let identity = IdentityConfig {
            publishable_key: env_non_empty("CLERK_PUBLISHABLE_KEY"),
            secret_key: env_non_empty("CLERK_SECRET_KEY"),
            jwt_key: env_non_empty("CLERK_JWT_KEY").map(|k| parse_pem(&k)),
            authorized_parties: parse_list(std::env::var("CLERK_AUTHORIZED_PARTIES").ok().as_deref()),
            api_url: base_url(env_non_empty("CLERK_API_URL").as_deref(), DEFAULT_CLERK_API_URL),
            mock_state_path: parse_state_path(std::env::var("MOCK_AUTH_STATE_PATH").ok().as_deref()),
            mock_load_delay: Duration::from_millis(env_parse(
                "MOCK_AUTH_LOAD_DELAY_MS",
                DEFAULT_MOCK_AUTH_LOAD_DELAY_MS,
            )),
            timeouts,
        };

        let store = StoreConfig {
            api_key: env_non_empty("FIREBASE_API_KEY"),
            project_id: env_non_empty("FIREBASE_PROJECT_ID"),
            database_id: env_non_empty("FIREBASE_DATABASE_ID")
                .unwrap_or_else(|| DEFAULT_FIRESTORE_DATABASE_ID.to_string()),
            base_url: base_url(env_non_empty("FIRESTORE_BASE_URL").as_deref(), DEFAULT_FIRESTORE_BASE_URL),
            mock_persist_writes: env_bool("MOCK_STORE_PERSIST_WRITES").unwrap_or(false),
            timeouts,
        };

        Self { port: env_parse("PORT", DEFAULT_PORT), identity, store }
    }
}

// =============================================================================
// PARSING HELPERS
// =============================================================================

/// True when a credential is missing, blank, or equal to the given placeholder.
#[must_use]
pub fn is_placeholder(value: Option<&str>, sentinel: &str) -> bool {
    match value.map(str::trim) {
        None | Some("") => true,
        Some(v) => v == sentinel,
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().as_deref().and_then(parse_bool)
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Env files often carry a PEM on one line with literal `\n` separators.
pub(crate) fn parse_pem(raw: &str) -> String {
    raw.trim().replace("\\n", "\n")
}

/// Comma-separated values, trimmed, empties dropped.
pub(crate) fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Unset uses the default path; an explicitly empty value disables persistence.
pub(crate) fn parse_state_path(raw: Option<&str>) -> Option<PathBuf> {
    match raw.map(str::trim) {
        None => Some(PathBuf::from(DEFAULT_MOCK_AUTH_STATE_PATH)),
        Some("") => None,
        Some(path) => Some(PathBuf::from(path)),
    }
}

pub(crate) fn base_url(raw: Option<&str>, default: &str) -> String {
    raw.unwrap_or(default).trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
