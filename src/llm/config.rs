//! LLM configuration parsed from environment variables.

use super::LlmError;
use crate::config::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, HttpTimeouts, base_url, env_parse};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeouts: HttpTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// Required:
    /// - `GEMINI_API_KEY`
    ///
    /// Optional:
    /// - `GEMINI_MODEL`: default `gemini-2.0-flash-exp`
    /// - `GEMINI_BASE_URL`: default public v1beta endpoint
    /// - `EXTERNAL_REQUEST_TIMEOUT_SECS` / `EXTERNAL_CONNECT_TIMEOUT_SECS`
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] when the key is absent or blank.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_parts(
            std::env::var(API_KEY_VAR).ok().as_deref(),
            std::env::var("GEMINI_MODEL").ok().as_deref(),
            std::env::var("GEMINI_BASE_URL").ok().as_deref(),
            HttpTimeouts {
                request_secs: env_parse("EXTERNAL_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("EXTERNAL_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            },
        )
    }

    pub(crate) fn from_parts(
        api_key: Option<&str>,
        model: Option<&str>,
        base: Option<&str>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, LlmError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LlmError::MissingApiKey { var: API_KEY_VAR.into() })?
            .to_string();
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_GEMINI_MODEL)
            .to_string();
        Ok(Self { api_key, model, base_url: base_url(base, DEFAULT_GEMINI_BASE_URL), timeouts })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
