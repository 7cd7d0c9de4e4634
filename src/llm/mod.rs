//! LLM: text generation for interview questions and answer feedback.
//!
//! DESIGN
//! ======
//! Handlers only see the `LlmChat` trait so tests can substitute canned
//! responses. The one concrete client talks to Gemini `generateContent`
//! and is configured from environment variables by [`config::LlmConfig`].

pub mod config;
pub mod gemini;

pub use gemini::GeminiClient;

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The provider returned no text (blocked or empty candidate list).
    #[error("API returned no text: {0}")]
    EmptyResponse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Provider-neutral async trait for single-prompt completion. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// Send one user prompt and return the model's text.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or the response carries no text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
