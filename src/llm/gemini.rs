//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper. Generation and safety settings are fixed. Pure
//! parsing in `parse_response` for testability.

use serde::{Deserialize, Serialize};

use super::config::LlmConfig;
use super::{LlmChat, LlmError};

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key: config.api_key, model: config.model, base_url: config.base_url })
    }

    /// Build a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(LlmConfig::from_env()?)
    }

    /// Return the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait::async_trait]
impl LlmChat for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", &self.api_key)])
            .json(&build_request(prompt))
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

// =============================================================================
// BUILD / PARSE
// =============================================================================

pub(crate) fn build_request(prompt: &str) -> ApiRequest<'_> {
    ApiRequest {
        contents: vec![Content { role: "user", parts: vec![RequestPart { text: prompt }] }],
        generation_config: GenerationConfig {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain",
        },
        safety_settings: SAFETY_CATEGORIES
            .into_iter()
            .map(|category| SafetySetting { category, threshold: SAFETY_THRESHOLD })
            .collect(),
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn parse_response(json: &str) -> Result<String, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(candidate) = api.candidates.into_iter().next() else {
        let reason = api
            .prompt_feedback
            .map_or_else(|| "no candidates".to_string(), |f| f.to_string());
        return Err(LlmError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse(
            candidate.finish_reason.unwrap_or_else(|| "empty text".to_string()),
        ));
    }
    Ok(text)
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
