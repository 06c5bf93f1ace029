//! Google Gemini API client implementation
//!
//! Implements the LlmClient trait for the Gemini `generateContent` REST API.
//! Structured contracts are sent as a JSON response schema; low-latency
//! requests disable thinking.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, ComputeMode, LlmClient, LlmError};
use crate::config::LlmConfig;

/// Gemini API client
pub struct GeminiClient {
    model: String,
    suggestion_model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable or file named in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "from_config: called");
        let api_key = config.get_api_key().map_err(|e| LlmError::Config(e.to_string()))?;

        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Transport)?;

        Ok(Self {
            model: config.model.clone(),
            suggestion_model: config.suggestion_model().to_string(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    /// Model serving a request of the given mode
    fn model_for(&self, mode: ComputeMode) -> &str {
        match mode {
            ComputeMode::Full => &self.model,
            ComputeMode::LowLatency => &self.suggestion_model,
        }
    }

    /// Build the request body for the Gemini API
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        debug!(contract = ?request.contract, mode = ?request.mode, "build_request_body: called");
        let mut generation_config = json!({
            "maxOutputTokens": self.max_tokens,
        });

        if request.contract.expects_json() {
            generation_config["responseMimeType"] = json!("application/json");
            if let Some(schema) = request.contract.response_schema() {
                generation_config["responseSchema"] = to_gemini_schema(schema);
            }
        } else {
            debug!("build_request_body: plain text contract");
            generation_config["responseMimeType"] = json!("text/plain");
        }

        if request.mode == ComputeMode::LowLatency {
            debug!("build_request_body: low latency, disabling thinking");
            generation_config["thinkingConfig"] = json!({ "thinkingBudget": 0 });
        }

        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.instruction }],
            }],
            "generationConfig": generation_config,
        })
    }

    /// Extract the text from a Gemini response
    fn parse_response(&self, api_response: GeminiResponse) -> Result<String, LlmError> {
        debug!(candidates = api_response.candidates.len(), "parse_response: called");
        let Some(candidate) = api_response.candidates.into_iter().next() else {
            let reason = api_response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            debug!(%reason, "parse_response: no candidate");
            return Err(LlmError::EmptyResponse(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "empty text".to_string());
            debug!(%reason, "parse_response: empty text");
            return Err(LlmError::EmptyResponse(reason));
        }

        Ok(text)
    }
}

/// Gemini expects upper-case OpenAPI type names
fn to_gemini_schema(schema: Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(t) if key == "type" => Value::String(t.to_uppercase()),
                        other => to_gemini_schema(other),
                    };
                    (key, value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(to_gemini_schema).collect()),
        other => other,
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn execute(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let model = self.model_for(request.mode);
        debug!(%model, instruction_len = request.instruction.len(), "execute: called");
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout)
                } else {
                    LlmError::Transport(e)
                }
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            debug!(%status, "execute: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Backend { status, message: text });
        }

        debug!("execute: success");
        let api_response: GeminiResponse = response.json().await?;
        self.parse_response(api_response)
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
