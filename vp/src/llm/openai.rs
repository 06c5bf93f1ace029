//! OpenAI API client implementation
//!
//! Implements the LlmClient trait for OpenAI's Chat Completions API.
//! Structured contracts use the `json_schema` response format.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, ComputeMode, LlmClient, LlmError, OutputContract};
use crate::config::LlmConfig;

/// OpenAI API client
pub struct OpenAIClient {
    model: String,
    suggestion_model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAIClient {
    /// Create a new client from configuration
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

    fn model_for(&self, mode: ComputeMode) -> &str {
        match mode {
            ComputeMode::Full => &self.model,
            ComputeMode::LowLatency => &self.suggestion_model,
        }
    }

    /// Build the request body for the OpenAI API
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let model = self.model_for(request.mode);
        debug!(%model, contract = ?request.contract, "build_request_body: called");

        // GPT-5.x and o-series models use max_completion_tokens and accept reasoning_effort
        let is_reasoning_model = model.starts_with("gpt-5") || model.starts_with("o1") || model.starts_with("o3");

        let mut body = json!({
            "model": model,
            "messages": [{ "role": "user", "content": request.instruction }],
        });

        if is_reasoning_model {
            body["max_completion_tokens"] = json!(self.max_tokens);
            if request.mode == ComputeMode::LowLatency {
                debug!("build_request_body: low latency, minimal reasoning");
                body["reasoning_effort"] = json!("minimal");
            }
        } else {
            body["max_tokens"] = json!(self.max_tokens);
        }

        if let Some(schema) = request.contract.response_schema() {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": request.contract.schema_name(),
                    "schema": wrap_top_level(request.contract, schema),
                },
            });
        }

        body
    }

    /// Extract the text from an OpenAI response
    fn parse_response(&self, api_response: OpenAIResponse) -> Result<String, LlmError> {
        debug!(choices = api_response.choices.len(), "parse_response: called");
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::EmptyResponse("no choices".to_string()))?;

        if let Some(refusal) = choice.message.refusal {
            debug!("parse_response: refusal");
            return Err(LlmError::EmptyResponse(refusal));
        }

        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(LlmError::EmptyResponse(
                choice.finish_reason.unwrap_or_else(|| "empty text".to_string()),
            )),
        }
    }
}

/// json_schema response formats require an object at the top level
fn wrap_top_level(contract: OutputContract, schema: Value) -> Value {
    match contract {
        OutputContract::DialogueLines => json!({
            "type": "object",
            "properties": { "lines": schema },
            "required": ["lines"],
        }),
        _ => schema,
    }
}

/// Undo `wrap_top_level` so the decoder sees the contract's own shape
fn unwrap_top_level(contract: OutputContract, text: String) -> String {
    if contract != OutputContract::DialogueLines {
        return text;
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(mut map)) => match map.remove("lines") {
            Some(lines) => lines.to_string(),
            None => text,
        },
        _ => text,
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn execute(&self, request: CompletionRequest) -> Result<String, LlmError> {
        debug!(instruction_len = request.instruction.len(), "execute: called");
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
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
        let api_response: OpenAIResponse = response.json().await?;
        let text = self.parse_response(api_response)?;
        Ok(unwrap_top_level(request.contract, text))
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
    refusal: Option<String>,
}
