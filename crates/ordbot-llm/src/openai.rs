//! OpenAI chat-completions client with tool support
//!
//! Passes the tool menu and call policy through to the API and parses call
//! requests back out of the response without touching their argument
//! payloads.

use async_trait::async_trait;
use ordbot_core::config::get_config_opt;
use ordbot_core::{Error, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use crate::provider::{
    ChatMessage, ChatRequest, ChatResponse, LlmProvider, TokenUsage, ToolCallInfo,
};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const PREVIEW_CHARS: usize = 500;

/// Truncate a response body for logging. Counts characters, not bytes, so
/// multibyte content never splits mid-character.
fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Resolve the chat model from the environment.
///
/// `CHAT_TOOL_MODEL` wins over `CHAT_MODEL`; both default to gpt-4o-mini.
pub fn model_from_env() -> String {
    get_config_opt("CHAT_TOOL_MODEL")
        .or_else(|| get_config_opt("CHAT_MODEL"))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a client with a caller-supplied request timeout.
    ///
    /// Expiry surfaces as `Error::Timeout` for that invocation.
    pub fn with_timeout(api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url: OPENAI_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn from_env() -> Result<Self> {
        let api_key = get_config_opt("OPENAI_API_KEY")
            .ok_or_else(|| Error::missing_config("OPENAI_API_KEY must be set"))?;

        let client = Self::new(api_key);
        Ok(match get_config_opt("OPENAI_BASE_URL") {
            Some(url) => client.with_base_url(&url),
            None => client,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn chat(&self, model: &str, request: ChatRequest) -> Result<ChatResponse> {
        let model = if model.is_empty() { DEFAULT_MODEL } else { model };
        let url = format!("{}/chat/completions", self.base_url);

        // Convert messages to API format
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| {
                let mut msg = json!({
                    "role": m.role,
                    "content": m.content
                });

                // Add tool_call_id for tool responses
                if let Some(ref id) = m.tool_call_id {
                    msg["tool_call_id"] = json!(id);
                }

                // Echo tool_calls on assistant messages; the service rejects
                // tool results whose originating call it has not seen
                if let Some(ref calls) = m.tool_calls {
                    msg["tool_calls"] = json!(calls.iter().map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": tc.arguments
                            }
                        })
                    }).collect::<Vec<_>>());
                }

                msg
            })
            .collect();

        let mut body = json!({
            "model": model,
            "messages": messages,
            "stream": false
        });

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request.tools.iter().map(|t| t.to_openai_format()).collect();
            body["tool_choice"] = request.tool_choice.to_api_format();
            info!(
                "Sending request with {} tools, tool_choice={:?}",
                tools.len(),
                request.tool_choice
            );
            body["tools"] = json!(tools);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }

        debug!("OpenAI request: {}", serde_json::to_string(&body).unwrap_or_default());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(format!("OpenAI request timed out: {}", e))
                } else {
                    Error::http(format!("Failed to send request to OpenAI: {}", e))
                }
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read OpenAI response: {}", e)))?;

        debug!("OpenAI response ({}): {}", status, preview(&response_text));

        if !status.is_success() {
            return Err(Error::provider(format!(
                "OpenAI API error ({}): {}",
                status, response_text
            )));
        }

        let response_json: Value = serde_json::from_str(&response_text)?;

        let choice = response_json
            .get("choices")
            .and_then(|c| c.get(0))
            .ok_or_else(|| Error::provider("No choices in response"))?;

        let message = choice
            .get("message")
            .ok_or_else(|| Error::provider("No message in response"))?;

        let content = message
            .get("content")
            .and_then(|c| c.as_str())
            .unwrap_or("")
            .to_string();

        let role = message
            .get("role")
            .and_then(|r| r.as_str())
            .unwrap_or("assistant")
            .to_string();

        // Parse call requests; argument payloads stay raw strings
        let tool_calls: Option<Vec<ToolCallInfo>> = message
            .get("tool_calls")
            .and_then(|tc| tc.as_array())
            .map(|calls| {
                calls
                    .iter()
                    .filter_map(|call| {
                        let id = call.get("id")?.as_str()?.to_string();
                        let function = call.get("function")?;
                        let name = function.get("name")?.as_str()?.to_string();
                        let arguments = function
                            .get("arguments")
                            .and_then(|a| a.as_str())
                            .unwrap_or("{}")
                            .to_string();

                        Some(ToolCallInfo { id, name, arguments })
                    })
                    .collect()
            });

        if let Some(ref calls) = tool_calls {
            info!("Parsed {} tool calls from response", calls.len());
            for call in calls {
                debug!("  Tool call: {} ({})", call.name, call.id);
            }
        }

        let finish_reason = choice
            .get("finish_reason")
            .and_then(|f| f.as_str())
            .map(|s| s.to_string());

        let usage = response_json.get("usage").map(|u| TokenUsage {
            prompt_tokens: u.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
            completion_tokens: u.get("completion_tokens").and_then(|v| v.as_u64()).unwrap_or(0)
                as u32,
            total_tokens: u.get("total_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
        });

        if let Some(ref u) = usage {
            info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "Token usage"
            );
        }

        Ok(ChatResponse {
            message: ChatMessage {
                role,
                content,
                tool_calls,
                tool_call_id: None,
            },
            model: model.to_string(),
            finish_reason,
            usage,
        })
    }
}
