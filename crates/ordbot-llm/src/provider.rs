//! Reasoning-service traits and message types
//!
//! Defines the shape consumed and produced locally: an ordered message
//! history, an optional tool menu with a call policy, and a response that is
//! either terminal text or a set of call requests.

use async_trait::async_trait;
use ordbot_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: content.into(),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// Call request from the reasoning service.
///
/// Arguments stay a raw JSON string here: parsing (and the fallback on a
/// malformed payload) belongs to the dispatcher, not the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallInfo {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// Tool definition offered to the reasoning service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Convert to OpenAI function calling format
    pub fn to_openai_format(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters
            }
        })
    }
}

/// Call policy for a chat request
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// Let the service decide whether to call tools
    #[default]
    Auto,
    /// Force the service to call a tool
    Required,
    /// Disable tool usage
    None,
}

impl ToolChoice {
    /// Convert to OpenAI wire format
    pub fn to_api_format(&self) -> Value {
        match self {
            ToolChoice::Auto => serde_json::json!("auto"),
            ToolChoice::Required => serde_json::json!("required"),
            ToolChoice::None => serde_json::json!("none"),
        }
    }
}

/// Full chat request with tools
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: ToolChoice,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            tool_choice: ToolChoice::Auto,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = choice;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub model: String,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl ChatResponse {
    /// Call requests carried by the assistant message
    pub fn tool_calls(&self) -> &[ToolCallInfo] {
        self.message.tool_calls.as_deref().unwrap_or(&[])
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }

    /// Free-form assistant text
    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// Reasoning-service provider trait.
///
/// Implementations send (history, tool menu, call policy) and parse back
/// text plus call requests. Transport failures, non-success statuses and
/// timeouts are hard errors; they are never retried here.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, model: &str, request: ChatRequest) -> Result<ChatResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::system("be helpful");
        assert_eq!(msg.role, "system");
        assert!(msg.tool_calls.is_none());

        let msg = ChatMessage::tool_result("call_1", "{\"success\":true}");
        assert_eq!(msg.role, "tool");
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_tool_choice_api_format() {
        assert_eq!(ToolChoice::Auto.to_api_format(), serde_json::json!("auto"));
        assert_eq!(ToolChoice::Required.to_api_format(), serde_json::json!("required"));
        assert_eq!(ToolChoice::None.to_api_format(), serde_json::json!("none"));
    }

    #[test]
    fn test_tool_definition_openai_format() {
        let def = ToolDefinition {
            name: "list_orders".to_string(),
            description: "List all orders".to_string(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        };
        let value = def.to_openai_format();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "list_orders");
    }

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new(vec![ChatMessage::user("hi")])
            .with_tool_choice(ToolChoice::Required)
            .with_temperature(0.7);
        assert_eq!(request.tool_choice, ToolChoice::Required);
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.tools.is_empty());
    }

    #[test]
    fn test_response_tool_calls_accessor() {
        let response = ChatResponse {
            message: ChatMessage::assistant("done"),
            model: "gpt-4o-mini".to_string(),
            finish_reason: Some("stop".to_string()),
            usage: None,
        };
        assert!(!response.has_tool_calls());
        assert_eq!(response.text(), "done");
    }
}
