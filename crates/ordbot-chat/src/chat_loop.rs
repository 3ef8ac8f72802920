//! Dispatch loop for the order-support conversation
//!
//! Drives one user request to a terminal answer: offers the tool menu,
//! executes the service's call requests against the order store, feeds the
//! structured results back, and asks for the closing text. The loop is
//! bounded - at most one configurable corrective round plus one
//! result-feeding round - so a non-compliant service response can never
//! spin it forever.

use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use ordbot_core::Result;
use ordbot_llm::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, TokenUsage, ToolChoice, ToolDefinition};
use ordbot_store::OrderStore;

use crate::system_prompt::{order_agent_prompt, CORRECTIVE_NUDGE};
use crate::tools::{build_tool_definitions, ToolInvocation};

/// Configuration for the dispatch loop
#[derive(Debug, Clone)]
pub struct ChatLoopConfig {
    /// Model to use
    pub model: String,
    /// Maximum tool calls executed per turn
    pub max_tool_calls_per_turn: usize,
    /// Corrective user turns sent when the service issues no call request
    pub corrective_nudges: usize,
    /// Sampling temperature, if any
    pub temperature: Option<f32>,
    /// Completion token budget per invocation, if any
    pub max_tokens: Option<u32>,
}

impl Default for ChatLoopConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tool_calls_per_turn: 10,
            corrective_nudges: 1,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Dispatch loop bridging the reasoning service to the order store.
///
/// Owns the conversation history for its session; the provider and store
/// are passed in explicitly at construction.
pub struct OrderChatLoop<P: LlmProvider> {
    provider: Arc<P>,
    store: Arc<RwLock<OrderStore>>,
    config: ChatLoopConfig,
    tools: Vec<ToolDefinition>,
    messages: Vec<ChatMessage>,
}

impl<P: LlmProvider> OrderChatLoop<P> {
    pub fn new(provider: Arc<P>, store: Arc<RwLock<OrderStore>>, config: ChatLoopConfig) -> Self {
        let messages = vec![ChatMessage::system(order_agent_prompt())];

        Self {
            provider,
            store,
            config,
            tools: build_tool_definitions(),
            messages,
        }
    }

    /// Process a user message and return the terminal answer.
    ///
    /// Reasoning-service failures propagate as hard errors; local tool
    /// failures are absorbed into the conversation as structured results.
    pub async fn process_message(&mut self, user_message: &str) -> Result<ChatTurnResult> {
        info!("Processing user message: {}", user_message);
        self.messages.push(ChatMessage::user(user_message));

        let mut response = self.invoke_with_menu().await?;

        // One bounded corrective round when the service answers without
        // requesting any call
        let mut corrective_nudges = 0;
        while !response.has_tool_calls() && corrective_nudges < self.config.corrective_nudges {
            warn!("No call requests in response, sending corrective nudge");
            self.messages.push(ChatMessage::assistant(response.text()));
            self.messages.push(ChatMessage::user(CORRECTIVE_NUDGE));
            response = self.invoke_with_menu().await?;
            corrective_nudges += 1;
        }

        if !response.has_tool_calls() {
            // Terminal text with no side effects
            let usage = response.usage.clone();
            let final_text = response.text().to_string();
            self.messages.push(response.message);
            return Ok(ChatTurnResult {
                final_text,
                tool_calls_made: 0,
                corrective_nudges,
                usage,
            });
        }

        // The service requires seeing its own call requests echoed back
        // before it accepts their results
        self.messages.push(response.message.clone());

        // Every echoed call request needs a correlated result, executed or
        // not - the service rejects a history with dangling call requests
        let mut tool_calls_made = 0;
        for (idx, call) in response.tool_calls().iter().enumerate() {
            let result = if idx < self.config.max_tool_calls_per_turn {
                let invocation = ToolInvocation::parse(&call.name, &call.arguments);
                info!(tool = invocation.name(), call_id = %call.id, "Executing tool");

                let result = {
                    let mut store = self.store.write().await;
                    invocation.execute(&mut store)
                };
                debug!(tool = invocation.name(), result = %result, "Tool result");
                tool_calls_made += 1;
                result
            } else {
                warn!(tool = %call.name, call_id = %call.id, "Tool call limit reached, not executing");
                json!({
                    "success": false,
                    "message": "tool call limit exceeded for this turn",
                })
            };

            self.messages
                .push(ChatMessage::tool_result(&call.id, result.to_string()));
        }

        // Closing round: no menu, the service turns results into the answer
        let final_request = self.base_request(self.messages.clone());
        let final_response = self
            .provider
            .chat(&self.config.model, final_request)
            .await?;

        let usage = final_response.usage.clone();
        let final_text = final_response.text().to_string();
        self.messages.push(final_response.message);

        Ok(ChatTurnResult {
            final_text,
            tool_calls_made,
            corrective_nudges,
            usage,
        })
    }

    async fn invoke_with_menu(&self) -> Result<ChatResponse> {
        let request = self
            .base_request(self.messages.clone())
            .with_tools(self.tools.clone())
            .with_tool_choice(ToolChoice::Auto);
        self.provider.chat(&self.config.model, request).await
    }

    fn base_request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        let mut request = ChatRequest::new(messages);
        if let Some(temp) = self.config.temperature {
            request = request.with_temperature(temp);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }

    /// Get conversation history
    pub fn history(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Reset the conversation, keeping only the system instruction
    pub fn clear_history(&mut self) {
        self.messages.clear();
        self.messages.push(ChatMessage::system(order_agent_prompt()));
    }
}

/// Result of a single dispatch turn
#[derive(Debug)]
pub struct ChatTurnResult {
    /// Terminal answer from the reasoning service
    pub final_text: String,
    /// Number of tool calls executed
    pub tool_calls_made: usize,
    /// Corrective user turns that were sent
    pub corrective_nudges: usize,
    /// Token usage of the closing response, if reported
    pub usage: Option<TokenUsage>,
}
