//! End-to-end dispatch tests driven by a scripted reasoning service

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

use async_trait::async_trait;
use ordbot_chat::{ChatLoopConfig, OrderChatLoop};
use ordbot_core::{Error, Result};
use ordbot_llm::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, ToolCallInfo};
use ordbot_store::{OrderStore, ProductOrder, CANCELLED, PREPARING, SHIPPING};

/// Provider replaying a fixed script of responses
struct ScriptedProvider {
    responses: Mutex<VecDeque<ChatResponse>>,
    requests_seen: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests_seen: Mutex::new(Vec::new()),
        }
    }

    fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, _model: &str, request: ChatRequest) -> Result<ChatResponse> {
        self.requests_seen.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::provider("script exhausted"))
    }
}

fn text_response(content: &str) -> ChatResponse {
    ChatResponse {
        message: ChatMessage::assistant(content),
        model: "scripted".to_string(),
        finish_reason: Some("stop".to_string()),
        usage: None,
    }
}

fn tool_call_response(calls: Vec<(&str, &str, &str)>) -> ChatResponse {
    let tool_calls = calls
        .into_iter()
        .map(|(id, name, arguments)| ToolCallInfo {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        })
        .collect();

    ChatResponse {
        message: ChatMessage {
            role: "assistant".to_string(),
            content: String::new(),
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        },
        model: "scripted".to_string(),
        finish_reason: Some("tool_calls".to_string()),
        usage: None,
    }
}

fn seeded_store() -> Arc<RwLock<OrderStore>> {
    let mut store = OrderStore::new();
    store.save(ProductOrder::new(
        "1000000",
        "MacBook Air",
        "Yeouido-dong, Yeongdeungpo-gu, Seoul",
        SHIPPING,
    ));
    store.save(ProductOrder::new(
        "1000001",
        "iPhone",
        "Yeoksam-dong, Gangnam-gu, Seoul",
        PREPARING,
    ));
    Arc::new(RwLock::new(store))
}

#[tokio::test]
async fn test_cancel_flow_mutates_store_before_final_answer() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_call_response(vec![(
            "call_1",
            "cancel_order",
            r#"{"product_name": "MacBook Air"}"#,
        )]),
        text_response("Your MacBook Air order has been cancelled."),
    ]));
    let store = seeded_store();
    let mut chat_loop =
        OrderChatLoop::new(provider.clone(), store.clone(), ChatLoopConfig::default());

    let result = chat_loop
        .process_message("Please cancel my MacBook Air order.")
        .await
        .unwrap();

    assert_eq!(result.tool_calls_made, 1);
    assert_eq!(result.corrective_nudges, 0);
    assert!(result.final_text.contains("cancelled"));

    // The store mutation is the source of truth, not the final text
    let store = store.read().await;
    let outcome = store.get_shipping_status("MacBook Air");
    assert!(outcome.success());
    assert_eq!(outcome.shipping_status(), Some(CANCELLED));

    // Untouched order stays as-is
    assert_eq!(store.get_shipping_status("iPhone").shipping_status(), Some(PREPARING));
    assert_eq!(provider.remaining(), 0);
}

#[tokio::test]
async fn test_call_request_echo_precedes_tool_results() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_call_response(vec![(
            "call_1",
            "cancel_order",
            r#"{"product_name": "MacBook Air"}"#,
        )]),
        text_response("Done."),
    ]));
    let store = seeded_store();
    let mut chat_loop =
        OrderChatLoop::new(provider.clone(), store, ChatLoopConfig::default());

    chat_loop.process_message("Cancel the MacBook Air.").await.unwrap();

    let history = chat_loop.history();
    let assistant_idx = history
        .iter()
        .position(|m| m.role == "assistant" && m.tool_calls.is_some())
        .expect("assistant call-request entry in history");
    let tool_idx = history
        .iter()
        .position(|m| m.role == "tool")
        .expect("tool result in history");
    assert!(assistant_idx < tool_idx);
    assert_eq!(history[tool_idx].tool_call_id.as_deref(), Some("call_1"));

    // The closing request carries the full history and no menu
    let requests = provider.requests();
    let final_request = requests.last().unwrap();
    assert!(final_request.tools.is_empty());
    assert!(final_request.messages.iter().any(|m| m.role == "tool"));
}

#[tokio::test]
async fn test_nudge_then_compliance() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        text_response("Are you sure you want to cancel?"),
        tool_call_response(vec![(
            "call_1",
            "cancel_order",
            r#"{"product_name": "MacBook Air"}"#,
        )]),
        text_response("The MacBook Air order is cancelled."),
    ]));
    let store = seeded_store();
    let mut chat_loop =
        OrderChatLoop::new(provider.clone(), store.clone(), ChatLoopConfig::default());

    let result = chat_loop
        .process_message("Please cancel my MacBook Air order.")
        .await
        .unwrap();

    assert_eq!(result.corrective_nudges, 1);
    assert_eq!(result.tool_calls_made, 1);
    assert_eq!(
        store.read().await.get_shipping_status("MacBook Air").shipping_status(),
        Some(CANCELLED)
    );
}

#[tokio::test]
async fn test_nudge_is_bounded_and_store_untouched() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        text_response("Are you sure you want to cancel?"),
        text_response("I still need you to confirm."),
        // A third response would only be reachable by an unbounded retry
        text_response("unreachable"),
    ]));
    let store = seeded_store();
    let mut chat_loop =
        OrderChatLoop::new(provider.clone(), store.clone(), ChatLoopConfig::default());

    let result = chat_loop
        .process_message("Please cancel my MacBook Air order.")
        .await
        .unwrap();

    assert_eq!(result.corrective_nudges, 1);
    assert_eq!(result.tool_calls_made, 0);
    assert_eq!(result.final_text, "I still need you to confirm.");

    // Exactly two invocations: initial plus one corrective round
    assert_eq!(provider.remaining(), 1);
    assert_eq!(
        store.read().await.get_shipping_status("MacBook Air").shipping_status(),
        Some(SHIPPING)
    );
}

#[tokio::test]
async fn test_unsupported_operation_still_reaches_terminal_answer() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_call_response(vec![("call_1", "delete_everything", "{}")]),
        text_response("I cannot do that."),
    ]));
    let store = seeded_store();
    let mut chat_loop =
        OrderChatLoop::new(provider.clone(), store.clone(), ChatLoopConfig::default());

    let result = chat_loop.process_message("Wipe it all.").await.unwrap();

    assert_eq!(result.final_text, "I cannot do that.");
    assert_eq!(result.tool_calls_made, 1);

    let history = chat_loop.history();
    let tool_message = history.iter().find(|m| m.role == "tool").unwrap();
    assert!(tool_message.content.contains("unsupported operation"));
    assert!(tool_message.content.contains("\"success\":false"));

    assert_eq!(store.read().await.len(), 2);
}

#[tokio::test]
async fn test_malformed_arguments_degrade_to_not_found() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_call_response(vec![("call_1", "get_shipping_status", "not json")]),
        text_response("I could not find that order."),
    ]));
    let store = seeded_store();
    let mut chat_loop =
        OrderChatLoop::new(provider.clone(), store.clone(), ChatLoopConfig::default());

    let result = chat_loop.process_message("Where is my stuff?").await.unwrap();

    assert_eq!(result.tool_calls_made, 1);
    let history = chat_loop.history();
    let tool_message = history.iter().find(|m| m.role == "tool").unwrap();
    assert!(tool_message.content.contains("\"success\":false"));

    // No mutation on a failed lookup
    let store = store.read().await;
    assert_eq!(store.get_shipping_status("MacBook Air").shipping_status(), Some(SHIPPING));
    assert_eq!(store.get_shipping_status("iPhone").shipping_status(), Some(PREPARING));
}

#[tokio::test]
async fn test_list_orders_flow() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_call_response(vec![("call_1", "list_orders", "{}")]),
        text_response("You have two orders: a MacBook Air and an iPhone."),
    ]));
    let store = seeded_store();
    let mut chat_loop =
        OrderChatLoop::new(provider.clone(), store, ChatLoopConfig::default());

    let result = chat_loop.process_message("What did I order?").await.unwrap();

    assert_eq!(result.tool_calls_made, 1);
    let history = chat_loop.history();
    let tool_message = history.iter().find(|m| m.role == "tool").unwrap();
    assert!(tool_message.content.contains("1000000"));
    assert!(tool_message.content.contains("1000001"));
}

#[tokio::test]
async fn test_call_cap_answers_every_call_request() {
    // Three calls against a cap of two: the overflow call still gets a
    // correlated result so the echoed history stays acceptable
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_call_response(vec![
            ("call_1", "get_shipping_status", r#"{"product_name": "MacBook Air"}"#),
            ("call_2", "get_shipping_status", r#"{"product_name": "iPhone"}"#),
            ("call_3", "cancel_order", r#"{"product_name": "MacBook Air"}"#),
        ]),
        text_response("Here is what I found."),
    ]));
    let store = seeded_store();
    let config = ChatLoopConfig {
        max_tool_calls_per_turn: 2,
        ..ChatLoopConfig::default()
    };
    let mut chat_loop = OrderChatLoop::new(provider.clone(), store.clone(), config);

    let result = chat_loop.process_message("Check my orders.").await.unwrap();

    assert_eq!(result.tool_calls_made, 2);

    let history = chat_loop.history();
    let echoed = history
        .iter()
        .find_map(|m| m.tool_calls.as_ref())
        .unwrap()
        .len();
    let results: Vec<_> = history.iter().filter(|m| m.role == "tool").collect();
    assert_eq!(results.len(), echoed);
    assert_eq!(results[2].tool_call_id.as_deref(), Some("call_3"));
    assert!(results[2].content.contains("tool call limit exceeded"));
    assert!(results[2].content.contains("\"success\":false"));

    // The capped cancel call never executed
    assert_eq!(
        store.read().await.get_shipping_status("MacBook Air").shipping_status(),
        Some(SHIPPING)
    );
}

#[tokio::test]
async fn test_config_limits_are_forwarded_to_requests() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_call_response(vec![(
            "call_1",
            "get_shipping_status",
            r#"{"product_name": "iPhone"}"#,
        )]),
        text_response("It is being prepared."),
    ]));
    let store = seeded_store();
    let config = ChatLoopConfig {
        max_tokens: Some(256),
        temperature: Some(0.2),
        ..ChatLoopConfig::default()
    };
    let mut chat_loop = OrderChatLoop::new(provider.clone(), store, config);

    chat_loop.process_message("Where is my iPhone?").await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.temperature, Some(0.2));
    }
}

#[tokio::test]
async fn test_provider_failure_propagates() {
    // Empty script: the very first invocation fails hard
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let store = seeded_store();
    let mut chat_loop =
        OrderChatLoop::new(provider, store.clone(), ChatLoopConfig::default());

    let err = chat_loop
        .process_message("Cancel my MacBook Air order.")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Provider(_)));

    assert_eq!(
        store.read().await.get_shipping_status("MacBook Air").shipping_status(),
        Some(SHIPPING)
    );
}
