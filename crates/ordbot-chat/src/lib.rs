//! ordbot-chat: dispatch layer for the order-support conversation
//!
//! Bridges the reasoning service to the order store: declares the tool
//! menu, executes call requests through a closed invocation enum, and
//! threads conversation state until a terminal answer is produced.

pub mod chat_loop;
pub mod system_prompt;
pub mod tools;

pub use chat_loop::{ChatLoopConfig, ChatTurnResult, OrderChatLoop};
pub use tools::{build_tool_definitions, ToolInvocation};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::chat_loop::{ChatLoopConfig, ChatTurnResult, OrderChatLoop};
    pub use super::tools::{build_tool_definitions, ToolInvocation};
}
