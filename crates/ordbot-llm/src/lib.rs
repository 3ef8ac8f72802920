//! ordbot-llm: reasoning-service integration
//!
//! ## Endpoint
//!
//! | Provider | Base URL | Auth Method |
//! |----------|----------|-------------|
//! | OpenAI | `https://api.openai.com/v1` | `Bearer {OPENAI_API_KEY}` |
//!
//! ## Environment Variables
//!
//! ```bash
//! OPENAI_API_KEY=sk-xxx        # API key (required)
//! OPENAI_BASE_URL=...          # Override endpoint (optional)
//! CHAT_TOOL_MODEL=gpt-4o-mini  # Model for tool-calling turns (optional)
//! CHAT_MODEL=gpt-4o-mini       # Fallback model (optional)
//! ```

pub mod openai;
pub mod provider;

pub use openai::OpenAiClient;
pub use provider::{
    ChatMessage, ChatRequest, ChatResponse, LlmProvider, TokenUsage, ToolCallInfo, ToolChoice,
    ToolDefinition,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::openai::OpenAiClient;
    pub use super::provider::{
        ChatMessage, ChatRequest, ChatResponse, LlmProvider, ToolCallInfo, ToolChoice,
        ToolDefinition,
    };
}
