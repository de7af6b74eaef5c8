//! Model access: the provider trait, request/message types, and the
//! OpenAI-compatible chat-completions provider.

pub mod provider;
pub mod providers;

pub use provider::{
    FinishReason, FunctionDefinition, LLMError, LLMErrorMetadata, LLMProvider, LLMRequest,
    LLMResponse, Message, MessageRole, ToolCall, ToolDefinition, Usage,
};
pub use providers::{OpenAICompatibleProvider, verify_connection};
