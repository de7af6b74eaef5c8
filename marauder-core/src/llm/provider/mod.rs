mod message;
mod provider_trait;
mod request;
mod tool;

pub use marauder_commons::llm::{
    FinishReason, FunctionCall, LLMError, LLMErrorMetadata, LLMResponse, ToolCall, Usage,
};
pub use message::{Message, MessageRole};
pub use provider_trait::LLMProvider;
pub use request::LLMRequest;
pub use tool::{FunctionDefinition, ToolDefinition};
