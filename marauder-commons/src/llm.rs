//! Core LLM types shared across the project

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub const fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Error(String),
}

impl FinishReason {
    /// Map an OpenAI-style `finish_reason` string.
    pub fn from_wire(reason: &str) -> Self {
        match reason {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "tool_calls" | "function_call" => Self::ToolCalls,
            "content_filter" => Self::ContentFilter,
            other => Self::Error(other.to_owned()),
        }
    }
}

/// A tool invocation emitted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque identifier, unique within the emitting response (e.g. "call_123")
    pub id: String,

    /// Always "function" for chat-completion tools
    #[serde(rename = "type")]
    pub call_type: String,

    pub function: FunctionCall,
}

/// Function call within a tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// The name of the function to call
    pub name: String,

    /// The arguments to pass to the function, as a JSON string
    pub arguments: String,
}

impl ToolCall {
    /// Create a new function tool call
    pub fn function(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_owned(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Parse the arguments as a JSON value. Empty argument strings are treated
    /// as an empty object, which some OpenAI-compatible servers emit for
    /// zero-parameter tools.
    pub fn parsed_arguments(&self) -> Result<serde_json::Value, serde_json::Error> {
        let raw = self.function.arguments.trim();
        if raw.is_empty() {
            return Ok(serde_json::Value::Object(serde_json::Map::new()));
        }
        serde_json::from_str(raw)
    }
}

/// Universal LLM response structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMResponse {
    /// The response content text
    pub content: Option<String>,

    /// Tool calls made by the model
    pub tool_calls: Option<Vec<ToolCall>>,

    /// The model that generated this response
    pub model: String,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Why the response finished
    pub finish_reason: FinishReason,

    /// Reasoning content (for models that support it). Shown, never stored.
    pub reasoning: Option<String>,
}

impl Default for LLMResponse {
    fn default() -> Self {
        Self {
            content: None,
            tool_calls: None,
            model: String::new(),
            usage: None,
            finish_reason: FinishReason::Stop,
            reasoning: None,
        }
    }
}

impl LLMResponse {
    /// Create a new text-only response
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Get content or empty string
    pub fn content_text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Tool calls in emission order; empty when the model answered in text.
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LLMErrorMetadata {
    pub provider: Option<String>,
    pub status: Option<u16>,
    pub message: Option<String>,
}

impl LLMErrorMetadata {
    pub fn new(provider: impl Into<String>, status: Option<u16>, message: Option<String>) -> Box<Self> {
        Box::new(Self {
            provider: Some(provider.into()),
            status,
            message,
        })
    }
}

/// Transport-level failures talking to the model endpoint.
#[derive(Debug, thiserror::Error, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LLMError {
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        metadata: Option<Box<LLMErrorMetadata>>,
    },
    #[error("Rate limit exceeded")]
    RateLimit {
        metadata: Option<Box<LLMErrorMetadata>>,
    },
    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
        metadata: Option<Box<LLMErrorMetadata>>,
    },
    #[error("Network error: {message}")]
    Network {
        message: String,
        metadata: Option<Box<LLMErrorMetadata>>,
    },
    #[error("Provider error: {message}")]
    Provider {
        message: String,
        metadata: Option<Box<LLMErrorMetadata>>,
    },
}

impl LLMError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            metadata: None,
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            metadata: None,
        }
    }

    pub fn metadata(&self) -> Option<&LLMErrorMetadata> {
        match self {
            Self::Authentication { metadata, .. }
            | Self::RateLimit { metadata }
            | Self::InvalidRequest { metadata, .. }
            | Self::Network { metadata, .. }
            | Self::Provider { metadata, .. } => metadata.as_deref(),
        }
    }
}
