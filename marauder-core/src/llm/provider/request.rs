use std::sync::Arc;

use super::{Message, ToolDefinition};

/// One chat-completions request.
#[derive(Debug, Clone, Default)]
pub struct LLMRequest {
    pub messages: Vec<Message>,
    /// Sent ahead of `messages` as a system message
    pub system_prompt: Option<Arc<String>>,
    pub tools: Option<Arc<Vec<ToolDefinition>>>,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LLMRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_system_prompt(mut self, prompt: Arc<String>) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    pub fn with_tools(mut self, tools: Arc<Vec<ToolDefinition>>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}
