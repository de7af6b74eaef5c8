use async_trait::async_trait;

use super::{LLMError, LLMRequest, LLMResponse};

/// A chat model endpoint.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Provider name used in logs and error messages
    fn name(&self) -> &str;

    /// Model used when a request leaves `model` blank
    fn default_model(&self) -> &str;

    /// Generate one completion
    async fn generate(&self, request: LLMRequest) -> Result<LLMResponse, LLMError>;
}
