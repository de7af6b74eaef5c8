mod openai_compatible;

pub use openai_compatible::OpenAICompatibleProvider;

use marauder_config::constants::defaults;

use super::provider::{LLMError, LLMProvider, LLMRequest, Message};

/// Send a tiny prompt and require a non-empty answer.
pub async fn verify_connection(provider: &dyn LLMProvider, model: &str) -> Result<(), LLMError> {
    let request = LLMRequest::new(model, vec![Message::user(defaults::CONNECTION_TEST_PROMPT)])
        .with_max_tokens(defaults::CONNECTION_TEST_MAX_TOKENS);
    let response = provider.generate(request).await?;
    if response.content_text().trim().is_empty() && !response.has_tool_calls() {
        return Err(LLMError::provider(format!(
            "{} returned an empty reply to the connection test",
            provider.name()
        )));
    }
    Ok(())
}
