use std::sync::Arc;

use marauder_config::constants::compaction::{
    MAX_COMPACTIONS_PER_SESSION, MAX_SUMMARY_CHARS, SUMMARY_ASSISTANT_CHARS, SUMMARY_HEADER,
    SUMMARY_MAX_TOKENS, SUMMARY_SOURCE_MESSAGES, SUMMARY_TOOL_RESULT_CHARS, SUMMARY_USER_CHARS,
};
use tracing::{info, warn};

use super::trim::is_trim_marker;
use crate::llm::{LLMError, LLMProvider, LLMRequest, Message, MessageRole};
use crate::prompts::summarize_prompt;
use crate::utils::text::clip_chars;

#[derive(Debug, thiserror::Error)]
pub enum CompactionError {
    #[error("context compaction already used {limit} times this session")]
    LimitReached { limit: usize },
    #[error("nothing to compact yet")]
    EmptyHistory,
    #[error("summary request failed: {0}")]
    Provider(#[from] LLMError),
    #[error("the model returned an empty summary")]
    EmptySummary,
}

fn is_summary(message: &Message) -> bool {
    message.role == MessageRole::System && message.content.starts_with(SUMMARY_HEADER)
}

/// Shrink `history` into the short transcript the summarizer sees.
///
/// Tool results become one-line assistant notes and an earlier summary is
/// carried forward as user text, so repeated compactions do not lose it.
pub fn condense_history(history: &[Message]) -> Vec<Message> {
    let condensed: Vec<Message> = history
        .iter()
        .filter_map(|message| match message.role {
            MessageRole::User => Some(Message::user(clip_chars(
                &message.content,
                SUMMARY_USER_CHARS,
            ))),
            MessageRole::Assistant if !message.content.trim().is_empty() => Some(
                Message::assistant(clip_chars(&message.content, SUMMARY_ASSISTANT_CHARS)),
            ),
            MessageRole::Assistant => None,
            MessageRole::Tool => Some(Message::assistant(format!(
                "[tool result: {}]",
                clip_chars(&message.content, SUMMARY_TOOL_RESULT_CHARS)
            ))),
            MessageRole::System if is_summary(message) => Some(Message::user(message.content.clone())),
            MessageRole::System => None,
        })
        .collect();

    let skip = condensed.len().saturating_sub(SUMMARY_SOURCE_MESSAGES);
    condensed.into_iter().skip(skip).collect()
}

/// Ask the model for a summary of `history`. The result is trimmed and
/// clipped to [`MAX_SUMMARY_CHARS`].
pub async fn summarize_history(
    provider: &dyn LLMProvider,
    model: &str,
    history: &[Message],
) -> Result<String, CompactionError> {
    let request = LLMRequest::new(model, condense_history(history))
        .with_system_prompt(Arc::new(summarize_prompt().to_owned()))
        .with_max_tokens(SUMMARY_MAX_TOKENS)
        .with_temperature(0.0);

    let response = provider.generate(request).await?;
    let summary = response.content_text().trim();
    if summary.is_empty() {
        return Err(CompactionError::EmptySummary);
    }
    Ok(clip_chars(summary, MAX_SUMMARY_CHARS).to_owned())
}

/// Per-session budget for summary compaction.
#[derive(Debug, Clone, Default)]
pub struct Compactor {
    used: usize,
}

impl Compactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        MAX_COMPACTIONS_PER_SESSION.saturating_sub(self.used)
    }

    /// Replace `history` with a single summary message. On any failure the
    /// history is left exactly as it was and the budget is not spent.
    pub async fn compact(
        &mut self,
        provider: &dyn LLMProvider,
        model: &str,
        history: &mut Vec<Message>,
    ) -> Result<(), CompactionError> {
        if self.remaining() == 0 {
            return Err(CompactionError::LimitReached {
                limit: MAX_COMPACTIONS_PER_SESSION,
            });
        }
        if history.iter().all(|m| is_trim_marker(m) || is_summary(m)) {
            return Err(CompactionError::EmptyHistory);
        }

        let summary = match summarize_history(provider, model, history).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(error = %err, "context compaction failed; history kept");
                return Err(err);
            }
        };

        let before = history.len();
        *history = vec![Message::system(format!("{SUMMARY_HEADER}\n{summary}"))];
        self.used += 1;
        info!(before, used = self.used, "compacted conversation into a summary");
        Ok(())
    }
}
