use super::usage::TokenUsage;
use crate::compaction::Compactor;
use crate::llm::Message;

/// State that outlives a single turn: history, token totals, and the
/// compaction budget.
#[derive(Debug, Default)]
pub struct ConversationSession {
    pub history: Vec<Message>,
    pub usage: TokenUsage,
    pub compactor: Compactor,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the conversation and the token display. The compaction budget
    /// belongs to the session and is kept.
    pub fn clear(&mut self) {
        self.history.clear();
        self.usage = TokenUsage::default();
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
