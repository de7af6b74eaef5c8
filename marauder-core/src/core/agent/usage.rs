use crate::llm::Usage;

/// Token accounting across API calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub api_calls: u64,
    /// Prompt size of the most recent request, i.e. the context actually sent.
    pub last_prompt_tokens: u64,
}

impl TokenUsage {
    /// Count one API call and fold in its usage, if the server reported any.
    pub fn record(&mut self, usage: Option<&Usage>) {
        self.api_calls += 1;
        if let Some(usage) = usage {
            self.prompt_tokens += u64::from(usage.prompt_tokens);
            self.completion_tokens += u64::from(usage.completion_tokens);
            self.last_prompt_tokens = u64::from(usage.prompt_tokens);
        }
    }

    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Share of `context_limit` used by the last request; `0.0` when unknown.
    pub fn context_fraction(&self, context_limit: u64) -> f64 {
        if context_limit == 0 {
            return 0.0;
        }
        self.last_prompt_tokens as f64 / context_limit as f64
    }
}
