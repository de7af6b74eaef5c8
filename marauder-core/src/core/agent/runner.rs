use std::sync::Arc;
use std::time::{Duration, Instant};

use marauder_config::constants::compaction::AUTO_COMPACT_THRESHOLD;
use marauder_config::constants::execution::MAX_TOOL_ROUNDS;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::observer::{TurnObserver, TurnPhase};
use super::output::cap_tool_output;
use super::session::ConversationSession;
use super::usage::TokenUsage;
use crate::compaction::{CompactionError, prepare_outbound, trim_history};
use crate::llm::{LLMError, LLMProvider, LLMRequest, Message};
use crate::prompts::default_system_prompt;
use crate::tools::{ToolRegistry, short_action, touched_path};

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The model endpoint failed. History built so far is kept.
    #[error(transparent)]
    Transport(#[from] LLMError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model replied without tool calls.
    Answered(String),
    /// The round cap was hit while the model was still calling tools.
    RoundLimit,
}

/// Summary of one completed turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub outcome: TurnOutcome,
    pub elapsed: Duration,
    pub actions: usize,
    /// Paths passed to `write_file`/`edit_file`, first occurrence order.
    pub files_touched: Vec<String>,
    /// Tokens spent in this turn only.
    pub usage: TokenUsage,
}

impl TurnReport {
    pub fn answer(&self) -> Option<&str> {
        match &self.outcome {
            TurnOutcome::Answered(text) => Some(text),
            TurnOutcome::RoundLimit => None,
        }
    }
}

pub struct AgentRunner {
    provider: Arc<dyn LLMProvider>,
    tools: Arc<ToolRegistry>,
    model: String,
    system_prompt: Arc<String>,
    max_rounds: usize,
    context_limit: u64,
}

impl AgentRunner {
    pub fn new(provider: Arc<dyn LLMProvider>, tools: Arc<ToolRegistry>, model: impl Into<String>) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            system_prompt: Arc::new(default_system_prompt().to_owned()),
            max_rounds: MAX_TOOL_ROUNDS,
            context_limit: 0,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Arc::new(prompt.into());
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Enables automatic compaction; `0` disables it.
    pub fn with_context_limit(mut self, context_limit: u64) -> Self {
        self.context_limit = context_limit;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn context_limit(&self) -> u64 {
        self.context_limit
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Summarize the session's history into one message (`/compact`).
    pub async fn compact(&self, session: &mut ConversationSession) -> Result<(), CompactionError> {
        session
            .compactor
            .compact(self.provider.as_ref(), &self.model, &mut session.history)
            .await?;
        session.usage.last_prompt_tokens = 0;
        Ok(())
    }

    /// Run one user turn to completion.
    pub async fn run_turn(
        &self,
        session: &mut ConversationSession,
        input: &str,
        observer: &dyn TurnObserver,
    ) -> Result<TurnReport, TurnError> {
        let started = Instant::now();
        self.auto_compact(session, observer).await;
        session.history.push(Message::user(input));

        let mut turn_usage = TokenUsage::default();
        let mut actions = 0usize;
        let mut files_touched: Vec<String> = Vec::new();

        for round in 0..self.max_rounds {
            trim_history(&mut session.history);
            let request = LLMRequest::new(&self.model, prepare_outbound(&session.history))
                .with_system_prompt(Arc::clone(&self.system_prompt))
                .with_tools(self.tools.declarations())
                .with_temperature(0.0);

            observer.on_phase(&TurnPhase::WaitingForApi);
            let response = match self.provider.generate(request).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(round, error = %err, "model request failed; ending turn");
                    return Err(TurnError::Transport(err));
                }
            };

            turn_usage.record(response.usage.as_ref());
            session.usage.record(response.usage.as_ref());
            observer.on_usage(&session.usage);
            observer.on_phase(&TurnPhase::ProcessingResponse);

            if let Some(reasoning) = response.reasoning.as_deref().map(str::trim)
                && !reasoning.is_empty()
            {
                observer.on_reasoning(reasoning);
                observer.on_phase(&TurnPhase::ThinkingDeeply);
            }

            let text = response.content_text().trim().to_owned();
            let calls = response.tool_calls.unwrap_or_default();
            session
                .history
                .push(Message::assistant_with_tools(text.clone(), calls.clone()));

            if calls.is_empty() {
                debug!(round, actions, "turn finished with a text answer");
                return Ok(TurnReport {
                    outcome: TurnOutcome::Answered(text),
                    elapsed: started.elapsed(),
                    actions,
                    files_touched,
                    usage: turn_usage,
                });
            }

            for call in &calls {
                actions += 1;
                let args = call
                    .parsed_arguments()
                    .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
                if let Some(path) = touched_path(call.name(), &args)
                    && !files_touched.contains(&path)
                {
                    files_touched.push(path);
                }

                observer.on_phase(&TurnPhase::Running(short_action(call.name(), &args)));
                observer.on_tool_started(call, &args);
                debug!(tool = %call.name(), id = %call.id, "dispatching tool call");

                let result = self.tools.execute(call.name(), &call.function.arguments).await;
                let result = cap_tool_output(&result);
                observer.on_tool_finished(call, &args, &result);
                session
                    .history
                    .push(Message::tool_response(call.id.clone(), result));
            }

            if !text.is_empty() {
                observer.on_assistant_text(&text);
            }
        }

        warn!(rounds = self.max_rounds, "tool round limit reached");
        observer.on_notice(&format!(
            "Stopped after {} tool rounds. Send another message to continue.",
            self.max_rounds
        ));
        Ok(TurnReport {
            outcome: TurnOutcome::RoundLimit,
            elapsed: started.elapsed(),
            actions,
            files_touched,
            usage: turn_usage,
        })
    }

    async fn auto_compact(&self, session: &mut ConversationSession, observer: &dyn TurnObserver) {
        let fraction = session.usage.context_fraction(self.context_limit);
        if fraction < AUTO_COMPACT_THRESHOLD || session.is_empty() {
            return;
        }

        let percent = (fraction * 100.0).round();
        match self.compact(session).await {
            Ok(()) => {
                info!(percent, "auto-compacted conversation");
                observer.on_notice(&format!(
                    "Context at {percent}% of the limit; conversation compacted into a summary."
                ));
            }
            Err(err) => observer.on_notice(&format!(
                "Context at {percent}% of the limit; could not compact ({err})."
            )),
        }
    }
}
