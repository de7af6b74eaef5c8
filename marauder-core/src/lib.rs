//! Core of the Marauder coding agent.
//!
//! - [`llm`]: provider trait, chat messages, and the OpenAI-compatible
//!   chat-completions client.
//! - [`tools`]: the sandboxed tool surface and its registry.
//! - [`compaction`]: history trimming, outbound truncation, and summaries.
//! - [`core::agent`]: the turn loop that ties them together.

pub mod compaction;
pub mod core;
pub mod llm;
pub mod prompts;
pub mod tools;
pub mod utils;

pub use crate::core::agent::{
    AgentRunner, ConversationSession, NoopObserver, TokenUsage, TurnError, TurnObserver,
    TurnOutcome, TurnPhase, TurnReport,
};
pub use llm::{LLMError, LLMProvider, OpenAICompatibleProvider};
pub use tools::{ToolError, ToolRegistry};
