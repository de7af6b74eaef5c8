//! The tool-call protocol engine.
//!
//! [`AgentRunner`] drives one user turn: send the compacted history with the
//! tool schema, dispatch every returned call in order, append the results,
//! and repeat until the model answers in plain text. Progress is reported
//! through a [`TurnObserver`].

mod observer;
mod output;
mod runner;
mod session;
mod usage;

pub use observer::{NoopObserver, TurnObserver, TurnPhase};
pub use output::cap_tool_output;
pub use runner::{AgentRunner, TurnError, TurnOutcome, TurnReport};
pub use session::ConversationSession;
pub use usage::TokenUsage;
