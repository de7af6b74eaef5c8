//! Shared types reused across the Marauder crates.
//!
//! `llm` holds the provider-neutral wire types exchanged with a chat
//! completion endpoint, and `paths` holds the workspace confinement helpers
//! every filesystem-touching tool goes through.

pub mod llm;
pub mod paths;

pub use llm::{FinishReason, FunctionCall, LLMError, LLMErrorMetadata, LLMResponse, ToolCall, Usage};
pub use paths::{PathEscapeError, confine_to_root, ensure_resolved_within, normalize_path};
