//! Fixed prompts sent to the model.

pub mod system;

pub use system::{SUMMARIZE_PROMPT, default_system_prompt, summarize_prompt};
