//! Budgets used to keep the conversation inside the model's context window.
//!
//! Hard trimming bounds the number of stored messages. Soft truncation
//! shrinks old messages in the outbound copy only. Summary compaction
//! replaces the whole history with a model-written digest.

/// Stored history is trimmed once it grows past this many messages.
pub const MAX_HISTORY_MESSAGES: usize = 30;
/// Messages kept from the start of history when trimming.
pub const HISTORY_KEEP_HEAD: usize = 1;
pub const TRIM_MARKER: &str = "[Earlier conversation trimmed for context efficiency]";

/// Trailing messages sent verbatim.
pub const RECENT_MESSAGES_INTACT: usize = 4;
pub const MAX_AGED_TOOL_RESULT_CHARS: usize = 800;
/// Aged tool results with more lines than this keep only head and tail lines.
pub const AGED_TOOL_RESULT_LINE_THRESHOLD: usize = 10;
pub const AGED_TOOL_RESULT_EDGE_LINES: usize = 5;
pub const MAX_AGED_ASSISTANT_CHARS: usize = 300;
pub const MAX_AGED_TOOL_ARGS_CHARS: usize = 200;
pub const AGED_EDIT_SNIPPET_CHARS: usize = 60;

pub const SUMMARY_MAX_TOKENS: u32 = 500;
/// Condensed entries fed to the summarizer, newest last.
pub const SUMMARY_SOURCE_MESSAGES: usize = 30;
pub const SUMMARY_USER_CHARS: usize = 500;
pub const SUMMARY_ASSISTANT_CHARS: usize = 300;
pub const SUMMARY_TOOL_RESULT_CHARS: usize = 100;
pub const MAX_SUMMARY_CHARS: usize = 4_000;
pub const SUMMARY_HEADER: &str = "[Conversation summary]";
pub const MAX_COMPACTIONS_PER_SESSION: usize = 3;
/// Fraction of the context limit at which compaction runs on its own.
pub const AUTO_COMPACT_THRESHOLD: f64 = 0.85;
