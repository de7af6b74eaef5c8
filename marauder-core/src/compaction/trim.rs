use marauder_config::constants::compaction::{HISTORY_KEEP_HEAD, MAX_HISTORY_MESSAGES, TRIM_MARKER};
use tracing::debug;

use crate::llm::{Message, MessageRole};

pub fn is_trim_marker(message: &Message) -> bool {
    message.role == MessageRole::System && message.content == TRIM_MARKER
}

/// Cap `history` at [`MAX_HISTORY_MESSAGES`]: keep the head, a marker, and
/// the most recent messages. Returns whether anything was removed.
///
/// Running it twice gives the same history as running it once. The kept tail
/// never opens with a tool result whose call was cut away.
pub fn trim_history(history: &mut Vec<Message>) -> bool {
    if history.len() <= MAX_HISTORY_MESSAGES {
        return false;
    }

    let tail_len = MAX_HISTORY_MESSAGES - 1;
    let tail_start = history.len() - tail_len;
    let orphans = history
        .iter()
        .skip(tail_start)
        .take_while(|message| message.is_tool_response())
        .count();

    let before = history.len();
    let mut trimmed = Vec::with_capacity(HISTORY_KEEP_HEAD + 1 + tail_len);
    trimmed.extend(history.drain(..HISTORY_KEEP_HEAD));
    trimmed.push(Message::system(TRIM_MARKER));
    let tail_start = tail_start - HISTORY_KEEP_HEAD + orphans;
    trimmed.extend(history.drain(tail_start..));
    *history = trimmed;

    debug!(before, after = history.len(), orphans, "trimmed conversation history");
    true
}
